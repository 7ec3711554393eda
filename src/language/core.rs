use include_dir::{include_dir, Dir};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::from_str;

use crate::error::{TcResult, TypeclockError};

static LANG_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lang");

#[derive(Deserialize, Clone, Debug)]
pub struct Language {
    pub name: String,
    pub size: u32,
    pub words: Vec<String>,
}

#[derive(Deserialize, Clone, Debug)]
pub struct QuoteBook {
    pub name: String,
    pub size: u32,
    pub quotes: Vec<String>,
}

impl Language {
    pub fn new(file_name: &str) -> TcResult<Self> {
        let lang: Language = read_json(&format!("{file_name}.json"))?;
        if lang.words.is_empty() {
            return Err(TypeclockError::EmptyWordList(lang.name));
        }
        Ok(lang)
    }
}

impl QuoteBook {
    pub fn new(file_name: &str) -> TcResult<Self> {
        let book: QuoteBook = read_json(&format!("{file_name}.json"))?;
        if book.quotes.is_empty() {
            return Err(TypeclockError::EmptyWordList(book.name));
        }
        Ok(book)
    }
}

/// Word list plus quote list a session draws its text from
#[derive(Clone, Debug)]
pub struct Lexicon {
    pub language: Language,
    pub quotes: QuoteBook,
}

impl Lexicon {
    pub fn english() -> TcResult<Self> {
        Ok(Self {
            language: Language::new("english")?,
            quotes: QuoteBook::new("quotes")?,
        })
    }

    /// Build a lexicon from in-memory lists, mostly useful for deterministic tests
    pub fn from_lists(words: &[&str], quotes: &[&str]) -> TcResult<Self> {
        if words.is_empty() {
            return Err(TypeclockError::EmptyWordList("custom".to_string()));
        }
        if quotes.is_empty() {
            return Err(TypeclockError::EmptyWordList("custom quotes".to_string()));
        }
        let words: Vec<String> = words.iter().map(|w| w.to_string()).collect();
        let quotes: Vec<String> = quotes.iter().map(|q| q.to_string()).collect();
        Ok(Self {
            language: Language {
                name: "custom".to_string(),
                size: words.len() as u32,
                words,
            },
            quotes: QuoteBook {
                name: "custom quotes".to_string(),
                size: quotes.len() as u32,
                quotes,
            },
        })
    }
}

fn read_json<T: DeserializeOwned>(file_name: &str) -> TcResult<T> {
    let file = LANG_DIR.get_file(file_name).ok_or_else(|| {
        TypeclockError::Config(format!("language file '{file_name}' not found"))
    })?;

    let file_as_str = file.contents_utf8().ok_or_else(|| {
        TypeclockError::Config(format!("language file '{file_name}' is not utf-8"))
    })?;

    Ok(from_str(file_as_str)?)
}
