use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::{TcResult, TypeclockError};
use crate::language::EXPECTED_WORDS;
use crate::stats::Outcome;

/// Longest countdown accepted, one hour
pub const MAX_DURATION_SECS: u32 = 3600;

#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Mode {
    Time,
    Words,
    Quote,
}

impl Mode {
    pub fn next(self) -> Self {
        match self {
            Mode::Time => Mode::Words,
            Mode::Words => Mode::Quote,
            Mode::Quote => Mode::Time,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            Mode::Time => Mode::Quote,
            Mode::Words => Mode::Time,
            Mode::Quote => Mode::Words,
        }
    }
}

/// Settings for one test; also the shape of `config.json`, where missing keys fall back to defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub mode: Mode,
    pub duration_secs: u32,
    pub word_count: usize,
    pub allow_backspace: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Time,
            duration_secs: 30,
            word_count: 50,
            allow_backspace: true,
        }
    }
}

impl SessionConfig {
    pub fn validate(&self) -> TcResult<()> {
        if self.duration_secs == 0 {
            return Err(TypeclockError::Config(
                "duration must be at least one second".to_string(),
            ));
        }
        if self.duration_secs > MAX_DURATION_SECS {
            return Err(TypeclockError::Config(format!(
                "duration must be at most {MAX_DURATION_SECS} seconds"
            )));
        }
        if self.word_count == 0 {
            return Err(TypeclockError::Config(
                "word count must be at least one".to_string(),
            ));
        }
        if self.word_count > EXPECTED_WORDS {
            return Err(TypeclockError::Config(format!(
                "word count must be at most {EXPECTED_WORDS}"
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    Finished,
}

/// Position of the next keystroke: word index, then letter index within it
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cursor {
    pub word: usize,
    pub char: usize,
}

/// A letter the user typed and how it was judged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Typed {
    pub ch: char,
    pub outcome: Outcome,
}
