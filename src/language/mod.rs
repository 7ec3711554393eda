pub mod core;
pub mod selection;

// Re-export the main types for convenience
pub use core::{Language, Lexicon, QuoteBook};
pub use selection::pick_random;

/// Number of words generated for every time and words mode test
pub const EXPECTED_WORDS: usize = 300;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integrated_functionality() {
        let lexicon = Lexicon::english().unwrap();
        let words = lexicon.random_words(EXPECTED_WORDS);
        assert_eq!(words.len(), EXPECTED_WORDS);

        let quote = lexicon.random_quote();
        assert!(!quote.is_empty());
    }
}
