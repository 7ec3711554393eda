use super::core::Lexicon;
use rand::seq::SliceRandom;
use rand::Rng;

/// Pick one entry uniformly at random, `None` for an empty list
pub fn pick_random<'a, R: Rng + ?Sized>(list: &'a [String], rng: &mut R) -> Option<&'a str> {
    list.choose(rng).map(String::as_str)
}

impl Lexicon {
    /// Sample `num` words with replacement from the word list
    pub fn random_words(&self, num: usize) -> Vec<String> {
        self.random_words_with(num, &mut rand::thread_rng())
    }

    pub fn random_words_with<R: Rng + ?Sized>(&self, num: usize, rng: &mut R) -> Vec<String> {
        (0..num)
            .filter_map(|_| pick_random(&self.language.words, rng))
            .map(str::to_owned)
            .collect()
    }

    /// Pick a quote and split it into words
    pub fn random_quote(&self) -> Vec<String> {
        self.random_quote_with(&mut rand::thread_rng())
    }

    pub fn random_quote_with<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        pick_random(&self.quotes.quotes, rng)
            .map(|quote| quote.split_whitespace().map(str::to_owned).collect())
            .unwrap_or_default()
    }
}
