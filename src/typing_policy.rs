use crate::session::Typed;
use crate::stats::Outcome;

/// Judge `c` typed at letter position `idx` of `expected`
pub fn classify(expected: &str, idx: usize, c: char) -> Outcome {
    match expected.chars().nth(idx) {
        Some(e) if e == c => Outcome::Correct,
        Some(_) => Outcome::Incorrect,
        None => Outcome::Extra,
    }
}

/// Record a letter at the end of the word's typed letters
pub fn write_letter(typed: &mut Vec<Typed>, expected: &str, c: char) -> Typed {
    let letter = Typed {
        ch: c,
        outcome: classify(expected, typed.len(), c),
    };
    typed.push(letter);
    letter
}

/// Drop the last typed letter; `None` at the start of a word
pub fn erase_letter(typed: &mut Vec<Typed>) -> Option<Typed> {
    typed.pop()
}

/// Every expected letter typed correctly and nothing extra
pub fn word_matches(expected: &str, typed: &[Typed]) -> bool {
    typed.len() == expected.chars().count()
        && typed.iter().all(|t| t.outcome == Outcome::Correct)
}
