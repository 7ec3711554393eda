use crate::util::steadiness;

/// Classification of a single typed character
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    Correct,
    Incorrect,
    /// Typed past the end of the expected word
    Extra,
}

impl Outcome {
    pub fn is_correct(self) -> bool {
        self == Outcome::Correct
    }
}

/// Point-in-time recording of the derived statistics
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Snapshot {
    /// Seconds into the test
    pub elapsed: f64,
    pub wpm: u32,
    pub raw: u32,
    pub accuracy: u32,
}

/// Results handed to the presentation when a test ends
#[derive(Clone, Debug, PartialEq)]
pub struct FinalStats {
    pub wpm: u32,
    pub raw_wpm: u32,
    pub accuracy: u32,
    pub consistency: u32,
    pub correct: usize,
    pub incorrect: usize,
    pub extra: usize,
    pub elapsed_secs: f64,
    pub history: Vec<Snapshot>,
}

/// Keystroke counters plus the per-tick history
#[derive(Clone, Debug, Default)]
pub struct Stats {
    correct: usize,
    incorrect: usize,
    extra: usize,
    keystrokes: usize,
    history: Vec<Snapshot>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Extra characters count as incorrect too; `extra` only breaks them out for display.
    pub fn register_keystroke(&mut self, outcome: Outcome) {
        self.keystrokes += 1;
        match outcome {
            Outcome::Correct => self.correct += 1,
            Outcome::Incorrect => self.incorrect += 1,
            Outcome::Extra => {
                self.incorrect += 1;
                self.extra += 1;
            }
        }
    }

    /// Net wpm: only correct characters count
    pub fn calculate_wpm(&self, elapsed_secs: f64) -> u32 {
        per_minute(self.correct, elapsed_secs)
    }

    /// Every typed character counts, right or wrong
    pub fn calculate_raw_wpm(&self, elapsed_secs: f64) -> u32 {
        per_minute(self.correct + self.incorrect, elapsed_secs)
    }

    pub fn calculate_accuracy(&self) -> u32 {
        if self.keystrokes == 0 {
            return 100;
        }
        let acc = (self.correct as f64 / self.keystrokes as f64) * 100.0;
        acc.round().clamp(0.0, 100.0) as u32
    }

    pub fn snapshot(&mut self, time_remaining: u32, total_time: u32) {
        self.snapshot_at(f64::from(total_time.saturating_sub(time_remaining)));
    }

    /// Record the stats as they stand `elapsed_secs` into the test
    pub fn snapshot_at(&mut self, elapsed_secs: f64) {
        let snapshot = Snapshot {
            elapsed: elapsed_secs,
            wpm: self.calculate_wpm(elapsed_secs),
            raw: self.calculate_raw_wpm(elapsed_secs),
            accuracy: self.calculate_accuracy(),
        };
        self.history.push(snapshot);
    }

    /// How steady raw wpm stayed across snapshots, 100 being perfectly flat
    pub fn consistency(&self) -> u32 {
        if self.history.len() < 2 {
            return 100;
        }
        let raws: Vec<f64> = self.history.iter().map(|s| f64::from(s.raw)).collect();
        steadiness(&raws).map_or(0, |pct| pct.round() as u32)
    }

    pub fn final_stats(&self, elapsed_secs: f64) -> FinalStats {
        FinalStats {
            wpm: self.calculate_wpm(elapsed_secs),
            raw_wpm: self.calculate_raw_wpm(elapsed_secs),
            accuracy: self.calculate_accuracy(),
            consistency: self.consistency(),
            correct: self.correct,
            incorrect: self.incorrect,
            extra: self.extra,
            elapsed_secs,
            history: self.history.clone(),
        }
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn incorrect(&self) -> usize {
        self.incorrect
    }

    pub fn extra(&self) -> usize {
        self.extra
    }

    pub fn keystrokes(&self) -> usize {
        self.keystrokes
    }

    pub fn history(&self) -> &[Snapshot] {
        &self.history
    }
}

/// Standard typing speed: five characters make a word
fn per_minute(chars: usize, elapsed_secs: f64) -> u32 {
    if elapsed_secs.is_nan() || elapsed_secs <= 0.0 {
        return 0;
    }
    let minutes = elapsed_secs / 60.0;
    ((chars as f64 / 5.0) / minutes).max(0.0).round() as u32
}
