use tracing::{debug, info, warn};

use crate::error::{TcResult, TypeclockError};
use crate::language::{Lexicon, EXPECTED_WORDS};
use crate::session::{Cursor, Mode, Phase, SessionConfig, Typed};
use crate::stats::{FinalStats, Outcome, Stats};
use crate::timer::{Clock, SystemClock, Timer, TimerEvent};
use crate::typing_policy::{erase_letter, word_matches, write_letter};

/// Everything that can drive a session forward
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    KeyPress(char),
    Backspace,
    Space,
    TimerTick(u32),
    TimerComplete,
    Restart,
    ConfigChange(SessionConfig),
}

/// What changed, for whoever draws the session
#[derive(Debug, Clone, PartialEq)]
pub enum Feedback {
    Started,
    Keystroke {
        word: usize,
        index: usize,
        ch: char,
        outcome: Outcome,
    },
    Reverted {
        word: usize,
        index: usize,
    },
    WordAdvanced {
        word: usize,
    },
    LiveWpm(u32),
    TimeLeft(u32),
    Finished(FinalStats),
    Reset,
    ConfigRejected(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FinishReason {
    TimeUp,
    TextDone,
}

/// Owns one typing test at a time: text, cursor, countdown and counters
#[derive(Debug)]
pub struct SessionController<C: Clock = SystemClock> {
    config: SessionConfig,
    lexicon: Lexicon,
    words: Vec<String>,
    typed: Vec<Vec<Typed>>,
    cursor: Cursor,
    phase: Phase,
    timer: Timer<C>,
    stats: Stats,
    live_wpm: u32,
    time_left: u32,
    results: Option<FinalStats>,
}

impl SessionController<SystemClock> {
    pub fn new(config: SessionConfig, lexicon: Lexicon) -> TcResult<Self> {
        Self::with_clock(config, lexicon, SystemClock)
    }
}

impl<C: Clock> SessionController<C> {
    pub fn with_clock(config: SessionConfig, lexicon: Lexicon, clock: C) -> TcResult<Self> {
        config.validate()?;
        let mut controller = Self {
            timer: Timer::with_clock(config.duration_secs, clock),
            time_left: config.duration_secs,
            config,
            lexicon,
            words: Vec::new(),
            typed: Vec::new(),
            cursor: Cursor::default(),
            phase: Phase::Idle,
            stats: Stats::new(),
            live_wpm: 0,
            results: None,
        };
        controller.reset();
        Ok(controller)
    }

    pub fn handle(&mut self, input: Input) -> Vec<Feedback> {
        debug!(?input, phase = ?self.phase, "handling input");
        match input {
            Input::Restart => self.reset(),
            Input::ConfigChange(config) => match self.reconfigure(config) {
                Ok(feedback) => feedback,
                Err(e) => {
                    warn!("configuration rejected: {e}");
                    vec![Feedback::ConfigRejected(e.to_string())]
                }
            },
            Input::TimerTick(remaining) => self.on_tick(remaining),
            Input::TimerComplete => {
                if self.phase == Phase::Running {
                    vec![self.finish(FinishReason::TimeUp)]
                } else {
                    Vec::new()
                }
            }
            Input::Space | Input::KeyPress(' ') => {
                let mut feedback = self.auto_start();
                if self.phase == Phase::Running {
                    feedback.extend(self.on_space());
                }
                feedback
            }
            Input::KeyPress(c) if c.is_control() => Vec::new(),
            Input::KeyPress(c) => {
                let mut feedback = self.auto_start();
                if self.phase == Phase::Running {
                    feedback.extend(self.on_letter(c));
                }
                feedback
            }
            Input::Backspace => {
                if self.phase == Phase::Running {
                    self.on_backspace()
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Forward whatever the countdown has due into the state machine
    pub fn poll_timer(&mut self) -> Vec<Feedback> {
        let mut feedback = Vec::new();
        for event in self.timer.poll() {
            let input = match event {
                TimerEvent::Tick(remaining) => Input::TimerTick(remaining),
                TimerEvent::Complete => Input::TimerComplete,
            };
            feedback.extend(self.handle(input));
        }
        feedback
    }

    /// Swap in a new configuration and start over; refused mid-test
    pub fn reconfigure(&mut self, config: SessionConfig) -> TcResult<Vec<Feedback>> {
        if self.phase == Phase::Running {
            return Err(TypeclockError::SessionRunning);
        }
        config.validate()?;
        info!(mode = %config.mode, duration = config.duration_secs, "configuration changed");
        self.config = config;
        Ok(self.reset())
    }

    fn reset(&mut self) -> Vec<Feedback> {
        self.stats.reset();
        self.phase = Phase::Idle;
        self.cursor = Cursor::default();
        self.results = None;
        self.live_wpm = 0;
        self.words = self.generate_text();
        self.typed = vec![Vec::new(); self.words.len()];
        debug!(words = self.words.len(), "session reset");

        let mut feedback = vec![Feedback::Reset];
        if let TimerEvent::Tick(remaining) = self.timer.set_time(self.config.duration_secs) {
            feedback.extend(self.on_tick(remaining));
        }
        feedback
    }

    fn generate_text(&self) -> Vec<String> {
        let words = match self.config.mode {
            Mode::Time | Mode::Words => Vec::new(),
            Mode::Quote => self.lexicon.random_quote(),
        };
        if words.is_empty() {
            self.lexicon.random_words(EXPECTED_WORDS)
        } else {
            words
        }
    }

    fn auto_start(&mut self) -> Vec<Feedback> {
        if self.phase != Phase::Idle {
            return Vec::new();
        }
        self.phase = Phase::Running;
        self.timer.start();
        info!(mode = %self.config.mode, duration = self.config.duration_secs, "test started");
        vec![Feedback::Started]
    }

    fn on_tick(&mut self, remaining: u32) -> Vec<Feedback> {
        self.time_left = remaining;
        if self.phase == Phase::Running {
            self.stats.snapshot(remaining, self.config.duration_secs);
        }
        vec![Feedback::TimeLeft(remaining)]
    }

    fn on_letter(&mut self, c: char) -> Vec<Feedback> {
        let word = self.cursor.word;
        let Some(expected) = self.words.get(word) else {
            return Vec::new();
        };
        let letter = write_letter(&mut self.typed[word], expected, c);
        let index = self.cursor.char;
        self.cursor.char += 1;
        self.stats.register_keystroke(letter.outcome);

        let mut feedback = vec![
            Feedback::Keystroke {
                word,
                index,
                ch: c,
                outcome: letter.outcome,
            },
            self.refresh_live_wpm(),
        ];

        let last = self.target_words().saturating_sub(1);
        if self.config.mode != Mode::Time
            && word == last
            && word_matches(&self.words[word], &self.typed[word])
        {
            feedback.push(self.finish(FinishReason::TextDone));
        }
        self.check_cursor();
        feedback
    }

    fn on_space(&mut self) -> Vec<Feedback> {
        if self.cursor.word >= self.words.len() {
            return Vec::new();
        }
        self.cursor.word += 1;
        self.cursor.char = 0;
        self.stats.register_keystroke(Outcome::Correct);

        let mut feedback = vec![
            Feedback::WordAdvanced {
                word: self.cursor.word,
            },
            self.refresh_live_wpm(),
        ];
        if self.config.mode != Mode::Time && self.cursor.word >= self.target_words() {
            feedback.push(self.finish(FinishReason::TextDone));
        }
        self.check_cursor();
        feedback
    }

    fn on_backspace(&mut self) -> Vec<Feedback> {
        if !self.config.allow_backspace {
            return Vec::new();
        }
        let word = self.cursor.word;
        let Some(typed) = self.typed.get_mut(word) else {
            return Vec::new();
        };
        match erase_letter(typed) {
            Some(_) => {
                self.cursor.char -= 1;
                self.check_cursor();
                vec![Feedback::Reverted {
                    word,
                    index: self.cursor.char,
                }]
            }
            None => Vec::new(),
        }
    }

    fn refresh_live_wpm(&mut self) -> Feedback {
        self.live_wpm = self
            .stats
            .calculate_wpm(f64::from(self.timer.time_elapsed()));
        Feedback::LiveWpm(self.live_wpm)
    }

    fn finish(&mut self, reason: FinishReason) -> Feedback {
        self.timer.stop();
        self.phase = Phase::Finished;
        let elapsed = match reason {
            FinishReason::TimeUp => f64::from(self.timer.time_elapsed()),
            FinishReason::TextDone => self.timer.run_time().as_secs_f64(),
        };
        // Early finishes close the history at the actual end; a time-up already
        // snapshotted its final tick
        let last = self.stats.history().last().map_or(0.0, |s| s.elapsed);
        if reason == FinishReason::TextDone && elapsed > last {
            self.stats.snapshot_at(elapsed);
        }
        let results = self.stats.final_stats(elapsed);
        info!(
            wpm = results.wpm,
            raw = results.raw_wpm,
            accuracy = results.accuracy,
            ?reason,
            "test finished"
        );
        self.results = Some(results.clone());
        Feedback::Finished(results)
    }

    fn check_cursor(&self) {
        debug_assert!(self.cursor.word <= self.words.len());
        debug_assert!(self
            .typed
            .get(self.cursor.word)
            .map_or(self.cursor.char == 0, |t| t.len() == self.cursor.char));
    }

    /// How many words must be finished before the test ends on its own
    pub fn target_words(&self) -> usize {
        match self.config.mode {
            Mode::Words => self.config.word_count.min(self.words.len()),
            Mode::Time | Mode::Quote => self.words.len(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn typed(&self) -> &[Vec<Typed>] {
        &self.typed
    }

    pub fn cursor(&self) -> Cursor {
        self.cursor
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn live_wpm(&self) -> u32 {
        self.live_wpm
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn timer(&self) -> &Timer<C> {
        &self.timer
    }

    pub fn results(&self) -> Option<&FinalStats> {
        self.results.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::ManualClock;
    use assert_matches::assert_matches;
    use std::time::Duration;

    fn controller(word: &str, config: SessionConfig) -> (SessionController<ManualClock>, ManualClock) {
        let clock = ManualClock::new();
        let lexicon = Lexicon::from_lists(&[word], &["alpha beta"]).unwrap();
        let controller = SessionController::with_clock(config, lexicon, clock.clone()).unwrap();
        (controller, clock)
    }

    fn type_str(c: &mut SessionController<ManualClock>, s: &str) {
        for ch in s.chars() {
            if ch == ' ' {
                c.handle(Input::Space);
            } else {
                c.handle(Input::KeyPress(ch));
            }
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let (c, _) = controller("cat", SessionConfig::default());
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.words().len(), EXPECTED_WORDS);
        assert_eq!(c.cursor(), Cursor::default());
        assert_eq!(c.time_left(), 30);
        assert!(!c.timer().is_running());
    }

    #[test]
    fn test_invalid_config_is_rejected_on_construction() {
        let clock = ManualClock::new();
        let lexicon = Lexicon::from_lists(&["cat"], &["q"]).unwrap();
        let cfg = SessionConfig {
            duration_secs: 0,
            ..SessionConfig::default()
        };
        assert_matches!(
            SessionController::with_clock(cfg, lexicon, clock),
            Err(TypeclockError::Config(_))
        );
    }

    #[test]
    fn test_first_letter_starts_the_test() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        let feedback = c.handle(Input::KeyPress('c'));

        assert_eq!(feedback[0], Feedback::Started);
        assert_matches!(
            feedback[1],
            Feedback::Keystroke {
                word: 0,
                index: 0,
                ch: 'c',
                outcome: Outcome::Correct
            }
        );
        assert_eq!(c.phase(), Phase::Running);
        assert!(c.timer().is_running());
    }

    #[test]
    fn test_backspace_does_not_start() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        assert!(c.handle(Input::Backspace).is_empty());
        assert_eq!(c.phase(), Phase::Idle);
    }

    #[test]
    fn test_control_chars_are_ignored() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        assert!(c.handle(Input::KeyPress('\u{7}')).is_empty());
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.stats().keystrokes(), 0);
    }

    #[test]
    fn test_typo_and_extra_letters() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        type_str(&mut c, "caxd");

        let outcomes: Vec<Outcome> = c.typed()[0].iter().map(|t| t.outcome).collect();
        assert_eq!(
            outcomes,
            vec![
                Outcome::Correct,
                Outcome::Correct,
                Outcome::Incorrect,
                Outcome::Extra
            ]
        );
        assert_eq!(c.cursor(), Cursor { word: 0, char: 4 });

        c.handle(Input::Space);
        assert_eq!(c.cursor(), Cursor { word: 1, char: 0 });
        // The space itself counts as a correct keystroke
        assert_eq!(c.stats().correct(), 3);
        assert_eq!(c.stats().incorrect(), 2);
    }

    #[test]
    fn test_backspace_reverts_within_word() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        type_str(&mut c, "cx");
        let feedback = c.handle(Input::Backspace);

        assert_eq!(feedback, vec![Feedback::Reverted { word: 0, index: 1 }]);
        assert_eq!(c.cursor(), Cursor { word: 0, char: 1 });
        assert_eq!(c.typed()[0].len(), 1);
        // The erased keystroke still counts
        assert_eq!(c.stats().keystrokes(), 2);
    }

    #[test]
    fn test_backspace_never_crosses_words() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        type_str(&mut c, "cat ");
        assert!(c.handle(Input::Backspace).is_empty());
        assert_eq!(c.cursor(), Cursor { word: 1, char: 0 });
        assert_eq!(c.typed()[0].len(), 3);
    }

    #[test]
    fn test_backspace_disabled() {
        let cfg = SessionConfig {
            allow_backspace: false,
            ..SessionConfig::default()
        };
        let (mut c, _) = controller("cat", cfg);
        type_str(&mut c, "cx");
        assert!(c.handle(Input::Backspace).is_empty());
        assert_eq!(c.cursor(), Cursor { word: 0, char: 2 });
    }

    #[test]
    fn test_space_on_untouched_word_still_advances() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        c.handle(Input::Space);
        assert_eq!(c.phase(), Phase::Running);
        assert_eq!(c.cursor(), Cursor { word: 1, char: 0 });
        assert!(c.typed()[0].is_empty());
    }

    #[test]
    fn test_timer_ticks_snapshot_while_running() {
        let (mut c, clock) = controller("cat", SessionConfig::default());
        type_str(&mut c, "cat");

        clock.advance(Duration::from_secs(1));
        let feedback = c.poll_timer();

        assert_eq!(feedback, vec![Feedback::TimeLeft(29)]);
        assert_eq!(c.time_left(), 29);
        assert_eq!(c.stats().history().len(), 1);
        assert_eq!(c.stats().history()[0].elapsed, 1.0);
    }

    #[test]
    fn test_live_wpm_uses_whole_elapsed_seconds() {
        let (mut c, clock) = controller("cat", SessionConfig::default());
        type_str(&mut c, "cat");
        assert_eq!(c.live_wpm(), 0);

        clock.advance(Duration::from_secs(6));
        c.poll_timer();
        let feedback = c.handle(Input::KeyPress('x'));
        // 3 correct chars over 6s is 6 wpm
        assert!(feedback.contains(&Feedback::LiveWpm(6)));
        assert_eq!(c.live_wpm(), 6);
    }

    #[test]
    fn test_timer_completion_finishes() {
        let cfg = SessionConfig {
            duration_secs: 2,
            ..SessionConfig::default()
        };
        let (mut c, clock) = controller("cat", cfg);
        type_str(&mut c, "cat cat");

        clock.advance(Duration::from_secs(1));
        c.poll_timer();
        clock.advance(Duration::from_secs(1));
        let feedback = c.poll_timer();

        assert_eq!(feedback[0], Feedback::TimeLeft(0));
        assert_matches!(&feedback[1], Feedback::Finished(results) if results.elapsed_secs == 2.0);
        assert_eq!(c.phase(), Phase::Finished);

        let results = c.results().unwrap();
        // 7 correct chars over 2 seconds
        assert_eq!(results.wpm, 42);
        assert_eq!(results.accuracy, 100);
        assert_eq!(results.history.len(), 2);
    }

    #[test]
    fn test_finished_ignores_typing() {
        let cfg = SessionConfig {
            duration_secs: 1,
            ..SessionConfig::default()
        };
        let (mut c, clock) = controller("cat", cfg);
        type_str(&mut c, "c");
        clock.advance(Duration::from_secs(1));
        c.poll_timer();

        assert!(c.handle(Input::KeyPress('a')).is_empty());
        assert!(c.handle(Input::Space).is_empty());
        assert!(c.handle(Input::Backspace).is_empty());
        assert_eq!(c.cursor(), Cursor { word: 0, char: 1 });
    }

    #[test]
    fn test_restart_resets_everything() {
        let cfg = SessionConfig {
            duration_secs: 1,
            ..SessionConfig::default()
        };
        let (mut c, clock) = controller("cat", cfg);
        type_str(&mut c, "cat c");
        clock.advance(Duration::from_secs(1));
        c.poll_timer();
        assert_eq!(c.phase(), Phase::Finished);

        let feedback = c.handle(Input::Restart);
        assert_eq!(feedback, vec![Feedback::Reset, Feedback::TimeLeft(1)]);
        assert_eq!(c.phase(), Phase::Idle);
        assert_eq!(c.cursor(), Cursor::default());
        assert_eq!(c.stats().keystrokes(), 0);
        assert!(c.results().is_none());
        assert!(c.typed().iter().all(Vec::is_empty));
        assert_eq!(c.live_wpm(), 0);
    }

    #[test]
    fn test_restart_while_running_stops_timer() {
        let (mut c, clock) = controller("cat", SessionConfig::default());
        type_str(&mut c, "ca");
        c.handle(Input::Restart);

        assert_eq!(c.phase(), Phase::Idle);
        clock.advance(Duration::from_secs(5));
        assert!(c.poll_timer().is_empty());
    }

    #[test]
    fn test_config_change_rejected_while_running() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        c.handle(Input::KeyPress('c'));

        let cfg = SessionConfig {
            duration_secs: 60,
            ..SessionConfig::default()
        };
        let feedback = c.handle(Input::ConfigChange(cfg));

        assert_matches!(&feedback[..], [Feedback::ConfigRejected(_)]);
        assert_eq!(c.config().duration_secs, 30);
        assert_eq!(c.phase(), Phase::Running);
    }

    #[test]
    fn test_config_change_when_idle() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        let cfg = SessionConfig {
            duration_secs: 60,
            ..SessionConfig::default()
        };
        let feedback = c.handle(Input::ConfigChange(cfg));

        assert_eq!(feedback, vec![Feedback::Reset, Feedback::TimeLeft(60)]);
        assert_eq!(c.config().duration_secs, 60);
        assert_eq!(c.timer().remaining(), 60);
    }

    #[test]
    fn test_invalid_config_change_is_rejected() {
        let (mut c, _) = controller("cat", SessionConfig::default());
        let cfg = SessionConfig {
            word_count: 0,
            ..SessionConfig::default()
        };
        assert_matches!(
            c.reconfigure(cfg),
            Err(TypeclockError::Config(_))
        );
        assert_eq!(c.config(), &SessionConfig::default());
    }

    #[test]
    fn test_words_mode_finishes_on_last_word() {
        let cfg = SessionConfig {
            mode: Mode::Words,
            word_count: 2,
            ..SessionConfig::default()
        };
        let (mut c, clock) = controller("ab", cfg);
        type_str(&mut c, "ab a");
        assert_eq!(c.phase(), Phase::Running);

        clock.advance(Duration::from_millis(1500));
        let feedback = c.handle(Input::KeyPress('b'));

        assert_matches!(feedback.last(), Some(Feedback::Finished(_)));
        let results = c.results().unwrap();
        assert_eq!(results.elapsed_secs, 1.5);
        // 5 correct keystrokes over 1.5s
        assert_eq!(results.wpm, 40);
        assert!(!c.timer().is_running());
        // closing snapshot at the actual finish, not the last whole second
        assert_eq!(results.history.len(), 1);
        assert_eq!(results.history[0].elapsed, 1.5);
        assert_eq!(results.history[0].wpm, 40);
    }

    #[test]
    fn test_early_finish_after_ticks_keeps_tick_history() {
        let cfg = SessionConfig {
            mode: Mode::Words,
            word_count: 2,
            ..SessionConfig::default()
        };
        let (mut c, clock) = controller("ab", cfg);
        type_str(&mut c, "ab ");
        clock.advance(Duration::from_secs(1));
        c.poll_timer();
        clock.advance(Duration::from_millis(400));
        type_str(&mut c, "ab");

        let results = c.results().unwrap();
        assert_eq!(results.history.len(), 2);
        assert_eq!(results.history[0].elapsed, 1.0);
        assert!((results.history[1].elapsed - 1.4).abs() < 1e-9);
        assert!((results.elapsed_secs - 1.4).abs() < 1e-9);
    }

    #[test]
    fn test_words_mode_finishes_on_space_past_last_word() {
        let cfg = SessionConfig {
            mode: Mode::Words,
            word_count: 1,
            ..SessionConfig::default()
        };
        let (mut c, _) = controller("ab", cfg);
        type_str(&mut c, "ax");
        assert_eq!(c.phase(), Phase::Running);

        let feedback = c.handle(Input::Space);
        assert_matches!(feedback.last(), Some(Feedback::Finished(_)));
        assert_eq!(c.phase(), Phase::Finished);
    }

    #[test]
    fn test_quote_mode_uses_quote_words() {
        let cfg = SessionConfig {
            mode: Mode::Quote,
            ..SessionConfig::default()
        };
        let (mut c, _) = controller("cat", cfg);
        assert_eq!(c.words(), &["alpha".to_string(), "beta".to_string()]);
        assert_eq!(c.target_words(), 2);

        type_str(&mut c, "alpha beta");
        assert_eq!(c.phase(), Phase::Finished);
        assert_eq!(c.results().unwrap().accuracy, 100);
    }

    #[test]
    fn test_exhausted_text_ignores_input() {
        let (mut c, _) = controller("a", SessionConfig::default());
        for _ in 0..EXPECTED_WORDS {
            c.handle(Input::Space);
        }
        assert_eq!(c.cursor().word, EXPECTED_WORDS);

        assert!(c.handle(Input::Space).is_empty());
        assert!(c.handle(Input::KeyPress('a')).is_empty());
        assert!(c.handle(Input::Backspace).is_empty());
        assert_eq!(c.cursor().word, EXPECTED_WORDS);
    }
}
