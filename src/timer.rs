use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::debug;

const TICK: Duration = Duration::from_secs(1);

/// Source of "now" for the countdown
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Wall clock used by the binary
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Hand-cranked clock for deterministic tests. Clones share the same time.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Rc<Cell<Instant>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self {
            now: Rc::new(Cell::new(Instant::now())),
        }
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}

/// Events the countdown hands back to its owner
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    Tick(u32),
    Complete,
}

#[derive(Clone, Copy, Debug)]
struct Running {
    ends_at: Instant,
    next_tick_at: Instant,
    segment_start: Instant,
}

/// Countdown measured against an absolute end time, so a late poll
/// recomputes the remaining seconds instead of drifting.
#[derive(Debug)]
pub struct Timer<C: Clock = SystemClock> {
    clock: C,
    initial: u32,
    remaining: u32,
    running: Option<Running>,
    run_time: Duration,
}

impl Timer<SystemClock> {
    pub fn new(seconds: u32) -> Self {
        Self::with_clock(seconds, SystemClock)
    }
}

impl<C: Clock> Timer<C> {
    pub fn with_clock(seconds: u32, clock: C) -> Self {
        Self {
            clock,
            initial: seconds,
            remaining: seconds,
            running: None,
            run_time: Duration::ZERO,
        }
    }

    /// Set a new duration; stops the countdown and resets it
    pub fn set_time(&mut self, seconds: u32) -> TimerEvent {
        self.initial = seconds;
        self.reset()
    }

    pub fn start(&mut self) {
        if self.running.is_some() {
            return;
        }
        let now = self.clock.now();
        self.running = Some(Running {
            ends_at: now + Duration::from_secs(u64::from(self.remaining)),
            next_tick_at: now + TICK,
            segment_start: now,
        });
        debug!(remaining = self.remaining, "timer started");
    }

    /// Emit whatever is due: nothing, a tick, or the final tick followed by completion
    pub fn poll(&mut self) -> Vec<TimerEvent> {
        let Some(mut running) = self.running else {
            return Vec::new();
        };
        let now = self.clock.now();
        if now < running.next_tick_at {
            return Vec::new();
        }

        // Missed slots are skipped rather than replayed
        while running.next_tick_at <= now {
            running.next_tick_at += TICK;
        }
        self.running = Some(running);

        let left = ceil_secs(running.ends_at.saturating_duration_since(now));
        if left == 0 {
            self.remaining = 0;
            self.stop();
            vec![TimerEvent::Tick(0), TimerEvent::Complete]
        } else {
            self.remaining = left;
            vec![TimerEvent::Tick(left)]
        }
    }

    pub fn stop(&mut self) {
        if let Some(running) = self.running.take() {
            self.run_time += self
                .clock
                .now()
                .saturating_duration_since(running.segment_start);
            debug!(remaining = self.remaining, "timer stopped");
        }
    }

    /// Stop and restore the initial duration. The returned tick lets listeners
    /// refresh without a running clock.
    pub fn reset(&mut self) -> TimerEvent {
        self.stop();
        self.remaining = self.initial;
        self.run_time = Duration::ZERO;
        TimerEvent::Tick(self.remaining)
    }

    pub fn time_elapsed(&self) -> u32 {
        self.initial.saturating_sub(self.remaining)
    }

    /// Wall-clock time spent running since the last reset
    pub fn run_time(&self) -> Duration {
        match self.running {
            Some(running) => {
                self.run_time
                    + self
                        .clock
                        .now()
                        .saturating_duration_since(running.segment_start)
            }
            None => self.run_time,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn initial(&self) -> u32 {
        self.initial
    }
}

fn ceil_secs(d: Duration) -> u32 {
    let millis = d.as_millis();
    millis.div_ceil(1000).min(u128::from(u32::MAX)) as u32
}
