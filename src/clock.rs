use std::time::{Duration, Instant};

/// Host-side cadence gate for the stepping loop.
///
/// The engine never schedules itself; a host polls [`Ticker::due`] from its
/// own loop and steps once per `true`. Missed intervals are coalesced into a
/// single step, never caught up.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    last: Option<Instant>,
    running: bool,
}

impl Ticker {
    pub fn new(delay_ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(delay_ms),
            last: None,
            running: true,
        }
    }

    pub fn set_delay(&mut self, delay_ms: u64) {
        self.interval = Duration::from_millis(delay_ms);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    pub fn resume(&mut self) {
        self.running = true;
    }

    pub fn toggle(&mut self) -> bool {
        self.running = !self.running;
        self.running
    }

    /// Whether a step should run at `now`. The first poll while running
    /// always fires.
    pub fn due(&mut self, now: Instant) -> bool {
        if !self.running {
            return false;
        }
        let fire = match self.last {
            None => true,
            Some(last) => now.saturating_duration_since(last) >= self.interval,
        };
        if fire {
            self.last = Some(now);
        }
        fire
    }

    /// Time left until the next step would fire.
    pub fn remaining(&self, now: Instant) -> Duration {
        match self.last {
            None => Duration::ZERO,
            Some(last) => self
                .interval
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }
}
