/// Polling cadence
use std::thread;
use std::time::Duration;

/// Blocks until the next polling cycle is due.
pub trait Ticker {
    fn wait(&mut self);
}

/// Sleeps a fixed period per cycle. Not aligned to the wall clock, so the
/// work done in each cycle adds up as drift.
pub struct SleepTicker {
    period: Duration,
}

impl SleepTicker {
    pub fn new(period: Duration) -> Self {
        SleepTicker { period }
    }
}

impl Ticker for SleepTicker {
    fn wait(&mut self) {
        thread::sleep(self.period);
    }
}
