//! The polling loop: sample counters, derive rates, report them on the
//! console and drive the gauge.
//!
//! `Poller::start` performs initialization (capacity, gauge device, first
//! sample). Each `Poller::cycle` waits one tick and folds the new sample into
//! the baseline it is given, returning the baseline for the next cycle.

use std::convert::Infallible;
use std::io::Write;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::constants::GAUGE_BAUD_RATE;
use crate::counters::{CounterSource, SampleCounters};
use crate::error::{PollError, Result};
use crate::format::console_line;
use crate::gauge::{self, GaugeReading, GaugeSink};
use crate::ticker::Ticker;

/// Which rate drives the gauge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Receive,
    Transmit,
}

/// Loop settings, fixed for the lifetime of the process
#[derive(Debug, Clone)]
pub struct LoopConfig {
    /// Interface whose counters are sampled
    pub interface: String,
    /// Seconds between samples
    pub interval_secs: u64,
    /// Link capacity in Mbit/s, 0 to use the advertised link speed
    pub capacity_mbit: u64,
    /// Suppress the console rate line
    pub quiet: bool,
    /// Write readings to the gauge device
    pub gauge_enabled: bool,
    /// Serial device of the gauge
    pub gauge_device: String,
    pub gauge_direction: Direction,
}

impl LoopConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Throughput over one interval, in bits per second
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateSample {
    pub tx_bps: f64,
    pub rx_bps: f64,
}

impl RateSample {
    /// Rates between two samples taken `interval_secs` apart. A counter that
    /// went backwards yields a negative rate.
    pub fn between(baseline: SampleCounters, next: SampleCounters, interval_secs: u64) -> Self {
        let interval = interval_secs as f64;
        RateSample {
            tx_bps: delta(baseline.tx_bits, next.tx_bits) / interval,
            rx_bps: delta(baseline.rx_bits, next.rx_bits) / interval,
        }
    }

    pub fn select(&self, direction: Direction) -> f64 {
        match direction {
            Direction::Receive => self.rx_bps,
            Direction::Transmit => self.tx_bps,
        }
    }
}

fn delta(before: u64, after: u64) -> f64 {
    (after as i128 - before as i128) as f64
}

/// Outcome of one polling cycle
#[derive(Debug, Clone, PartialEq)]
pub struct Cycle {
    /// Baseline for the next cycle
    pub sample: SampleCounters,
    pub rate: RateSample,
    /// Present only when the gauge is enabled
    pub gauge: Option<GaugeReading>,
}

/// Pure step of the loop: fold `next` into `baseline`.
pub fn advance(
    baseline: SampleCounters,
    next: SampleCounters,
    config: &LoopConfig,
    capacity_mbit: u64,
) -> Cycle {
    let rate = RateSample::between(baseline, next, config.interval_secs);
    let gauge = config
        .gauge_enabled
        .then(|| GaugeReading::from_rate(rate.select(config.gauge_direction), capacity_mbit));

    Cycle {
        sample: next,
        rate,
        gauge,
    }
}

/// Capacity in Mbit/s: the configured one, or the link speed when unset.
fn resolve_capacity<C: CounterSource>(config: &LoopConfig, source: &mut C) -> Result<u64> {
    if config.capacity_mbit != 0 {
        return Ok(config.capacity_mbit);
    }

    let speed = source.link_speed()?;
    if speed <= 0 {
        return Err(PollError::UnknownLinkSpeed {
            interface: config.interface.clone(),
            speed,
        });
    }
    Ok(speed as u64)
}

/// Running polling loop. Owns the counter source, the gauge device and the
/// console for the lifetime of the process.
pub struct Poller<C, S, T, W> {
    config: LoopConfig,
    capacity_mbit: u64,
    source: C,
    sink: Option<S>,
    ticker: T,
    console: W,
}

impl<C, S, T, W> Poller<C, S, T, W>
where
    C: CounterSource,
    S: GaugeSink,
    T: Ticker,
    W: Write,
{
    /// Initialize the loop and take the first sample, which is returned as the
    /// baseline for the first cycle.
    pub fn start(
        config: LoopConfig,
        mut source: C,
        ticker: T,
        console: W,
    ) -> Result<(Self, SampleCounters)> {
        let capacity_mbit = resolve_capacity(&config, &mut source)?;
        info!(
            "Starting up with interface {} (speed considered max: {}MBit)",
            config.interface, capacity_mbit
        );

        let sink = if config.gauge_enabled {
            let sink = S::open(&config.gauge_device, GAUGE_BAUD_RATE)?;
            if !sink.is_open() {
                return Err(PollError::SinkOpenFailure {
                    device: config.gauge_device.clone(),
                    reason: "device is not open".to_string(),
                });
            }
            Some(sink)
        } else {
            None
        };

        let baseline = source.sample()?;
        debug!(?baseline, "initial sample");

        let poller = Poller {
            config,
            capacity_mbit,
            source,
            sink,
            ticker,
            console,
        };
        Ok((poller, baseline))
    }

    /// Wait one tick, sample, report. Returns the new baseline.
    pub fn cycle(&mut self, baseline: SampleCounters) -> Result<SampleCounters> {
        self.ticker.wait();
        let next = self.source.sample()?;
        if next.tx_bits < baseline.tx_bits || next.rx_bits < baseline.rx_bits {
            warn!(?baseline, ?next, "interface counters went backwards");
        }

        let cycle = advance(baseline, next, &self.config, self.capacity_mbit);
        debug!(
            tx_bps = cycle.rate.tx_bps,
            rx_bps = cycle.rate.rx_bps,
            gauge = ?cycle.gauge,
            "cycle"
        );

        if !self.config.quiet {
            self.console
                .write_all(console_line(&cycle.rate).as_bytes())
                .and_then(|_| self.console.flush())
                .map_err(PollError::Console)?;
        }

        if let (Some(sink), Some(reading)) = (self.sink.as_mut(), cycle.gauge) {
            debug!(%reading, "gauge update");
            gauge::send(sink, reading)?;
        }

        Ok(cycle.sample)
    }

    /// Cycle until something fails.
    pub fn run(mut self, mut baseline: SampleCounters) -> Result<Infallible> {
        loop {
            baseline = self.cycle(baseline)?;
        }
    }
}
