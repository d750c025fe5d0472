//! Utilization percentage for the serial gauge and its wire encoding.
//!
//! Each update is one ASCII line holding a decimal integer followed by `\n`.
//! The firmware acknowledges nothing, so a reading is written and forgotten.

use std::fmt;
use std::io::{self, Write};
use std::time::Duration;

use serialport::SerialPort;
use tracing::{debug, info};

use crate::constants::BITS_PER_MEGABIT;
use crate::error::{PollError, Result};

/// How long a single serial write may block before it fails
const WRITE_TIMEOUT: Duration = Duration::from_secs(1);

/// Link utilization in percent. Values above 100 mean the configured
/// capacity is lower than the traffic actually seen and are kept as-is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeReading(pub i64);

impl GaugeReading {
    /// Percentage of `capacity_mbit` used by `rate_bps`, rounded half to even.
    pub fn from_rate(rate_bps: f64, capacity_mbit: u64) -> Self {
        let mbit = rate_bps / BITS_PER_MEGABIT;
        let percent = (mbit / capacity_mbit as f64) * 100.0;
        GaugeReading(percent.round_ties_even() as i64)
    }

    /// The wire form: decimal digits and a trailing newline.
    pub fn encode(&self) -> Vec<u8> {
        format!("{}\n", self.0).into_bytes()
    }
}

impl fmt::Display for GaugeReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

/// Output device the gauge readings are written to.
pub trait GaugeSink: Sized {
    fn open(device: &str, baud_rate: u32) -> Result<Self>;

    fn is_open(&self) -> bool;

    /// Write one complete line, terminator included.
    fn write_line(&mut self, line: &[u8]) -> io::Result<()>;
}

/// Encode `reading` and hand it to `sink`.
pub fn send<S: GaugeSink>(sink: &mut S, reading: GaugeReading) -> Result<()> {
    sink.write_line(&reading.encode())
        .map_err(PollError::SinkWriteFailure)
}

/// Arduino gauge attached to a serial port
pub struct SerialGauge {
    device: String,
    port: Box<dyn SerialPort>,
}

impl GaugeSink for SerialGauge {
    fn open(device: &str, baud_rate: u32) -> Result<Self> {
        info!("Initializing gauge interface on {}", device);
        let port = serialport::new(device, baud_rate)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|err| PollError::SinkOpenFailure {
                device: device.to_string(),
                reason: err.to_string(),
            })?;

        Ok(SerialGauge {
            device: device.to_string(),
            port,
        })
    }

    /// Probes the descriptor; a device unplugged after open reports false.
    fn is_open(&self) -> bool {
        self.port.baud_rate().is_ok()
    }

    fn write_line(&mut self, line: &[u8]) -> io::Result<()> {
        debug!(device = %self.device, bytes = line.len(), "writing gauge line");
        self.port.write_all(line)?;
        self.port.flush()
    }
}


#[cfg(test)]
mod tests {
    use super::fake::MemorySink;
    use super::*;

    const ONE_MBIT: f64 = 1_048_576.0;

    #[test]
    fn test_one_mbit_of_ten() {
        let reading = GaugeReading::from_rate(ONE_MBIT, 10);
        assert_eq!(reading, GaugeReading(10));
        assert_eq!(reading.encode(), b"10\n");
    }

    #[test]
    fn test_over_capacity_is_not_clamped() {
        let reading = GaugeReading::from_rate(15.0 * ONE_MBIT, 10);
        assert_eq!(reading.encode(), b"150\n");
    }

    #[test]
    fn test_idle_link() {
        assert_eq!(GaugeReading::from_rate(0.0, 100).encode(), b"0\n");
    }

    #[test]
    fn test_negative_rate_keeps_sign() {
        assert_eq!(GaugeReading::from_rate(-5.0 * ONE_MBIT, 10).encode(), b"-50\n");
    }

    #[test]
    fn test_rounds_half_to_even() {
        assert_eq!(GaugeReading::from_rate(ONE_MBIT, 200), GaugeReading(0));
        assert_eq!(GaugeReading::from_rate(5.0 * ONE_MBIT, 200), GaugeReading(2));
        assert_eq!(GaugeReading::from_rate(7.0 * ONE_MBIT, 200), GaugeReading(4));
    }

    #[test]
    fn test_rounds_to_nearest() {
        // 1.3 of 10 Mbit -> 13%, 1.36 -> 13.6% -> 14%
        assert_eq!(GaugeReading::from_rate(1.3 * ONE_MBIT, 10), GaugeReading(13));
        assert_eq!(GaugeReading::from_rate(1.36 * ONE_MBIT, 10), GaugeReading(14));
    }

    #[test]
    fn test_send_writes_one_line() {
        let mut sink = MemorySink::open("/dev/null", 9600).unwrap();
        send(&mut sink, GaugeReading(42)).unwrap();
        send(&mut sink, GaugeReading(-3)).unwrap();
        assert_eq!(sink.lines, vec![b"42\n".to_vec(), b"-3\n".to_vec()]);
    }

    #[test]
    fn test_send_failure_is_sink_write_failure() {
        let mut sink = MemorySink::open("/dev/null", 9600).unwrap();
        sink.broken = true;
        let err = send(&mut sink, GaugeReading(1)).unwrap_err();
        assert!(matches!(err, PollError::SinkWriteFailure(_)));
    }

    #[test]
    fn test_serial_open_failure() {
        let err = SerialGauge::open("/dev/does-not-exist-gauge", 9600).err().unwrap();
        assert!(matches!(err, PollError::SinkOpenFailure { ref device, .. } if device == "/dev/does-not-exist-gauge"));
    }

    #[test]
    fn test_display() {
        assert_eq!(GaugeReading(150).to_string(), "150%");
    }
}
