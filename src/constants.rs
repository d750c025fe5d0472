/// Root of the per-interface sysfs tree
pub const SYS_CLASS_NET: &str = "/sys/class/net";

/// Cumulative transmitted bytes, relative to the interface directory
pub const TX_BYTES_FILE: &str = "statistics/tx_bytes";

/// Cumulative received bytes, relative to the interface directory
pub const RX_BYTES_FILE: &str = "statistics/rx_bytes";

/// Negotiated link speed in Mbit/s, relative to the interface directory
pub const LINK_SPEED_FILE: &str = "speed";

/// Serial device the gauge is attached to when none is given
pub const DEFAULT_GAUGE_DEVICE: &str = "/dev/ttyUSB0";

/// Baud rate the gauge firmware listens at
pub const GAUGE_BAUD_RATE: u32 = 9600;

pub const BITS_PER_BYTE: u64 = 8;

/// Bits in one (binary) megabit, as the gauge scales rates
pub const BITS_PER_MEGABIT: f64 = 1_048_576.0;

/// Read buffer for a single sysfs counter file (u64 max is 20 digits)
pub const COUNTER_BUF_LEN: usize = 32;
