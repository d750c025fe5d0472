/// Human-readable rendering of rates
use crate::poller::RateSample;

/// Binary prefixes tried in order before falling back to `Yi`
const PREFIXES: [&str; 8] = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi"];

/// Prefix used once every other prefix is exhausted
const LAST_PREFIX: &str = "Yi";

/// Padding after the console line, blanks out a longer previous line
const LINE_PADDING: &str = "                 ";

/// Format a magnitude with 1024-based prefixes, e.g. 1536.0 -> "1.5KiB".
pub fn format_size(mut num: f64) -> String {
    for prefix in PREFIXES {
        if num.abs() < 1024.0 {
            return format!("{:.1}{}B", num, prefix);
        }
        num /= 1024.0;
    }
    format!("{:.1}{}B", num, LAST_PREFIX)
}

/// The self-overwriting console line for one cycle.
pub fn console_line(rate: &RateSample) -> String {
    format!(
        "\rRx: {}/sec   Tx: {}/sec{}",
        format_size(rate.rx_bps),
        format_size(rate.tx_bps),
        LINE_PADDING
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_size_boundaries() {
        assert_eq!(format_size(1023.9), "1023.9B");
        assert_eq!(format_size(1024.0), "1.0KiB");
        assert_eq!(format_size(0.0), "0.0B");
        assert_eq!(format_size(-2048.0), "-2.0KiB");
    }

    #[test]
    fn test_format_size_one_decimal() {
        assert_eq!(format_size(1536.0), "1.5KiB");
        assert_eq!(format_size(8000.0), "7.8KiB");
        assert_eq!(format_size(3.0 * 1024.0 * 1024.0), "3.0MiB");
    }

    #[test]
    fn test_format_size_prefix_advances_per_1024() {
        let all = ["", "Ki", "Mi", "Gi", "Ti", "Pi", "Ei", "Zi", "Yi"];
        let mut num = 5.0;
        for prefix in all {
            assert_eq!(format_size(num), format!("5.0{}B", prefix));
            num *= 1024.0;
        }
    }

    #[test]
    fn test_format_size_stays_yi_past_the_end() {
        let yotta = 1024f64.powi(8);
        assert_eq!(format_size(2.0 * yotta), "2.0YiB");
        assert_eq!(format_size(2048.0 * yotta), "2048.0YiB");
        assert_eq!(format_size(-2048.0 * 1024.0 * yotta), "-2097152.0YiB");
    }

    #[test]
    fn test_console_line() {
        let rate = RateSample {
            tx_bps: 1024.0,
            rx_bps: 512.0,
        };
        let line = console_line(&rate);
        assert!(line.starts_with("\rRx: 512.0B/sec   Tx: 1.0KiB/sec"));
        assert!(line.ends_with(' '));
        assert!(!line.contains('\n'));
    }
}
