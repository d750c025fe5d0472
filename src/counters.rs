/// Network counter collection from /sys/class/net
use std::fs::{self, File};
use std::io;
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::constants::*;
use crate::error::{PollError, Result};

/// Transmitted and received bit counters captured at one instant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SampleCounters {
    /// Bits transmitted since the interface came up
    pub tx_bits: u64,
    /// Bits received since the interface came up
    pub rx_bits: u64,
}

impl SampleCounters {
    pub fn from_bytes(tx_bytes: u64, rx_bytes: u64) -> Self {
        SampleCounters {
            tx_bits: tx_bytes.saturating_mul(BITS_PER_BYTE),
            rx_bits: rx_bytes.saturating_mul(BITS_PER_BYTE),
        }
    }
}

/// Where the polling loop gets its counters from.
pub trait CounterSource {
    /// Current cumulative counters, in bits.
    fn sample(&mut self) -> Result<SampleCounters>;

    /// Advertised link speed in Mbit/s. Linux reports -1 without carrier.
    fn link_speed(&mut self) -> Result<i64>;
}

impl<C: CounterSource + ?Sized> CounterSource for &mut C {
    fn sample(&mut self) -> Result<SampleCounters> {
        (**self).sample()
    }

    fn link_speed(&mut self) -> Result<i64> {
        (**self).link_speed()
    }
}

/// A statistics file kept open for repeated positional reads
struct CounterFile {
    path: PathBuf,
    file: File,
}

impl CounterFile {
    fn open(path: PathBuf) -> Result<Self> {
        match File::open(&path) {
            Ok(file) => Ok(CounterFile { path, file }),
            Err(source) => Err(PollError::SourceUnavailable { path, source }),
        }
    }

    fn read(&self, buf: &mut [u8]) -> Result<u64> {
        let len = pread_file(self.file.as_raw_fd(), buf).map_err(|source| {
            PollError::SourceUnavailable {
                path: self.path.clone(),
                source,
            }
        })?;
        parse_counter(&buf[..len]).ok_or_else(|| PollError::InvalidCounter {
            path: self.path.clone(),
            content: String::from_utf8_lossy(&buf[..len]).trim().to_string(),
        })
    }
}

/// Counters of one interface as exposed under /sys/class/net/<iface>.
///
/// The two statistics files are opened once and re-read with pread() every
/// cycle; an interface that disappears surfaces as a read error.
pub struct SysfsCounters {
    tx: CounterFile,
    rx: CounterFile,
    speed_path: PathBuf,
    buf: [u8; COUNTER_BUF_LEN],
}

impl SysfsCounters {
    pub fn open(interface: &str) -> Result<Self> {
        Self::open_at(Path::new(SYS_CLASS_NET), interface)
    }

    /// Open the counters of `interface` below an arbitrary sysfs-like root.
    pub fn open_at(root: &Path, interface: &str) -> Result<Self> {
        let dir = root.join(interface);
        let tx = CounterFile::open(dir.join(TX_BYTES_FILE))?;
        let rx = CounterFile::open(dir.join(RX_BYTES_FILE))?;
        debug!(interface, dir = %dir.display(), "opened interface counters");

        Ok(SysfsCounters {
            tx,
            rx,
            speed_path: dir.join(LINK_SPEED_FILE),
            buf: [0u8; COUNTER_BUF_LEN],
        })
    }
}

impl CounterSource for SysfsCounters {
    fn sample(&mut self) -> Result<SampleCounters> {
        let tx_bytes = self.tx.read(&mut self.buf)?;
        let rx_bytes = self.rx.read(&mut self.buf)?;
        Ok(SampleCounters::from_bytes(tx_bytes, rx_bytes))
    }

    fn link_speed(&mut self) -> Result<i64> {
        let content = fs::read_to_string(&self.speed_path).map_err(|source| {
            PollError::SourceUnavailable {
                path: self.speed_path.clone(),
                source,
            }
        })?;
        content
            .trim()
            .parse::<i64>()
            .map_err(|_| PollError::InvalidCounter {
                path: self.speed_path.clone(),
                content: content.trim().to_string(),
            })
    }
}

/// Parse a sysfs counter ("1234567\n" -> 1234567)
fn parse_counter(data: &[u8]) -> Option<u64> {
    std::str::from_utf8(data).ok()?.trim().parse().ok()
}

/// Read file contents from offset 0 with pread64, leaving the file position alone.
#[inline]
fn pread_file(fd: i32, buf: &mut [u8]) -> io::Result<usize> {
    let bytes_read = unsafe {
        libc::pread64(fd, buf.as_mut_ptr() as *mut libc::c_void, buf.len(), 0)
    };

    if bytes_read < 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(bytes_read as usize)
    }
}
