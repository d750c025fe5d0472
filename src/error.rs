//! Fatal conditions of the polling loop.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that terminate the polling loop. None of them are retried.
#[derive(Error, Debug)]
pub enum PollError {
    /// A counter or link speed file is missing or unreadable.
    #[error("counter source {path} unavailable: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A counter file did not hold a decimal integer.
    #[error("counter source {path} holds {content:?}, expected a decimal integer")]
    InvalidCounter { path: PathBuf, content: String },

    /// Auto-detected capacity is not usable as a denominator.
    #[error("interface {interface} reports link speed {speed} Mbit/s, pass --pipe-size instead")]
    UnknownLinkSpeed { interface: String, speed: i64 },

    /// The gauge device could not be opened.
    #[error("unable to open gauge interface on {device}: {reason}")]
    SinkOpenFailure { device: String, reason: String },

    /// Writing a reading to the gauge failed.
    #[error("failed to write to gauge: {0}")]
    SinkWriteFailure(#[source] io::Error),

    /// Writing the rate line to the console failed.
    #[error("failed to write console output: {0}")]
    Console(#[source] io::Error),
}

pub type Result<T> = std::result::Result<T, PollError>;
