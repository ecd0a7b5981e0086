//! # Error Types
//!
//! This module defines error types used throughout the tfhka library.
//!
//! The driver can fail in two very different ways: the *process* can fail
//! (won't start, hangs, exits non-zero) or the *protocol* can fail (the
//! result file is missing or says something we don't recognize). Each gets
//! its own variant so callers can tell "the driver said no" apart from
//! "we could not tell what the driver said".

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Main error type for tfhka operations
#[derive(Debug, Error)]
pub enum TfhkaError {
    /// The driver executable could not be started
    #[error("Failed to launch driver: {0}")]
    DriverLaunch(String),

    /// The driver ran longer than the configured bound and was killed
    #[error("Driver timed out after {0:?}")]
    DriverTimeout(Duration),

    /// The driver ran but exited with a non-zero status
    #[error("Driver exited with status {code}")]
    DriverExit { code: i32 },

    /// An expected result file is missing, unreadable, or empty
    #[error("Result file unavailable: {}", path.display())]
    FileUnavailable { path: PathBuf },

    /// A result file was present but its content matched no recognized form
    #[error("Malformed driver response: {0:?}")]
    MalformedResponse(String),

    /// A command file was only partially processed by the printer
    #[error("Command file incomplete: sent {sent} lines, printer processed {processed}")]
    IncompleteFile { sent: usize, processed: usize },

    /// Invalid caller input (bad report kind, unparseable invoice, ...)
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
