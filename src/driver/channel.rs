//! # Result File Channel
//!
//! The driver answers every command through text files in its working
//! directory, not through stdout or its exit code. This module is the one
//! place that convention lives, behind the [`ResultChannel`] trait so the
//! mailbox could later be swapped for a pipe or socket without touching the
//! client.
//!
//! ## File Convention
//!
//! | File | Written by | Holds |
//! |------|-----------|-------|
//! | `Puerto.txt` | client | the serial port name the driver should open |
//! | `Retorno.txt` | driver | general command results and the connectivity probe |
//! | `Status_Error.txt` | driver | the printer's status/error payload |
//!
//! Upload operations additionally write to a caller-named data file.
//!
//! ## Last-Line Rule
//!
//! The driver appends progress and diagnostic lines before the final status
//! line, so only the *last non-empty line* of a result file is authoritative.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;

use crate::error::TfhkaError;

/// Port-configuration file (client-written side channel to the driver)
pub const PORT_FILE: &str = "Puerto.txt";

/// General command-result file
pub const RETURN_FILE: &str = "Retorno.txt";

/// Status/error payload file
pub const STATUS_FILE: &str = "Status_Error.txt";

/// Read side of the driver's result mailbox.
///
/// File names are relative to the driver's working directory. A missing,
/// unreadable, or content-free file is [`TfhkaError::FileUnavailable`] —
/// never a silent empty string that could be misread as a verdict.
///
/// `Send` so a client can sit behind a mutex in the HTTP server.
pub trait ResultChannel: Send {
    /// All lines of the named result file, in file order.
    fn lines(&self, name: &str) -> Result<Vec<String>, TfhkaError>;

    /// The authoritative last non-empty line of the named result file.
    fn last_line(&self, name: &str) -> Result<String, TfhkaError>;

    /// Overwrite a named file wholesale with a single value (the client →
    /// driver direction, used for the `Puerto.txt` side channel).
    ///
    /// Truncate-and-replace: a shorter value leaves no residue from a
    /// longer previous one.
    fn store(&self, name: &str, value: &str) -> Result<(), TfhkaError>;
}

/// File-backed [`ResultChannel`] rooted at the driver's working directory.
pub struct FileChannel {
    dir: PathBuf,
}

impl FileChannel {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Absolute location of a named file in the working directory.
    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    fn read(&self, name: &str) -> Result<String, TfhkaError> {
        let path = self.path(name);
        fs::read_to_string(&path).map_err(|_| TfhkaError::FileUnavailable { path })
    }
}

impl ResultChannel for FileChannel {
    fn lines(&self, name: &str) -> Result<Vec<String>, TfhkaError> {
        let content = self.read(name)?;
        let lines: Vec<String> = content.lines().map(|l| l.trim_end_matches('\r').to_string()).collect();
        if lines.iter().all(|l| l.trim().is_empty()) {
            return Err(TfhkaError::FileUnavailable {
                path: self.path(name),
            });
        }
        Ok(lines)
    }

    fn last_line(&self, name: &str) -> Result<String, TfhkaError> {
        let lines = self.lines(name)?;
        lines
            .into_iter()
            .rev()
            .find(|l| !l.trim().is_empty())
            .ok_or(TfhkaError::FileUnavailable {
                path: self.path(name),
            })
    }

    fn store(&self, name: &str, value: &str) -> Result<(), TfhkaError> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path(name))?;
        file.write_all(value.as_bytes())?;
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
