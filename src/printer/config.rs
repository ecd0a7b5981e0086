//! # Driver Configuration
//!
//! This module defines the profile describing where the Tfinulx driver
//! lives and how to run it.
//!
//! ## Usage
//!
//! ```
//! use tfhka::printer::DriverConfig;
//!
//! let config = DriverConfig::default()
//!     .with_driver("/opt/tfhka/tfinulx")
//!     .with_trace(true);
//! assert_eq!(config.timeout().as_secs(), 30);
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default driver executable, resolved relative to the working directory
pub const DEFAULT_DRIVER: &str = "./tfinulx";

/// Default bound on one driver invocation, in seconds.
///
/// The driver retries the serial link internally, so a healthy run against
/// an unreachable printer can still take many seconds before it gives up.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// # Driver Profile
///
/// Describes one driver installation: the executable, the directory
/// holding its result files, the invocation bound, and whether the client
/// keeps an operation trace.
///
/// Serializable so deployments can keep it in a config file next to the
/// driver.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Path to the driver executable
    pub driver_path: PathBuf,

    /// Directory the driver reads and writes its result files in
    pub work_dir: PathBuf,

    /// Upper bound on one driver invocation, in seconds
    pub timeout_secs: u64,

    /// Keep a per-session operation trace
    pub trace: bool,
}

impl DriverConfig {
    /// Profile rooted at the given working directory, with defaults for
    /// everything else.
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            ..Self::default()
        }
    }

    pub fn with_driver(mut self, driver_path: impl Into<PathBuf>) -> Self {
        self.driver_path = driver_path.into();
        self
    }

    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_trace(mut self, trace: bool) -> Self {
        self.trace = trace;
        self
    }

    /// The invocation bound as a [`Duration`].
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// The driver's working directory.
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver_path: PathBuf::from(DEFAULT_DRIVER),
            work_dir: PathBuf::from("."),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            trace: false,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
