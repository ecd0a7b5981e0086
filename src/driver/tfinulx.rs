//! # Tfinulx Process Invocation
//!
//! This module frames logical printer operations as invocations of the
//! external `tfinulx` driver binary and runs them with a bounded wait.
//!
//! ## Invocation Model
//!
//! The driver is called as `tfinulx <verb> [arg...]` with its working
//! directory set to the directory holding its result files. Arguments are
//! passed as an argument vector — never through a shell — so printer
//! commands and file paths cannot be reinterpreted by the invocation layer.
//!
//! Stdout is captured and returned for the operation trace only. Control
//! decisions are made exclusively from the result files (see
//! [`channel`](crate::driver::channel)).
//!
//! ## Bounded Wait
//!
//! A driver talking to an unplugged printer can block on the serial port
//! for a long time. `invoke` polls the child and kills it once the
//! configured timeout elapses, surfacing [`TfhkaError::DriverTimeout`].

use std::ffi::OsString;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use crate::error::TfhkaError;

/// Interval between child-exit polls while waiting on the driver
const POLL_INTERVAL_MS: u64 = 25;

/// One invocation of the driver: a fixed verb plus its arguments.
///
/// The verbs mirror the driver's command-line surface exactly:
///
/// | Verb | Arguments | Result file |
/// |------|-----------|-------------|
/// | `CheckFprinter` | — | `Retorno.txt` |
/// | `SendCmd` | printer command | `Retorno.txt` |
/// | `ReadFpStatus` | output file | the named file |
/// | `SendFileCmd` | command file path | `Retorno.txt` |
/// | `UploadStatusCmd` | status code, output file | `Status_Error.txt` + the named file |
/// | `UploadReportCmd` | report code, output file | `Retorno.txt` + the named file |
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverCommand {
    /// Probe the configured port and the printer behind it
    CheckFprinter,
    /// Send a single raw printer command
    SendCmd(String),
    /// Ask the driver to write the printer's status/error payload to a file
    ReadFpStatus(String),
    /// Execute every line of a plain-text command file
    SendFileCmd(PathBuf),
    /// Upload a status block (e.g. `S1`) into the named file
    UploadStatusCmd { code: String, file: String },
    /// Upload an X/Z report (e.g. `U0X`) into the named file
    UploadReportCmd { code: String, file: String },
}

impl DriverCommand {
    /// The driver verb, as spelled on its command line.
    pub fn verb(&self) -> &'static str {
        match self {
            Self::CheckFprinter => "CheckFprinter",
            Self::SendCmd(_) => "SendCmd",
            Self::ReadFpStatus(_) => "ReadFpStatus",
            Self::SendFileCmd(_) => "SendFileCmd",
            Self::UploadStatusCmd { .. } => "UploadStatusCmd",
            Self::UploadReportCmd { .. } => "UploadReportCmd",
        }
    }

    /// The full argument vector for this invocation, verb first.
    pub fn argv(&self) -> Vec<OsString> {
        let mut argv: Vec<OsString> = vec![self.verb().into()];
        match self {
            Self::CheckFprinter => {}
            Self::SendCmd(cmd) => argv.push(cmd.into()),
            Self::ReadFpStatus(file) => argv.push(file.into()),
            Self::SendFileCmd(path) => argv.push(path.into()),
            Self::UploadStatusCmd { code, file } | Self::UploadReportCmd { code, file } => {
                argv.push(code.into());
                argv.push(file.into());
            }
        }
        argv
    }
}

impl std::fmt::Display for DriverCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CheckFprinter => write!(f, "CheckFprinter"),
            Self::SendCmd(cmd) => write!(f, "SendCmd {}", cmd),
            Self::ReadFpStatus(file) => write!(f, "ReadFpStatus {}", file),
            Self::SendFileCmd(path) => write!(f, "SendFileCmd {}", path.display()),
            Self::UploadStatusCmd { code, file } => write!(f, "UploadStatusCmd {} {}", code, file),
            Self::UploadReportCmd { code, file } => write!(f, "UploadReportCmd {} {}", code, file),
        }
    }
}

/// Trait for running driver commands and capturing their stdout.
///
/// The one real implementation is [`TfinulxDriver`]; tests substitute a stub
/// that writes result files itself instead of spawning a process.
///
/// `Send` so a client can sit behind a mutex in the HTTP server.
pub trait DriverInvoker: Send {
    /// Run the command to completion and return the driver's stdout text.
    fn invoke(&self, command: &DriverCommand) -> Result<String, TfhkaError>;
}

/// # Tfinulx Driver
///
/// Runs the external driver binary for each operation and waits (bounded)
/// for it to exit.
///
/// ## Example
///
/// ```no_run
/// use std::time::Duration;
/// use tfhka::driver::{DriverCommand, DriverInvoker, TfinulxDriver};
///
/// let driver = TfinulxDriver::new("./tfinulx", ".", Duration::from_secs(30));
/// let trace = driver.invoke(&DriverCommand::CheckFprinter)?;
/// # Ok::<(), tfhka::TfhkaError>(())
/// ```
pub struct TfinulxDriver {
    program: PathBuf,
    work_dir: PathBuf,
    timeout: Duration,
}

impl TfinulxDriver {
    /// Create a driver handle.
    ///
    /// - `program`: path to the driver executable
    /// - `work_dir`: directory the driver reads and writes its files in
    /// - `timeout`: upper bound on one invocation
    pub fn new(
        program: impl Into<PathBuf>,
        work_dir: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            program: program.into(),
            work_dir: work_dir.into(),
            timeout,
        }
    }

    /// Path to the driver executable.
    pub fn program(&self) -> &PathBuf {
        &self.program
    }
}

impl DriverInvoker for TfinulxDriver {
    fn invoke(&self, command: &DriverCommand) -> Result<String, TfhkaError> {
        let mut child = Command::new(&self.program)
            .args(command.argv())
            .current_dir(&self.work_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| {
                TfhkaError::DriverLaunch(format!("{}: {}", self.program.display(), e))
            })?;

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait()? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                // Killing a dead child is fine; only the timeout matters here.
                let _ = child.kill();
                let _ = child.wait();
                return Err(TfhkaError::DriverTimeout(self.timeout));
            }
            thread::sleep(Duration::from_millis(POLL_INTERVAL_MS));
        };

        // The child has exited, so draining the pipe cannot block.
        let mut output = String::new();
        if let Some(mut stdout) = child.stdout.take() {
            stdout.read_to_string(&mut output)?;
        }

        if !status.success() {
            return Err(TfhkaError::DriverExit {
                code: status.code().unwrap_or(-1),
            });
        }

        Ok(output)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn argv_strings(command: &DriverCommand) -> Vec<String> {
        command
            .argv()
            .into_iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_check_fprinter_argv() {
        assert_eq!(argv_strings(&DriverCommand::CheckFprinter), ["CheckFprinter"]);
    }

    #[test]
    fn test_send_cmd_argv_is_single_argument() {
        // A printer command with spaces must stay one argument; nothing
        // here may pass through a shell.
        let cmd = DriverCommand::SendCmd("iS*Consumidor Final".to_string());
        assert_eq!(argv_strings(&cmd), ["SendCmd", "iS*Consumidor Final"]);
    }

    #[test]
    fn test_upload_argv_order() {
        let cmd = DriverCommand::UploadReportCmd {
            code: "U0X".to_string(),
            file: "ReportFile.txt".to_string(),
        };
        assert_eq!(argv_strings(&cmd), ["UploadReportCmd", "U0X", "ReportFile.txt"]);
    }

    #[test]
    fn test_display_matches_command_line() {
        let cmd = DriverCommand::UploadStatusCmd {
            code: "S1".to_string(),
            file: "StatusFile.txt".to_string(),
        };
        assert_eq!(cmd.to_string(), "UploadStatusCmd S1 StatusFile.txt");
    }

    #[test]
    fn test_missing_program_is_launch_failure() {
        let driver = TfinulxDriver::new(
            "/nonexistent/tfinulx",
            std::env::temp_dir(),
            Duration::from_secs(1),
        );
        let err = driver.invoke(&DriverCommand::CheckFprinter).unwrap_err();
        assert!(matches!(err, TfhkaError::DriverLaunch(_)));
    }
}
