//! # Fiscal Printer Client
//!
//! [`Fiscal`] is the façade over the driver: one method per logical printer
//! operation, each following the same shape — build the command, invoke the
//! driver, read the relevant result file(s), classify, update session
//! state, return a typed result.
//!
//! ## Session State
//!
//! The client owns the last-set port name, the last-known connectivity
//! verdict (tri-state: unknown until the first probe), the most recent
//! status/error payload, and — when enabled in the config — an operation
//! trace. State reflects only the most recent operation and is updated
//! only after a successful parse; a failed operation leaves it untouched.
//!
//! ## Not Thread-Safe Across Clients
//!
//! All operations take `&mut self`, so one client cannot interleave
//! driver calls. Two clients sharing one working directory are unsafe:
//! the driver uses fixed result-file names as a mailbox, and a second
//! invocation can overwrite a result before the first client reads it.
//! Serialize access per working directory (the HTTP server wraps the
//! client in a mutex for exactly this reason).
//!
//! ## Example
//!
//! ```no_run
//! use tfhka::printer::{DriverConfig, Fiscal};
//!
//! let mut printer = Fiscal::new(DriverConfig::new("/var/lib/tfhka"));
//! printer.set_port("/dev/ttyS0")?;
//! if printer.check_printer()? {
//!     let reply = printer.send_cmd("I0X")?; // print an X report
//!     println!("printer replied {}", reply);
//! }
//! # Ok::<(), tfhka::TfhkaError>(())
//! ```

use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::driver::{
    DriverCommand, DriverInvoker, FileChannel, ResultChannel, TfinulxDriver, PORT_FILE,
    RETURN_FILE, STATUS_FILE,
};
use crate::error::TfhkaError;
use crate::invoice::Invoice;
use crate::printer::config::DriverConfig;
use crate::protocol::codes::{self, StatusReport};
use crate::protocol::response::{self, CmdReply};

/// Command file the invoice builder writes into the working directory
pub const INVOICE_FILE: &str = "invoice.txt";

/// X or Z fiscal report.
///
/// An X report prints the running totals without closing the fiscal day;
/// a Z report closes the day and commits it to fiscal memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    X,
    Z,
}

impl ReportKind {
    /// The printer command that emits this report.
    pub fn command(self) -> &'static str {
        match self {
            Self::X => "I0X",
            Self::Z => "I0Z",
        }
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "x" | "X" => Ok(Self::X),
            "z" | "Z" => Ok(Self::Z),
            other => Err(format!("Unknown report kind '{}'. Use 'X' or 'Z'.", other)),
        }
    }
}

impl std::fmt::Display for ReportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::X => write!(f, "X"),
            Self::Z => write!(f, "Z"),
        }
    }
}

/// Per-session operation trace.
///
/// One timestamped entry per invoked operation, carrying the driver's
/// stdout. Diagnostic only — nothing in the client reads it back.
#[derive(Debug, Default)]
pub struct OperationTrace {
    entries: Vec<String>,
}

impl OperationTrace {
    pub fn new() -> Self {
        Self::default()
    }

    fn record(&mut self, operation: &str, detail: &str) {
        let stamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
        if detail.is_empty() {
            self.entries.push(format!("{} {}", stamp, operation));
        } else {
            self.entries.push(format!("{} {}: {}", stamp, operation, detail));
        }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// # Fiscal Printer Client
///
/// See the [module documentation](self) for the operation model.
pub struct Fiscal {
    config: DriverConfig,
    invoker: Box<dyn DriverInvoker>,
    channel: Box<dyn ResultChannel>,
    port_name: String,
    connected: Option<bool>,
    last_status: String,
    trace: Option<OperationTrace>,
}

impl Fiscal {
    /// Client over the real driver described by `config`.
    pub fn new(config: DriverConfig) -> Self {
        let invoker = TfinulxDriver::new(&config.driver_path, &config.work_dir, config.timeout());
        let channel = FileChannel::new(&config.work_dir);
        Self::with_parts(config, Box::new(invoker), Box::new(channel))
    }

    /// Client over explicit transport parts.
    ///
    /// The seam for substituting the process invocation or the result
    /// mailbox — tests drive the client with a scripted invoker and an
    /// ordinary [`FileChannel`] on a temp directory.
    pub fn with_parts(
        config: DriverConfig,
        invoker: Box<dyn DriverInvoker>,
        channel: Box<dyn ResultChannel>,
    ) -> Self {
        let trace = config.trace.then(OperationTrace::new);
        Self {
            config,
            invoker,
            channel,
            port_name: String::new(),
            connected: None,
            last_status: String::new(),
            trace,
        }
    }

    // ------------------------------------------------------------------
    // Session accessors
    // ------------------------------------------------------------------

    /// The last port name passed to [`set_port`](Self::set_port).
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Last-known connectivity verdict; `None` before the first probe.
    pub fn connected(&self) -> Option<bool> {
        self.connected
    }

    /// Most recent status/error payload.
    pub fn last_status(&self) -> &str {
        &self.last_status
    }

    /// The operation trace, when tracing is enabled.
    pub fn trace(&self) -> Option<&OperationTrace> {
        self.trace.as_ref()
    }

    fn record(&mut self, operation: &str, detail: &str) {
        if let Some(trace) = &mut self.trace {
            trace.record(operation, detail.trim());
        }
    }

    // ------------------------------------------------------------------
    // Operations
    // ------------------------------------------------------------------

    /// Store the serial port name the driver should open.
    ///
    /// Writes `Puerto.txt` wholesale (no residue from a longer previous
    /// name) and remembers the name in the session.
    pub fn set_port(&mut self, port: &str) -> Result<(), TfhkaError> {
        self.channel.store(PORT_FILE, port)?;
        self.port_name = port.to_string();
        self.record("SetPort", port);
        Ok(())
    }

    /// Probe the configured port and the printer behind it.
    ///
    /// Verdict is the last line of `Retorno.txt`: a leading `'T'` means
    /// the printer answered. Updates `connected` and `last_status`.
    pub fn check_printer(&mut self) -> Result<bool, TfhkaError> {
        let command = DriverCommand::CheckFprinter;
        let output = self.invoker.invoke(&command)?;
        self.record(&command.to_string(), &output);

        let line = self.channel.last_line(RETURN_FILE)?;
        let up = response::connectivity(&line);
        self.last_status = line;
        self.connected = Some(up);
        Ok(up)
    }

    /// Send a single raw command to the printer.
    ///
    /// Returns the fiscal ACK/NAK verdict (see
    /// [`protocol::response`](crate::protocol::response) for the rule) and
    /// updates `last_status` with the reply line.
    pub fn send_cmd(&mut self, cmd: &str) -> Result<CmdReply, TfhkaError> {
        let command = DriverCommand::SendCmd(cmd.to_string());
        let output = self.invoker.invoke(&command)?;
        self.record(&command.to_string(), &output);

        let line = self.channel.last_line(RETURN_FILE)?;
        let reply = response::classify_reply(&line)?;
        self.last_status = line;
        Ok(reply)
    }

    /// Read the printer's status/error payload.
    pub fn read_status(&mut self) -> Result<String, TfhkaError> {
        let command = DriverCommand::ReadFpStatus(STATUS_FILE.to_string());
        let output = self.invoker.invoke(&command)?;
        self.record(&command.to_string(), &output);

        let line = self.channel.last_line(STATUS_FILE)?;
        self.last_status = line.clone();
        Ok(line)
    }

    /// Read the printer's status/error payload and parse it into numeric
    /// codes with their manual descriptions.
    pub fn read_status_codes(&mut self) -> Result<StatusReport, TfhkaError> {
        let payload = self.read_status()?;
        codes::parse_status_reply(&payload)
    }

    /// Execute every line of a plain-text command file.
    ///
    /// Returns the driver's raw result line (`Retorno: N`, where `N` is
    /// the count of lines the printer processed). No session effect
    /// beyond the trace; callers that need completeness checking should
    /// use [`send_invoice`](Self::send_invoice) or compare the count via
    /// [`response::return_count`].
    pub fn send_file(&mut self, path: &Path) -> Result<String, TfhkaError> {
        let command = DriverCommand::SendFileCmd(path.to_path_buf());
        let output = self.invoker.invoke(&command)?;
        self.record(&command.to_string(), &output);

        self.channel.last_line(RETURN_FILE)
    }

    /// Upload a status block (e.g. `S1`) into the named file and return
    /// its authoritative last line. Updates `last_status` from
    /// `Status_Error.txt`.
    pub fn upload_status(&mut self, code: &str, file: &str) -> Result<String, TfhkaError> {
        let command = DriverCommand::UploadStatusCmd {
            code: code.to_string(),
            file: file.to_string(),
        };
        let output = self.invoker.invoke(&command)?;
        self.record(&command.to_string(), &output);

        let status = self.channel.last_line(STATUS_FILE)?;
        let data = self.channel.last_line(file)?;
        self.last_status = status;
        Ok(data)
    }

    /// Upload an X/Z report (e.g. `U0X`) into the named file and return
    /// its full content. Reports can span many records, so every line is
    /// returned, in file order. Updates `last_status` from `Retorno.txt`.
    pub fn upload_report(&mut self, code: &str, file: &str) -> Result<String, TfhkaError> {
        let command = DriverCommand::UploadReportCmd {
            code: code.to_string(),
            file: file.to_string(),
        };
        let output = self.invoker.invoke(&command)?;
        self.record(&command.to_string(), &output);

        let status = self.channel.last_line(RETURN_FILE)?;
        let lines = self.channel.lines(file)?;
        self.last_status = status;
        Ok(lines.join("\n"))
    }

    /// Print an X or Z fiscal report.
    pub fn print_report(&mut self, kind: ReportKind) -> Result<CmdReply, TfhkaError> {
        self.send_cmd(kind.command())
    }

    /// Build the command file for an invoice, send it, and verify the
    /// printer processed every line.
    ///
    /// Returns the driver's result line on success. A shortfall in the
    /// processed-line count is [`TfhkaError::IncompleteFile`]; a reply
    /// not of the `Retorno: N` form is
    /// [`TfhkaError::MalformedResponse`].
    pub fn send_invoice(&mut self, invoice: &Invoice) -> Result<String, TfhkaError> {
        let commands = invoice.commands();
        let sent = commands.len();
        fs::write(self.config.work_dir().join(INVOICE_FILE), commands.join("\n"))?;

        let reply = self.send_file(Path::new(INVOICE_FILE))?;
        match response::return_count(&reply) {
            Some(processed) if processed == sent => Ok(reply),
            Some(processed) => Err(TfhkaError::IncompleteFile { sent, processed }),
            None => Err(TfhkaError::MalformedResponse(reply)),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::invoice::{Customer, Item, Payment};
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    /// Invoker that writes scripted result files instead of spawning the
    /// driver, recording each command it is asked to run.
    struct ScriptedInvoker {
        dir: PathBuf,
        files: Vec<(String, String)>,
        invoked: Arc<Mutex<Vec<String>>>,
    }

    impl ScriptedInvoker {
        fn new(dir: &TempDir, files: &[(&str, &str)]) -> Self {
            Self {
                dir: dir.path().to_path_buf(),
                files: files
                    .iter()
                    .map(|(n, c)| (n.to_string(), c.to_string()))
                    .collect(),
                invoked: Arc::new(Mutex::new(Vec::new())),
            }
        }
    }

    impl DriverInvoker for ScriptedInvoker {
        fn invoke(&self, command: &DriverCommand) -> Result<String, TfhkaError> {
            self.invoked.lock().unwrap().push(command.to_string());
            for (name, content) in &self.files {
                fs::write(self.dir.join(name), content)?;
            }
            Ok(String::new())
        }
    }

    fn client_with(dir: &TempDir, files: &[(&str, &str)], trace: bool) -> Fiscal {
        let (client, _invoked) = client_and_log(dir, files, trace);
        client
    }

    fn client_and_log(
        dir: &TempDir,
        files: &[(&str, &str)],
        trace: bool,
    ) -> (Fiscal, Arc<Mutex<Vec<String>>>) {
        let config = DriverConfig::new(dir.path()).with_trace(trace);
        let invoker = ScriptedInvoker::new(dir, files);
        let invoked = Arc::clone(&invoker.invoked);
        let channel = FileChannel::new(dir.path());
        let client = Fiscal::with_parts(config, Box::new(invoker), Box::new(channel));
        (client, invoked)
    }

    #[test]
    fn test_check_printer_connected() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "TRUE\n")], false);
        assert_eq!(client.connected(), None);
        assert!(client.check_printer().unwrap());
        assert_eq!(client.connected(), Some(true));
        assert_eq!(client.last_status(), "TRUE");
    }

    #[test]
    fn test_check_printer_last_line_rule() {
        // Progress lines before the verdict line are ignored.
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "garbage\nTrue\n")], false);
        assert!(client.check_printer().unwrap());
    }

    #[test]
    fn test_check_printer_disconnected() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "False\n")], false);
        assert!(!client.check_printer().unwrap());
        assert_eq!(client.connected(), Some(false));
    }

    #[test]
    fn test_check_printer_missing_file() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[], false);
        let err = client.check_printer().unwrap_err();
        assert!(matches!(err, TfhkaError::FileUnavailable { .. }));
        // Failure leaves the session untouched.
        assert_eq!(client.connected(), None);
        assert_eq!(client.last_status(), "");
    }

    #[test]
    fn test_send_cmd_ack() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "Retorno: 1\n")], false);
        assert_eq!(client.send_cmd("PJ23").unwrap(), CmdReply::Ack);
        assert_eq!(client.last_status(), "Retorno: 1");
    }

    #[test]
    fn test_send_cmd_nak() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "Retorno: 0\n")], false);
        assert_eq!(client.send_cmd("PJ23").unwrap(), CmdReply::Nak);
    }

    #[test]
    fn test_send_cmd_malformed_leaves_state() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "unexpected\n")], false);
        let err = client.send_cmd("PJ23").unwrap_err();
        assert!(matches!(err, TfhkaError::MalformedResponse(_)));
        assert_eq!(client.last_status(), "");
    }

    #[test]
    fn test_set_port_updates_session_and_file() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[], false);
        client.set_port("/dev/ttyS0").unwrap();
        assert_eq!(client.port_name(), "/dev/ttyS0");
        let on_disk = fs::read_to_string(dir.path().join(PORT_FILE)).unwrap();
        assert_eq!(on_disk, "/dev/ttyS0");
    }

    #[test]
    fn test_read_status_updates_last_status() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(STATUS_FILE, "Status: 4 Error: 0\n")], false);
        let payload = client.read_status().unwrap();
        assert_eq!(payload, "Status: 4 Error: 0");
        assert_eq!(client.last_status(), "Status: 4 Error: 0");
    }

    #[test]
    fn test_read_status_codes() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(STATUS_FILE, "Status: 7 Error: 128\n")], false);
        let report = client.read_status_codes().unwrap();
        assert_eq!(report.status, 7);
        assert_eq!(report.error, 128);
        assert_eq!(report.error_text(), "Communication error");
    }

    #[test]
    fn test_upload_status_takes_last_line() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(
            &dir,
            &[
                (STATUS_FILE, "Status: 4 Error: 0\n"),
                ("StatusFile.txt", "header\nS1 payload data\n"),
            ],
            false,
        );
        let data = client.upload_status("S1", "StatusFile.txt").unwrap();
        assert_eq!(data, "S1 payload data");
        assert_eq!(client.last_status(), "Status: 4 Error: 0");
    }

    #[test]
    fn test_upload_report_concatenates_all_lines() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(
            &dir,
            &[
                (RETURN_FILE, "Retorno: 1\n"),
                ("ReportFile.txt", "record 1\nrecord 2\nrecord 3\n"),
            ],
            false,
        );
        let report = client.upload_report("U0X", "ReportFile.txt").unwrap();
        assert_eq!(report, "record 1\nrecord 2\nrecord 3");
    }

    #[test]
    fn test_print_report_sends_report_command() {
        let dir = TempDir::new().unwrap();
        let (mut client, invoked) = client_and_log(&dir, &[(RETURN_FILE, "Retorno: 1\n")], false);
        assert_eq!(client.print_report(ReportKind::Z).unwrap(), CmdReply::Ack);
        let invoked = invoked.lock().unwrap();
        assert_eq!(invoked.len(), 1);
        assert_eq!(invoked[0], "SendCmd I0Z");
    }

    #[test]
    fn test_trace_records_operations() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "Retorno: 1\n")], true);
        client.set_port("COM1").unwrap();
        client.send_cmd("3").unwrap();
        let trace = client.trace().unwrap();
        assert_eq!(trace.len(), 2);
        assert!(trace.entries()[0].contains("SetPort"));
        assert!(trace.entries()[1].contains("SendCmd 3"));
    }

    #[test]
    fn test_trace_disabled_by_default() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "Retorno: 1\n")], false);
        client.send_cmd("3").unwrap();
        assert!(client.trace().is_none());
    }

    fn demo_invoice() -> Invoice {
        Invoice {
            customer: Customer {
                name: "Maria Perez".to_string(),
                rif: "V123456789".to_string(),
            },
            items: vec![Item {
                description: "Cafe".to_string(),
                quantity: 1.0,
                unit_price: 11.60,
                tax_rate: 16.0,
            }],
            payments: vec![Payment { slot: 1, amount: 11.60 }],
        }
    }

    #[test]
    fn test_send_invoice_complete() {
        let dir = TempDir::new().unwrap();
        // demo_invoice builds 5 command lines: iS*, iR*, item, "3", "101"-style total.
        let mut client = client_with(&dir, &[(RETURN_FILE, "Retorno: 5\n")], false);
        let reply = client.send_invoice(&demo_invoice()).unwrap();
        assert_eq!(reply, "Retorno: 5");
        let written = fs::read_to_string(dir.path().join(INVOICE_FILE)).unwrap();
        assert_eq!(written.lines().count(), 5);
    }

    #[test]
    fn test_send_invoice_incomplete() {
        let dir = TempDir::new().unwrap();
        let mut client = client_with(&dir, &[(RETURN_FILE, "Retorno: 3\n")], false);
        let err = client.send_invoice(&demo_invoice()).unwrap_err();
        match err {
            TfhkaError::IncompleteFile { sent, processed } => {
                assert_eq!(sent, 5);
                assert_eq!(processed, 3);
            }
            other => panic!("expected IncompleteFile, got {:?}", other),
        }
    }

    #[test]
    fn test_report_kind_parsing() {
        assert_eq!("x".parse::<ReportKind>().unwrap(), ReportKind::X);
        assert_eq!("Z".parse::<ReportKind>().unwrap(), ReportKind::Z);
        assert!("Q".parse::<ReportKind>().is_err());
        assert_eq!(ReportKind::X.command(), "I0X");
        assert_eq!(ReportKind::Z.command(), "I0Z");
    }
}
