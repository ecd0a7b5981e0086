//! # Tfhka - Fiscal Printer Client Library
//!
//! Tfhka is a Rust client for The Factory HKA fiscal printers, driven
//! through the external `tfinulx` command-line driver. The driver owns the
//! serial link to the printer and reports every outcome through text files
//! in its working directory; this crate frames logical operations as driver
//! invocations and parses those result files into typed results.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tfhka::printer::{DriverConfig, Fiscal};
//!
//! // One client per driver working directory
//! let config = DriverConfig::new("/var/lib/tfhka").with_driver("/opt/tfhka/tfinulx");
//! let mut printer = Fiscal::new(config);
//!
//! // Point the driver at the serial port, probe the printer
//! printer.set_port("/dev/ttyS0")?;
//! if printer.check_printer()? {
//!     // Send a raw command and check the fiscal ACK/NAK verdict
//!     let reply = printer.send_cmd("I0X")?;
//!     println!("X report: {}", reply);
//! }
//!
//! # Ok::<(), tfhka::TfhkaError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`driver`] | driver invocation and the result-file mailbox |
//! | [`protocol`] | verdict rules and fiscal status/error codes |
//! | [`printer`] | the [`Fiscal`](printer::Fiscal) client façade and its configuration |
//! | [`invoice`] | fiscal invoice command-file builder |
//! | [`server`] | JSON HTTP front-end |
//! | [`error`] | error types |
//!
//! ## Protocol Notes
//!
//! The driver's exit code and stdout are not part of the control protocol;
//! stdout is captured only for the optional operation trace. Only the last
//! non-empty line of a result file is authoritative — the driver appends
//! progress lines before the final status line.
//!
//! One working directory supports one client at a time: the result files
//! are a shared mailbox, so concurrent invocations would race on them.

pub mod driver;
pub mod error;
pub mod invoice;
pub mod printer;
pub mod protocol;
pub mod server;

// Re-exports for convenience
pub use error::TfhkaError;
pub use invoice::Invoice;
pub use printer::{DriverConfig, Fiscal, ReportKind};
pub use protocol::CmdReply;
