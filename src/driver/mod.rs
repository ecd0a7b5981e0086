//! # Driver Transport Layer
//!
//! This module provides communication with the external Tfinulx driver
//! process, which owns the serial link to the fiscal printer.
//!
//! ## Components
//!
//! - [`tfinulx`]: command framing and argv invocation of the driver binary
//! - [`channel`]: the result-file mailbox the driver answers through
//!
//! The driver never reports outcomes on stdout or via its exit code; only
//! the files it writes into the working directory are authoritative.

pub mod channel;
pub mod tfinulx;

pub use channel::{FileChannel, ResultChannel, PORT_FILE, RETURN_FILE, STATUS_FILE};
pub use tfinulx::{DriverCommand, DriverInvoker, TfinulxDriver};
