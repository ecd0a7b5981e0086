//! # Tfinulx Response Protocol
//!
//! Classification rules for the driver's informal reply protocol.
//!
//! ## Module Structure
//!
//! - [`response`]: verdict derivation from a result file's last line
//! - [`codes`]: the fiscal status/error code tables and the `Status: N
//!   Error: M` payload parser
//!
//! The rules here are pure functions over strings; all file and process
//! handling lives in [`driver`](crate::driver).

pub mod codes;
pub mod response;

pub use codes::StatusReport;
pub use response::CmdReply;
