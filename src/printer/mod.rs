//! # Fiscal Printer Client
//!
//! The [`Fiscal`](client::Fiscal) façade and its configuration.

pub mod client;
pub mod config;

pub use client::{Fiscal, OperationTrace, ReportKind};
pub use config::DriverConfig;
