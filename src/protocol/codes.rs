//! # Fiscal Status and Error Codes
//!
//! The printer reports its state as a pair of numeric codes, surfaced by
//! the driver as a `Status: N Error: M` payload in reply to the `S1`
//! status request. The tables below come from the vendor's protocol
//! manual.

use crate::error::TfhkaError;

/// Parsed `Status: N Error: M` payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusReport {
    pub status: u8,
    pub error: u8,
}

impl StatusReport {
    /// Human-readable description of the status code.
    pub fn status_text(&self) -> &'static str {
        describe_status(self.status)
    }

    /// Human-readable description of the error code.
    pub fn error_text(&self) -> &'static str {
        describe_error(self.error)
    }

    /// Whether the printer is reporting any error condition.
    pub fn is_error(&self) -> bool {
        self.error != 0
    }
}

/// Parse a `Status: N Error: M` payload line.
///
/// Tolerates extra whitespace and surrounding text; both labels must be
/// present with a numeric value each, otherwise the payload is a
/// [`TfhkaError::MalformedResponse`].
pub fn parse_status_reply(text: &str) -> Result<StatusReport, TfhkaError> {
    let normalized = text.replace(':', " ");
    let tokens: Vec<&str> = normalized.split_whitespace().collect();

    let value_after = |label: &str| -> Option<u8> {
        let idx = tokens.iter().position(|t| t.eq_ignore_ascii_case(label))?;
        tokens.get(idx + 1)?.parse().ok()
    };

    match (value_after("Status"), value_after("Error")) {
        (Some(status), Some(error)) => Ok(StatusReport { status, error }),
        _ => Err(TfhkaError::MalformedResponse(text.to_string())),
    }
}

/// Describe a printer status code (per the vendor manual).
pub fn describe_status(code: u8) -> &'static str {
    match code {
        0 => "Unknown state",
        1 => "Test mode, idle",
        2 => "Test mode, issuing fiscal documents",
        3 => "Test mode, issuing non-fiscal documents",
        4 => "Fiscal mode, idle",
        5 => "Fiscal mode, issuing fiscal documents",
        6 => "Fiscal mode, issuing non-fiscal documents",
        7 => "Fiscal mode, fiscal memory nearly full, idle",
        8 => "Fiscal mode, fiscal memory nearly full, issuing fiscal documents",
        9 => "Fiscal mode, fiscal memory nearly full, issuing non-fiscal documents",
        10 => "Fiscal mode, fiscal memory full, idle",
        11 => "Fiscal mode, fiscal memory full, issuing fiscal documents",
        12 => "Fiscal mode, fiscal memory full, issuing non-fiscal documents",
        _ => "Undocumented status code",
    }
}

/// Describe a printer error code (per the vendor manual).
pub fn describe_error(code: u8) -> &'static str {
    match code {
        0 => "No error",
        1 => "Out of paper",
        2 => "Mechanical fault in paper feed",
        3 => "Out of paper and mechanical fault",
        80 => "Invalid command or invalid value",
        84 => "Invalid tax rate",
        88 => "No directives assigned",
        92 => "Invalid command",
        96 => "Fiscal error",
        100 => "Fiscal memory error",
        108 => "Fiscal memory full",
        112 => "Buffer full (reset command required)",
        128 => "Communication error",
        137 => "No response",
        144 => "LRC error",
        145 => "Internal API error",
        153 => "Error opening file",
        _ => "Undocumented error code",
    }
}

// ============================================================================
// TESTS
// ============================================================================
