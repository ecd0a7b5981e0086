//! # Verdict Derivation
//!
//! The driver signals outcomes through short reply lines. Three forms
//! exist:
//!
//! - **Connectivity probes** answer a word whose first character carries the
//!   verdict: `T...` means the port opened and the printer answered.
//! - **Command replies** take the form `Retorno: N`, where `N` is `1` for an
//!   accepted command, `0` for a rejected one, and a processed-line count
//!   for command files.
//! - **Payload replies** (status reads, uploads) are free-form text returned
//!   to the caller verbatim.
//!
//! ## Canonical ACK Rule
//!
//! Acceptance is exact-string equality with [`ACK_MARKER`]. A reply of the
//! `Retorno:` form with any other number is a NAK; content not of that form
//! is a malformed response, which is an error, not a NAK — "the printer
//! said no" and "we could not read the answer" are different outcomes.

use crate::error::TfhkaError;

/// The exact reply the driver writes for an accepted command
pub const ACK_MARKER: &str = "Retorno: 1";

/// Reply prefix shared by all command-result lines
const RETURN_PREFIX: &str = "Retorno:";

/// Fiscal ACK/NAK verdict for a single printer command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmdReply {
    /// The printer acknowledged the command
    Ack,
    /// The printer rejected the command
    Nak,
}

impl CmdReply {
    pub fn is_ack(self) -> bool {
        matches!(self, Self::Ack)
    }
}

impl std::fmt::Display for CmdReply {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ack => write!(f, "ACK"),
            Self::Nak => write!(f, "NAK"),
        }
    }
}

/// Connectivity verdict: true iff the reply's first character is `'T'`.
///
/// The driver answers the probe with `TRUE ...` when the port opened and
/// the printer responded, and a description of the failure otherwise.
pub fn connectivity(last_line: &str) -> bool {
    last_line.starts_with('T')
}

/// Classify a command reply line into ACK/NAK.
///
/// Errors with [`TfhkaError::MalformedResponse`] when the line is not of
/// the `Retorno: N` form at all.
pub fn classify_reply(last_line: &str) -> Result<CmdReply, TfhkaError> {
    if last_line == ACK_MARKER {
        return Ok(CmdReply::Ack);
    }
    if return_count(last_line).is_some() {
        return Ok(CmdReply::Nak);
    }
    Err(TfhkaError::MalformedResponse(last_line.to_string()))
}

/// Extract the numeric payload of a `Retorno: N` reply.
///
/// For `SendFileCmd` the number is the count of command-file lines the
/// printer processed; callers compare it against the count they sent.
/// Returns `None` when the line is not of that form.
pub fn return_count(line: &str) -> Option<usize> {
    let rest = line.strip_prefix(RETURN_PREFIX)?.trim();
    if rest.is_empty() {
        return None;
    }
    rest.parse().ok()
}

// ============================================================================
// TESTS
// ============================================================================
