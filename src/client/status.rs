//! Transfer status reported to callers

use crate::error::{ClientError, error_description, error_to_status_code};
use crate::protocol::responses;

/// Outcome of the current or last transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferResult {
    Progress,
    Ok,
    Error,
}

/// Snapshot of a request: its outcome, the last reply code (or a reserved
/// code for local failures) and a description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub result: TransferResult,
    pub code: u16,
    pub desc: String,
}

impl Status {
    pub fn in_progress() -> Self {
        Self {
            result: TransferResult::Progress,
            code: 0,
            desc: String::new(),
        }
    }

    /// A failed request, described by `err`.
    pub fn failed(err: &ClientError) -> Self {
        Self {
            result: TransferResult::Error,
            code: error_to_status_code(err),
            desc: error_description(err),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.result == TransferResult::Ok
    }

    pub fn is_error(&self) -> bool {
        self.result == TransferResult::Error
    }

    /// Whether `code` was produced locally rather than sent by the server.
    pub fn is_local_code(&self) -> bool {
        responses::is_reserved(self.code)
    }
}

/// No request has concluded yet, so nothing is reported as done.
impl Default for Status {
    fn default() -> Self {
        Self::in_progress()
    }
}
