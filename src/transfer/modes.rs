//! Transfer direction and driving mode
//!
//! Replaces a get/put + blocking bit set with two small enums.

use crate::storage::OpenMode;

/// Which way the file travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Download: `RETR`, server to local file.
    Get,
    /// Upload: `STOR`, local file to server.
    Put,
}

impl Direction {
    /// How the local file must be opened for this direction.
    pub fn open_mode(self) -> OpenMode {
        match self {
            Direction::Get => OpenMode::Write,
            Direction::Put => OpenMode::Read,
        }
    }
}

/// Who drives the state machine after `transfer` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// `transfer` loops internally until the request concludes.
    Blocking,
    /// `transfer` performs one step; the caller keeps calling `step`.
    StepDriven,
}

/// The request currently being served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub local_path: String,
    pub remote_path: String,
    pub direction: Direction,
}
