//! Module `state`
//!
//! Protocol states of the client. A request walks them in declaration
//! order from `Connect` to `Quit`, or drops out to `Error`/`Timeout`.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum FtpState {
    Connect,
    Greet,
    User,
    Password,
    Passive,
    Data,
    Transfer,
    Finish,
    Quit,
    /// Ready for the next request.
    Idle,
    Timeout,
    Error,
}

impl FtpState {
    /// Whether a request is being served. `step` only does work here.
    pub fn is_active(self) -> bool {
        self <= FtpState::Quit
    }

    /// Whether the last request ended in failure.
    pub fn is_failed(self) -> bool {
        matches!(self, FtpState::Timeout | FtpState::Error)
    }
}

impl fmt::Display for FtpState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}
