//! Error types
//!
//! Defines the failures a transfer request can end with. Every variant is
//! terminal for the request that produced it.

use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Errors raised by the FTP client state machine and its collaborators.
#[derive(Debug)]
pub enum ClientError {
    /// `begin` was never called, so there is no server to talk to.
    SessionNotBegun,
    /// A transfer was requested while another one is still active.
    Busy,
    /// The local file could not be opened.
    LocalFile { path: String, source: io::Error },
    /// The control channel could not be opened.
    ControlConnect {
        host: String,
        port: u16,
        source: io::Error,
    },
    /// The server closed the control channel while a reply was awaited.
    ControlClosed,
    /// Reading from or writing to the control channel failed.
    ControlIo(io::Error),
    /// The server answered with a code other than the one expected.
    UnexpectedReply {
        expected: u16,
        code: u16,
        text: String,
    },
    /// No matching reply arrived before the deadline.
    Timeout {
        expected: u16,
        context: &'static str,
    },
    /// The 227 reply did not carry a usable `(h1,h2,h3,h4,p1,p2)` payload.
    MalformedPassive(String),
    /// The data channel could not be opened.
    DataConnect { addr: SocketAddr, source: io::Error },
    /// Streaming between the local file and the data channel failed.
    TransferIo(io::Error),
    /// The caller cancelled the transfer.
    Cancelled,
}

impl ClientError {
    /// Whether this failure is a reply deadline expiring.
    pub fn is_timeout(&self) -> bool {
        matches!(self, ClientError::Timeout { .. })
    }
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClientError::SessionNotBegun => write!(f, "begin() not called"),
            ClientError::Busy => write!(f, "Transfer already in progress"),
            ClientError::LocalFile { path, source } => {
                write!(f, "Cannot open local file {}: {}", path, source)
            }
            ClientError::ControlConnect { host, port, source } => {
                write!(f, "Cannot connect to {}:{}: {}", host, port, source)
            }
            ClientError::ControlClosed => write!(f, "Control connection closed by server"),
            ClientError::ControlIo(e) => write!(f, "Control connection I/O error: {}", e),
            ClientError::UnexpectedReply {
                expected,
                code,
                text,
            } => write!(f, "Expected reply {} but got {}: {}", expected, code, text),
            ClientError::Timeout { expected, context } => {
                write!(f, "Timeout waiting for reply {}: {}", expected, context)
            }
            ClientError::MalformedPassive(msg) => {
                write!(f, "Passive mode reply not understood: {}", msg)
            }
            ClientError::DataConnect { addr, source } => {
                write!(f, "Cannot open data connection to {}: {}", addr, source)
            }
            ClientError::TransferIo(e) => write!(f, "Transfer failed: {}", e),
            ClientError::Cancelled => write!(f, "Transfer cancelled"),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ClientError::LocalFile { source, .. }
            | ClientError::ControlConnect { source, .. }
            | ClientError::DataConnect { source, .. } => Some(source),
            ClientError::ControlIo(e) | ClientError::TransferIo(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ClientError {
    fn from(error: io::Error) -> Self {
        ClientError::TransferIo(error)
    }
}
