//! RAX FTP client
//!
//! A resumable, non-blocking FTP client. Transfers are driven one protocol
//! step at a time through `FtpClient::step`, or to completion with the
//! blocking mode or the async driver.

pub mod client;
pub mod config;
pub mod error;
pub mod protocol;
pub mod storage;
pub mod transfer;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{FtpClient, FtpState, ServerInfo, Status, TransferResult, transfer_async};
pub use config::{ClientConfig, ClientSettings};
pub use error::ClientError;
pub use transfer::{Direction, Mode, TransferStats};
