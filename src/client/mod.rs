//! FTP client
//!
//! The resumable client state machine, its status reporting and the
//! drivers that run it.

pub mod driver;
pub mod machine;
pub mod session;
pub mod state;
pub mod status;

pub use driver::transfer_async;
pub use machine::FtpClient;
pub use session::ServerInfo;
pub use state::FtpState;
pub use status::{Status, TransferResult};
