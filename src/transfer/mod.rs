//! Transfer module for the FTP client
//!
//! Direction and mode of a request, the buffer that moves file bytes over
//! the data channel, and transfer statistics.

pub mod buffer;
pub mod modes;
pub mod results;

pub use buffer::{ChunkOutcome, TransferBuffer};
pub use modes::{Direction, Mode, TransferRequest};
pub use results::TransferStats;
