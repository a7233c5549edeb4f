//! FTP protocol, client side
//!
//! Commands the client sends, reply codes it expects, and the parsing of
//! what the server sends back.

pub mod commands;
pub mod parser;
pub mod reply;
pub mod responses;

pub use commands::Command;
pub use parser::{parse_host_port, parse_pasv_reply, parse_reply_code};
pub use reply::{Reply, ReplyPoll, ReplyReader};
