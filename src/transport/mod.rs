//! Byte-stream transport
//!
//! The client drives two independent transports, one for the control
//! channel and one for the data channel.

pub mod tcp;

pub use tcp::TcpTransport;

use std::io;
use std::net::SocketAddr;

/// A connection the client can poll without blocking.
///
/// `read` returns `Ok(0)` when nothing is available right now. A peer that
/// has closed its side is reported by `connected()` returning `false` once
/// everything it sent has been read.
pub trait Transport {
    /// Opens the connection, replacing any previous one.
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()>;

    fn connected(&self) -> bool;

    /// Reads whatever is available into `buf` without waiting.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes as much of `data` as the connection accepts right now.
    fn write(&mut self, data: &[u8]) -> io::Result<usize>;

    /// Writes all of `data`, used for short command lines.
    fn write_all(&mut self, mut data: &[u8]) -> io::Result<()> {
        while !data.is_empty() {
            match self.write(data)? {
                0 => return Err(io::Error::from(io::ErrorKind::WriteZero)),
                n => data = &data[n..],
            }
        }
        Ok(())
    }

    fn remote_addr(&self) -> Option<SocketAddr>;

    /// Closes the connection. Closing an unconnected transport is a no-op.
    fn close(&mut self);
}
