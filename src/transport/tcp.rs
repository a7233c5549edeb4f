//! Module `tcp`
//!
//! `Transport` over a non-blocking `std::net::TcpStream`.

use log::{debug, warn};
use std::io::{self, ErrorKind, Read, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::transport::Transport;

/// A TCP connection switched to non-blocking mode after connecting.
///
/// Connecting itself is bounded by `connect_timeout`; every read and write
/// afterwards returns immediately.
pub struct TcpTransport {
    stream: Option<TcpStream>,
    remote: Option<SocketAddr>,
    peer_closed: bool,
    connect_timeout: Duration,
}

impl TcpTransport {
    pub fn new(connect_timeout: Duration) -> Self {
        Self {
            stream: None,
            remote: None,
            peer_closed: false,
            connect_timeout,
        }
    }

    fn open(&self, host: &str, port: u16) -> io::Result<(TcpStream, SocketAddr)> {
        let mut last_error = None;

        for addr in (host, port).to_socket_addrs()? {
            match TcpStream::connect_timeout(&addr, self.connect_timeout) {
                Ok(stream) => return Ok((stream, addr)),
                Err(e) => {
                    debug!("Connecting to {} failed: {}", addr, e);
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            io::Error::new(ErrorKind::NotFound, format!("{} did not resolve", host))
        }))
    }
}

impl Transport for TcpTransport {
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        self.close();

        let (stream, addr) = self.open(host, port)?;
        stream.set_nonblocking(true)?;
        if let Err(e) = stream.set_nodelay(true) {
            warn!("Failed to disable Nagle on {}: {}", addr, e);
        }

        self.stream = Some(stream);
        self.remote = Some(addr);
        self.peer_closed = false;
        Ok(())
    }

    fn connected(&self) -> bool {
        self.stream.is_some() && !self.peer_closed
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Ok(0);
        };
        if self.peer_closed || buf.is_empty() {
            return Ok(0);
        }

        match stream.read(buf) {
            Ok(0) => {
                self.peer_closed = true;
                Ok(0)
            }
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(ref e) if is_peer_gone(e) => {
                self.peer_closed = true;
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        let Some(stream) = self.stream.as_mut() else {
            return Err(io::Error::from(ErrorKind::NotConnected));
        };
        if self.peer_closed {
            return Ok(0);
        }

        match stream.write(data) {
            Ok(n) => Ok(n),
            Err(ref e) if e.kind() == ErrorKind::WouldBlock => Ok(0),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(ref e) if is_peer_gone(e) => {
                debug!("Peer {} went away while writing: {}", describe_remote(self.remote), e);
                self.peer_closed = true;
                Ok(0)
            }
            Err(e) => Err(e),
        }
    }

    /// Command lines are short, so waiting out a full send buffer here is
    /// bounded in practice.
    fn write_all(&mut self, mut data: &[u8]) -> io::Result<()> {
        let mut stalls = 0;
        while !data.is_empty() {
            match self.write(data)? {
                0 if stalls < 100 => {
                    stalls += 1;
                    std::thread::sleep(Duration::from_millis(1));
                }
                0 => return Err(io::Error::from(ErrorKind::WriteZero)),
                n => data = &data[n..],
            }
        }
        Ok(())
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        self.remote
    }

    fn close(&mut self) {
        if let Some(stream) = self.stream.take() {
            let _ = stream.shutdown(Shutdown::Both);
        }
        self.remote = None;
        self.peer_closed = false;
    }
}

/// Errors meaning the other end has closed or reset the connection.
fn is_peer_gone(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted
    )
}

fn describe_remote(remote: Option<SocketAddr>) -> String {
    remote.map_or_else(|| "unknown".to_string(), |a| a.to_string())
}

impl Drop for TcpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::thread;
    use std::time::Instant;

    fn read_until(transport: &mut TcpTransport, want: usize) -> Vec<u8> {
        let mut out = Vec::new();
        let mut buf = [0u8; 64];
        let deadline = Instant::now() + Duration::from_secs(5);
        while out.len() < want && Instant::now() < deadline {
            let n = transport.read(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
            if n == 0 {
                thread::sleep(Duration::from_millis(5));
            }
        }
        out
    }

    #[test]
    fn test_read_does_not_block_and_reports_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            thread::sleep(Duration::from_millis(50));
            stream.write_all(b"220 hi\r\n").unwrap();
        });

        let mut transport = TcpTransport::new(Duration::from_secs(2));
        transport.connect("127.0.0.1", port).unwrap();
        assert!(transport.connected());
        assert_eq!(transport.remote_addr().unwrap().port(), port);

        let mut buf = [0u8; 16];
        assert_eq!(transport.read(&mut buf).unwrap(), 0);

        assert_eq!(read_until(&mut transport, 8), b"220 hi\r\n");
        server.join().unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while transport.connected() && Instant::now() < deadline {
            transport.read(&mut buf).unwrap();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(!transport.connected());

        transport.close();
        assert!(transport.remote_addr().is_none());
    }

    #[test]
    fn test_write_after_peer_reset_reports_close() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let _ = stream.read(&mut buf);
            // Dropping with unread data resets the connection.
        });

        let mut transport = TcpTransport::new(Duration::from_secs(2));
        transport.connect("127.0.0.1", port).unwrap();
        let chunk = [0x5au8; 4096];

        let deadline = Instant::now() + Duration::from_secs(5);
        while transport.connected() && Instant::now() < deadline {
            transport.write(&chunk).unwrap();
            thread::sleep(Duration::from_millis(1));
        }
        server.join().unwrap();

        assert!(!transport.connected());
        assert_eq!(transport.write(&chunk).unwrap(), 0);
    }

    #[test]
    fn test_connect_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let mut transport = TcpTransport::new(Duration::from_secs(1));
        assert!(transport.connect("127.0.0.1", port).is_err());
        assert!(!transport.connected());
    }
}
