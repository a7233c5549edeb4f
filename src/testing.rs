//! In-memory collaborators for unit tests.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::io;
use std::net::SocketAddr;
use std::rc::Rc;

use crate::storage::{FileStore, LocalFile, OpenMode};
use crate::transport::Transport;

/// A transport fed from a byte queue, optionally answering command lines
/// from a script.
pub(crate) struct MockTransport {
    inbound: VecDeque<u8>,
    written: Vec<u8>,
    pending_line: Vec<u8>,
    script: Vec<(String, String)>,
    greeting: Option<String>,
    open: bool,
    peer_closed: bool,
    remote: Option<SocketAddr>,
    pub refuse_connect: bool,
    pub fail_writes: bool,
    pub read_chunk: usize,
    pub write_chunk: usize,
    /// The peer closes after accepting this many bytes.
    pub close_after: Option<usize>,
    pub connects: Vec<(String, u16)>,
    pub closes: usize,
}

impl MockTransport {
    pub fn new() -> Self {
        Self {
            inbound: VecDeque::new(),
            written: Vec::new(),
            pending_line: Vec::new(),
            script: Vec::new(),
            greeting: None,
            open: false,
            peer_closed: false,
            remote: None,
            refuse_connect: false,
            fail_writes: false,
            read_chunk: usize::MAX,
            write_chunk: usize::MAX,
            close_after: None,
            connects: Vec::new(),
            closes: 0,
        }
    }

    /// Queued every time `connect` succeeds.
    pub fn greeting(mut self, line: &str) -> Self {
        self.greeting = Some(line.to_string());
        self
    }

    /// When a written line starts with `prefix`, `reply` is queued. The
    /// first matching entry wins and stays in place for later sessions.
    pub fn respond(mut self, prefix: &str, reply: &str) -> Self {
        self.script.push((prefix.to_string(), reply.to_string()));
        self
    }

    pub fn push_inbound(&mut self, bytes: &[u8]) {
        self.inbound.extend(bytes);
    }

    /// The peer closes once its queued bytes have been read. Writes are
    /// accepted no longer.
    pub fn close_peer(&mut self) {
        self.peer_closed = true;
    }

    /// Connects this transport as if the client had opened it.
    pub fn connected_to(mut self, addr: &str) -> Self {
        self.open = true;
        self.remote = addr.parse().ok();
        self
    }

    pub fn written(&self) -> &[u8] {
        &self.written
    }

    pub fn written_text(&self) -> String {
        String::from_utf8_lossy(&self.written).into_owned()
    }

    /// Inbound bytes not yet read.
    pub fn unread(&self) -> usize {
        self.inbound.len()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    fn run_script(&mut self) {
        while let Some(end) = self.pending_line.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.pending_line.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line);
            let reply = self
                .script
                .iter()
                .find(|(prefix, _)| line.starts_with(prefix.as_str()))
                .map(|(_, reply)| reply.clone());
            if let Some(reply) = reply {
                self.inbound.extend(reply.as_bytes());
            }
        }
    }
}

impl Transport for MockTransport {
    fn connect(&mut self, host: &str, port: u16) -> io::Result<()> {
        self.connects.push((host.to_string(), port));
        if self.refuse_connect {
            return Err(io::Error::from(io::ErrorKind::ConnectionRefused));
        }
        self.open = true;
        self.remote = format!("{}:{}", host, port).parse().ok();
        if let Some(greeting) = &self.greeting {
            self.inbound.extend(greeting.as_bytes());
        }
        Ok(())
    }

    fn connected(&self) -> bool {
        self.open && !(self.peer_closed && self.inbound.is_empty())
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.open {
            return Ok(0);
        }
        let n = buf.len().min(self.read_chunk).min(self.inbound.len());
        for (slot, byte) in buf.iter_mut().zip(self.inbound.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn write(&mut self, data: &[u8]) -> io::Result<usize> {
        if !self.open {
            return Err(io::Error::from(io::ErrorKind::NotConnected));
        }
        if self.fail_writes {
            return Err(io::Error::other("injected write failure"));
        }
        if self.peer_closed {
            return Ok(0);
        }
        let mut n = data.len().min(self.write_chunk);
        if let Some(limit) = self.close_after {
            n = n.min(limit.saturating_sub(self.written.len()));
            if n == 0 {
                self.peer_closed = true;
                return Ok(0);
            }
        }
        self.written.extend_from_slice(&data[..n]);
        self.pending_line.extend_from_slice(&data[..n]);
        self.run_script();
        Ok(n)
    }

    fn remote_addr(&self) -> Option<SocketAddr> {
        if self.open { self.remote } else { None }
    }

    fn close(&mut self) {
        if self.open {
            self.closes += 1;
        }
        self.open = false;
    }
}

/// Files kept in a shared map so tests can inspect what a download wrote.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    pub fail_open: bool,
    pub opens: Rc<RefCell<Vec<(String, OpenMode)>>>,
}

impl MemoryStore {
    pub fn with_file(self, name: &str, contents: &[u8]) -> Self {
        self.files
            .borrow_mut()
            .insert(name.to_string(), contents.to_vec());
        self
    }

    pub fn contents(&self, name: &str) -> Option<Vec<u8>> {
        self.files.borrow().get(name).cloned()
    }
}

impl FileStore for MemoryStore {
    type File = MemoryFile;

    fn open(&mut self, path: &str, mode: OpenMode) -> io::Result<MemoryFile> {
        self.opens.borrow_mut().push((path.to_string(), mode));
        if self.fail_open {
            return Err(io::Error::from(io::ErrorKind::PermissionDenied));
        }
        let snapshot = match mode {
            OpenMode::Read => self
                .files
                .borrow()
                .get(path)
                .cloned()
                .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))?,
            OpenMode::Write => {
                self.files.borrow_mut().insert(path.to_string(), Vec::new());
                Vec::new()
            }
        };
        Ok(MemoryFile {
            name: path.to_string(),
            files: Rc::clone(&self.files),
            snapshot,
            pos: 0,
        })
    }
}

pub(crate) struct MemoryFile {
    name: String,
    files: Rc<RefCell<HashMap<String, Vec<u8>>>>,
    snapshot: Vec<u8>,
    pos: usize,
}

impl LocalFile for MemoryFile {
    fn size(&self) -> u64 {
        self.snapshot.len() as u64
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.snapshot.len() - self.pos);
        buf[..n].copy_from_slice(&self.snapshot[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.files
            .borrow_mut()
            .entry(self.name.clone())
            .or_default()
            .extend_from_slice(data);
        Ok(())
    }
}
