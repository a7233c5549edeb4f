//! Module `reply`
//!
//! Assembles reply lines from the control channel across any number of
//! non-blocking polls.
//!
//! Received bytes are queued until a line terminator arrives. Lines are
//! consumed in arrival order, one reply per wait, so a burst of replies
//! delivered between two polls is never lost: whatever belongs to a later
//! wait stays queued for it. Multi-line replies (`230-...` up to `230 ...`)
//! are folded into a single reply carrying the final line.

use log::{debug, trace};
use std::io;
use std::time::{Duration, Instant};

use crate::error::ClientError;
use crate::protocol::parser::parse_reply_code;
use crate::transport::Transport;

const READ_CHUNK: usize = 256;
const MAX_LINE_LENGTH: usize = 4096;
// Bounds the work done by one poll when the server keeps sending.
const MAX_READS_PER_POLL: usize = MAX_LINE_LENGTH / READ_CHUNK;

/// A complete reply line and its leading numeric code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub text: String,
}

/// Outcome of one poll.
#[derive(Debug, PartialEq, Eq)]
pub enum ReplyPoll {
    /// Nothing conclusive yet; poll again later.
    Pending,
    /// The expected reply arrived.
    Matched(Reply),
    /// The deadline passed. The reader is ready for a fresh wait.
    TimedOut,
}

/// Response line accumulator for the control channel.
#[derive(Debug, Default)]
pub struct ReplyReader {
    pending: Vec<u8>,
    deadline: Option<Instant>,
    continuation: Option<u16>,
}

impl ReplyReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a wait has been started and not yet concluded.
    pub fn is_waiting(&self) -> bool {
        self.deadline.is_some()
    }

    /// Drops queued input and any wait in progress.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.deadline = None;
        self.continuation = None;
    }

    /// Polls for a reply with code `expected`.
    ///
    /// The first poll of a wait arms a deadline `timeout` from now. Returns
    /// `Matched` exactly once, when a complete reply with the expected code
    /// is available. A complete reply with any other code ends the wait with
    /// `UnexpectedReply`.
    pub fn wait_for<T: Transport>(
        &mut self,
        transport: &mut T,
        expected: u16,
        timeout: Duration,
    ) -> Result<ReplyPoll, ClientError> {
        let now = Instant::now();
        let deadline = *self.deadline.get_or_insert(now + timeout);

        if now >= deadline {
            debug!("Waiting for code {} - timeout!", expected);
            self.deadline = None;
            self.continuation = None;
            return Ok(ReplyPoll::TimedOut);
        }

        let reply = match self.fill_until_reply(transport) {
            Ok(reply) => reply,
            Err(e) => {
                self.deadline = None;
                return Err(e);
            }
        };

        let Some(reply) = reply else {
            if !transport.connected() {
                self.deadline = None;
                return Err(ClientError::ControlClosed);
            }
            return Ok(ReplyPoll::Pending);
        };

        self.deadline = None;
        if reply.code == expected {
            debug!("Waiting for code {} success, server replies: {}", expected, reply.text);
            Ok(ReplyPoll::Matched(reply))
        } else {
            debug!("Waiting for code {} but server replies: {}", expected, reply.text);
            Err(ClientError::UnexpectedReply {
                expected,
                code: reply.code,
                text: reply.text,
            })
        }
    }

    /// Reads what the transport has until a reply completes, input runs dry
    /// or the per-poll read budget is spent. Unread input waits for the
    /// next poll.
    fn fill_until_reply<T: Transport>(
        &mut self,
        transport: &mut T,
    ) -> Result<Option<Reply>, ClientError> {
        let mut chunk = [0u8; READ_CHUNK];
        for _ in 0..MAX_READS_PER_POLL {
            if let Some(reply) = self.take_ready()? {
                return Ok(Some(reply));
            }

            let n = transport.read(&mut chunk).map_err(ClientError::ControlIo)?;
            if n == 0 {
                return Ok(None);
            }
            self.pending.extend_from_slice(&chunk[..n]);
        }
        self.take_ready()
    }

    fn take_ready(&mut self) -> Result<Option<Reply>, ClientError> {
        if let Some(reply) = self.next_reply() {
            return Ok(Some(reply));
        }
        if self.pending.len() > MAX_LINE_LENGTH {
            return Err(ClientError::ControlIo(io::Error::new(
                io::ErrorKind::InvalidData,
                "reply line too long",
            )));
        }
        Ok(None)
    }

    fn next_reply(&mut self) -> Option<Reply> {
        while let Some(line) = self.take_line() {
            let raw = line.trim_end();
            let text = raw.trim_start();
            if text.is_empty() {
                continue;
            }

            let code = parse_reply_code(text);

            if let Some(open) = self.continuation {
                // Only "NNN " at the very start of a line ends the block.
                let closes = raw
                    .strip_prefix(open.to_string().as_str())
                    .is_some_and(|rest| rest.is_empty() || rest.starts_with(' '));
                if !closes {
                    trace!("Reply continuation: {}", text);
                    continue;
                }
                self.continuation = None;
            } else if code != 0 && text.as_bytes().get(3) == Some(&b'-') {
                trace!("Multi-line reply {} started: {}", code, text);
                self.continuation = Some(code);
                continue;
            }

            return Some(Reply {
                code,
                text: text.to_string(),
            });
        }
        None
    }

    fn take_line(&mut self) -> Option<String> {
        let end = self.pending.iter().position(|&b| b == b'\r' || b == b'\n')?;
        let line: Vec<u8> = self.pending.drain(..=end).collect();
        Some(String::from_utf8_lossy(&line[..end]).into_owned())
    }
}
