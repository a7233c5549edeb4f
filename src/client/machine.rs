//! Module `machine`
//!
//! The FTP client state machine. Each call to `step` advances a transfer by
//! at most one protocol transition and returns without waiting on the
//! network, so a single thread can interleave transfers with other work.
//!
//! A request walks `Connect → Greet → User → Password → Passive → Data →
//! Transfer → Finish → Quit → Idle`. Any failure is terminal for the
//! request: the machine drops to `Error` (or `Timeout`), releases every
//! resource it holds and reports the cause through `Status`.

use log::{debug, error, info, warn};
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::client::{FtpState, ServerInfo, Status, TransferResult};
use crate::config::ClientSettings;
use crate::error::ClientError;
use crate::protocol::{Command, Reply, ReplyPoll, ReplyReader, parse_pasv_reply, responses};
use crate::storage::{FileStore, FsStore, LocalFile};
use crate::transfer::{
    ChunkOutcome, Direction, Mode, TransferBuffer, TransferRequest, TransferStats,
};
use crate::transport::{TcpTransport, Transport};

/// A reusable FTP client serving one transfer at a time.
///
/// `T` is used for both the control and the data channel; `S` provides the
/// local files.
pub struct FtpClient<T: Transport, S: FileStore> {
    settings: ClientSettings,
    server: Option<Arc<ServerInfo>>,
    state: FtpState,
    status: Status,
    control: T,
    data: T,
    store: S,
    file: Option<S::File>,
    request: Option<TransferRequest>,
    reply: ReplyReader,
    data_addr: Option<SocketAddr>,
    buffer: Option<TransferBuffer>,
    bytes_transferred: u64,
    transfer_started: Option<Instant>,
    transfer_elapsed: Duration,
}

impl FtpClient<TcpTransport, FsStore> {
    /// A client over TCP with local files resolved under `root`.
    pub fn with_tcp(root: impl Into<std::path::PathBuf>, settings: ClientSettings) -> Self {
        let connect_timeout = settings.connect_timeout();
        Self::new(
            TcpTransport::new(connect_timeout),
            TcpTransport::new(connect_timeout),
            FsStore::new(root),
            settings,
        )
    }
}

impl<T: Transport, S: FileStore> FtpClient<T, S> {
    pub fn new(control: T, data: T, store: S, settings: ClientSettings) -> Self {
        Self {
            settings,
            server: None,
            state: FtpState::Idle,
            status: Status::default(),
            control,
            data,
            store,
            file: None,
            request: None,
            reply: ReplyReader::new(),
            data_addr: None,
            buffer: None,
            bytes_transferred: 0,
            transfer_started: None,
            transfer_elapsed: Duration::ZERO,
        }
    }

    /// Binds the server used by every following transfer.
    ///
    /// May be called again between transfers to switch servers; rebinding
    /// while a transfer is active is refused with `Busy`.
    pub fn begin(&mut self, server: impl Into<Arc<ServerInfo>>) -> Result<(), ClientError> {
        if self.state.is_active() {
            warn!("Cannot rebind server while {} is in progress", self.state);
            return Err(ClientError::Busy);
        }

        let server = server.into();
        info!(
            "FTP session bound to {}:{} as {}",
            server.host, server.port, server.login
        );
        self.server = Some(server);
        Ok(())
    }

    /// Starts transferring `local_path` to or from `remote_path`.
    ///
    /// With `Mode::Blocking` the call returns once the request has
    /// concluded. With `Mode::StepDriven` it performs the first transition
    /// and returns; the caller then calls `step` until the state leaves the
    /// active range.
    ///
    /// A request issued while another is active is rejected with the busy
    /// code and leaves the active one untouched.
    pub fn transfer(
        &mut self,
        local_path: &str,
        remote_path: &str,
        direction: Direction,
        mode: Mode,
    ) -> Status {
        if self.state.is_active() {
            warn!(
                "Transfer of {} rejected: previous request still in state {}",
                local_path, self.state
            );
            return Status::failed(&ClientError::Busy);
        }

        self.reset_request();

        if self.server.is_none() {
            return self.reject(ClientError::SessionNotBegun);
        }

        match self.store.open(local_path, direction.open_mode()) {
            Ok(file) => self.file = Some(file),
            Err(source) => {
                return self.reject(ClientError::LocalFile {
                    path: local_path.to_string(),
                    source,
                });
            }
        }

        info!(
            "Starting {:?} transfer: local {} remote {}",
            direction, local_path, remote_path
        );
        self.request = Some(TransferRequest {
            local_path: local_path.to_string(),
            remote_path: remote_path.to_string(),
            direction,
        });
        self.state = FtpState::Connect;

        match mode {
            Mode::Blocking => self.run_to_completion(),
            Mode::StepDriven => {
                self.step();
            }
        }

        self.status.clone()
    }

    /// Advances the current request by at most one transition.
    ///
    /// Does nothing once the request has concluded. Never waits on the
    /// network beyond a connect attempt.
    pub fn step(&mut self) -> &Status {
        if !self.state.is_active() {
            if self.state.is_failed() {
                self.status.result = TransferResult::Error;
            }
            return &self.status;
        }

        if let Err(err) = self.advance() {
            self.fail(err);
        }
        &self.status
    }

    /// Abandons the active request, releasing every resource it holds.
    pub fn cancel(&mut self) -> &Status {
        if self.state.is_active() {
            warn!("Transfer cancelled in state {}", self.state);
            self.release();
            self.status = Status::failed(&ClientError::Cancelled);
            self.state = FtpState::Idle;
        }
        &self.status
    }

    // --------------------
    // Getter methods
    // --------------------

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn state(&self) -> FtpState {
        self.state
    }

    /// Bytes moved and time spent in the data phase of the current or
    /// last request.
    pub fn stats(&self) -> TransferStats {
        let elapsed = match self.transfer_started {
            Some(started) => started.elapsed(),
            None => self.transfer_elapsed,
        };
        TransferStats {
            bytes: self.bytes_transferred,
            elapsed,
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn server(&self) -> Option<&ServerInfo> {
        self.server.as_deref()
    }

    pub fn request(&self) -> Option<&TransferRequest> {
        self.request.as_ref()
    }

    /// Data channel address from the last passive-mode reply.
    pub fn data_addr(&self) -> Option<SocketAddr> {
        self.data_addr
    }

    pub fn control(&self) -> &T {
        &self.control
    }

    pub fn data(&self) -> &T {
        &self.data
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    // --------------------
    // State transitions
    // --------------------

    fn advance(&mut self) -> Result<(), ClientError> {
        let server = self.server.clone().ok_or(ClientError::SessionNotBegun)?;

        match self.state {
            FtpState::Connect => self.connect_control(&server)?,
            FtpState::Greet => {
                if self.expect(responses::READY, "No server greeting")?.is_some() {
                    self.send(&Command::User(server.login.clone()))?;
                    self.state = FtpState::User;
                }
            }
            FtpState::User => {
                if self
                    .expect(responses::PASSWORD_REQUIRED, "No password prompt")?
                    .is_some()
                {
                    self.send(&Command::Pass(server.password.clone()))?;
                    self.state = FtpState::Password;
                }
            }
            FtpState::Password => {
                if self
                    .expect(responses::LOGIN_SUCCESS, "Login not confirmed")?
                    .is_some()
                {
                    self.send(&Command::Pasv)?;
                    self.state = FtpState::Passive;
                }
            }
            FtpState::Passive => {
                if let Some(reply) =
                    self.expect(responses::ENTERING_PASSIVE, "No passive mode reply")?
                {
                    self.data_addr = Some(self.resolve_data_addr(&reply)?);
                    self.state = FtpState::Data;
                }
            }
            FtpState::Data => self.open_data()?,
            FtpState::Transfer => self.exchange_chunk()?,
            FtpState::Finish => {
                self.close_transfer();
                self.state = FtpState::Quit;
            }
            FtpState::Quit => self.quit(),
            FtpState::Idle | FtpState::Timeout | FtpState::Error => {}
        }

        Ok(())
    }

    fn connect_control(&mut self, server: &ServerInfo) -> Result<(), ClientError> {
        if server.validate_ca {
            debug!("Ignoring CA verification - FTP only");
        }
        self.status.result = TransferResult::Progress;

        let connected = self
            .control
            .connect(&server.host, server.port)
            .and_then(|()| {
                if self.control.connected() {
                    Ok(())
                } else {
                    Err(io::Error::from(io::ErrorKind::NotConnected))
                }
            });

        if let Err(source) = connected {
            return Err(ClientError::ControlConnect {
                host: server.host.clone(),
                port: server.port,
                source,
            });
        }

        info!(
            "Connection to {}:{} established ({})",
            server.host,
            server.port,
            describe(self.control.remote_addr())
        );
        self.state = FtpState::Greet;
        Ok(())
    }

    /// Polls for reply `code`. `Ok(None)` while still waiting.
    fn expect(&mut self, code: u16, context: &'static str) -> Result<Option<Reply>, ClientError> {
        let timeout = self.settings.reply_timeout();

        match self.reply.wait_for(&mut self.control, code, timeout)? {
            ReplyPoll::Pending => Ok(None),
            ReplyPoll::TimedOut => Err(ClientError::Timeout {
                expected: code,
                context,
            }),
            ReplyPoll::Matched(reply) => {
                self.status.code = reply.code;
                self.status.desc = reply.text.clone();
                Ok(Some(reply))
            }
        }
    }

    /// Parses the 227 payload. Servers advertising `0.0.0.0` mean "the
    /// address you already reached me on".
    fn resolve_data_addr(&self, reply: &Reply) -> Result<SocketAddr, ClientError> {
        debug!("Parsing PASV response {}", reply.text);
        let parsed = parse_pasv_reply(&reply.text)?;

        if !parsed.ip().is_unspecified() {
            return Ok(SocketAddr::V4(parsed));
        }

        match self.control.remote_addr() {
            Some(remote) => {
                debug!(
                    "PASV advertised {}, using control peer {} instead",
                    parsed.ip(),
                    remote.ip()
                );
                Ok(SocketAddr::new(remote.ip(), parsed.port()))
            }
            None => {
                warn!("PASV advertised {} and control peer is unknown", parsed.ip());
                Ok(SocketAddr::V4(parsed))
            }
        }
    }

    fn open_data(&mut self) -> Result<(), ClientError> {
        let Some(addr) = self.data_addr else {
            return Err(ClientError::MalformedPassive(
                "no passive address parsed".into(),
            ));
        };

        self.data
            .connect(&addr.ip().to_string(), addr.port())
            .map_err(|source| ClientError::DataConnect { addr, source })?;
        info!(
            "Data connection to {} established",
            describe(self.data.remote_addr())
        );

        let (Some(request), Some(file)) = (self.request.as_ref(), self.file.as_ref()) else {
            return Err(missing_local_file(self.request.as_ref()));
        };

        let (command, buffer) = match request.direction {
            Direction::Put => (
                Command::Stor(request.remote_path.clone()),
                TransferBuffer::for_upload(file.size(), self.settings.upload_buffer_cap),
            ),
            Direction::Get => (
                Command::Retr(request.remote_path.clone()),
                TransferBuffer::for_download(self.settings.download_buffer_size),
            ),
        };

        self.bytes_transferred = 0;
        self.transfer_started = Some(Instant::now());
        self.send(&command)?;
        debug!("Transfer buffer of {} bytes allocated", buffer.capacity());
        self.buffer = Some(buffer);
        self.state = FtpState::Transfer;
        Ok(())
    }

    fn exchange_chunk(&mut self) -> Result<(), ClientError> {
        let Some(direction) = self.request.as_ref().map(|r| r.direction) else {
            return Err(missing_local_file(None));
        };
        let (Some(buffer), Some(file)) = (self.buffer.as_mut(), self.file.as_mut()) else {
            return Err(missing_local_file(self.request.as_ref()));
        };

        let outcome = match direction {
            Direction::Put => buffer.file_to_network(file, &mut self.data)?,
            Direction::Get => buffer.network_to_file(file, &mut self.data)?,
        };

        match outcome {
            ChunkOutcome::Moved(n) => self.bytes_transferred += n as u64,
            ChunkOutcome::Stalled => {}
            ChunkOutcome::Exhausted => {
                debug!("No more data after {} bytes", self.bytes_transferred);
                self.state = FtpState::Finish;
                return Ok(());
            }
        }

        if !self.data.connected() {
            debug!("Data connection closed by server");
            self.state = FtpState::Finish;
        }
        Ok(())
    }

    fn close_transfer(&mut self) {
        self.buffer = None;
        self.data.close();
        self.file = None;
        if let Some(started) = self.transfer_started.take() {
            self.transfer_elapsed = started.elapsed();
        }

        let stats = self.stats();
        info!(
            "Transfer finished: {} bytes in {:?} ({} B/s)",
            stats.bytes,
            stats.elapsed,
            stats.bytes_per_sec()
        );
    }

    fn quit(&mut self) {
        if let Err(e) = self.send(&Command::Quit) {
            warn!("Failed to send QUIT: {}", e);
        }
        self.status.result = TransferResult::Ok;
        self.control.close();
        self.reply.reset();
        self.state = FtpState::Idle;
    }

    fn send(&mut self, command: &Command) -> Result<(), ClientError> {
        debug!(">>> {}", command);
        self.control
            .write_all(command.to_wire().as_bytes())
            .map_err(ClientError::ControlIo)
    }

    fn run_to_completion(&mut self) {
        let interval = self.settings.step_interval();
        while self.state.is_active() {
            self.step();
            if self.state.is_active() {
                thread::sleep(interval);
            }
        }
    }

    // --------------------
    // Failure and cleanup
    // --------------------

    fn fail(&mut self, err: ClientError) {
        error!("Transfer failed in state {}: {}", self.state, err);
        self.status = Status::failed(&err);
        self.state = if err.is_timeout() {
            FtpState::Timeout
        } else {
            FtpState::Error
        };
        self.release();
    }

    /// Fails a request before it became active.
    fn reject(&mut self, err: ClientError) -> Status {
        error!("Transfer not started: {}", err);
        self.status = Status::failed(&err);
        self.status.clone()
    }

    fn release(&mut self) {
        self.buffer = None;
        self.data.close();
        self.file = None;
        self.control.close();
        self.reply.reset();
        if let Some(started) = self.transfer_started.take() {
            self.transfer_elapsed = started.elapsed();
        }
    }

    fn reset_request(&mut self) {
        self.release();
        self.state = FtpState::Idle;
        self.status = Status::in_progress();
        self.request = None;
        self.data_addr = None;
        self.bytes_transferred = 0;
        self.transfer_elapsed = Duration::ZERO;
    }
}

fn missing_local_file(request: Option<&TransferRequest>) -> ClientError {
    ClientError::LocalFile {
        path: request.map(|r| r.local_path.clone()).unwrap_or_default(),
        source: io::Error::new(io::ErrorKind::NotFound, "local file not open"),
    }
}

fn describe(addr: Option<SocketAddr>) -> String {
    addr.map(|a| a.to_string())
        .unwrap_or_else(|| "unknown peer".to_string())
}
