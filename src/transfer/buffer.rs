//! Module `buffer`
//!
//! Moves file bytes between the local file and the data channel one bounded
//! chunk per call, so no single step waits on a large read or write.

use std::io;

use crate::storage::LocalFile;
use crate::transport::Transport;

/// What one chunked exchange achieved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkOutcome {
    /// This many bytes reached their destination.
    Moved(usize),
    /// Nothing could move right now; try again on a later step.
    Stalled,
    /// The source has nothing more to give.
    Exhausted,
}

/// Working buffer for one transfer.
///
/// Uploads size it to the file (up to a ceiling) because the size is known
/// up front; downloads use a fixed capacity.
#[derive(Debug)]
pub struct TransferBuffer {
    buf: Vec<u8>,
    filled: usize,
    sent: usize,
}

impl TransferBuffer {
    pub fn for_upload(file_size: u64, cap: usize) -> Self {
        let size = usize::try_from(file_size).unwrap_or(usize::MAX);
        Self::with_capacity(size.clamp(1, cap.max(1)))
    }

    pub fn for_download(capacity: usize) -> Self {
        Self::with_capacity(capacity.max(1))
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: vec![0; capacity],
            filled: 0,
            sent: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Upload step: refills from the file once the previous chunk is fully
    /// written, then writes as much as the data channel accepts.
    pub fn file_to_network<F: LocalFile, T: Transport>(
        &mut self,
        file: &mut F,
        data: &mut T,
    ) -> io::Result<ChunkOutcome> {
        if self.sent == self.filled {
            self.filled = file.read(&mut self.buf)?;
            self.sent = 0;
            if self.filled == 0 {
                return Ok(ChunkOutcome::Exhausted);
            }
        }

        match data.write(&self.buf[self.sent..self.filled])? {
            0 => Ok(ChunkOutcome::Stalled),
            n => {
                self.sent += n;
                Ok(ChunkOutcome::Moved(n))
            }
        }
    }

    /// Download step: reads what the data channel has and appends it to the
    /// file. The source is exhausted once the server has closed the channel
    /// and everything it sent has been read.
    pub fn network_to_file<F: LocalFile, T: Transport>(
        &mut self,
        file: &mut F,
        data: &mut T,
    ) -> io::Result<ChunkOutcome> {
        match data.read(&mut self.buf)? {
            0 if data.connected() => Ok(ChunkOutcome::Stalled),
            0 => Ok(ChunkOutcome::Exhausted),
            n => {
                file.write_all(&self.buf[..n])?;
                Ok(ChunkOutcome::Moved(n))
            }
        }
    }
}
