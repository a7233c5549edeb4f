//! Local file storage
//!
//! The client reads uploads from and writes downloads to a `FileStore`.

pub mod filesystem;

pub use filesystem::{FsFile, FsStore};

use std::io;

/// How a local file is opened for a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenMode {
    /// Existing file, read from the start. Used for uploads.
    Read,
    /// Created or truncated. Used for downloads.
    Write,
}

/// Opens named local files.
pub trait FileStore {
    type File: LocalFile;

    fn open(&mut self, path: &str, mode: OpenMode) -> io::Result<Self::File>;
}

/// An open local file. Dropping it closes it.
pub trait LocalFile {
    /// Size in bytes at the time of the call.
    fn size(&self) -> u64;

    /// Reads the next chunk. `Ok(0)` means the end of the file.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    fn write_all(&mut self, data: &[u8]) -> io::Result<()>;
}
