//! File system operations
//!
//! `FileStore` backed by `std::fs`, resolving relative names under a root
//! directory.

use log::{debug, warn};
use std::fs::{File, OpenOptions};
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use crate::storage::{FileStore, LocalFile, OpenMode};

/// Local files under `root`. Absolute paths are used as given.
#[derive(Debug, Clone)]
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

impl Default for FsStore {
    fn default() -> Self {
        Self::new(".")
    }
}

impl FileStore for FsStore {
    type File = FsFile;

    fn open(&mut self, path: &str, mode: OpenMode) -> io::Result<FsFile> {
        let real_path = self.resolve(path);
        debug!("Opening local file {} for {:?}", real_path.display(), mode);

        let file = match mode {
            OpenMode::Read => File::open(&real_path)?,
            OpenMode::Write => OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(&real_path)?,
        };

        if file.metadata()?.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is a directory", real_path.display()),
            ));
        }

        Ok(FsFile { file })
    }
}

/// An open `std::fs::File`.
#[derive(Debug)]
pub struct FsFile {
    file: File,
}

impl LocalFile for FsFile {
    fn size(&self) -> u64 {
        known_size(self.file.metadata().map(|m| m.len()))
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        self.file.write_all(data)
    }
}

fn known_size(len: io::Result<u64>) -> u64 {
    match len {
        Ok(len) => len,
        Err(e) => {
            warn!("Cannot determine local file size, assuming empty: {}", e);
            0
        }
    }
}
