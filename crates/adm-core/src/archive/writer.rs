//! Zip container writer.

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Failure writing a member or finalizing the container.
#[derive(Debug, Error)]
pub enum PackError {
    #[error("zip: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("io: {0}")]
    Io(#[from] io::Error),
}

/// Sink the builder packs fetched bodies into.
pub trait Container {
    /// Append `data` as a new member named `name`.
    fn add_member(&mut self, name: &str, data: &[u8]) -> Result<(), PackError>;

    /// Complete the container and return its path.
    fn finish(self) -> Result<PathBuf, PackError>;
}

/// Writer for one container file. Not shared between threads: a task's build
/// owns its writer for the whole pipeline.
pub struct ContainerWriter {
    zip: ZipWriter<File>,
    path: PathBuf,
    members: usize,
}

impl ContainerWriter {
    /// Create (or truncate) the container at `path`. The parent directory must exist.
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            zip: ZipWriter::new(file),
            path: path.to_path_buf(),
            members: 0,
        })
    }

    /// Members written so far.
    pub fn members(&self) -> usize {
        self.members
    }
}

impl Container for ContainerWriter {
    fn add_member(&mut self, name: &str, data: &[u8]) -> Result<(), PackError> {
        let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        self.zip.start_file(name, options)?;
        self.zip.write_all(data)?;
        self.members += 1;
        Ok(())
    }

    /// Writes the central directory and flushes the file.
    fn finish(mut self) -> Result<PathBuf, PackError> {
        let mut file = self.zip.finish()?;
        file.flush()?;
        Ok(self.path)
    }
}
