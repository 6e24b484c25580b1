//! Large-file staging
//!
//! Uploads above a size threshold are copied to a private temporary
//! directory in fixed-size chunks before extraction. Progress is reported
//! after every chunk. The directory lives exactly as long as the returned
//! [`StagedFile`].

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

use crate::config::UploadConfig;

/// Uploads larger than this are staged (200 MiB)
pub const DEFAULT_STAGING_THRESHOLD: u64 = 200 * 1024 * 1024;

/// Bytes read from the upload per chunk (50 MiB)
pub const DEFAULT_CHUNK_SIZE: usize = 50 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum StagingError {
    #[error("failed to create staging directory: {0}")]
    CreateDir(#[source] io::Error),

    #[error("failed to read upload: {0}")]
    Read(#[source] io::Error),

    #[error("failed to write staged file {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Progress after one chunk has been written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingProgress {
    pub bytes_written: u64,
    pub total_bytes: u64,
}

impl StagingProgress {
    /// `bytes_written / total_bytes`; a zero-length upload counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total_bytes == 0 {
            1.0
        } else {
            self.bytes_written as f64 / self.total_bytes as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct LargeFileStager {
    threshold: u64,
    chunk_size: usize,
    root: Option<PathBuf>,
}

impl Default for LargeFileStager {
    fn default() -> Self {
        Self::new(DEFAULT_STAGING_THRESHOLD, DEFAULT_CHUNK_SIZE)
    }
}

impl LargeFileStager {
    pub fn new(threshold: u64, chunk_size: usize) -> Self {
        Self {
            threshold,
            chunk_size: chunk_size.max(1),
            root: None,
        }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        let stager = Self::new(config.staging_threshold_bytes, config.staging_chunk_bytes);
        match &config.staging_dir {
            Some(dir) => stager.with_root(dir),
            None => stager,
        }
    }

    /// Create staging directories under `root` instead of the OS temp dir.
    pub fn with_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = Some(root.into());
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn needs_staging(&self, size: u64) -> bool {
        size > self.threshold
    }

    /// Copy `source` into a fresh temporary directory, one chunk at a time.
    ///
    /// `on_progress` is called after each chunk is written. Any error drops
    /// the half-written directory before returning.
    pub fn stage<R, F>(
        &self,
        name: &str,
        total_bytes: u64,
        mut source: R,
        mut on_progress: F,
    ) -> Result<StagedFile, StagingError>
    where
        R: Read,
        F: FnMut(StagingProgress),
    {
        let builder = {
            let mut builder = tempfile::Builder::new();
            builder.prefix("file-chat-");
            builder
        };
        let dir = match &self.root {
            Some(root) => builder.tempdir_in(root),
            None => builder.tempdir(),
        }
        .map_err(StagingError::CreateDir)?;

        let path = dir.path().join(staged_file_name(name));
        let write_err = |source: io::Error| StagingError::Write {
            path: path.clone(),
            source,
        };

        let mut writer = BufWriter::new(File::create(&path).map_err(write_err)?);
        let mut chunk = Vec::with_capacity(self.chunk_size);
        let mut bytes_written: u64 = 0;

        loop {
            chunk.clear();
            let read = (&mut source)
                .take(self.chunk_size as u64)
                .read_to_end(&mut chunk)
                .map_err(StagingError::Read)?;
            if read == 0 {
                break;
            }

            writer.write_all(&chunk).map_err(write_err)?;
            bytes_written += read as u64;
            on_progress(StagingProgress {
                bytes_written,
                total_bytes,
            });
        }

        writer
            .into_inner()
            .map_err(|e| write_err(e.into_error()))?
            .sync_all()
            .map_err(write_err)?;

        debug!(path = %path.display(), bytes_written, "Upload staged");
        Ok(StagedFile {
            dir,
            path,
            bytes_written,
        })
    }
}

/// Only the final path component of the upload name is used on disk.
fn staged_file_name(name: &str) -> PathBuf {
    Path::new(name)
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("upload"))
}

/// A staged upload. Dropping it deletes the file and its directory.
#[derive(Debug)]
pub struct StagedFile {
    dir: TempDir,
    path: PathBuf,
    bytes_written: u64,
}

impl StagedFile {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Delete the staging directory now, reporting failure instead of
    /// swallowing it as `Drop` does.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}
