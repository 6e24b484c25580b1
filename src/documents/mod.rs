//! Document Pipeline
//!
//! Turns an uploaded file into the plain text that is handed to the model:
//!
//! ```text
//! Upload ──► LargeFileStager (only above the threshold)
//!    │
//!    ▼
//! extractor::extract  (dispatch on FileKind)
//!    │
//!    ▼
//! sanitizer::clean ──► ExtractedDocument
//! ```

pub mod docx;
pub mod extractor;
pub mod pdf;
pub mod sanitizer;
pub mod spreadsheet;
pub mod stager;

pub use extractor::extract;
pub use sanitizer::clean;
pub use stager::{LargeFileStager, StagedFile, StagingError, StagingProgress};

use bytes::Bytes;
use std::fs::File;
use std::io::{BufReader, Cursor};
use tracing::{debug, info, warn};

const MIB: f64 = 1024.0 * 1024.0;

/// File kinds accepted at the upload boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Pdf,
    Docx,
    Txt,
    Csv,
    Xlsx,
    Xls,
}

impl FileKind {
    pub const ALL: [FileKind; 6] = [
        FileKind::Pdf,
        FileKind::Docx,
        FileKind::Txt,
        FileKind::Csv,
        FileKind::Xlsx,
        FileKind::Xls,
    ];

    /// Parse an extension, case-insensitively
    pub fn from_extension(ext: &str) -> Result<Self, DocumentError> {
        match ext.to_lowercase().as_str() {
            "pdf" => Ok(FileKind::Pdf),
            "docx" => Ok(FileKind::Docx),
            "txt" => Ok(FileKind::Txt),
            "csv" => Ok(FileKind::Csv),
            "xlsx" => Ok(FileKind::Xlsx),
            "xls" => Ok(FileKind::Xls),
            other => Err(DocumentError::UnsupportedFileType(other.to_string())),
        }
    }

    /// The kind declared by a file name is its last `.`-separated suffix.
    /// A name without any dot is treated as all suffix.
    pub fn from_file_name(name: &str) -> Result<Self, DocumentError> {
        let ext = name.rsplit('.').next().unwrap_or(name);
        Self::from_extension(ext)
    }

    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::Pdf => "pdf",
            FileKind::Docx => "docx",
            FileKind::Txt => "txt",
            FileKind::Csv => "csv",
            FileKind::Xlsx => "xlsx",
            FileKind::Xls => "xls",
        }
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.extension())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DocumentError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFileType(String),

    #[error("file is not valid UTF-8 text: {0}")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),

    #[error("failed to read PDF: {0}")]
    Pdf(#[from] lopdf::Error),

    #[error("failed to read DOCX: {0}")]
    Docx(String),

    #[error("failed to read spreadsheet: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("no columns to parse from file")]
    EmptyTable,

    #[error("workbook has no worksheets")]
    NoWorksheet,

    #[error(transparent)]
    Staging(#[from] StagingError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A named upload with the kind its file name declares.
#[derive(Debug, Clone)]
pub struct Upload {
    name: String,
    kind: FileKind,
    data: Bytes,
}

impl Upload {
    /// Fails with `UnsupportedFileType` before any byte is looked at.
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Result<Self, DocumentError> {
        let name = name.into();
        let kind = FileKind::from_file_name(&name)?;
        Ok(Self {
            name,
            kind,
            data: data.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> FileKind {
        self.kind
    }

    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Sanitized plain text of one upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    text: String,
}

impl ExtractedDocument {
    /// The only constructor: raw extractor output always goes through `clean`.
    pub fn from_raw(raw: &str) -> Self {
        Self { text: clean(raw) }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Run one upload through staging, extraction and sanitization.
///
/// The upload is consumed. Large uploads are staged to disk first and the
/// staged copy is what gets parsed; the staging directory is removed before
/// this function returns, whatever the extraction outcome.
pub fn load_document(
    upload: Upload,
    stager: &LargeFileStager,
) -> Result<ExtractedDocument, DocumentError> {
    let kind = upload.kind();
    let size = upload.size();

    let raw = if stager.needs_staging(size) {
        info!(
            file = %upload.name(),
            size_mb = size as f64 / MIB,
            "Staging large upload before extraction"
        );
        let staged = stager.stage(upload.name(), size, upload.data(), |progress| {
            info!(
                progress = progress.fraction(),
                "Processed {:.1} MB",
                progress.bytes_written as f64 / MIB
            );
        })?;
        info!(path = %staged.path().display(), "File ready");

        let extracted = File::open(staged.path())
            .map_err(DocumentError::from)
            .and_then(|file| extract(kind, BufReader::new(file)));

        let path = staged.path().to_path_buf();
        if let Err(e) = staged.close() {
            warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
        }
        extracted?
    } else {
        extract(kind, Cursor::new(upload.data()))?
    };

    let document = ExtractedDocument::from_raw(&raw);
    debug!(
        file = %upload.name(),
        kind = %kind,
        chars = document.len(),
        "Extracted document text"
    );
    Ok(document)
}
