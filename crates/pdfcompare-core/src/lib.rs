use std::io::{Read, Seek, SeekFrom};
use std::time::Duration;

use bytes::Bytes;

pub mod backend;
pub mod config_file;
pub mod envelope;
pub mod mock;
pub mod pages;
pub mod remote;

// Re-export for convenience
pub use backend::{ExtractionBackend, ExtractionError};
pub use config_file::{ConfigError, ConfigFile, RemoteSettings};
pub use envelope::{RemoteEnvelope, parse_envelope};
pub use pages::assemble_pages;
pub use remote::{PDF_PIG_PATH, PY_MU_PDF_PATH, RemoteBackend};

/// An uploaded document handed to a backend for a single extraction call.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    pub file_name: String,
    pub data: Bytes,
}

impl ExtractionRequest {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            data: data.into(),
        }
    }

    /// Read a seekable source from its start, regardless of where it is
    /// currently positioned.
    pub fn from_reader<R: Read + Seek>(
        file_name: impl Into<String>,
        mut reader: R,
    ) -> std::io::Result<Self> {
        reader.seek(SeekFrom::Start(0))?;
        Self::from_stream(file_name, reader)
    }

    /// Read a forward-only source from its current position.
    pub fn from_stream<R: Read>(
        file_name: impl Into<String>,
        mut reader: R,
    ) -> std::io::Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Ok(Self::new(file_name, data))
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Text extracted from a document. `text` is never blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub text: String,
    /// Wall-clock time of the backend round trip, when the backend measures it.
    pub elapsed: Option<Duration>,
}

impl ExtractionResult {
    pub fn new(text: String) -> Self {
        Self {
            text,
            elapsed: None,
        }
    }

    pub fn with_elapsed(mut self, elapsed: Duration) -> Self {
        self.elapsed = Some(elapsed);
        self
    }
}
