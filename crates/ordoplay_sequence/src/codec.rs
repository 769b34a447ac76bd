// SPDX-License-Identifier: MIT OR Apache-2.0
//! Show persistence.
//!
//! A show is one [`Sequence`] wrapped in a versioned [`ShowDocument`]. The
//! player only talks to the [`SequenceCodec`] trait; [`FileCodec`] is the
//! default implementation, storing one file per show name.

use crate::sequence::{Sequence, StructureError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Current show format version
pub const SHOW_FORMAT_VERSION: u32 = 1;

/// Persistence errors
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// File could not be read or written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// RON parse failure
    #[error("RON parse error: {0}")]
    RonParse(#[from] ron::error::SpannedError),

    /// RON serialize failure
    #[error("RON error: {0}")]
    Ron(#[from] ron::Error),

    /// JSON failure
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Binary encoding failure
    #[error("Binary error: {0}")]
    Binary(#[from] bincode::Error),

    /// Show written by a newer version
    #[error("Show version {found} is newer than supported version {supported}")]
    Version {
        /// Version in the file
        found: u32,
        /// Newest supported version
        supported: u32,
    },

    /// Show decoded but violates a structural invariant
    #[error("Invalid show: {0}")]
    Structure(#[from] StructureError),

    /// Show name cannot be used as a file name
    #[error("Invalid show name '{0}'")]
    InvalidName(String),
}

/// Result type for show encoding and decoding
pub type Result<T> = std::result::Result<T, CodecError>;

/// Encoding of show files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ShowFormat {
    /// Human-readable RON
    #[default]
    Ron,
    /// JSON
    Json,
    /// Compact binary
    Binary,
}

impl ShowFormat {
    /// File extension for this format
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Ron => "ron",
            Self::Json => "json",
            Self::Binary => "show",
        }
    }
}

/// On-disk show layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShowDocument {
    /// Show format version
    pub version: u32,
    /// The stored sequence
    pub sequence: Sequence,
}

/// Reads and writes sequences by show name
pub trait SequenceCodec: Send + Sync {
    /// Read a show
    fn read(&self, name: &str) -> Result<Sequence>;

    /// Write a show
    fn write(&self, name: &str, sequence: &Sequence) -> Result<()>;
}

/// Stores each show as `<directory>/<name>.<ext>`
#[derive(Debug, Clone)]
pub struct FileCodec {
    directory: PathBuf,
    format: ShowFormat,
}

impl FileCodec {
    /// Create a codec over `directory`
    pub fn new(directory: impl Into<PathBuf>, format: ShowFormat) -> Self {
        Self {
            directory: directory.into(),
            format,
        }
    }

    /// Directory holding the shows
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path of the file for `name`
    pub fn path_for(&self, name: &str) -> Result<PathBuf> {
        let usable = !name.is_empty()
            && !name.contains(['/', '\\'])
            && name != "."
            && name != "..";
        if !usable {
            return Err(CodecError::InvalidName(name.to_string()));
        }
        Ok(self
            .directory
            .join(format!("{name}.{}", self.format.extension())))
    }

    fn decode(&self, bytes: &[u8]) -> Result<ShowDocument> {
        Ok(match self.format {
            ShowFormat::Ron => ron::de::from_bytes(bytes)?,
            ShowFormat::Json => serde_json::from_slice(bytes)?,
            ShowFormat::Binary => bincode::deserialize(bytes)?,
        })
    }

    fn encode(&self, document: &ShowDocument) -> Result<Vec<u8>> {
        Ok(match self.format {
            ShowFormat::Ron => {
                let config = ron::ser::PrettyConfig::default().struct_names(true);
                ron::ser::to_string_pretty(document, config)?.into_bytes()
            }
            ShowFormat::Json => serde_json::to_vec_pretty(document)?,
            ShowFormat::Binary => bincode::serialize(document)?,
        })
    }
}

impl SequenceCodec for FileCodec {
    fn read(&self, name: &str) -> Result<Sequence> {
        let path = self.path_for(name)?;
        let bytes = std::fs::read(&path)?;
        let document = self.decode(&bytes)?;

        if document.version > SHOW_FORMAT_VERSION {
            return Err(CodecError::Version {
                found: document.version,
                supported: SHOW_FORMAT_VERSION,
            });
        }
        document.sequence.validate()?;
        tracing::debug!("Read show '{}' from {}", name, path.display());
        Ok(document.sequence)
    }

    fn write(&self, name: &str, sequence: &Sequence) -> Result<()> {
        let path = self.path_for(name)?;
        let document = ShowDocument {
            version: SHOW_FORMAT_VERSION,
            sequence: sequence.clone(),
        };
        let bytes = self.encode(&document)?;
        std::fs::create_dir_all(&self.directory)?;
        std::fs::write(&path, bytes)?;
        tracing::debug!("Wrote show '{}' to {}", name, path.display());
        Ok(())
    }
}
