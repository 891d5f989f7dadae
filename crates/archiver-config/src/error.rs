//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving configuration overrides.
///
/// None of these abort resolution: every error is handled at the pass that
/// produced it, logged, and recorded in the
/// [`ResolutionReport`](crate::ResolutionReport). The resolver always
/// returns a usable [`Config`](crate::Config).
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Configuration file exists but could not be read.
    #[error("failed to read configuration file: {path}")]
    FileRead {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid JSON.
    #[error("failed to parse configuration file: {path}")]
    FileParse {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Merged configuration document no longer decodes into the record.
    #[error("configuration file does not match the config shape: {path}")]
    FileDecode {
        /// Path to the file.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// Environment variable or flag holds a malformed value for an
    /// object-typed key.
    #[error("malformed value for object-typed key {key}")]
    ValueMalformed {
        /// The schema key the value was meant for.
        key: String,
        /// Underlying error.
        #[source]
        source: serde_json::Error,
    },
}

impl ConfigError {
    /// Create a new file read error.
    pub fn file_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FileRead {
            path: path.into(),
            source,
        }
    }

    /// Create a new file parse error.
    pub fn file_parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::FileParse {
            path: path.into(),
            source,
        }
    }

    /// Create a new file decode error.
    pub fn file_decode(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::FileDecode {
            path: path.into(),
            source,
        }
    }

    /// Create a new malformed value error.
    pub fn value_malformed(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::ValueMalformed {
            key: key.into(),
            source,
        }
    }
}
