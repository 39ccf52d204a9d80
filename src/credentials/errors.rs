use std::path::PathBuf;

use thiserror::Error;

/// Outcome of credential resolution when no usable credentials were found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CredentialError {
    #[error("credentials are not configured")]
    NotConfigured,

    #[error("invalid credentials: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

impl CredentialError {
    /// Human-readable validation messages, empty when nothing was supplied.
    pub fn messages(&self) -> &[String] {
        match self {
            CredentialError::NotConfigured => &[],
            CredentialError::Invalid(messages) => messages,
        }
    }
}

/// Settings store I/O errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no config directory available for settings")]
    NoConfigDir,

    #[error("failed to read settings at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write settings at {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to encode settings: {0}")]
    Encode(#[from] serde_json::Error),
}
