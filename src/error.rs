// src/error.rs

//! Error types for depchase
//!
//! Local, recoverable conditions (a cache miss, a requirement with no
//! provider) are logged and never reach this type. Everything here aborts
//! the current run.

use thiserror::Error;

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading repositories or resolving closures
#[derive(Error, Debug)]
pub enum Error {
    /// A named lookup matched no package
    #[error("No such package: {0}")]
    NoSuchPackage(String),

    /// A direct name lookup matched more than one package
    #[error("Too many packages match {name}: {}", candidates.join(", "))]
    AmbiguousPackage {
        name: String,
        candidates: Vec<String>,
    },

    /// Repository metadata or an extension block could not be retrieved
    #[error("Failed to fetch {url}: {reason}")]
    FetchFailure { url: String, reason: String },

    /// A cache file did not match its expected cookie or could not be decoded
    #[error("Corrupt cache file {path}: {reason}")]
    CorruptCache { path: String, reason: String },

    /// Downloaded metadata did not match the checksum advertised by repomd.xml
    #[error("Checksum mismatch for {file}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    /// The self-hosting fixed point stopped making progress
    #[error("Solver could not make progress:\n{}", problems.join("\n"))]
    SolverContradiction { problems: Vec<String> },

    /// Repository metadata could not be parsed
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Invalid repository or resolver configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Underlying I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn fetch(url: impl Into<String>, reason: impl ToString) -> Self {
        Error::FetchFailure {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
