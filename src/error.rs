use std::io;
use thiserror::Error;

/// Main error type for templater operations
#[derive(Error, Debug)]
pub enum TemplaterError {
    /// Invalid run configuration: bad input path, unusable output directory,
    /// unreadable or malformed key-file, malformed key token, bad glob
    #[error("{0}")]
    Config(String),

    /// IO error when reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// `WalkDir` error when traversing directories
    #[error("Directory traversal error: {0}")]
    WalkDir(#[from] walkdir::Error),

    /// Regex compilation error
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl TemplaterError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Whether this is a configuration error as opposed to a low-level failure
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, TemplaterError>;
