//! Error types for the project boundary
//!
//! - Parse operations (text → [`Document`](jpm_tree::Document))
//! - Load and write operations (file system ↔ [`SourceFile`](jpm_tree::SourceFile))

use std::path::PathBuf;

/// Errors while turning file content into a document
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// No parser registered for file extension
    #[error("no parser registered for extension: '{0}'")]
    NoParserForExtension(String),

    /// Syntax error in source file
    #[error("syntax error in {path} at byte {offset}: {message}")]
    Syntax {
        /// Offending file
        path: PathBuf,
        /// Byte offset of the error
        offset: u64,
        /// Parser message
        message: String,
    },

    /// Document has no root element
    #[error("{0} has no root element")]
    MissingRoot(PathBuf),

    /// Grammar could not be loaded into the parser
    #[error("grammar error: {0}")]
    Grammar(String),
}

impl ParseError {
    /// Create syntax error for path
    pub fn syntax(path: impl Into<PathBuf>, offset: u64, message: impl Into<String>) -> Self {
        Self::Syntax {
            path: path.into(),
            offset,
            message: message.into(),
        }
    }
}

/// Errors while reading a project or writing it back
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    /// IO error on a specific file
    #[error("io error on {path}: {source}")]
    Io {
        /// File or directory being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit
    #[error("file too large: {path} is {size} bytes (max: {max})")]
    FileTooLarge {
        /// Offending file
        path: PathBuf,
        /// Actual size
        size: u64,
        /// Configured limit
        max: u64,
    },

    /// Path escapes the project root
    #[error("path is outside the project root: {0}")]
    OutsideRoot(PathBuf),

    /// Content could not be parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Blocking parse task did not complete
    #[error("parse task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl LoadError {
    /// Create IO error for path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for loader operations
pub type LoadResult<T> = Result<T, LoadError>;
