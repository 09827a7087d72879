/*!
 * Error types for the srtmerge application.
 *
 * This module contains custom error types for different parts of the application,
 * using the thiserror crate for ergonomic error definitions.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a merge run
#[derive(Error, Debug)]
pub enum MergeError {
    /// A subtitle file could not be read or the output could not be written
    #[error("I/O error on {path:?}: {source}")]
    Io {
        /// File that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Encoding label not known to the encoder or decoder tables
    #[error("Unknown encoding label: {0}")]
    UnknownEncoding(String),

    /// Source bytes are invalid for the declared encoding
    #[error("Failed to decode {path:?} as {encoding}")]
    Decode {
        /// Source file
        path: PathBuf,
        /// Encoding label used for decoding
        encoding: String,
    },

    /// Input is not a SubRip file
    #[error("Unsupported subtitle file (only .srt is supported): {0:?}")]
    UnsupportedExtension(PathBuf),

    /// No cue was emitted, so there is nothing to write
    #[error("Nothing to merge: no cues were found in any source")]
    EmptyMerge,
}

/// Errors raised while validating configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Output encoding label is not supported
    #[error("Unsupported output encoding: {0}")]
    OutputEncoding(String),

    /// Color is neither a known name nor a #RRGGBB value
    #[error("Invalid color value: {0}")]
    InvalidColor(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from the merge engine
    #[error("Merge error: {0}")]
    Merge(#[from] MergeError),

    /// Error in the configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
