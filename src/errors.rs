/*!
 * Error types for the lyricblocks crate.
 *
 * This module contains custom error types for the transcript loader and the
 * lyric fetcher, using the thiserror crate for ergonomic error definitions.
 * The segmenter has no error type: every cursor resolves to a piece.
 */

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading a transcript
#[derive(Error, Debug)]
pub enum TranscriptError {
    /// The transcript file could not be opened or decoded
    #[error("Failed to read transcript {path:?}: {message}")]
    Unreadable {
        /// Path that was requested
        path: PathBuf,
        /// Underlying I/O message
        message: String,
    },
}

/// Errors that can occur when invoking the external lyric search tool
#[derive(Error, Debug)]
pub enum FetchError {
    /// The configured executable does not exist
    #[error("Lyric search executable not found: {0:?}")]
    AppNotFound(PathBuf),

    /// The output directory could not be created
    #[error("Failed to prepare output directory: {0}")]
    OutputDir(String),

    /// The process could not be started
    #[error("Failed to start lyric search: {0}")]
    Spawn(String),

    /// The process did not finish in time
    #[error("Lyric search timed out after {0} seconds")]
    Timeout(u64),

    /// The process finished but never produced a usable file
    #[error("No lyric file produced at {0:?}")]
    NoOutput(PathBuf),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from transcript loading
    #[error("Transcript error: {0}")]
    Transcript(#[from] TranscriptError),

    /// Error from the lyric fetcher
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

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
