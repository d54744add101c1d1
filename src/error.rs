//! The errors that can occur.

use std::path::PathBuf;
use thiserror::Error;

/// A type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;

/// Application-level errors: everything that happens outside of a running batch.
#[derive(Debug, Error)]
pub enum Error {
    /// An error occurred while interacting with the file system.
    #[error("An IO error occurred: {0}")]
    IO(#[from] std::io::Error),
    /// The config file exists but could not be parsed.
    #[error("Malformed config file {path:?}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    /// An input file could not be imported.
    #[error("Failed to read file {path:?}: {source}")]
    Import {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// A batch could not be started.
    #[error(transparent)]
    Start(#[from] crate::batch::StartError),
    /// An error occurred while waiting for the worker.
    #[error("An error occurred while running the runtime: {0}")]
    Runtime(#[from] tokio::task::JoinError),
}

/// Why a single item could not be processed.
///
/// These never escape the batch loop: they are collected into the summary and logged.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Search failed: {0}")]
    Search(String),
    #[error("No search results for \"{0}\"")]
    NoSearchResults(String),
    #[error("Not a recognized video URL: {0}")]
    InvalidUrl(String),
    #[error("Failed to fetch video info: {0}")]
    Metadata(String),
    #[error("No audio stream found for {0}")]
    NoAudioStream(String),
    #[error("Download failed: {0}")]
    Download(String),
    /// The encoder ran but exited with a non-zero status.
    #[error("Encoder failed with code {code}: {stderr}")]
    Encode { code: i32, stderr: String },
    #[error("An IO error occurred: {0}")]
    Io(#[from] std::io::Error),
    #[error("Unexpected failure: {0}")]
    Panicked(String),
}

impl From<reqwest::Error> for ItemError {
    fn from(e: reqwest::Error) -> Self {
        ItemError::Download(e.to_string())
    }
}
