//! Error types for the publisher binary and diagnostics

use link::config::ConfigError;
use link::layout::LayoutError;
use link_shared_memory::LinkError;
use thiserror::Error;

/// Errors surfaced by the publisher outside the tick path
#[derive(Error, Debug)]
pub enum PublisherError {
    /// Channel setup failed
    #[error("Link channel error: {0}")]
    Link(#[from] LinkError),

    /// Configuration could not be loaded or validated
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Record could not be decoded
    #[error("Record layout error: {0}")]
    Layout(#[from] LayoutError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Signal handler could not be installed
    #[error("Signal handler error: {0}")]
    Signal(#[from] ctrlc::Error),
}

/// Result type for publisher operations
pub type PublisherResult<T> = Result<T, PublisherError>;
