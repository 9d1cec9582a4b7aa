//! Error types for the route worker.
//!
//! Uses `thiserror` for typed errors that surface through the whole worker
//! lifecycle: broker connectivity, page rendering, and frame transport.

use std::path::PathBuf;

/// Errors that can occur while rendering a page.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// A template file does not exist.
    #[error("template not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// A template file exists but could not be read.
    #[error("failed to read template {}: {source}", path.display())]
    Io {
        /// Path that was read.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// Template markup is malformed.
    #[error("syntax error in template {}: {source}", path.display())]
    Syntax {
        /// Offending template.
        path: PathBuf,
        /// Parser diagnostics.
        source: minijinja::Error,
    },

    /// Template evaluation failed.
    #[error("failed to render template {}: {source}", path.display())]
    Render {
        /// Offending template.
        path: PathBuf,
        /// Evaluation diagnostics.
        source: minijinja::Error,
    },
}

/// Errors that can occur during route worker operation.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Failed to reach the broker or configure the socket.
    #[error("connection error: {0}")]
    Connection(String),

    /// Failed to render the page for a request.
    #[error(transparent)]
    Render(#[from] RenderError),

    /// Failed to send or receive frames.
    #[error("transport error: {0}")]
    Transport(String),

    /// Configuration is invalid or missing.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization failure while encoding a response.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
