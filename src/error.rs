// this_file: src/error.rs
//! Error types for the glyphmask library

use thiserror::Error;

/// Main error type for glyphmask operations
#[derive(Debug, Error)]
pub enum Error {
    /// Font file loading or parsing error
    #[error("Font error: {0}")]
    Font(String),

    /// JSON parsing or validation error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO operation error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Unparsable color specification
    #[error("Color error: {0}")]
    Color(String),

    /// Missing or inconsistent companion option
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rendering error
    #[error("Rendering error: {0}")]
    Rendering(String),

    /// Invalid input parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),
}

/// Result type alias for glyphmask operations
pub type Result<T> = std::result::Result<T, Error>;
