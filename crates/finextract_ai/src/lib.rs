//! PDF document loading and AI table extraction.
//!
//! The extraction step is an opaque request/response call: the raw PDF bytes,
//! their mime type and a JSON schema descriptor go in, and an ordered list of
//! [`finextract_io_xlsx::SpecTableRecord`] (or an [`AiError`]) comes out.
//! Providers live behind the [`providers::TableExtractor`] trait so the
//! pipeline can swap the Gemini backend for a saved extraction file.

pub mod conf;
pub mod document;
pub mod providers;
pub mod schema;

use std::path::PathBuf;

use thiserror::Error;

pub use document::SpecPdfDocument;
pub use providers::{
    SpecExtractorConfig, TableExtractor, create_extractor_from_config, gemini::GeminiProvider,
    json_file::JsonFileProvider,
};

/// Errors that can occur while loading documents or extracting tables.
#[derive(Debug, Error)]
pub enum AiError {
    /// HTTP request to the extraction service failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Reading a local file failed.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// The input document was rejected before any extraction call.
    #[error("{message}")]
    InvalidInput {
        /// User-facing reason.
        message: String,
    },

    /// The service answered with an error or refused the request.
    #[error("Provider error: {message}")]
    Provider {
        /// Description of what went wrong.
        message: String,
    },

    /// The service answered without any content.
    #[error("No data returned from the extraction service.")]
    EmptyResponse,

    /// Configuration error (missing credentials, unknown provider).
    #[error("Configuration error: {message}")]
    Config {
        /// Description.
        message: String,
    },
}
