//! Table-extraction provider abstraction and implementations.

pub mod gemini;
pub mod json_file;

use std::path::PathBuf;
use std::time::Duration;

use finextract_io_xlsx::SpecExtractionResult;

use crate::AiError;
use crate::conf::{
    C_ENV_API_KEY, C_ENV_API_KEY_FALLBACK, C_ENV_BASE_URL, C_ENV_MODEL, C_ENV_TIMEOUT_SECS,
    C_GEMINI_BASE_URL, C_MODEL_DEFAULT, N_TIMEOUT_SECS_DEFAULT,
};
use crate::document::SpecPdfDocument;

/// Trait for table-extraction backends.
#[async_trait::async_trait]
pub trait TableExtractor: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    /// Extract every table from `document`, in document order.
    ///
    /// # Errors
    ///
    /// Returns [`AiError`] if the call fails or the answer cannot be parsed.
    /// A successful call may still return zero tables.
    async fn extract_tables(
        &self,
        document: &SpecPdfDocument,
    ) -> Result<SpecExtractionResult, AiError>;
}

/// Gemini connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecGeminiConfig {
    /// API key.
    pub api_key: String,
    /// Model name, e.g. `gemini-3-pro-preview`.
    pub model: String,
    /// REST API root.
    pub base_url: String,
    /// Whole-request timeout.
    pub timeout: Duration,
}

impl SpecGeminiConfig {
    /// Build settings from the environment.
    ///
    /// Reads `GEMINI_API_KEY` (falling back to `API_KEY`), `FINEXTRACT_MODEL`,
    /// `FINEXTRACT_BASE_URL` and `FINEXTRACT_TIMEOUT_SECS`. `model` overrides the
    /// environment when given.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Config`] if no API key is set or the timeout is not
    /// a positive integer.
    pub fn from_env(model: Option<String>) -> Result<Self, AiError> {
        Self::from_lookup(model, |key| std::env::var(key).ok())
    }

    /// Same as [`Self::from_env`] with an injectable variable lookup.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_lookup(
        model: Option<String>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AiError> {
        let lookup_non_empty = |key: &str| lookup(key).filter(|val| !val.trim().is_empty());

        let api_key = lookup_non_empty(C_ENV_API_KEY)
            .or_else(|| lookup_non_empty(C_ENV_API_KEY_FALLBACK))
            .ok_or_else(|| AiError::Config {
                message: format!(
                    "API Key is missing. Set {C_ENV_API_KEY} (or {C_ENV_API_KEY_FALLBACK})."
                ),
            })?;

        let model = model
            .filter(|val| !val.trim().is_empty())
            .or_else(|| lookup_non_empty(C_ENV_MODEL))
            .unwrap_or_else(|| C_MODEL_DEFAULT.to_string());

        let base_url =
            lookup_non_empty(C_ENV_BASE_URL).unwrap_or_else(|| C_GEMINI_BASE_URL.to_string());

        let n_timeout_secs = match lookup_non_empty(C_ENV_TIMEOUT_SECS) {
            Some(val) => val
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| AiError::Config {
                    message: format!("{C_ENV_TIMEOUT_SECS} must be a positive integer, got {val:?}"),
                })?,
            None => N_TIMEOUT_SECS_DEFAULT,
        };

        Ok(Self {
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(n_timeout_secs),
        })
    }
}

/// Which backend to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecExtractorConfig {
    /// Call the Gemini API.
    Gemini(SpecGeminiConfig),
    /// Replay a saved extraction JSON file.
    JsonFile {
        /// Path to a `{"tables": [...]}` (or bare `[...]`) file.
        path: PathBuf,
    },
}

/// Creates the configured extractor.
///
/// # Errors
///
/// Returns [`AiError::Http`] if the HTTP client cannot be built.
pub fn create_extractor_from_config(
    config: &SpecExtractorConfig,
) -> Result<Box<dyn TableExtractor>, AiError> {
    match config {
        SpecExtractorConfig::Gemini(cfg) => {
            log::info!("Using Gemini extractor (model {})", cfg.model);
            Ok(Box::new(gemini::GeminiProvider::from_config(cfg)?))
        }
        SpecExtractorConfig::JsonFile { path } => {
            log::info!("Using saved extraction from {}", path.display());
            Ok(Box::new(json_file::JsonFileProvider::new(path.clone())))
        }
    }
}
