//! Extraction constants and environment variable names.

/// Only accepted input mime type.
pub const C_MIME_PDF: &str = "application/pdf";
/// Leading bytes of every PDF file.
pub const V_MAGIC_PDF: &[u8] = b"%PDF-";
/// Largest accepted input document (20 MiB).
pub const N_BYTES_PDF_MAX: usize = 20 * 1024 * 1024;

/// Default Gemini model.
pub const C_MODEL_DEFAULT: &str = "gemini-3-pro-preview";
/// Gemini REST API root.
pub const C_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Default request timeout in seconds. Extraction of long reports is slow.
pub const N_TIMEOUT_SECS_DEFAULT: u64 = 300;

/// Primary credential variable.
pub const C_ENV_API_KEY: &str = "GEMINI_API_KEY";
/// Fallback credential variable.
pub const C_ENV_API_KEY_FALLBACK: &str = "API_KEY";
/// Model override variable.
pub const C_ENV_MODEL: &str = "FINEXTRACT_MODEL";
/// Timeout override variable (seconds).
pub const C_ENV_TIMEOUT_SECS: &str = "FINEXTRACT_TIMEOUT_SECS";
/// API root override variable (self-hosted proxies).
pub const C_ENV_BASE_URL: &str = "FINEXTRACT_BASE_URL";
