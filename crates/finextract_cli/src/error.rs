//! CLI error type and user-facing messages.

use std::path::PathBuf;

use finextract_ai::AiError;
use finextract_io_xlsx::XlsxWriteError;
use thiserror::Error;

use crate::status::StatusError;

/// Shown when extraction fails for any reason other than bad input.
pub const C_MSG_EXTRACTION_FAILED: &str =
    "Failed to process the document. Please ensure it is a valid PDF report.";
/// Shown when extraction succeeds with zero tables.
pub const C_MSG_NO_TABLES: &str = "No tables were found in this document.";

/// Errors that can stop a run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Loading or extraction failed.
    #[error(transparent)]
    Ai(#[from] AiError),

    /// Workbook could not be written.
    #[error(transparent)]
    Xlsx(#[from] XlsxWriteError),

    /// Pipeline steps were driven out of order.
    #[error(transparent)]
    Status(#[from] StatusError),

    /// Extraction returned an empty table list.
    #[error("No tables were found in this document.")]
    NoTables,

    /// Extraction dump could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Extraction dump could not be written.
    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        /// Destination.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
}

/// Message shown to the user for `err`.
///
/// Input and configuration problems are reported as-is; service and parsing
/// failures collapse into one generic extraction message.
pub fn derive_user_message(err: &CliError) -> String {
    match err {
        CliError::Ai(AiError::InvalidInput { message }) => message.clone(),
        CliError::Ai(err @ (AiError::Config { .. } | AiError::Io { .. })) => err.to_string(),
        CliError::Ai(_) => C_MSG_EXTRACTION_FAILED.to_string(),
        CliError::NoTables => C_MSG_NO_TABLES.to_string(),
        CliError::Xlsx(err) => format!("Failed to generate the Excel file: {err}"),
        CliError::Status(_) | CliError::Json(_) | CliError::Io { .. } => err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages() {
        let err = CliError::from(AiError::InvalidInput {
            message: "Please upload a valid PDF file.".to_string(),
        });
        assert_eq!(derive_user_message(&err), "Please upload a valid PDF file.");

        let err = CliError::from(AiError::EmptyResponse);
        assert_eq!(derive_user_message(&err), C_MSG_EXTRACTION_FAILED);

        let err = CliError::from(AiError::Provider {
            message: "HTTP 500".to_string(),
        });
        assert_eq!(derive_user_message(&err), C_MSG_EXTRACTION_FAILED);

        let err = CliError::from(AiError::Config {
            message: "API Key is missing.".to_string(),
        });
        assert_eq!(
            derive_user_message(&err),
            "Configuration error: API Key is missing."
        );

        assert_eq!(derive_user_message(&CliError::NoTables), C_MSG_NO_TABLES);
        assert!(
            derive_user_message(&CliError::from(XlsxWriteError::Closed))
                .starts_with("Failed to generate the Excel file")
        );
    }
}
