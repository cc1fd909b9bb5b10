//! Saved-extraction provider: replays a JSON file instead of calling a service.

use std::path::PathBuf;

use finextract_io_xlsx::{SpecExtractionResult, SpecTableRecord};
use serde::Deserialize;

use super::TableExtractor;
use crate::AiError;
use crate::document::SpecPdfDocument;

/// Reads tables from a file previously written with `--save-json`.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    /// Creates a provider reading `path` on every call.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

/// Accepted file shapes.
#[derive(Deserialize)]
#[serde(untagged)]
enum SavedExtraction {
    Result(SpecExtractionResult),
    Tables(Vec<SpecTableRecord>),
}

/// Parse `{"tables": [...]}` or a bare `[...]` list of tables.
///
/// # Errors
///
/// Returns [`AiError::Json`] for any other shape.
pub fn parse_saved_extraction(txt: &str) -> Result<SpecExtractionResult, AiError> {
    let value: serde_json::Value = serde_json::from_str(txt)?;
    let saved: SavedExtraction = serde_json::from_value(value)?;
    Ok(match saved {
        SavedExtraction::Result(result) => result,
        SavedExtraction::Tables(tables) => SpecExtractionResult {
            tables,
            report_title: None,
        },
    })
}

#[async_trait::async_trait]
impl TableExtractor for JsonFileProvider {
    fn name(&self) -> &'static str {
        "json-file"
    }

    async fn extract_tables(
        &self,
        _document: &SpecPdfDocument,
    ) -> Result<SpecExtractionResult, AiError> {
        let txt = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| AiError::Io {
                path: self.path.clone(),
                source,
            })?;
        parse_saved_extraction(&txt)
    }
}
