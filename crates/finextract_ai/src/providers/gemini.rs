//! Google Gemini provider implementation.

use base64::Engine;
use finextract_io_xlsx::SpecExtractionResult;
use serde::{Deserialize, Serialize};

use super::{SpecGeminiConfig, TableExtractor};
use crate::AiError;
use crate::conf::C_GEMINI_BASE_URL;
use crate::document::SpecPdfDocument;
use crate::schema::{C_EXTRACTION_PROMPT, derive_response_schema};

/// Gemini `generateContent` provider.
pub struct GeminiProvider {
    api_key: String,
    model: String,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiProvider {
    /// Creates a provider with the default API root and no timeout.
    #[must_use]
    pub fn new(api_key: String, model: String) -> Self {
        Self {
            api_key,
            model,
            base_url: C_GEMINI_BASE_URL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Creates a provider from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`AiError::Http`] if the HTTP client cannot be built.
    pub fn from_config(cfg: &SpecGeminiConfig) -> Result<Self, AiError> {
        let client = reqwest::Client::builder().timeout(cfg.timeout).build()?;
        Ok(Self {
            api_key: cfg.api_key.clone(),
            model: cfg.model.clone(),
            base_url: cfg.base_url.clone(),
            client,
        })
    }

    /// Full `generateContent` URL for the configured model.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

/// Gemini API request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiRequest {
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiBlob>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiBlob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

/// Gemini API response body.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    prompt_feedback: Option<GeminiPromptFeedback>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiResponseContent>,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Deserialize)]
struct GeminiResponsePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPromptFeedback {
    block_reason: Option<String>,
}

/// Gemini API error response.
#[derive(Deserialize)]
struct GeminiError {
    error: GeminiErrorDetail,
}

#[derive(Deserialize)]
struct GeminiErrorDetail {
    message: String,
}

/// Build the request body: inline base64 document, instruction, JSON schema.
pub fn derive_generate_content_request(document: &SpecPdfDocument) -> GeminiRequest {
    let data = base64::engine::general_purpose::STANDARD.encode(&document.bytes);
    GeminiRequest {
        contents: vec![GeminiContent {
            parts: vec![
                GeminiPart {
                    inline_data: Some(GeminiBlob {
                        mime_type: document.mime_type.clone(),
                        data,
                    }),
                    text: None,
                },
                GeminiPart {
                    inline_data: None,
                    text: Some(C_EXTRACTION_PROMPT.to_string()),
                },
            ],
        }],
        generation_config: GeminiGenerationConfig {
            response_mime_type: "application/json",
            response_schema: derive_response_schema(),
        },
    }
}

/// Parse a successful `generateContent` body into extracted tables.
///
/// # Errors
///
/// [`AiError::Provider`] when the prompt was blocked, [`AiError::EmptyResponse`]
/// when no text came back, [`AiError::Json`] when the text is not the
/// expected JSON shape.
pub fn parse_generate_content_response(body: &str) -> Result<SpecExtractionResult, AiError> {
    let response: GeminiResponse = serde_json::from_str(body)?;

    let c_text: String = response
        .candidates
        .first()
        .and_then(|candidate| candidate.content.as_ref())
        .map(|content| {
            content
                .parts
                .iter()
                .filter_map(|part| part.text.as_deref())
                .collect()
        })
        .unwrap_or_default();

    if c_text.trim().is_empty() {
        if let Some(reason) = response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
        {
            return Err(AiError::Provider {
                message: format!("Request blocked: {reason}"),
            });
        }
        if let Some(reason) = response
            .candidates
            .first()
            .and_then(|candidate| candidate.finish_reason.as_deref())
        {
            log::warn!("Gemini returned no text (finish reason {reason})");
        }
        return Err(AiError::EmptyResponse);
    }

    Ok(serde_json::from_str(&c_text)?)
}

#[async_trait::async_trait]
impl TableExtractor for GeminiProvider {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn extract_tables(
        &self,
        document: &SpecPdfDocument,
    ) -> Result<SpecExtractionResult, AiError> {
        let request = derive_generate_content_request(document);

        log::debug!(
            "POST {} ({} document bytes)",
            self.endpoint(),
            document.len()
        );
        let resp = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let err: GeminiError = serde_json::from_str(&body).unwrap_or_else(|_| GeminiError {
                error: GeminiErrorDetail {
                    message: format!("HTTP {status}: {body}"),
                },
            });
            return Err(AiError::Provider {
                message: err.error.message,
            });
        }

        let result = parse_generate_content_response(&body)?;
        log::info!("Gemini returned {} table(s)", result.tables.len());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_carries_inline_pdf_prompt_and_schema() {
        let document =
            SpecPdfDocument::from_bytes(Some("q.pdf".to_string()), b"%PDF-1.4".to_vec())
                .expect("document");
        let body = serde_json::to_value(derive_generate_content_request(&document))
            .expect("serialize request");

        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["inlineData"]["mimeType"], json!("application/pdf"));
        assert_eq!(parts[0]["inlineData"]["data"], json!("JVBERi0xLjQ="));
        assert!(parts[0].get("text").is_none());
        assert!(
            parts[1]["text"]
                .as_str()
                .is_some_and(|txt| txt.contains("expert financial analyst"))
        );
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            json!("application/json")
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"],
            derive_response_schema()
        );
    }

    #[test]
    fn test_endpoint_joins_base_url_and_model() {
        let mut provider = GeminiProvider::new("k".to_string(), "gemini-x".to_string());
        provider.base_url = "http://localhost:8080/v1beta/".to_string();
        assert_eq!(
            provider.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-x:generateContent"
        );
    }

    #[test]
    fn test_parse_response_joins_text_parts() {
        let body = json!({
            "candidates": [{
                "content": {"parts": [
                    {"text": "{\"tables\": [{\"sheetName\": \"Debt\", "},
                    {"text": "\"rows\": [[\"Term loan\", \"1,200\"]]}]}"}
                ]},
                "finishReason": "STOP"
            }]
        })
        .to_string();

        let result = parse_generate_content_response(&body).expect("parse");
        assert_eq!(result.tables.len(), 1);
        assert_eq!(result.tables[0].sheet_name.as_deref(), Some("Debt"));
        assert_eq!(result.tables[0].rows[0].len(), 2);
    }

    #[test]
    fn test_parse_response_reports_empty_and_blocked() {
        let body = json!({"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]})
            .to_string();
        assert!(matches!(
            parse_generate_content_response(&body),
            Err(AiError::EmptyResponse)
        ));

        let body = json!({"promptFeedback": {"blockReason": "SAFETY"}}).to_string();
        let err = parse_generate_content_response(&body).expect_err("blocked");
        assert_eq!(err.to_string(), "Provider error: Request blocked: SAFETY");
    }

    #[test]
    fn test_parse_response_rejects_non_json_text() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "Sorry, no."}]}}]})
            .to_string();
        assert!(matches!(
            parse_generate_content_response(&body),
            Err(AiError::Json(_))
        ));
    }
}
