//! Gemini text client
//!
//! Calls the Gemini REST API (`models/{model}:generateContent`) directly.

use std::time::Duration;

use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use contracts::{BannerConfig, ContractError, ResponseFormat, TextGenerator, TextRequest};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::error::{ClientError, Result};
use crate::http::{self, RequestAuth};

const SERVICE: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Text generation over the Gemini HTTP API
#[derive(Clone)]
pub struct GeminiTextClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiTextClient {
    /// Create a client for `model` with the given API key
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        Ok(Self {
            client: http::build_client(SERVICE, timeout)?,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Create a client from the loaded configuration
    pub fn from_config(config: &BannerConfig) -> Result<Self> {
        let client = Self::new(
            config.credentials.gemini_api_key.clone(),
            config.models.text.clone(),
            Duration::from_secs(config.http.timeout_secs),
        )?;
        Ok(match &config.models.gemini_endpoint {
            Some(endpoint) => client.with_base_url(endpoint.clone()),
            None => client,
        })
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl TextGenerator for GeminiTextClient {
    fn name(&self) -> &str {
        SERVICE
    }

    #[instrument(
        name = "gemini_generate",
        skip(self, request),
        fields(model = %self.model, images = request.images.len(), format = ?request.format)
    )]
    async fn generate(&self, request: TextRequest) -> std::result::Result<String, ContractError> {
        let body = build_request_body(&request);
        let auth = RequestAuth::ApiKey(&self.api_key);
        let response: GenerateContentResponse =
            http::post_json(&self.client, SERVICE, &self.endpoint(), auth, &body).await?;
        let text = extract_text(response)?;
        debug!(chars = text.len(), "gemini reply received");
        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerateContentRequest {
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_mime_type: String,
}

/// Prompt first, then one inline part per image
pub(crate) fn build_request_body(request: &TextRequest) -> GenerateContentRequest {
    let mut parts = Vec::with_capacity(1 + request.images.len());
    parts.push(Part::Text {
        text: request.prompt.clone(),
    });
    for image in &request.images {
        parts.push(Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: image.mime_type.clone(),
                data: BASE64_STANDARD.encode(&image.bytes),
            },
        });
    }

    let generation_config = match request.format {
        ResponseFormat::Json => Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
        }),
        ResponseFormat::Text => None,
    };

    GenerateContentRequest {
        contents: vec![Content {
            role: "user".to_string(),
            parts,
        }],
        generation_config,
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Debug, Deserialize)]
struct ContentResponse {
    #[serde(default)]
    parts: Vec<PartResponse>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

/// Concatenate the text parts of the first candidate
pub(crate) fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let text: String = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(ClientError::empty(SERVICE));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::ImageData;

    #[test]
    fn test_body_text_only() {
        let body = build_request_body(&TextRequest::text("hello"));
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert!(json.get("generationConfig").is_none());
    }

    #[test]
    fn test_body_json_mode_and_images() {
        let request = TextRequest::json("describe")
            .with_images(vec![ImageData::jpeg(vec![0xFFu8, 0xD8, 0xFF])]);
        let json = serde_json::to_value(build_request_body(&request)).unwrap();

        let parts = json["contents"][0]["parts"].as_array().unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1]["inlineData"]["mimeType"], "image/jpeg");
        assert_eq!(parts[1]["inlineData"]["data"], "/9j/");
        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
    }

    #[test]
    fn test_extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [{"text": "Hello "}, {"text": "world"}]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_text(response).unwrap(), "Hello world");
    }

    #[test]
    fn test_extract_text_blocked_prompt() {
        let response: GenerateContentResponse =
            serde_json::from_str(r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#).unwrap();
        assert!(matches!(
            extract_text(response),
            Err(ClientError::Empty { .. })
        ));
    }

    #[test]
    fn test_endpoint_keeps_key_out_of_url() {
        let client = GeminiTextClient::new("KEY", "gemini-1.5-flash", Duration::from_secs(5))
            .unwrap()
            .with_base_url("http://localhost:8080/");
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/models/gemini-1.5-flash:generateContent"
        );
    }

    #[tokio::test]
    async fn test_transport_error_hides_api_key() {
        let client =
            GeminiTextClient::new("SECRET-KEY-123", "gemini-1.5-flash", Duration::from_secs(5))
                .unwrap()
                .with_base_url("http://127.0.0.1:1");

        let err = client.generate(TextRequest::text("hello")).await.unwrap_err();

        let message = err.to_string();
        assert!(message.contains("gemini"), "unexpected error: {message}");
        assert!(!message.contains("SECRET-KEY-123"));
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }
}
