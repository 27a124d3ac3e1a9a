//! Google Generative Language API client.

use crate::story::{GenerationRequest, StoryError, TextGenerator};
use serde::{Deserialize, Serialize};
use std::future::Future;

pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

pub const DEFAULT_API_KEY_VAR: &str = "API_KEY";

const USER_AGENT: &str = "folklore-map";

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig<'a> {
    response_mime_type: &'a str,
    response_schema: &'a serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

impl<'a> GenerateContentRequest<'a> {
    fn from_request(request: &'a GenerationRequest) -> Self {
        Self {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: &request.system_instruction,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part {
                    text: &request.prompt,
                }],
            }],
            generation_config: GenerationConfig {
                response_mime_type: "application/json",
                response_schema: &request.response_schema,
            },
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Calls `models/{model}:generateContent`, reading the API key from the
/// environment on every request.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key_var: String,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new(DEFAULT_API_BASE_URL, DEFAULT_MODEL, DEFAULT_API_KEY_VAR)
    }
}

impl GeminiClient {
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key_var: impl Into<String>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            model: model.into(),
            api_key_var: api_key_var.into(),
        }
    }

    /// Replaces the HTTP client (proxy, timeout or TLS settings).
    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }

    fn api_key(&self) -> Result<String, StoryError> {
        std::env::var(&self.api_key_var)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| StoryError::MissingApiKey(self.api_key_var.clone()))
    }

    async fn generate_content(&self, request: &GenerationRequest) -> Result<String, StoryError> {
        let api_key = self.api_key()?;
        let body = GenerateContentRequest::from_request(request);

        let response = self
            .http
            .post(self.endpoint())
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let raw = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&raw)
                .map(|envelope| envelope.error.message)
                .unwrap_or(raw);
            return Err(StoryError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateContentResponse = response.json().await?;
        log::debug!("Model returned {} candidate(s)", parsed.candidates.len());
        parsed.text().ok_or(StoryError::EmptyResponse)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(
        &self,
        request: &GenerationRequest,
    ) -> impl Future<Output = Result<String, StoryError>> + Send {
        self.generate_content(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::story::build_request;
    use serde_json::json;

    #[test]
    fn request_body_carries_persona_prompt_and_schema() {
        let request = build_request("Jujuy", Some("el Coquena"));
        let body = serde_json::to_value(GenerateContentRequest::from_request(&request)).unwrap();

        assert_eq!(
            body["systemInstruction"]["parts"][0]["text"],
            json!(request.system_instruction)
        );
        assert!(body["systemInstruction"].get("role").is_none());
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], json!(request.prompt));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"],
            request.response_schema
        );
    }

    #[test]
    fn response_text_joins_first_candidate_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "{\"title\": " }, { "text": "\"t\", \"story\": \"s\"}" }] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(
            response.text().as_deref(),
            Some(r#"{"title": "t", "story": "s"}"#)
        );
    }

    #[test]
    fn response_without_text_is_empty() {
        let cases = [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "  " }] } }] }),
        ];
        for case in cases {
            let response: GenerateContentResponse = serde_json::from_value(case).unwrap();
            assert!(response.text().is_none());
        }
    }

    #[test]
    fn endpoint_joins_base_and_model() {
        let client = GeminiClient::new("http://localhost:8080/v1beta/", "gemini-test", "KEY");
        assert_eq!(
            client.endpoint(),
            "http://localhost:8080/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn missing_key_is_reported_with_variable_name() {
        let client = GeminiClient::new(
            DEFAULT_API_BASE_URL,
            DEFAULT_MODEL,
            "FOLKLORE_MAP_UNIT_TEST_UNSET_KEY",
        );
        assert!(matches!(
            client.api_key(),
            Err(StoryError::MissingApiKey(var)) if var == "FOLKLORE_MAP_UNIT_TEST_UNSET_KEY"
        ));
    }
}
