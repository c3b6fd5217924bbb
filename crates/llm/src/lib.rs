//! Remote generation client for the Gemini `generateContent` endpoint.
//!
//! One outbound HTTPS POST per request; the credential travels as a `key`
//! query parameter and the call is bounded by the configured timeout.
//! Failures are mapped into the typed [`LlmError`] taxonomy so the caller
//! can decide which kinds recover via the local-template fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Placeholder fragment that marks a credential as unusable even when set.
const PLACEHOLDER_KEY_FRAGMENT: &str = "your-api-key";

/// Safety thresholds sent with every request.
const SAFETY_SETTINGS: [SafetySetting; 2] = [
    SafetySetting {
        category: "HARM_CATEGORY_HARASSMENT",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
    SafetySetting {
        category: "HARM_CATEGORY_HATE_SPEECH",
        threshold: "BLOCK_MEDIUM_AND_ABOVE",
    },
];

// ── Error taxonomy ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum LlmError {
    /// No usable secret configured.  Expected on first run; recovered by
    /// the local fallback and never shown to the user as an error.
    #[error("no usable API credential configured")]
    CredentialMissing,
    /// Transport failure or timeout.
    #[error("network failure talking to the generation API: {0}")]
    Network(#[source] reqwest::Error),
    /// Remote quota / backoff signal (HTTP 429).
    #[error("generation API rate limit exceeded")]
    RateLimited,
    /// The payload arrived but is missing the fields we need.
    #[error("malformed generation response: {0}")]
    MalformedResponse(String),
    /// Anything uncategorized, carrying the remote status and message.
    #[error("generation API error ({status}): {message}")]
    Unknown { status: u16, message: String },
}

impl LlmError {
    /// Kinds the resolver recovers from by switching to the local template
    /// path.  Everything else propagates to the caller.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LlmError::CredentialMissing | LlmError::Network(_) | LlmError::RateLimited
        )
    }
}

/// A credential is usable when it is non-empty and not the sample-config
/// placeholder.
pub fn has_usable_key(key: &str) -> bool {
    let key = key.trim();
    !key.is_empty() && !key.contains(PLACEHOLDER_KEY_FRAGMENT)
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    safety_settings: Vec<SafetySetting>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_k: u32,
    top_p: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct SafetySetting {
    category: &'static str,
    threshold: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetails {
    message: String,
}

// ── Client ───────────────────────────────────────────────────────────────────

/// Connection parameters for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct RemoteConfig {
    /// Full generateContent endpoint, model segment included.
    pub endpoint: String,
    pub api_key: String,
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

/// The seam the response resolver talks through; lets tests substitute a
/// scripted responder for the real HTTP client.
#[async_trait]
pub trait RemoteResponder: Send + Sync {
    /// Generate a completion for the full prompt (system instruction plus
    /// user question already concatenated by the caller).
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    client: Client,
    config: RemoteConfig,
}

impl GeminiClient {
    pub fn new(config: RemoteConfig) -> Result<Self, LlmError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(LlmError::Network)?;
        Ok(Self { client, config })
    }

    pub fn has_usable_credential(&self) -> bool {
        has_usable_key(&self.config.api_key)
    }

    fn build_request(&self, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_k: self.config.top_k,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_output_tokens,
            },
            safety_settings: SAFETY_SETTINGS.to_vec(),
        }
    }
}

#[async_trait]
impl RemoteResponder for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        if !self.has_usable_credential() {
            return Err(LlmError::CredentialMissing);
        }

        let request = self.build_request(prompt);
        debug!(endpoint = %self.config.endpoint, prompt_len = prompt.len(), "sending generate request");

        let response = self
            .client
            .post(&self.config.endpoint)
            .query(&[("key", self.config.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(LlmError::Network)?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(LlmError::Unknown {
                status: status.as_u16(),
                message,
            });
        }

        let payload: GenerateResponse = response
            .json()
            .await
            .map_err(|err| LlmError::MalformedResponse(err.to_string()))?;

        payload
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content.parts.into_iter().next())
            .map(|part| part.text)
            .ok_or_else(|| LlmError::MalformedResponse("empty candidate list".to_string()))
    }
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(api_key: &str) -> RemoteConfig {
        RemoteConfig {
            endpoint: "https://example.invalid/v1beta/models/gemini-pro:generateContent"
                .to_string(),
            api_key: api_key.to_string(),
            temperature: 0.7,
            top_k: 40,
            top_p: 0.95,
            max_output_tokens: 1000,
            timeout: Duration::from_secs(5),
        }
    }

    // ── Credential gate ────────────────────────────────────────────────────

    #[test]
    fn usable_key_rules() {
        assert!(!has_usable_key(""));
        assert!(!has_usable_key("   "));
        assert!(!has_usable_key("paste-your-api-key-here"));
        assert!(has_usable_key("AIzaSyTest1234"));
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_network_io() {
        let client = GeminiClient::new(test_config("")).unwrap();
        let err = client.generate("무엇이든").await.unwrap_err();
        assert!(matches!(err, LlmError::CredentialMissing));
    }

    // ── Recoverability matrix ──────────────────────────────────────────────

    #[test]
    fn fallback_kinds_are_recoverable() {
        assert!(LlmError::CredentialMissing.is_recoverable());
        assert!(LlmError::RateLimited.is_recoverable());
        assert!(!LlmError::MalformedResponse("x".to_string()).is_recoverable());
        assert!(
            !LlmError::Unknown {
                status: 500,
                message: "boom".to_string()
            }
            .is_recoverable()
        );
    }

    // ── Wire shape ─────────────────────────────────────────────────────────

    #[test]
    fn request_serializes_with_camel_case_fields() {
        let client = GeminiClient::new(test_config("key")).unwrap();
        let request = client.build_request("질문");
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["contents"][0]["parts"][0]["text"], "질문");
        assert_eq!(json["generationConfig"]["topK"], 40);
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 1000);
        assert!((json["generationConfig"]["topP"].as_f64().unwrap() - 0.95).abs() < 1e-6);
        assert_eq!(
            json["safetySettings"][0]["category"],
            "HARM_CATEGORY_HARASSMENT"
        );
        assert_eq!(
            json["safetySettings"][1]["threshold"],
            "BLOCK_MEDIUM_AND_ABOVE"
        );
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn response_first_candidate_text_is_extracted() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "첫 번째"}, {"text": "나머지"}]}},
                {"content": {"parts": [{"text": "두 번째 후보"}]}}
            ]
        }"#;
        let payload: GenerateResponse = serde_json::from_str(raw).unwrap();
        let text = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text);
        assert_eq!(text.as_deref(), Some("첫 번째"));
    }

    #[test]
    fn response_without_candidates_field_parses_to_empty() {
        let payload: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(payload.candidates.is_empty());
    }

    #[test]
    fn error_body_message_is_parsed() {
        let raw = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
        let parsed: ApiErrorBody = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.error.message, "API key not valid");
    }

    #[test]
    fn error_display_wording() {
        assert_eq!(
            LlmError::CredentialMissing.to_string(),
            "no usable API credential configured"
        );
        assert_eq!(
            LlmError::Unknown {
                status: 503,
                message: "overloaded".to_string()
            }
            .to_string(),
            "generation API error (503): overloaded"
        );
    }
}
