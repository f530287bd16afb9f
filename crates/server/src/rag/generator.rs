//! Answer generation client.
//!
//! Talks to an OpenAI-compatible chat completions endpoint (OpenRouter by
//! default). One non-streaming call per question; no retries, no multi-turn
//! memory. Conversation grounding comes entirely from the system prompt.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::config::GeneratorConfig;

use super::error::RagError;

/// Sampling temperature; kept low for grounded, repeatable answers.
const TEMPERATURE: f32 = 0.3;

/// Cap on generated tokens per answer.
const MAX_TOKENS: u32 = 512;

/// Chat completion client.
#[derive(Clone)]
pub struct GeneratorClient {
    client: reqwest::Client,
    completions_url: String,
    model: String,
}

impl GeneratorClient {
    /// Create a new generator client.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key cannot be used as a header value or
    /// the HTTP client cannot be built. Callers treat a failed construction
    /// as "generator unavailable" and fall back, never as a startup crash.
    pub fn new(config: &GeneratorConfig) -> Result<Self, RagError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key.expose_secret()))
            .map_err(|_| RagError::Unauthorized("API key is not a valid header value".into()))?;
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            completions_url: format!(
                "{}/chat/completions",
                config.base_url.trim_end_matches('/')
            ),
            model: config.model.clone(),
        })
    }

    /// Generate one answer for a system instruction and user message.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails, the API rejects it, or the
    /// response carries no answer text.
    #[instrument(skip(self, system, user_message), fields(model = %self.model))]
    pub async fn generate(&self, system: &str, user_message: &str) -> Result<String, RagError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user_message.to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let response = self
            .client
            .post(&self.completions_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(error_from_status(status, response).await);
        }

        let body = response.text().await?;
        let completion: CompletionResponse = serde_json::from_str(&body)
            .map_err(|e| RagError::Parse(format!("Failed to parse response: {e}")))?;

        extract_answer(completion)
    }
}

/// Turn a non-success response into a typed error.
async fn error_from_status(status: reqwest::StatusCode, response: reqwest::Response) -> RagError {
    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        let retry_after = response
            .headers()
            .get("Retry-After")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.parse().ok())
            .unwrap_or(60);
        return RagError::RateLimited(retry_after);
    }

    if status == reqwest::StatusCode::UNAUTHORIZED {
        return RagError::Unauthorized("Invalid API key".to_string());
    }

    match response.text().await {
        Ok(body) => {
            if let Ok(api_error) = serde_json::from_str::<ApiErrorResponse>(&body) {
                RagError::Api {
                    error_type: api_error.error.error_type.unwrap_or_else(|| "unknown".into()),
                    message: api_error.error.message,
                }
            } else {
                RagError::Api {
                    error_type: "unknown".to_string(),
                    message: body,
                }
            }
        }
        Err(e) => RagError::Http(e),
    }
}

/// Pull the answer text out of the first choice.
fn extract_answer(completion: CompletionResponse) -> Result<String, RagError> {
    completion
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| RagError::InvalidResponse("No choices in response".to_string()))
}

/// Request body for a chat completion.
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

/// One turn in the completion request or response.
#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

/// Response from the chat completions API.
#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<CompletionChoice>,
}

/// One generated choice.
#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: ChatMessage,
}

/// Error envelope from the API.
#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiError,
}

/// Error detail from the API.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
    #[serde(rename = "type")]
    error_type: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_request_serializes_both_turns() {
        let request = CompletionRequest {
            model: "test-model".to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: "instructions".to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: "what is fever".to_string(),
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["role"], "user");
        assert_eq!(json["messages"][1]["content"], "what is fever");
        assert_eq!(json["max_tokens"], 512);
    }

    #[test]
    fn test_extract_answer_from_first_choice() {
        let body = r#"{
            "choices": [
                {"message": {"role": "assistant", "content": "I don't know."}}
            ]
        }"#;
        let completion: CompletionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(extract_answer(completion).unwrap(), "I don't know.");
    }

    #[test]
    fn test_extract_answer_without_choices_is_an_error() {
        let completion: CompletionResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(
            extract_answer(completion),
            Err(RagError::InvalidResponse(_))
        ));
    }

    #[test]
    fn test_api_error_body_parses() {
        let body = r#"{"error": {"message": "model not found", "type": "invalid_request_error"}}"#;
        let parsed: ApiErrorResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.error.message, "model not found");
        assert_eq!(parsed.error.error_type.as_deref(), Some("invalid_request_error"));
    }
}
