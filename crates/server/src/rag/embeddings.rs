//! Embedding client for query vectorization.
//!
//! Uses an OpenAI-compatible embeddings endpoint to turn the user's question
//! into a vector before similarity search. The knowledge base was indexed
//! with the same model, so the dimensions must match the index exactly.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::RagError;

const OPENAI_EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const EMBEDDING_MODEL: &str = "text-embedding-3-small";
const EMBEDDING_DIMENSIONS: usize = 1536;

/// Client for generating text embeddings.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: reqwest::Client,
}

impl EmbeddingClient {
    /// Create a new embedding client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Embeddings API key
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(api_key: &secrecy::SecretString) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key.expose_secret()))
                .expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self { client }
    }

    /// Generate an embedding vector for the given text.
    ///
    /// # Returns
    ///
    /// A 1536-dimensional embedding vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an invalid response.
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    pub async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let request = EmbeddingRequest {
            model: EMBEDDING_MODEL.to_string(),
            input: text.to_string(),
        };

        let response = self
            .client
            .post(OPENAI_EMBEDDINGS_URL)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Api {
                error_type: format!("embeddings ({status})"),
                message: body,
            });
        }

        let response: EmbeddingResponse = response.json().await?;

        let embedding = response
            .data
            .into_iter()
            .next()
            .ok_or_else(|| RagError::InvalidResponse("No embedding data in response".to_string()))?
            .embedding;

        if embedding.len() != EMBEDDING_DIMENSIONS {
            return Err(RagError::InvalidResponse(format!(
                "Expected {} dimensions, got {}",
                EMBEDDING_DIMENSIONS,
                embedding.len()
            )));
        }

        Ok(embedding)
    }
}

/// Request body for text embedding.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    input: String,
}

/// Response from the embeddings API.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// Single embedding data in response.
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_embedding_dimensions_constant() {
        assert_eq!(EMBEDDING_DIMENSIONS, 1536);
    }

    #[test]
    fn test_embedding_response_parses() {
        let body = r#"{"data":[{"embedding":[0.1,-0.2,0.3]}],"model":"text-embedding-3-small"}"#;
        let parsed: EmbeddingResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.data.len(), 1);
        assert_eq!(parsed.data[0].embedding.len(), 3);
    }
}
