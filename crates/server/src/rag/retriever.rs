//! Similarity search client for the pre-built vector index.
//!
//! Queries a Pinecone-style index over the medical knowledge base. The
//! index is populated offline; this client is read-only.

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::embeddings::EmbeddingClient;
use super::error::RagError;

/// Number of passages retrieved per question.
pub const TOP_K: usize = 3;

/// Metadata key under which the indexed passage text is stored.
const TEXT_METADATA_KEY: &str = "text";

/// Retrieves the most similar knowledge-base passages for a query.
#[derive(Clone)]
pub struct ContextRetriever {
    client: reqwest::Client,
    embeddings: EmbeddingClient,
    query_url: String,
}

impl ContextRetriever {
    /// Create a new retriever.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Vector index API key
    /// * `index_host` - Index query host, e.g. `https://my-index-abc123.svc.pinecone.io`
    /// * `embeddings` - Client used to vectorize queries
    ///
    /// # Panics
    ///
    /// Panics if the API key contains invalid header characters.
    #[must_use]
    pub fn new(
        api_key: &secrecy::SecretString,
        index_host: &str,
        embeddings: EmbeddingClient,
    ) -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.expose_secret()).expect("Invalid API key for header"),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            embeddings,
            query_url: format!("{}/query", index_host.trim_end_matches('/')),
        }
    }

    /// Retrieve the top-k most similar passages for a question.
    ///
    /// Matches without passage text in their metadata are skipped, so the
    /// result may contain fewer than [`TOP_K`] entries.
    ///
    /// # Errors
    ///
    /// Returns an error if embedding or the index query fails.
    #[instrument(skip(self, query), fields(query_len = query.len()))]
    pub async fn retrieve(&self, query: &str) -> Result<Vec<String>, RagError> {
        let vector = self.embeddings.embed(query).await?;

        let request = QueryRequest {
            vector,
            top_k: TOP_K,
            include_metadata: true,
        };

        let response = self
            .client
            .post(&self.query_url)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RagError::Api {
                error_type: format!("index query ({status})"),
                message: body,
            });
        }

        let response: QueryResponse = response.json().await?;

        Ok(extract_passages(response))
    }
}

/// Pull the passage texts out of the index matches, preserving order.
fn extract_passages(response: QueryResponse) -> Vec<String> {
    response
        .matches
        .into_iter()
        .filter_map(|m| {
            m.metadata
                .and_then(|meta| meta.get(TEXT_METADATA_KEY).cloned())
                .and_then(|v| match v {
                    serde_json::Value::String(s) => Some(s),
                    _ => None,
                })
        })
        .collect()
}

/// Request body for an index similarity query.
#[derive(Debug, Serialize)]
struct QueryRequest {
    vector: Vec<f32>,
    #[serde(rename = "topK")]
    top_k: usize,
    #[serde(rename = "includeMetadata")]
    include_metadata: bool,
}

/// Response from an index similarity query.
#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<QueryMatch>,
}

/// One scored match from the index.
#[derive(Debug, Deserialize)]
struct QueryMatch {
    #[allow(dead_code)]
    id: String,
    #[allow(dead_code)]
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<serde_json::Map<String, serde_json::Value>>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_is_three() {
        assert_eq!(TOP_K, 3);
    }

    #[test]
    fn test_query_request_wire_names() {
        let request = QueryRequest {
            vector: vec![0.5],
            top_k: TOP_K,
            include_metadata: true,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["topK"], 3);
        assert_eq!(json["includeMetadata"], true);
    }

    #[test]
    fn test_extract_passages_in_match_order() {
        let body = r#"{
            "matches": [
                {"id": "a", "score": 0.91, "metadata": {"text": "Fever is a rise in body temperature."}},
                {"id": "b", "score": 0.88, "metadata": {"text": "Hydration helps recovery."}},
                {"id": "c", "score": 0.70, "metadata": {"text": "Rest is recommended."}}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        let passages = extract_passages(response);

        assert_eq!(
            passages,
            vec![
                "Fever is a rise in body temperature.",
                "Hydration helps recovery.",
                "Rest is recommended.",
            ]
        );
    }

    #[test]
    fn test_extract_passages_skips_matches_without_text() {
        let body = r#"{
            "matches": [
                {"id": "a", "score": 0.9},
                {"id": "b", "score": 0.8, "metadata": {"source": "page-12"}},
                {"id": "c", "score": 0.7, "metadata": {"text": "Usable passage."}}
            ]
        }"#;
        let response: QueryResponse = serde_json::from_str(body).unwrap();
        let passages = extract_passages(response);

        assert_eq!(passages, vec!["Usable passage."]);
    }

    #[test]
    fn test_empty_matches_yield_no_passages() {
        let response: QueryResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_passages(response).is_empty());
    }
}
