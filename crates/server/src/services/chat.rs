//! Conversation pipeline.
//!
//! Orchestrates one question-answer turn:
//! 1. Bail out with a fixed message if the answer generator never came up
//! 2. Retrieve the top-k most similar knowledge-base passages
//! 3. Render the grounding prompt and call the generator once
//! 4. Persist the exchange for authenticated users (failures are swallowed)
//!
//! The pipeline never errors toward the caller: every failure becomes a
//! fixed fallback string and the chat UI keeps working.

use sqlx::PgPool;
use tracing::{info, instrument, warn};

use crate::db::ChatHistoryRepository;
use crate::models::session::CurrentUser;
use crate::rag::{ContextRetriever, GeneratorClient, RagError, prompt};

/// Answer returned while the generator is disabled for the process lifetime
/// (model API key missing or client construction failed at startup).
pub const MODEL_UNAVAILABLE_FALLBACK: &str =
    "The AI model is currently unavailable. Please try again later.";

/// Answer returned when a single retrieval or generation call fails.
pub const ANSWER_ERROR_FALLBACK: &str = "An error occurred. Please try again later.";

/// Conversation pipeline service.
pub struct ChatService<'a> {
    pool: &'a PgPool,
    retriever: &'a ContextRetriever,
    generator: Option<&'a GeneratorClient>,
}

impl<'a> ChatService<'a> {
    /// Create a new chat service.
    ///
    /// `generator` is `None` when the model client failed to initialize;
    /// the pipeline then answers with [`MODEL_UNAVAILABLE_FALLBACK`].
    #[must_use]
    pub const fn new(
        pool: &'a PgPool,
        retriever: &'a ContextRetriever,
        generator: Option<&'a GeneratorClient>,
    ) -> Self {
        Self {
            pool,
            retriever,
            generator,
        }
    }

    /// Answer one user message.
    ///
    /// Never fails: upstream errors are logged server-side and converted to
    /// a fallback answer. The exchange is persisted only when a user
    /// identity is present and an answer (fallback included) was produced;
    /// persistence failure is logged and swallowed so the user still gets
    /// their answer.
    #[instrument(skip(self, user, message), fields(authenticated = user.is_some()))]
    pub async fn answer(&self, user: Option<&CurrentUser>, message: &str) -> String {
        let Some(generator) = self.generator else {
            let answer = MODEL_UNAVAILABLE_FALLBACK.to_string();
            self.persist(user, message, &answer).await;
            return answer;
        };

        let answer = match self.grounded_answer(generator, message).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "answer pipeline failed, returning fallback");
                // A failed call is not an exchange; nothing is recorded.
                return ANSWER_ERROR_FALLBACK.to_string();
            }
        };

        self.persist(user, message, &answer).await;
        answer
    }

    /// Retrieve context and generate a grounded answer.
    async fn grounded_answer(
        &self,
        generator: &GeneratorClient,
        message: &str,
    ) -> Result<String, RagError> {
        let passages = self.retriever.retrieve(message).await?;
        info!(passages = passages.len(), "context retrieved");

        let system = prompt::render_system_prompt(&passages);
        generator.generate(&system, message).await
    }

    /// Record the exchange for an authenticated user; log-and-swallow on failure.
    async fn persist(&self, user: Option<&CurrentUser>, prompt: &str, response: &str) {
        let Some(user) = user else {
            return;
        };

        let repo = ChatHistoryRepository::new(self.pool);
        if let Err(e) = repo.append(user.id, prompt, response).await {
            warn!(user_id = %user.id, error = %e, "failed to persist chat exchange");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use sqlx::postgres::PgPoolOptions;

    use medibot_core::UserId;

    use crate::config::GeneratorConfig;
    use crate::rag::EmbeddingClient;

    use super::*;

    /// Pool pointing at a closed port; acquisition fails fast instead of
    /// reaching a real database.
    fn unreachable_pool() -> PgPool {
        PgPoolOptions::new()
            .acquire_timeout(Duration::from_secs(1))
            .connect_lazy("postgres://nobody@127.0.0.1:1/medibot")
            .unwrap()
    }

    fn unreachable_retriever() -> ContextRetriever {
        let embeddings = EmbeddingClient::new(&SecretString::from("test-key"));
        ContextRetriever::new(&SecretString::from("test-key"), "http://127.0.0.1:9", embeddings)
    }

    fn unreachable_generator() -> GeneratorClient {
        GeneratorClient::new(&GeneratorConfig {
            api_key: SecretString::from("test-key"),
            model: "test-model".to_string(),
            base_url: "http://127.0.0.1:9".to_string(),
        })
        .unwrap()
    }

    fn signed_in_user() -> CurrentUser {
        CurrentUser {
            id: UserId::new(1),
            fullname: "Test User".to_string(),
        }
    }

    #[tokio::test]
    async fn test_unavailable_generator_answers_with_fixed_fallback() {
        let pool = unreachable_pool();
        let retriever = unreachable_retriever();
        let service = ChatService::new(&pool, &retriever, None);

        let answer = service.answer(None, "what is fever").await;

        assert_eq!(answer, MODEL_UNAVAILABLE_FALLBACK);
    }

    #[tokio::test]
    async fn test_persist_failure_is_swallowed() {
        // The append against the dead pool fails; the caller still gets
        // the fallback answer, not an error.
        let pool = unreachable_pool();
        let retriever = unreachable_retriever();
        let service = ChatService::new(&pool, &retriever, None);
        let user = signed_in_user();

        let answer = service.answer(Some(&user), "what is fever").await;

        assert_eq!(answer, MODEL_UNAVAILABLE_FALLBACK);
    }

    #[tokio::test]
    async fn test_failed_pipeline_returns_error_fallback() {
        // Retrieval cannot succeed here, so the grounded path errors and
        // the per-call fallback comes back without touching the database.
        let pool = unreachable_pool();
        let retriever = unreachable_retriever();
        let generator = unreachable_generator();
        let service = ChatService::new(&pool, &retriever, Some(&generator));
        let user = signed_in_user();

        let answer = service.answer(Some(&user), "what is fever").await;

        assert_eq!(answer, ANSWER_ERROR_FALLBACK);
    }

    #[test]
    fn test_unavailable_fallback_exact_text() {
        assert_eq!(
            MODEL_UNAVAILABLE_FALLBACK,
            "The AI model is currently unavailable. Please try again later."
        );
    }

    #[test]
    fn test_error_fallback_exact_text() {
        assert_eq!(
            ANSWER_ERROR_FALLBACK,
            "An error occurred. Please try again later."
        );
    }

    #[test]
    fn test_fallbacks_differ() {
        // The two degradation modes must stay distinguishable in history.
        assert_ne!(MODEL_UNAVAILABLE_FALLBACK, ANSWER_ERROR_FALLBACK);
    }
}
