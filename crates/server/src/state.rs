//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::ServerConfig;
use crate::rag::{ContextRetriever, EmbeddingClient, GeneratorClient};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; everything inside is read-only after
/// startup, so handlers can share it without locking.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    retriever: ContextRetriever,
    generator: Option<GeneratorClient>,
}

impl AppState {
    /// Create a new application state.
    ///
    /// The retriever is required: a misconfigured vector index is a startup
    /// failure. The generator is not: when its config is absent or the
    /// client cannot be constructed, chat runs in degraded fallback mode
    /// for the process lifetime.
    #[must_use]
    pub fn new(config: ServerConfig, pool: PgPool) -> Self {
        let embeddings = EmbeddingClient::new(&config.retrieval.openai_api_key);
        let retriever = ContextRetriever::new(
            &config.retrieval.pinecone_api_key,
            &config.retrieval.index_host,
            embeddings,
        );

        let generator = config.generator.as_ref().and_then(|generator_config| {
            match GeneratorClient::new(generator_config) {
                Ok(client) => Some(client),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to initialize answer generator; chat will use the fallback answer");
                    None
                }
            }
        });

        if generator.is_none() {
            tracing::warn!("answer generator disabled; chat degrades to the fallback answer");
        }

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                retriever,
                generator,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the context retriever.
    #[must_use]
    pub fn retriever(&self) -> &ContextRetriever {
        &self.inner.retriever
    }

    /// Get the answer generator, if it initialized successfully.
    #[must_use]
    pub fn generator(&self) -> Option<&GeneratorClient> {
        self.inner.generator.as_ref()
    }
}
