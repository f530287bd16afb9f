//! Chat history domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use medibot_core::{ChatExchangeId, UserId};

/// One user prompt and the response generated for it.
#[derive(Debug, Clone)]
pub struct ChatExchange {
    /// Database ID of this exchange.
    pub id: ChatExchangeId,
    /// User who owns this exchange.
    pub user_id: UserId,
    /// The verbatim user message.
    pub prompt: String,
    /// The generated answer (or fallback text).
    pub response: String,
    /// When this exchange was recorded.
    pub created_at: DateTime<Utc>,
}

/// Wire shape for `/get_chat_history`: only the texts, oldest first.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExchangeView {
    pub prompt: String,
    pub response: String,
}

impl From<ChatExchange> for ExchangeView {
    fn from(exchange: ChatExchange) -> Self {
        Self {
            prompt: exchange.prompt,
            response: exchange.response,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_exchange_view_json_shape() {
        let view = ExchangeView {
            prompt: "what is fever".to_string(),
            response: "I don't know.".to_string(),
        };

        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "prompt": "what is fever",
                "response": "I don't know."
            })
        );
    }
}
