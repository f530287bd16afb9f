//! Chat route handlers.
//!
//! The chat page requires a session; the message and history endpoints are
//! soft-auth: an anonymous caller still gets an answer (not persisted) and
//! an empty history, matching the UI's expectations.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Form, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use crate::db::ChatHistoryRepository;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::chat::ExchangeView;
use crate::services::ChatService;
use crate::state::AppState;

/// Chat page template.
#[derive(Template, WebTemplate)]
#[template(path = "chat.html")]
pub struct ChatTemplate {
    pub fullname: String,
}

/// Form body for `/get`.
#[derive(Debug, Deserialize)]
pub struct MessageForm {
    pub msg: String,
}

/// Response body for `/get`.
#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub response: String,
}

/// Display the chat UI. Redirects to login when unauthenticated.
pub async fn chat_page(RequireAuth(user): RequireAuth) -> impl IntoResponse {
    ChatTemplate {
        fullname: user.fullname,
    }
}

/// Answer one user message through the conversation pipeline.
///
/// Always returns 200 with a `response` field; pipeline failures surface
/// as fallback text, never as an error status.
pub async fn get_bot_response(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Form(form): Form<MessageForm>,
) -> Json<AnswerResponse> {
    let service = ChatService::new(state.pool(), state.retriever(), state.generator());

    let response = service.answer(user.as_ref(), &form.msg).await;

    Json(AnswerResponse { response })
}

/// Return the caller's chat history, oldest first.
///
/// Unauthenticated callers and users with no history both get `[]`; a
/// failed read is logged and also answered with `[]` so the UI keeps
/// rendering.
pub async fn get_chat_history(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Json<Vec<ExchangeView>> {
    let Some(user) = user else {
        return Json(Vec::new());
    };

    let repo = ChatHistoryRepository::new(state.pool());
    match repo.list_for(user.id).await {
        Ok(exchanges) => Json(exchanges.into_iter().map(Into::into).collect()),
        Err(e) => {
            tracing::error!(user_id = %user.id, error = %e, "Failed to fetch chat history");
            Json(Vec::new())
        }
    }
}
