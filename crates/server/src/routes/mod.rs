//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                 - Redirect to /chat when logged in, else /login
//! GET  /home             - Static landing page
//! GET  /health           - Liveness check
//! GET  /health/ready     - Readiness check (database ping)
//!
//! # Auth
//! GET  /login            - Login page
//! POST /login            - Login action
//! GET  /register         - Register page
//! POST /register         - Register action
//! GET  /logout           - Purge chat history, clear session, redirect
//!
//! # Chat
//! GET  /chat             - Chat UI (requires login, redirects otherwise)
//! POST /get              - Form field `msg` -> pipeline -> JSON {"response": ...}
//! GET  /get_chat_history - JSON [{prompt, response}, ..] oldest first, [] if none
//! ```

pub mod auth;
pub mod chat;
pub mod pages;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(pages::root))
        .route("/home", get(pages::home))
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route("/chat", get(chat::chat_page))
        .route("/get", post(chat::get_bot_response))
        .route("/get_chat_history", get(chat::get_chat_history))
}
