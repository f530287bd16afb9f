//! Business logic services.

pub mod auth;
pub mod chat;

pub use auth::{AuthError, AuthService};
pub use chat::ChatService;
