//! Domain models for the assistant.

pub mod chat;
pub mod session;
pub mod user;

pub use chat::ChatExchange;
pub use session::{CurrentUser, keys as session_keys};
pub use user::User;
