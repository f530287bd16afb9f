//! User domain types.
//!
//! These types represent validated domain objects separate from database row types.

use chrono::{DateTime, Utc};

use medibot_core::{Email, UserId};

/// A registered user (domain type).
///
/// The password hash never leaves the repository layer; this type carries
/// only the identity fields.
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Display name shown in the chat UI.
    pub fullname: String,
    /// User's email address.
    pub email: Email,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
}
