//! Authentication route handlers.
//!
//! Handles login, registration, and logout. Failures surface as flash
//! messages via `?error=` / `?success=` query parameters on the redirect,
//! never as error pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::db::ChatHistoryRepository;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
pub struct RegisterForm {
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

// =============================================================================
// Query Types
// =============================================================================

/// Query parameters for flash display.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub error: Option<String>,
    pub success: Option<String>,
}

// =============================================================================
// Templates
// =============================================================================

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<&'static str>,
    pub success: Option<&'static str>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<&'static str>,
}

// =============================================================================
// Flash Messages
// =============================================================================

/// Resolve a flash code from the query string into user-facing text.
///
/// Unknown codes render nothing, so the query string cannot be used to
/// inject arbitrary text into the page.
fn flash_message(code: Option<&str>) -> Option<&'static str> {
    match code? {
        "login_required" => Some("You must be logged in to access the chat."),
        "credentials" => Some("Invalid email or password."),
        "password_mismatch" => Some("Passwords do not match."),
        "email_taken" => Some("Error: Email already exists."),
        "invalid_email" => Some("Please enter a valid email address."),
        "db" => Some("Database connection error."),
        "registered" => Some("Registration successful! Please log in."),
        "logged_out" => Some("You have been logged out successfully."),
        _ => None,
    }
}

// =============================================================================
// Login Routes
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: flash_message(query.error.as_deref()),
        success: flash_message(query.success.as_deref()),
    }
}

/// Handle login form submission.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let service = AuthService::new(state.pool());

    match service.login(&form.email, &form.password).await {
        Ok(user) => {
            let current_user = CurrentUser {
                id: user.id,
                fullname: user.fullname,
            };

            if let Err(e) = set_current_user(&session, &current_user).await {
                tracing::error!(error = %e, "Failed to set session");
                return Redirect::to("/login?error=db").into_response();
            }

            Redirect::to("/chat").into_response()
        }
        Err(AuthError::Repository(e)) => {
            tracing::error!(error = %e, "Login failed against the database");
            Redirect::to("/login?error=db").into_response()
        }
        Err(e) => {
            tracing::warn!(error = %e, "Login failed");
            Redirect::to("/login?error=credentials").into_response()
        }
    }
}

// =============================================================================
// Registration Routes
// =============================================================================

/// Display the registration page.
pub async fn register_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    RegisterTemplate {
        error: flash_message(query.error.as_deref()),
    }
}

/// Handle registration form submission.
pub async fn register(State(state): State<AppState>, Form(form): Form<RegisterForm>) -> Response {
    let service = AuthService::new(state.pool());

    match service
        .register(
            &form.fullname,
            &form.email,
            &form.password,
            &form.confirm_password,
        )
        .await
    {
        Ok(user) => {
            tracing::info!(user_id = %user.id, "user registered");
            Redirect::to("/login?success=registered").into_response()
        }
        Err(AuthError::PasswordMismatch) => {
            Redirect::to("/register?error=password_mismatch").into_response()
        }
        Err(AuthError::DuplicateEmail) => {
            Redirect::to("/register?error=email_taken").into_response()
        }
        Err(AuthError::InvalidEmail(_)) => {
            Redirect::to("/register?error=invalid_email").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Registration failed");
            Redirect::to("/register?error=db").into_response()
        }
    }
}

// =============================================================================
// Logout Route
// =============================================================================

/// Handle logout.
///
/// Deletes the user's entire chat history before clearing the session.
/// This is a deliberate retention policy (no transcript survives a logout),
/// not cleanup of transient state; revisit only as a product decision.
pub async fn logout(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    session: Session,
) -> Response {
    if let Some(user) = user {
        let repo = ChatHistoryRepository::new(state.pool());
        match repo.purge(user.id).await {
            Ok(removed) => {
                tracing::info!(user_id = %user.id, removed, "chat history purged at logout");
            }
            Err(e) => {
                tracing::error!(user_id = %user.id, error = %e, "Failed to purge chat history");
            }
        }
    }

    if let Err(e) = clear_current_user(&session).await {
        tracing::error!(error = %e, "Failed to clear session");
    }

    // Also destroy the entire session
    if let Err(e) = session.flush().await {
        tracing::error!(error = %e, "Failed to flush session");
    }

    Redirect::to("/login?success=logged_out").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_message_known_codes() {
        assert_eq!(
            flash_message(Some("password_mismatch")),
            Some("Passwords do not match.")
        );
        assert_eq!(
            flash_message(Some("email_taken")),
            Some("Error: Email already exists.")
        );
        assert_eq!(
            flash_message(Some("credentials")),
            Some("Invalid email or password.")
        );
        assert_eq!(
            flash_message(Some("registered")),
            Some("Registration successful! Please log in.")
        );
    }

    #[test]
    fn test_flash_message_rejects_unknown_codes() {
        assert_eq!(flash_message(Some("<script>alert(1)</script>")), None);
        assert_eq!(flash_message(Some("unknown")), None);
        assert_eq!(flash_message(None), None);
    }
}
