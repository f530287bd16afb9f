//! Page route handlers: root redirect and the landing page.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::{IntoResponse, Redirect, Response};

use crate::middleware::OptionalAuth;

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate;

/// Root: logged-in users go to the chat, everyone else to login.
pub async fn root(OptionalAuth(user): OptionalAuth) -> Response {
    if user.is_some() {
        Redirect::to("/chat").into_response()
    } else {
        Redirect::to("/login").into_response()
    }
}

/// Display the landing page.
pub async fn home() -> impl IntoResponse {
    HomeTemplate
}
