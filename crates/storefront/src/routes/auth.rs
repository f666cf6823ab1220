//! Authentication route handlers.
//!
//! Handles login, registration, and logout with email/password credentials.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::filters;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::middleware::{clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::AuthService;
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
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

/// Query parameters for error/success display.
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
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Register page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/register.html")]
pub struct RegisterTemplate {
    pub error: Option<String>,
    pub email: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the login page.
pub async fn login_page(Query(query): Query<MessageQuery>) -> impl IntoResponse {
    LoginTemplate {
        error: query.error,
        success: query.success,
    }
}

/// Handle login form submission.
#[instrument(skip(state, session, form))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Response {
    let service = AuthService::new(state.pool());

    match service
        .login_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email.clone(),
            };
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to store login in session: {e}");
                return LoginTemplate {
                    error: Some("Something went wrong. Please try again.".to_string()),
                    success: None,
                }
                .into_response();
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));
            Redirect::to("/account").into_response()
        }
        Err(e) => {
            tracing::debug!("Login failed: {e}");
            LoginTemplate {
                error: Some("Invalid email or password.".to_string()),
                success: None,
            }
            .into_response()
        }
    }
}

/// Display the registration page.
pub async fn register_page() -> impl IntoResponse {
    RegisterTemplate {
        error: None,
        email: String::new(),
    }
}

/// Handle registration form submission.
#[instrument(skip(state, session, form))]
pub async fn register(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<RegisterForm>,
) -> Response {
    let render_error = |email: &str, message: String| {
        RegisterTemplate {
            error: Some(message),
            email: email.to_owned(),
        }
        .into_response()
    };

    if form.password != form.password_confirm {
        return render_error(&form.email, "Passwords do not match.".to_string());
    }

    let service = AuthService::new(state.pool());

    match service
        .register_with_password(&form.email, &form.password)
        .await
    {
        Ok(user) => {
            let current = CurrentUser {
                id: user.id,
                email: user.email.clone(),
            };
            if let Err(e) = set_current_user(&session, &current).await {
                tracing::error!("Failed to store registration in session: {e}");
                return Redirect::to("/auth/login?success=Account+created").into_response();
            }

            set_sentry_user(&user.id, Some(user.email.as_str()));
            Redirect::to("/account").into_response()
        }
        Err(e) => {
            use crate::services::auth::AuthError;
            let message = match &e {
                AuthError::InvalidEmail(_) => "Please enter a valid email address.".to_string(),
                AuthError::WeakPassword(msg) => msg.clone(),
                AuthError::UserAlreadyExists => {
                    "An account with this email already exists.".to_string()
                }
                _ => {
                    tracing::error!("Registration failed: {e}");
                    "Something went wrong. Please try again.".to_string()
                }
            };
            render_error(&form.email, message)
        }
    }
}

/// Handle logout.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_user(&session).await {
        tracing::error!("Failed to clear login from session: {e}");
    }
    clear_sentry_user();
    Redirect::to("/")
}
