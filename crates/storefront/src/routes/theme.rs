//! Theme preference route handler.
//!
//! The light/dark preference is explicit application state: it lives in the
//! session, is flipped through this endpoint, and is mirrored into a plain
//! cookie so the base layout can apply it before first paint. Nothing hangs
//! callbacks off a global object.

use axum::http::HeaderMap;
use axum::response::{AppendHeaders, IntoResponse, Redirect};
use tower_sessions::Session;
use tracing::instrument;

use crate::models::session_keys;

/// Cookie mirrored for the layout's first-paint script.
const THEME_COOKIE: &str = "kw_theme";

/// Flip the theme between light and dark, then return whence we came.
#[instrument(skip(session, headers))]
pub async fn toggle(session: Session, headers: HeaderMap) -> impl IntoResponse {
    let current: Option<String> = session.get(session_keys::THEME).await.ok().flatten();
    let next = match current.as_deref() {
        Some("dark") => "light",
        _ => "dark",
    };

    if let Err(e) = session.insert(session_keys::THEME, next).await {
        tracing::warn!("Failed to store theme preference: {e}");
    }

    let back = headers
        .get(axum::http::header::REFERER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("/")
        .to_owned();

    (
        AppendHeaders([(
            axum::http::header::SET_COOKIE,
            format!("{THEME_COOKIE}={next}; Path=/; Max-Age=31536000; SameSite=Lax"),
        )]),
        Redirect::to(&back),
    )
}
