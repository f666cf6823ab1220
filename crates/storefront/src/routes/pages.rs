//! Static page route handler (about, terms, etc.).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use crate::filters;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Static page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/show.html")]
pub struct PageTemplate {
    pub title: String,
    pub content_html: String,
}

/// Display a static page by slug.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let page = state
        .content()
        .get_page(&slug)
        .ok_or_else(|| AppError::NotFound(format!("page {slug}")))?;

    Ok(PageTemplate {
        title: page.meta.title.clone(),
        content_html: page.content_html.clone(),
    })
}
