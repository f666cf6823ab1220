//! News route handlers.

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

/// News listing row.
#[derive(Clone)]
pub struct NewsItemView {
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub published: String,
    pub reading_time_minutes: u32,
}

/// News listing template.
#[derive(Template, WebTemplate)]
#[template(path = "news/index.html")]
pub struct NewsIndexTemplate {
    pub posts: Vec<NewsItemView>,
}

/// News post template.
#[derive(Template, WebTemplate)]
#[template(path = "news/show.html")]
pub struct NewsShowTemplate {
    pub title: String,
    pub published: String,
    pub author: Option<String>,
    pub reading_time_minutes: u32,
    pub content_html: String,
}

/// Display the news listing, newest first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let posts = state
        .content()
        .get_published_posts()
        .map(|post| NewsItemView {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            description: post.meta.description.clone(),
            published: post.meta.published_at.format("%d %b %Y").to_string(),
            reading_time_minutes: post.reading_time_minutes,
        })
        .collect();

    NewsIndexTemplate { posts }
}

/// Display a single news post.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse> {
    let post = state
        .content()
        .get_post(&slug)
        .filter(|post| !post.meta.draft)
        .ok_or_else(|| AppError::NotFound(format!("news post {slug}")))?;

    Ok(NewsShowTemplate {
        title: post.meta.title.clone(),
        published: post.meta.published_at.format("%d %b %Y").to_string(),
        author: post.meta.author.clone(),
        reading_time_minutes: post.reading_time_minutes,
        content_html: post.content_html.clone(),
    })
}
