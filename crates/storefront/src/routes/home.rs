//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::error::Result;
use crate::filters;
use crate::routes::store::ProductView;
use crate::routes::subjects::SubjectView;
use crate::state::AppState;

/// Recent news teaser for the home page.
#[derive(Clone)]
pub struct NewsTeaserView {
    pub slug: String,
    pub title: String,
    pub published: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub featured_subjects: Vec<SubjectView>,
    pub featured_products: Vec<ProductView>,
    pub recent_news: Vec<NewsTeaserView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let currency = state.config().gateway.currency;

    let featured_subjects = state
        .catalog()
        .subjects()
        .await?
        .iter()
        .take(4)
        .map(SubjectView::from_subject)
        .collect();

    let featured_products = state
        .catalog()
        .products()
        .await?
        .iter()
        .take(4)
        .map(|p| ProductView::from_product(p, currency))
        .collect();

    let recent_news = state
        .content()
        .get_recent_posts(3)
        .into_iter()
        .map(|post| NewsTeaserView {
            slug: post.slug.clone(),
            title: post.meta.title.clone(),
            published: post.meta.published_at.format("%d %b %Y").to_string(),
        })
        .collect();

    Ok(HomeTemplate {
        featured_subjects,
        featured_products,
        recent_news,
    })
}
