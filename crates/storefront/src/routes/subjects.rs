//! Subject directory route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;

use crate::db::catalog::Subject;
use crate::error::Result;
use crate::state::AppState;

/// Subject display data for templates.
#[derive(Clone)]
pub struct SubjectView {
    pub name: String,
    pub level: String,
    pub description: String,
    pub icon: Option<String>,
}

impl SubjectView {
    /// Build the display subject from the catalog row.
    #[must_use]
    pub fn from_subject(subject: &Subject) -> Self {
        Self {
            name: subject.name.clone(),
            level: subject.level.clone(),
            description: subject.description.clone(),
            icon: subject.icon.clone(),
        }
    }
}

/// Subject directory template.
#[derive(Template, WebTemplate)]
#[template(path = "subjects/index.html")]
pub struct SubjectsIndexTemplate {
    pub subjects: Vec<SubjectView>,
}

/// Display the subject directory.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let subjects = state
        .catalog()
        .subjects()
        .await?
        .iter()
        .map(SubjectView::from_subject)
        .collect();

    Ok(SubjectsIndexTemplate { subjects })
}
