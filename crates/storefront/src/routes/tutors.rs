//! Tutor directory route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::filters;

use crate::error::Result;
use crate::state::AppState;

/// Tutor display data for templates.
///
/// Qualifications are already normalized to a plain list at the repository
/// boundary; the template renders them without shape checks.
#[derive(Clone)]
pub struct TutorView {
    pub name: String,
    pub photo: Option<String>,
    pub subjects: String,
    pub qualifications: Vec<String>,
}

/// Tutor directory template.
#[derive(Template, WebTemplate)]
#[template(path = "tutors/index.html")]
pub struct TutorsIndexTemplate {
    pub tutors: Vec<TutorView>,
}

/// Display the tutor directory.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse> {
    let tutors = state
        .catalog()
        .tutors()
        .await?
        .iter()
        .map(|tutor| TutorView {
            name: tutor.name.clone(),
            photo: tutor.photo.clone(),
            subjects: tutor.subjects.clone(),
            qualifications: tutor.qualifications.clone(),
        })
        .collect();

    Ok(TutorsIndexTemplate { tutors })
}
