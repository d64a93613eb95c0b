use axum::{extract::Extension, Json};
use serde::Deserialize;

use crate::domains::answers::{ask, ask_web, Answer};
use crate::server::app::AppState;
use crate::server::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub category: Option<String>,
}

/// `POST /api/ask`
pub async fn ask_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, ApiError> {
    let category = request
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let answer = ask(&state.deps, &request.question, category).await?;

    tracing::info!(
        source = ?answer.source,
        citations = answer.citations.len(),
        "Question answered"
    );
    Ok(Json(answer))
}

/// `POST /api/ask/search`
pub async fn ask_search_handler(
    Extension(state): Extension<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<Answer>, ApiError> {
    let answer = ask_web(&state.deps, &request.question).await?;
    Ok(Json(answer))
}
