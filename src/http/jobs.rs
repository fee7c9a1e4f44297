use super::download::{render_listing, serve_file};
use super::AppState;
use crate::domain::jobs::JobRecord;
use crate::error::{AppError, AppResult};
use axum::extract::{Path, State};
use axum::response::{Html, Response};
use axum::Json;
use uuid::Uuid;

/// Look up a job by the raw id from the path. An id that does not parse is
/// just another unknown job.
async fn record(state: &AppState, id: &str) -> AppResult<JobRecord> {
    let id = Uuid::parse_str(id).map_err(|_| AppError::NotFound)?;
    state
        .dispatcher
        .registry()
        .get(&id)
        .await
        .ok_or(AppError::NotFound)
}

/// `GET /jobs/:id`
pub async fn status(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<JobRecord>> {
    Ok(Json(record(&state, &id).await?))
}

/// `GET /jobs/:id/download/`: files in the job's own output directory.
pub async fn list(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Html<String>> {
    let job = record(&state, &id).await?;
    Ok(render_listing(&job.output_dir, &format!("/jobs/{}/download/", job.id)).await)
}

/// `GET /jobs/:id/download/:filename`
pub async fn file(
    State(state): State<AppState>,
    Path((id, filename)): Path<(String, String)>,
) -> AppResult<Response> {
    let job = record(&state, &id).await?;
    serve_file(&job.output_dir, &filename).await
}
