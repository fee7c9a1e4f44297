use super::{pages, AppState};
use crate::adapters::local::fs;
use crate::domain::filename::is_plain_file_name;
use crate::error::{AppError, AppResult};
use axum::body::Body;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{Html, IntoResponse, Response};
use std::path::Path as FsPath;
use tokio_util::io::ReaderStream;
use tracing::warn;

/// `GET /download/`: whatever is currently in the shared `final` directory.
pub async fn list(State(state): State<AppState>) -> Html<String> {
    render_listing(&state.layout.final_dir(), "/download/").await
}

/// `GET /download/:filename`
pub async fn file(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    serve_file(&state.layout.final_dir(), &filename).await
}

pub(super) async fn render_listing(dir: &FsPath, href_prefix: &str) -> Html<String> {
    let files = match fs::list_dir(dir).await {
        Ok(files) => files,
        Err(e) => {
            warn!(dir = %dir.display(), error = %e, "failed to list output directory");
            Vec::new()
        }
    };
    pages::listing(&files, href_prefix)
}

/// Stream `name` out of `dir` as an attachment.
///
/// Any name the processor wrote is served as long as it stays a single path
/// component inside `dir`.
pub(super) async fn serve_file(dir: &FsPath, name: &str) -> AppResult<Response> {
    if !is_plain_file_name(name) {
        return Err(AppError::NotFound);
    }
    let path = fs::existing_file(dir, name).await.ok_or(AppError::NotFound)?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(AppError::NotFound),
        Err(e) => return Err(AppError::Read(e)),
    };
    let length = file.metadata().await.map_err(AppError::Read)?.len();

    let content_type = mime_guess::from_path(&path)
        .first_or_octet_stream()
        .to_string();
    let headers = [
        (header::CONTENT_TYPE, content_type),
        (header::CONTENT_LENGTH, length.to_string()),
        (header::CONTENT_DISPOSITION, content_disposition(name)),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// `attachment` disposition for `name`, adding an RFC 5987 `filename*` when the
/// name cannot be carried verbatim in a quoted string.
fn content_disposition(name: &str) -> String {
    let plain = |c: char| (c.is_ascii_graphic() || c == ' ') && c != '"' && c != '\\';
    if name.chars().all(plain) {
        return format!("attachment; filename=\"{name}\"");
    }

    let fallback: String = name.chars().map(|c| if plain(c) { c } else { '_' }).collect();
    format!(
        "attachment; filename=\"{fallback}\"; filename*=UTF-8''{}",
        urlencoding::encode(name)
    )
}
