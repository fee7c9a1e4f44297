use super::{pages, AppState};
use crate::adapters::local::fs;
use crate::domain::filename::sanitize_file_name;
use crate::domain::jobs::Invocation;
use crate::domain::layout::{OutputLayout, Workspace};
use crate::domain::upload::{InputKind, ScriptParams, StagedInputs, TEXT_FIELDS};
use crate::error::{AppError, AppResult};
use axum::extract::{Multipart, State};
use axum::response::Html;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// `POST /process`: stage the upload and start the processor in the background.
pub async fn process(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Html<String>> {
    let layout = &state.layout;

    if layout.mode() == OutputLayout::Shared {
        fs::reset_shared_area(layout).await.map_err(AppError::Cleanup)?;
        // Finished jobs point at output the reset just removed.
        let pruned = state.dispatcher.registry().prune_finished().await;
        debug!(pruned, "dropped finished job records");
    }
    fs::ensure_layout(layout).await.map_err(AppError::CreateDir)?;

    let workspace = layout.workspace(Uuid::new_v4());
    fs::create_workspace(&workspace).await.map_err(AppError::CreateDir)?;

    let (inputs, params) = match receive(&workspace, &mut multipart, &state.default_margin).await {
        Ok(staged) => staged,
        Err(e) => {
            discard(&workspace).await;
            return Err(e);
        }
    };

    let clips_dir = workspace.dir(InputKind::Clips);
    let output_dir = layout.output_dir_for(&workspace.id);
    if let Err(e) = prepare(&inputs, &clips_dir, &output_dir).await {
        // Nothing else sweeps an isolated workspace.
        if layout.mode() == OutputLayout::Isolated {
            discard(&workspace).await;
        }
        return Err(e);
    }

    let invocation =
        Invocation::build(&state.processor, &inputs, &clips_dir, &output_dir, &params);
    info!(job_id = %workspace.id, workspace = %workspace.root.display(), "upload staged");

    // The handle is dropped on purpose: the job runs detached and reports
    // through the registry.
    let handle = state
        .dispatcher
        .dispatch(workspace.id, invocation, output_dir, workspace.root.clone())
        .await;

    let listing_href = match layout.mode() {
        OutputLayout::Shared => String::from("/download/"),
        OutputLayout::Isolated => format!("/jobs/{}/download/", handle.id),
    };
    Ok(pages::confirmation(&handle.id, &listing_href))
}

/// Drain the multipart stream into the workspace.
///
/// File parts are streamed straight to disk; text parts are collected and
/// checked once the whole body has been read.
async fn receive(
    workspace: &Workspace,
    multipart: &mut Multipart,
    default_margin: &str,
) -> AppResult<(StagedInputs, ScriptParams)> {
    let mut files: HashMap<InputKind, PathBuf> = HashMap::new();
    let mut fields: HashMap<String, String> = HashMap::new();

    while let Some(field) = multipart.next_field().await? {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        if let Some(kind) = InputKind::from_field(&name) {
            // Browsers send an empty file name when nothing was picked.
            let raw = match field.file_name() {
                Some(raw) if !raw.is_empty() => raw.to_owned(),
                _ => continue,
            };
            let file_name =
                sanitize_file_name(&raw).ok_or_else(|| AppError::InvalidFileName(raw.clone()))?;

            let path = workspace.dir(kind).join(&file_name);
            let written = fs::stream_to_file(&path, field).await.map_err(AppError::Save)?;
            info!(field = %name, path = %path.display(), bytes = written, "saved upload");
            files.insert(kind, path);
        } else if TEXT_FIELDS.contains(&name.as_str()) {
            let value = field.text().await?;
            fields.insert(name, value);
        }
    }

    let inputs = StagedInputs::collect(files).ok_or(AppError::MissingFiles)?;
    let params =
        ScriptParams::from_fields(&fields, default_margin).ok_or(AppError::MissingFormData)?;
    Ok((inputs, params))
}

/// Unpack the clips and make sure the job's output directory exists.
async fn prepare(inputs: &StagedInputs, clips_dir: &Path, output_dir: &Path) -> AppResult<()> {
    fs::unpack_zip(&inputs.clips_archive, clips_dir).await?;
    tokio::fs::create_dir_all(output_dir)
        .await
        .map_err(AppError::CreateDir)
}

async fn discard(workspace: &Workspace) {
    if let Err(e) = tokio::fs::remove_dir_all(&workspace.root).await {
        warn!(workspace = %workspace.root.display(), error = %e, "failed to discard workspace");
    }
}
