//! Filesystem bookkeeping for the output area and request workspaces.

use crate::domain::layout::{Layout, Workspace};
use axum::body::Bytes;
use axum::BoxError;
use futures::{Stream, TryStreamExt};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{self, File};
use tokio::io::{AsyncWriteExt, BufWriter};
use tokio_util::io::StreamReader;
use tracing::debug;
use zip::result::ZipError;
use zip::ZipArchive;

/// Remove every entry inside `dir`, keeping `dir` itself.
///
/// A missing directory is not an error.
pub async fn clear_dir(dir: &Path) -> io::Result<()> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(dir = %dir.display(), "nothing to clear");
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_dir() {
            fs::remove_dir_all(&path).await?;
        } else {
            fs::remove_file(&path).await?;
        }
    }
    Ok(())
}

/// Wipe the shared output directories and every workspace under the tmp root.
pub async fn reset_shared_area(layout: &Layout) -> io::Result<()> {
    for dir in layout.shared_dirs() {
        clear_dir(&dir).await?;
    }
    clear_dir(layout.tmp_root()).await
}

/// Create the output tree and the tmp root if they are missing.
pub async fn ensure_layout(layout: &Layout) -> io::Result<()> {
    for dir in layout.shared_dirs() {
        fs::create_dir_all(&dir).await?;
    }
    fs::create_dir_all(layout.tmp_root()).await
}

pub async fn create_workspace(workspace: &Workspace) -> io::Result<()> {
    for dir in workspace.dirs() {
        fs::create_dir_all(&dir).await?;
    }
    Ok(())
}

// Save a `Stream` to a file
pub async fn stream_to_file<S, E>(path: &Path, stream: S) -> io::Result<u64>
where
    S: Stream<Item = Result<Bytes, E>>,
    E: Into<BoxError>,
{
    let body_with_io_error = stream.map_err(|err| io::Error::new(io::ErrorKind::Other, err));
    let body_reader = StreamReader::new(body_with_io_error);
    futures::pin_mut!(body_reader);

    let mut file = BufWriter::new(File::create(path).await?);
    let written = tokio::io::copy(&mut body_reader, &mut file).await?;
    file.flush().await?;

    Ok(written)
}

/// Extract a zip archive into `dest`.
///
/// Entries whose names would land outside `dest` are rejected by the archive
/// reader.
pub async fn unpack_zip(archive: &Path, dest: &Path) -> Result<(), ZipError> {
    let archive = archive.to_path_buf();
    let dest = dest.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<(), ZipError> {
        let file = std::fs::File::open(&archive)?;
        let mut zip = ZipArchive::new(file)?;
        zip.extract(&dest)
    })
    .await
    .map_err(|e| ZipError::Io(io::Error::new(io::ErrorKind::Other, e)))?
}

/// Names of the entries in `dir`, in directory order. A missing directory is empty.
pub async fn list_dir(dir: &Path) -> io::Result<Vec<String>> {
    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e),
    };

    let mut names = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// Resolve `name` inside `dir` if it is an existing regular file.
pub async fn existing_file(dir: &Path, name: &str) -> Option<PathBuf> {
    let path = dir.join(name);
    match fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Some(path),
        _ => None,
    }
}
