use std::fs;
use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{Multipart, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::HeaderValue;
use axum::response::{IntoResponse, Response};
use outline_splitter::config::DEFAULT_SPLIT_LEVEL;
use outline_splitter::naming::sanitize_title;
use outline_splitter::split_document;

use crate::archive::zip_directory;
use crate::config::ApiConfig;
use crate::error::ApiError;

const ALLOWED_EXTENSIONS: &[&str] = &["yaml", "yml", "json"];

pub async fn health() -> &'static str {
    "OK"
}

/// An outline document received in a split request.
struct Upload {
    stem: String,
    extension: String,
    bytes: Bytes,
    level: i64,
}

/// `POST /split`: split an uploaded outline and return the chapters as a zip.
pub async fn split_upload(
    State(config): State<Arc<ApiConfig>>,
    mut multipart: Multipart,
) -> Result<Response, ApiError> {
    let upload = read_upload(&mut multipart).await?;
    let download_name = format!(
        "{}_{}.zip",
        upload.stem,
        chrono::Local::now().format("%Y%m%d_%H%M%S")
    );

    tracing::info!(
        file = %upload.stem,
        level = upload.level,
        bytes = upload.bytes.len(),
        "splitting uploaded outline"
    );

    let archive = tokio::task::spawn_blocking(move || split_to_archive(&config, &upload))
        .await
        .map_err(|e| ApiError::Internal(format!("split task failed: {e}")))??;

    let disposition = HeaderValue::from_bytes(
        format!("attachment; filename=\"{download_name}\"").as_bytes(),
    )
    .map_err(|e| ApiError::Internal(e.to_string()))?;

    Ok((
        [
            (CONTENT_TYPE, HeaderValue::from_static("application/zip")),
            (CONTENT_DISPOSITION, disposition),
        ],
        archive,
    )
        .into_response())
}

async fn read_upload(multipart: &mut Multipart) -> Result<Upload, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut level = DEFAULT_SPLIT_LEVEL;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("invalid multipart body: {e}")))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read upload: {e}")))?;
                file = Some((file_name, bytes));
            }
            Some("level") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| ApiError::BadRequest(format!("failed to read level: {e}")))?;
                level = text
                    .trim()
                    .parse()
                    .map_err(|_| ApiError::BadRequest(format!("level must be an integer, got '{text}'")))?;
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file else {
        return Err(ApiError::BadRequest("no file uploaded".into()));
    };

    // Only the final path component of a client-supplied name is used
    let file_name = Path::new(&file_name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if file_name.is_empty() {
        return Err(ApiError::BadRequest("no file selected".into()));
    }

    let path = Path::new(file_name);
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if !ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Err(ApiError::BadRequest(
            "only .yaml, .yml and .json outlines are supported".into(),
        ));
    }

    let stem = sanitize_title(path.file_stem().and_then(|s| s.to_str()).unwrap_or_default());

    Ok(Upload {
        stem,
        extension,
        bytes,
        level,
    })
}

/// Save the upload, split it and zip the chapters, all inside one scratch
/// directory that is removed when this returns.
fn split_to_archive(config: &ApiConfig, upload: &Upload) -> Result<Vec<u8>, ApiError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("outline-split-");
    let workspace = match &config.work_dir {
        Some(dir) => builder.tempdir_in(dir)?,
        None => builder.tempdir()?,
    };

    let source = workspace.path().join(format!("source.{}", upload.extension));
    fs::write(&source, &upload.bytes)?;

    let chapters_dir = workspace.path().join("chapters");
    let report = split_document(&source, &chapters_dir, upload.level)?;
    if !report.is_complete() {
        tracing::warn!(
            failed = report.failed.len(),
            missing_content = report.extraction_failures,
            "split finished with problems"
        );
    }

    let archive_path = workspace.path().join("chapters.zip");
    let entries = zip_directory(&chapters_dir, &archive_path)?;
    tracing::info!(chapters = entries, "archive ready");

    Ok(fs::read(&archive_path)?)
}
