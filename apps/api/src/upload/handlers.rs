//! Axum route handlers for the upload form and resume display.

use std::path::{Path as FsPath, PathBuf};

use axum::{
    extract::{Multipart, Path, State},
    response::{Html, IntoResponse, Redirect, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;
use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::resume::{ParseStatus, ResumeRecord};
use crate::parser::PipelineError;
use crate::state::AppState;
use crate::upload::archive::expand_pdfs;
use crate::upload::storage::{sanitize_filename, store_upload, UploadKind};

/// Response header carrying `PARSED` or `RECORD_PARSE_ERROR`.
pub const PARSE_STATUS_HEADER: &str = "x-resume-parse-status";

const INDEX_HTML: &str = include_str!("../../templates/index.html");

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

struct UploadedFile {
    filename: String,
    data: Bytes,
}

#[derive(Debug, Serialize)]
pub struct BatchResponse {
    pub archive: String,
    pub documents: Vec<DocumentOutcome>,
}

/// Result for one PDF of an archive. `resume` is present whenever the
/// pipeline produced a record (including the empty one on parse failure).
#[derive(Debug, Serialize)]
pub struct DocumentOutcome {
    pub file: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume: Option<ResumeRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET / and GET /resume
pub async fn handle_upload_form() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST / and POST /resume
///
/// A PDF is stored and the client is redirected to `/resume/{name}`, which
/// parses it. A ZIP is expanded and every PDF inside is parsed right away;
/// one document failing does not stop the others.
pub async fn handle_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let upload = read_file_field(&mut multipart).await?;

    let kind = UploadKind::from_filename(&upload.filename).ok_or_else(|| {
        AppError::Validation(format!(
            "File type not allowed: {} (expected .pdf or .zip)",
            upload.filename
        ))
    })?;
    let name = sanitize_filename(&upload.filename)
        .filter(|name| UploadKind::from_filename(name) == Some(kind))
        .ok_or_else(|| AppError::Validation("Invalid filename".to_string()))?;

    let folder = state.config.upload_folder.clone();
    let stored_name = name.clone();
    let stored = tokio::task::spawn_blocking(move || {
        store_upload(&folder, &stored_name, &upload.data)
    })
    .await
    .map_err(|e| AppError::Internal(e.into()))??;
    info!("stored upload {}", stored.display());

    match kind {
        UploadKind::Pdf => Ok(Redirect::to(&format!("/resume/{name}")).into_response()),
        UploadKind::Zip => {
            let documents = process_archive(&state, stored).await?;
            Ok(Json(BatchResponse {
                archive: name,
                documents,
            })
            .into_response())
        }
    }
}

/// GET /resume/:name
///
/// Parses a previously uploaded PDF. The body is the resume record; the
/// `x-resume-parse-status` header says whether it was decoded or degraded.
pub async fn handle_display_resume(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Response, AppError> {
    let safe = sanitize_filename(&name)
        .filter(|safe| *safe == name)
        .filter(|safe| UploadKind::from_filename(safe) == Some(UploadKind::Pdf))
        .ok_or_else(|| AppError::NotFound(format!("Resume {name} not found")))?;

    let path = state.config.upload_folder.join(&safe);
    if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
        return Err(AppError::NotFound(format!("Resume {name} not found")));
    }

    let parsed = state.parser.query_resume(&path).await?;
    if let Some(full_name) = parsed.record.full_name() {
        info!(
            "parsed resume {safe} for {full_name} ({} positions)",
            parsed.record.work_experience_count()
        );
    } else if parsed.status.is_parsed() && parsed.record.is_empty() {
        info!("oracle returned an empty resume for {safe}");
    }

    Ok((
        [(PARSE_STATUS_HEADER, parsed.status.code())],
        Json(parsed.record),
    )
        .into_response())
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_file_field(multipart: &mut Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        if filename.is_empty() {
            return Err(AppError::Validation("No selected file".to_string()));
        }
        let data = field.bytes().await?;
        return Ok(UploadedFile { filename, data });
    }
    Err(AppError::Validation("No file part".to_string()))
}

async fn process_archive(
    state: &AppState,
    archive: PathBuf,
) -> Result<Vec<DocumentOutcome>, AppError> {
    let folder = state.config.upload_folder.clone();
    let pdfs = tokio::task::spawn_blocking(move || expand_pdfs(&archive, &folder))
        .await
        .map_err(|e| AppError::Internal(e.into()))?
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let mut documents = Vec::with_capacity(pdfs.len());
    for pdf in pdfs {
        let outcome = parse_document(state, &pdf).await;
        documents.push(outcome);
    }
    Ok(documents)
}

async fn parse_document(state: &AppState, pdf: &FsPath) -> DocumentOutcome {
    let file = pdf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    match state.parser.query_resume(pdf).await {
        Ok(parsed) => {
            let error = match &parsed.status {
                ParseStatus::Parsed => None,
                ParseStatus::Unparseable { reason } => Some(reason.clone()),
            };
            DocumentOutcome {
                file,
                status: parsed.status.code(),
                resume: Some(parsed.record),
                error,
            }
        }
        Err(e) => {
            warn!("skipping {file}: {e}");
            let status = match &e {
                PipelineError::DocumentRead(_) => "DOCUMENT_READ_ERROR",
                PipelineError::Completion(_) => "COMPLETION_ERROR",
            };
            DocumentOutcome {
                file,
                status,
                resume: None,
                error: Some(e.to_string()),
            }
        }
    }
}
