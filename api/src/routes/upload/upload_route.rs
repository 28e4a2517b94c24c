//! POST /upload: stores documents and starts one ingestion sync.

use std::sync::Arc;

use ai_llm_service::AnswerGenerator;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use knowledge_base::{DocumentStore, KnowledgeBase};
use tracing::{debug, info, instrument, warn};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult, MISSING_FILES_MSG},
    routes::upload::upload_response::{INGESTION_STARTED_MSG, UploadResponse},
};

const FILES_FIELD: &str = "files";

/// Handler: POST /upload (multipart, one or more `files` parts)
///
/// Parts with a disallowed extension are skipped. The first storage failure
/// aborts the request; files stored before it stay in the bucket.
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8001/upload -F files=@handbook.pdf -F files=@faq.md
/// ```
#[instrument(name = "upload_route", skip_all)]
pub async fn upload_route<K, D, G>(
    State(state): State<Arc<AppState<K, D, G>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>>
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    let mut multipart = multipart?;
    let mut saw_files_field = false;
    let mut uploaded: Vec<String> = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        saw_files_field = true;

        let Some(filename) = field.file_name().filter(|n| !n.is_empty()).map(str::to_string)
        else {
            continue;
        };
        if !state.config.is_allowed(&filename) {
            debug!(%filename, "upload_route: extension not allowed, skipping");
            continue;
        }

        let body = field.bytes().await?;
        let size = body.len();
        let key = state
            .docs
            .put_document(&filename, body)
            .await
            .map_err(|e| AppError::Upstream(format!("Failed to upload {filename}: {e}")))?;
        debug!(%filename, %key, size, "upload_route: stored");
        uploaded.push(filename);
    }

    if !saw_files_field {
        return Err(AppError::BadRequest(MISSING_FILES_MSG.to_string()));
    }
    if uploaded.is_empty() {
        return Err(AppError::BadRequest(format!(
            "No valid files uploaded. Allowed types: {}",
            state.config.allowed_extensions.join(", ")
        )));
    }

    let response = match state.kb.start_ingestion().await {
        Ok(job_id) => {
            info!(files = uploaded.len(), %job_id, "upload_route: ingestion started");
            UploadResponse::Started {
                uploaded,
                ingestion_job_id: job_id,
                message: INGESTION_STARTED_MSG.to_string(),
            }
        }
        Err(e) => {
            warn!(files = uploaded.len(), error = %e, "upload_route: ingestion failed to start");
            UploadResponse::SyncFailed {
                uploaded,
                warning: format!("Documents uploaded but ingestion failed: {e}"),
            }
        }
    };

    Ok(Json(response))
}
