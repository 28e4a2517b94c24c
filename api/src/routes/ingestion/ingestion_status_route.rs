use std::sync::Arc;

use ai_llm_service::AnswerGenerator;
use axum::{
    Json,
    extract::{Path, State},
};
use knowledge_base::{DocumentStore, KnowledgeBase};
use tracing::{debug, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    routes::sync::sync_response::JobStatusResponse,
};

/// Handler: GET /ingestion-status/{job_id}
///
/// 404 only when the service says the job does not exist; lookup failures
/// are 500s.
#[instrument(name = "ingestion_status_route", skip(state))]
pub async fn ingestion_status_route<K, D, G>(
    State(state): State<Arc<AppState<K, D, G>>>,
    Path(job_id): Path<String>,
) -> AppResult<Json<JobStatusResponse>>
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    match state.kb.ingestion_job(&job_id).await? {
        Some(job) => {
            debug!(status = %job.status, "ingestion_status_route: found");
            Ok(Json(job.into()))
        }
        None => Err(AppError::JobNotFound),
    }
}
