use std::sync::Arc;

use ai_llm_service::AnswerGenerator;
use axum::{Json, extract::State};
use knowledge_base::{DocumentStore, KnowledgeBase};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::AppResult,
    routes::sync::sync_response::{SYNC_STARTED_MSG, SyncStartedResponse},
};

/// Handler: POST /sync
///
/// Starts an ingestion job for the configured data source. Any failure,
/// missing ids included, is a 500.
#[instrument(name = "sync_route", skip_all)]
pub async fn sync_route<K, D, G>(
    State(state): State<Arc<AppState<K, D, G>>>,
) -> AppResult<Json<SyncStartedResponse>>
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    let job_id = state.kb.start_ingestion().await?;
    info!(%job_id, "sync_route: ingestion started");

    Ok(Json(SyncStartedResponse {
        ingestion_job_id: job_id,
        message: SYNC_STARTED_MSG.to_string(),
    }))
}
