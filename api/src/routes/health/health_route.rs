use std::sync::Arc;

use ai_llm_service::AnswerGenerator;
use axum::{Json, extract::State};
use knowledge_base::{DocumentStore, KnowledgeBase};
use tracing::{instrument, warn};

use crate::{
    core::app_state::AppState,
    routes::{
        health::health_response::{HealthResponse, LastIngestion},
        sync::sync_response::render_timestamp,
    },
};

/// Handler: GET /health
///
/// Always 200. The document count and latest job are looked up in parallel;
/// a failed lookup is logged and reported as `0` or left out.
#[instrument(name = "health_route", skip_all)]
pub async fn health_route<K, D, G>(
    State(state): State<Arc<AppState<K, D, G>>>,
) -> Json<HealthResponse>
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    let (count, latest) = tokio::join!(state.docs.document_count(), state.kb.latest_ingestion());

    let document_count = count.unwrap_or_else(|e| {
        warn!(error = %e, "health_route: document count unavailable");
        0
    });
    let last_ingestion = match latest {
        Ok(job) => job.map(|j| LastIngestion {
            status: j.status,
            started_at: render_timestamp(j.started_at),
        }),
        Err(e) => {
            warn!(error = %e, "health_route: latest ingestion job unavailable");
            None
        }
    };

    Json(HealthResponse {
        status: "healthy",
        document_count,
        knowledge_base_configured: state.kb.is_configured(),
        s3_bucket_configured: state.docs.is_configured(),
        llm: state.llm.backend_name(),
        last_ingestion,
    })
}
