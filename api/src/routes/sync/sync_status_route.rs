use std::sync::Arc;

use ai_llm_service::AnswerGenerator;
use axum::{Json, extract::State};
use knowledge_base::{DocumentStore, KnowledgeBase};
use tracing::instrument;

use crate::{
    core::app_state::AppState, error_handler::AppResult,
    routes::sync::sync_response::SyncStatusResponse,
};

/// Handler: GET /sync/status
#[instrument(name = "sync_status_route", skip_all)]
pub async fn sync_status_route<K, D, G>(
    State(state): State<Arc<AppState<K, D, G>>>,
) -> AppResult<Json<SyncStatusResponse>>
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    let body = match state.kb.latest_ingestion().await? {
        Some(job) => job.into(),
        None => SyncStatusResponse::no_jobs(),
    };
    Ok(Json(body))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::test_support::{FakeDocs, FakeKb, FakeLlm, call, get, job, state};

    #[tokio::test]
    async fn reports_latest_job() {
        let kb = FakeKb {
            latest: Some(job("J1", "IN_PROGRESS")),
            ..FakeKb::default()
        };
        let st = state(kb, FakeDocs::default(), FakeLlm::named("gemini"));
        let (status, json) = call(&st, get("/sync/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json,
            json!({
                "status": "IN_PROGRESS",
                "started_at": "2025-03-01T12:00:00Z",
                "updated_at": "2025-03-01T12:05:00Z"
            })
        );
    }

    #[tokio::test]
    async fn no_jobs_and_failures() {
        let st = state(FakeKb::default(), FakeDocs::default(), FakeLlm::named("gemini"));
        let (status, json) = call(&st, get("/sync/status")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!({"status": "no_jobs_found"}));

        let kb = FakeKb {
            fail_latest: true,
            ..FakeKb::default()
        };
        let st = state(kb, FakeDocs::default(), FakeLlm::named("gemini"));
        let (status, json) = call(&st, get("/sync/status")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "fake error: list failed");
    }
}
