//! POST /ask: answers a question from knowledge-base context.

use std::sync::Arc;

use ai_llm_service::AnswerGenerator;
use axum::{Json, extract::State};
use contextor::{ContextorError, QaAnswer, ask_with_opts};
use knowledge_base::{DocumentStore, KnowledgeBase};
use tracing::{info, instrument};

use crate::{
    core::app_state::AppState,
    error_handler::{AppError, AppResult},
    middleware_layer::json_extractor::LenientJson,
    routes::ask::ask_request::{AskRequest, AskResponse},
};

/// Handler: POST /ask
///
/// # Example
/// ```bash
/// curl -X POST http://127.0.0.1:8001/ask \
///   -H 'content-type: application/json' \
///   -d '{"question":"What is the refund policy?","top_k":6,"search_type":"HYBRID"}'
/// ```
#[instrument(name = "ask_route", skip_all, fields(llm = state.llm.backend_name()))]
pub async fn ask_route<K, D, G>(
    State(state): State<Arc<AppState<K, D, G>>>,
    LenientJson(body): LenientJson<AskRequest>,
) -> AppResult<Json<AskResponse>>
where
    K: KnowledgeBase,
    D: DocumentStore,
    G: AnswerGenerator,
{
    let question = body.question.as_deref().unwrap_or_default().trim().to_string();
    if question.is_empty() {
        return Err(ContextorError::EmptyQuestion.into());
    }
    let opts = body.to_options(&state.defaults)?;

    let QaAnswer { answer, context } =
        match ask_with_opts(&state.kb, &state.llm, &question, &opts).await {
            Ok(qa) => qa,
            Err(ContextorError::NoContext) => return Err(AppError::NoContext { question }),
            Err(e) => return Err(e.into()),
        };

    info!(chunks = context.len(), answer_len = answer.len(), "ask_route: answered");

    Ok(Json(AskResponse {
        question,
        top_k: opts.top_k,
        search_type: opts.search_type,
        reranking: opts.reranking,
        context,
        answer,
    }))
}
