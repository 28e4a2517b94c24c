//! Retrieval: request body construction and chunk extraction.

use serde::Deserialize;
use serde_json::{Map, Value, json};
use tracing::{debug, trace};

use crate::{
    errors::{KbError, KbResult},
    filters::normalize_filter,
    record::RetrievalRequest,
};

/// Upper bound Bedrock accepts for `numberOfResults`.
pub const MAX_RESULTS: u32 = 100;

/// Builds the JSON body for `POST /knowledgebases/{id}/retrieve`.
///
/// `filter` is included only when non-empty, the reranking block only when
/// `reranking` is set.
///
/// # Errors
/// - [`KbError::InvalidRequest`] if `top_k` is outside `1..=100`
/// - [`KbError::InvalidFilter`] if the metadata filter is malformed
pub fn build_retrieve_body(req: &RetrievalRequest<'_>, rerank_model_arn: &str) -> KbResult<Value> {
    if req.top_k == 0 || req.top_k > MAX_RESULTS {
        return Err(KbError::InvalidRequest(format!(
            "top_k must be between 1 and {MAX_RESULTS}, got {}",
            req.top_k
        )));
    }

    let mut vector = Map::new();
    vector.insert("numberOfResults".into(), json!(req.top_k));
    vector.insert("overrideSearchType".into(), json!(req.search_type.as_str()));
    if let Some(filter) = normalize_filter(req.filter)? {
        vector.insert("filter".into(), filter);
    }
    if req.reranking {
        vector.insert(
            "rerankingConfiguration".into(),
            json!({
                "type": "BEDROCK_RERANKING_MODEL",
                "bedrockRerankingConfiguration": {
                    "modelConfiguration": {"modelArn": rerank_model_arn}
                }
            }),
        );
    }

    trace!(keys = vector.len(), "retrieve::build_retrieve_body");
    Ok(json!({
        "retrievalQuery": {"text": req.query},
        "retrievalConfiguration": {"vectorSearchConfiguration": Value::Object(vector)}
    }))
}

/// Response body of the retrieve call (only what we read).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RetrieveResponse {
    #[serde(default)]
    retrieval_results: Vec<RetrievalResult>,
}

#[derive(Debug, Deserialize)]
struct RetrievalResult {
    #[serde(default)]
    content: Option<ResultContent>,
}

#[derive(Debug, Deserialize)]
struct ResultContent {
    #[serde(default)]
    text: Option<String>,
}

impl RetrieveResponse {
    /// Chunk texts in service order; hits with empty or missing text are skipped.
    pub(crate) fn into_chunks(self) -> Vec<String> {
        let total = self.retrieval_results.len();
        let chunks: Vec<String> = self
            .retrieval_results
            .into_iter()
            .filter_map(|r| r.content.and_then(|c| c.text))
            .filter(|t| !t.is_empty())
            .collect();
        debug!(total, kept = chunks.len(), "retrieve::into_chunks");
        chunks
    }
}
