use contextor::{AskDefaults, AskOptions};
use knowledge_base::{MAX_RESULTS, SearchType, normalize_filter};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error_handler::{AppError, AppResult};

/// Request payload for /ask.
///
/// Every field except `question` falls back to the server defaults.
#[derive(Debug, Default, Deserialize)]
pub struct AskRequest {
    /// Natural language question.
    #[serde(default)]
    pub question: Option<String>,
    /// Number of chunks to retrieve (`1..=100`).
    #[serde(default)]
    pub top_k: Option<u32>,
    /// `SEMANTIC` or `HYBRID`, any case.
    #[serde(default)]
    pub search_type: Option<String>,
    #[serde(default)]
    pub reranking: Option<bool>,
    /// Knowledge-base metadata filter; `null` and `{}` mean none.
    #[serde(default)]
    pub metadata_filter: Option<Value>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    /// Sampling top-k for the model, not the retrieval count.
    #[serde(default)]
    pub llm_top_k: Option<u32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

impl AskRequest {
    /// Merges the request over `defaults` and checks the retrieval inputs.
    ///
    /// Sampling parameters are range-checked later by the orchestrator.
    pub fn to_options(&self, defaults: &AskDefaults) -> AppResult<AskOptions> {
        let mut opts = AskOptions::from_defaults(defaults);

        if let Some(k) = self.top_k {
            if !(1..=MAX_RESULTS).contains(&k) {
                return Err(AppError::BadRequest(format!(
                    "top_k must be between 1 and {MAX_RESULTS}, got {k}"
                )));
            }
            opts.top_k = k;
        }
        if let Some(raw) = self.search_type.as_deref() {
            opts.search_type = raw.parse::<SearchType>().map_err(AppError::BadRequest)?;
        }
        if let Some(r) = self.reranking {
            opts.reranking = r;
        }
        opts.metadata_filter = normalize_filter(self.metadata_filter.as_ref())?;

        let generation = &mut opts.generation;
        if let Some(t) = self.temperature {
            generation.temperature = t;
        }
        if let Some(p) = self.top_p {
            generation.top_p = p;
        }
        if let Some(k) = self.llm_top_k {
            generation.top_k = k;
        }
        if let Some(m) = self.max_tokens {
            generation.max_tokens = m;
        }

        Ok(opts)
    }
}

/// Response payload for /ask.
#[derive(Debug, Serialize)]
pub struct AskResponse {
    pub question: String,
    pub top_k: u32,
    pub search_type: SearchType,
    pub reranking: bool,
    /// Retrieved chunks in the order they were given to the model.
    pub context: Vec<String>,
    pub answer: String,
}
