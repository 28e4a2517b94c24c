//! Public API types re-used by external crates (e.g., the HTTP API layer).

use ai_llm_service::GenerationParams;
use knowledge_base::SearchType;
use serde_json::Value;

use crate::cfg::AskDefaults;

/// Options that control retrieval and generation for a single question.
///
/// Start from [`AskOptions::from_defaults`] and override what the caller sent.
///
/// # Example
/// ```
/// use contextor::{AskDefaults, AskOptions};
/// let mut opts = AskOptions::from_defaults(&AskDefaults::default());
/// opts.top_k = 8;
/// assert_eq!(opts.generation.max_tokens, 1024);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct AskOptions {
    /// Number of chunks to retrieve (`1..=100`).
    pub top_k: u32,
    pub search_type: SearchType,
    pub reranking: bool,
    /// Opaque metadata filter forwarded to the knowledge base.
    pub metadata_filter: Option<Value>,
    pub generation: GenerationParams,
}

impl AskOptions {
    pub fn from_defaults(d: &AskDefaults) -> Self {
        Self {
            top_k: d.top_k,
            search_type: d.search_type,
            reranking: d.reranking,
            metadata_filter: None,
            generation: d.generation,
        }
    }
}

/// Final answer together with the exact chunks passed to the model.
///
/// # Example
/// ```
/// use contextor::QaAnswer;
/// let qa = QaAnswer {
///     answer: "Rust is a systems language.".into(),
///     context: vec!["Rust is a language.".into()],
/// };
/// assert!(!qa.answer.is_empty());
/// ```
#[derive(Clone, Debug)]
pub struct QaAnswer {
    pub answer: String,
    /// Retrieved chunks, in retrieval order.
    pub context: Vec<String>,
}
