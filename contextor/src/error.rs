//! Typed error for the contextor crate.

use ai_llm_service::AiLlmError;
use knowledge_base::KbError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContextorError {
    /// The question was missing or blank.
    #[error("Provide 'question' in JSON body.")]
    EmptyQuestion,

    /// Retrieval returned no chunks.
    #[error("No relevant documents found. Upload documents and sync first.")]
    NoContext,

    /// Malformed ask defaults in the environment.
    #[error("config error: {0}")]
    Config(String),

    /// Errors from the knowledge-base crate (retrieval).
    #[error(transparent)]
    Kb(#[from] KbError),

    /// Errors from the generation backend.
    #[error(transparent)]
    Llm(#[from] AiLlmError),
}

impl ContextorError {
    /// `true` for caller mistakes (maps to HTTP 400).
    pub fn is_invalid_input(&self) -> bool {
        match self {
            ContextorError::EmptyQuestion => true,
            ContextorError::Kb(e) => e.is_invalid_input(),
            ContextorError::Llm(e) => e.is_invalid_input(),
            _ => false,
        }
    }
}
