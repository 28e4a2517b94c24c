//! Answer generation for the RAG front end.
//!
//! One backend per process (Gemini or Bedrock Claude), a fixed prompt
//! template, and a unified [`error_handler::AiLlmError`].

pub mod config;
pub mod error_handler;
pub mod llm_service;
pub mod prompt;
pub mod services;

pub use config::generation_params::GenerationParams;
pub use error_handler::AiLlmError;
pub use llm_service::{AnswerGenerator, LlmService};
