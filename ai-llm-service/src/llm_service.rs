//! Answer generation behind a single capability.
//!
//! - [`LlmService`] is a closed set of backends, picked once at startup.
//! - Construct once, wrap in `Arc` (via the app state), and share.
//! - Callers depend on [`AnswerGenerator`], so handlers and tests can swap in
//!   another implementation without touching the HTTP contract.

use std::{future::Future, time::Instant};

use aws_config::SdkConfig;
use tracing::{info, instrument};

use crate::{
    config::{
        generation_params::GenerationParams, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::AiLlmError,
    prompt::build_rag_prompt,
    services::{bedrock_claude_service::BedrockClaudeService, gemini_service::GeminiService},
};

/// Produces an answer for a question given retrieved context.
pub trait AnswerGenerator: Send + Sync + 'static {
    /// Short backend name (`"gemini"` or `"bedrock"`).
    fn backend_name(&self) -> &'static str;

    /// Renders the prompt, calls the backend and returns the trimmed answer.
    fn generate(
        &self,
        context: &str,
        question: &str,
        params: &GenerationParams,
    ) -> impl Future<Output = Result<String, AiLlmError>> + Send;
}

/// The backend chosen for this process.
#[derive(Debug)]
pub enum LlmService {
    Gemini(GeminiService),
    BedrockClaude(BedrockClaudeService),
}

impl LlmService {
    /// Builds the backend named by `cfg.provider`.
    ///
    /// # Errors
    /// Propagates backend constructor errors (invalid endpoint, HTTP client build).
    pub fn from_config(cfg: LlmModelConfig, aws: &SdkConfig) -> Result<Self, AiLlmError> {
        Ok(match cfg.provider {
            LlmProvider::Gemini => LlmService::Gemini(GeminiService::new(cfg)?),
            LlmProvider::BedrockClaude => {
                LlmService::BedrockClaude(BedrockClaudeService::new(cfg, aws)?)
            }
        })
    }

    pub fn provider(&self) -> LlmProvider {
        match self {
            LlmService::Gemini(_) => LlmProvider::Gemini,
            LlmService::BedrockClaude(_) => LlmProvider::BedrockClaude,
        }
    }
}

impl AnswerGenerator for LlmService {
    fn backend_name(&self) -> &'static str {
        self.provider().as_str()
    }

    #[instrument(skip_all, fields(backend = self.backend_name(), context_len = context.len()))]
    async fn generate(
        &self,
        context: &str,
        question: &str,
        params: &GenerationParams,
    ) -> Result<String, AiLlmError> {
        params.validate()?;
        let prompt = build_rag_prompt(context, question);
        let started = Instant::now();

        let answer = match self {
            LlmService::Gemini(svc) => svc.generate(&prompt, params).await?,
            LlmService::BedrockClaude(svc) => svc.generate(&prompt, params).await?,
        };

        info!(
            latency_ms = started.elapsed().as_millis(),
            answer_len = answer.len(),
            "answer generated"
        );
        Ok(answer)
    }
}
