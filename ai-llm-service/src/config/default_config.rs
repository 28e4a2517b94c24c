//! Generation backend config loaded from environment variables.
//!
//! Exactly one backend is selected per process by `USE_BEDROCK_LLM`.
//!
//! # Environment variables
//!
//! Common:
//! - `USE_BEDROCK_LLM`  = `true` selects Bedrock Claude, otherwise Gemini (default `false`)
//! - `LLM_TIMEOUT_SECS` = HTTP timeout for Gemini calls (default `60`)
//!
//! Gemini:
//! - `GOOGLE_API_KEY` or `GEMINI_API_KEY` = API key (optional at startup, required at call time)
//! - `GEMINI_MODEL`    = model name (default `models/gemini-2.5-flash`)
//! - `GEMINI_ENDPOINT` = REST base URL (default `https://generativelanguage.googleapis.com`)
//!
//! Bedrock:
//! - `BEDROCK_MODEL_ID` = model id (default `anthropic.claude-3-sonnet-20240229-v1:0`)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        ConfigError, Result, opt_var, validate_http_endpoint, var_flag, var_opt_num,
    },
};

pub const DEFAULT_GEMINI_MODEL: &str = "models/gemini-2.5-flash";
pub const DEFAULT_GEMINI_ENDPOINT: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_BEDROCK_MODEL_ID: &str = "anthropic.claude-3-sonnet-20240229-v1:0";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Builds the backend config from the process environment.
///
/// # Errors
/// See [`config_from`].
pub fn config_from_env() -> Result<LlmModelConfig> {
    config_from(&|name: &str| std::env::var(name).ok())
}

/// Builds the backend config from an arbitrary variable lookup.
///
/// # Errors
/// - [`ConfigError::InvalidFormat`] for a malformed flag or endpoint
/// - [`ConfigError::InvalidNumber`] for a malformed timeout
/// - [`ConfigError::EmptyModel`] if the chosen model resolves to an empty string
pub fn config_from<F>(env: &F) -> Result<LlmModelConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let provider = LlmProvider::from_flag(var_flag(env, "USE_BEDROCK_LLM", false)?);
    let timeout_secs = var_opt_num(env, "LLM_TIMEOUT_SECS", "expected u64 seconds")?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

    let cfg = match provider {
        LlmProvider::Gemini => {
            let endpoint = opt_var(env, "GEMINI_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_GEMINI_ENDPOINT.to_string());
            validate_http_endpoint("GEMINI_ENDPOINT", &endpoint)?;
            LlmModelConfig {
                provider,
                model: opt_var(env, "GEMINI_MODEL")
                    .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
                endpoint,
                api_key: opt_var(env, "GOOGLE_API_KEY").or_else(|| opt_var(env, "GEMINI_API_KEY")),
                timeout_secs: Some(timeout_secs),
            }
        }
        LlmProvider::BedrockClaude => LlmModelConfig {
            provider,
            model: opt_var(env, "BEDROCK_MODEL_ID")
                .unwrap_or_else(|| DEFAULT_BEDROCK_MODEL_ID.to_string()),
            endpoint: String::new(),
            api_key: None,
            timeout_secs: None,
        },
    };

    if cfg.model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    Ok(cfg)
}
