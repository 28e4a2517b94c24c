use crate::config::llm_provider::LlmProvider;

/// Configuration for the selected generation backend.
///
/// # Fields
///
/// - `provider`: which backend to use (Gemini or Bedrock Claude).
/// - `model`: the model identifier (e.g., `"models/gemini-2.5-flash"`,
///   `"anthropic.claude-3-sonnet-20240229-v1:0"`).
/// - `endpoint`: REST base URL (Gemini only; Bedrock resolves its own endpoint).
/// - `api_key`: API key for providers that require one. May be `None` at
///   startup; the backend then fails on first use.
/// - `timeout_secs`: optional request timeout in seconds (Gemini HTTP client).
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider};
///
/// let cfg = LlmModelConfig {
///     provider: LlmProvider::Gemini,
///     model: "models/gemini-2.5-flash".to_string(),
///     endpoint: "https://generativelanguage.googleapis.com".to_string(),
///     api_key: Some("AIza...".to_string()),
///     timeout_secs: Some(60),
/// };
/// assert_eq!(cfg.provider.as_str(), "gemini");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmModelConfig {
    /// The backend (Gemini or Bedrock Claude).
    pub provider: LlmProvider,

    /// Model identifier string.
    pub model: String,

    /// REST base URL for HTTP backends.
    pub endpoint: String,

    /// Optional API key for authentication.
    pub api_key: Option<String>,

    /// Optional request timeout (in seconds).
    pub timeout_secs: Option<u64>,
}
