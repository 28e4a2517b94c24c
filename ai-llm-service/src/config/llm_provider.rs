/// Represents the backend used for answer generation.
///
/// Exactly one provider is active per process; it is picked once at startup
/// from `USE_BEDROCK_LLM` and never changes per request.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// assert_eq!(LlmProvider::from_flag(true), LlmProvider::BedrockClaude);
/// assert_eq!(LlmProvider::Gemini.as_str(), "gemini");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// Google Gemini over the Generative Language REST API.
    Gemini,
    /// Anthropic Claude hosted on Amazon Bedrock (`InvokeModel`).
    BedrockClaude,
}

impl LlmProvider {
    /// Maps the `USE_BEDROCK_LLM` flag to a provider.
    pub fn from_flag(use_bedrock: bool) -> Self {
        if use_bedrock {
            LlmProvider::BedrockClaude
        } else {
            LlmProvider::Gemini
        }
    }

    /// Short name reported by `/health`.
    pub fn as_str(self) -> &'static str {
        match self {
            LlmProvider::Gemini => "gemini",
            LlmProvider::BedrockClaude => "bedrock",
        }
    }
}
