//! Ask defaults loaded from environment variables.

use ai_llm_service::GenerationParams;
use knowledge_base::SearchType;

use crate::error::ContextorError;

/// Process-wide defaults for `/ask` parameters the caller leaves out.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AskDefaults {
    pub top_k: u32,
    pub search_type: SearchType,
    pub reranking: bool,
    pub generation: GenerationParams,
}

impl Default for AskDefaults {
    fn default() -> Self {
        Self {
            top_k: 4,
            search_type: SearchType::Semantic,
            reranking: false,
            generation: GenerationParams::default(),
        }
    }
}

impl AskDefaults {
    /// Build from process environment variables with defaults.
    ///
    /// Env: `RAG_TOP_K` (4), `RAG_SEARCH_TYPE` (`SEMANTIC`), `RAG_RERANKING` (false),
    /// plus `LLM_TEMPERATURE`, `LLM_TOP_P`, `LLM_TOP_K`, `LLM_MAX_TOKENS`.
    pub fn from_env() -> Result<Self, ContextorError> {
        Self::from_lookup(&|k: &str| std::env::var(k).ok())
    }

    /// Same as [`AskDefaults::from_env`], reading variables through `env`.
    ///
    /// # Example
    /// ```
    /// let d = contextor::AskDefaults::from_lookup(&|_: &str| None).unwrap();
    /// assert_eq!(d.top_k, 4);
    ///
    /// let env = |k: &str| (k == "RAG_TOP_K").then(|| "7".to_string());
    /// assert_eq!(contextor::AskDefaults::from_lookup(&env).unwrap().top_k, 7);
    /// ```
    pub fn from_lookup<F>(env: &F) -> Result<Self, ContextorError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let dflt = Self::default();
        let top_k = match var(env, "RAG_TOP_K") {
            Some(v) => v
                .parse::<u32>()
                .ok()
                .filter(|k| (1..=knowledge_base::MAX_RESULTS).contains(k))
                .ok_or_else(|| {
                    ContextorError::Config(format!("RAG_TOP_K must be 1..=100, got `{v}`"))
                })?,
            None => dflt.top_k,
        };
        let search_type = match var(env, "RAG_SEARCH_TYPE") {
            Some(v) => v.parse::<SearchType>().map_err(ContextorError::Config)?,
            None => dflt.search_type,
        };
        let reranking = match var(env, "RAG_RERANKING").map(|v| v.to_ascii_lowercase()) {
            Some(v) if v == "true" || v == "1" => true,
            Some(v) if v == "false" || v == "0" => false,
            Some(v) => {
                return Err(ContextorError::Config(format!(
                    "RAG_RERANKING must be true or false, got `{v}`"
                )));
            }
            None => dflt.reranking,
        };

        Ok(Self {
            top_k,
            search_type,
            reranking,
            generation: GenerationParams::from_lookup(env)?,
        })
    }
}

fn var<F>(env: &F, k: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    env(k).map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
