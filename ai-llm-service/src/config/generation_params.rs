use serde::Serialize;

use crate::error_handler::{ConfigError, Result, validate_range_f32, var_opt_num};

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 1.0;
/// Default nucleus-sampling threshold.
pub const DEFAULT_TOP_P: f32 = 0.95;
/// Default number of candidate tokens considered per step.
pub const DEFAULT_TOP_K: u32 = 40;
/// Default maximum answer length in tokens.
pub const DEFAULT_MAX_TOKENS: u32 = 1024;

/// Sampling parameters for one generation call.
///
/// Both backends receive all four values; neither is allowed to ignore one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            top_p: DEFAULT_TOP_P,
            top_k: DEFAULT_TOP_K,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

impl GenerationParams {
    /// Reads process-wide defaults from `LLM_TEMPERATURE`, `LLM_TOP_P`,
    /// `LLM_TOP_K` and `LLM_MAX_TOKENS`, falling back to the constants above.
    ///
    /// # Errors
    /// Fails on unparsable numbers or values outside the accepted ranges.
    pub fn from_lookup<F>(env: &F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let params = Self {
            temperature: var_opt_num(env, "LLM_TEMPERATURE", "expected f32")?
                .unwrap_or(DEFAULT_TEMPERATURE),
            top_p: var_opt_num(env, "LLM_TOP_P", "expected f32")?.unwrap_or(DEFAULT_TOP_P),
            top_k: var_opt_num(env, "LLM_TOP_K", "expected u32")?.unwrap_or(DEFAULT_TOP_K),
            max_tokens: var_opt_num(env, "LLM_MAX_TOKENS", "expected u32")?
                .unwrap_or(DEFAULT_MAX_TOKENS),
        };
        params.validate()?;
        Ok(params)
    }

    /// Checks every field against the range both backends accept.
    ///
    /// # Errors
    /// Returns [`ConfigError::OutOfRange`] naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate_range_f32(
            "temperature",
            self.temperature,
            0.0,
            2.0,
            "expected 0.0..=2.0",
        )?;
        validate_range_f32("top_p", self.top_p, 0.0, 1.0, "expected 0.0..=1.0")?;
        if self.top_k == 0 {
            return Err(ConfigError::OutOfRange {
                field: "llm_top_k",
                detail: "expected >= 1",
            }
            .into());
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::OutOfRange {
                field: "max_tokens",
                detail: "expected >= 1",
            }
            .into());
        }
        Ok(())
    }
}
