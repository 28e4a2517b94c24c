//! Google Gemini service for answer generation.
//!
//! Minimal, non-streaming client around the Generative Language REST API:
//! - POST {endpoint}/v1beta/{model}:generateContent
//!
//! Constructor validation:
//! - `cfg.provider` must be `LlmProvider::Gemini`
//! - `cfg.endpoint` must start with http:// or https://
//!
//! The API key is checked per call, so a process without one still starts and
//! reports the problem on the first `/ask`.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::{
    config::{
        generation_params::GenerationParams, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::{
        AiLlmError, ConfigError, HttpError, ProviderError, ProviderErrorKind, make_snippet,
        validate_http_endpoint,
    },
};

/// Thin client for the Gemini `generateContent` endpoint.
#[derive(Debug)]
pub struct GeminiService {
    client: reqwest::Client,
    cfg: LlmModelConfig,
    url_generate: String,
}

impl GeminiService {
    /// Creates a new [`GeminiService`] from the given config.
    ///
    /// # Errors
    /// - [`ConfigError::InvalidFormat`] if the provider is not Gemini or the endpoint is invalid
    /// - [`AiLlmError::HttpTransport`] if the HTTP client cannot be built
    pub fn new(cfg: LlmModelConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::Gemini {
            return Err(ConfigError::InvalidFormat {
                var: "USE_BEDROCK_LLM",
                reason: "Gemini service built for a non-Gemini provider",
            }
            .into());
        }
        let endpoint = cfg.endpoint.trim();
        validate_http_endpoint("GEMINI_ENDPOINT", endpoint)?;

        let timeout = Duration::from_secs(cfg.timeout_secs.unwrap_or(60));
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        let model = if cfg.model.starts_with("models/") {
            cfg.model.clone()
        } else {
            format!("models/{}", cfg.model)
        };
        let url_generate = format!(
            "{}/v1beta/{}:generateContent",
            endpoint.trim_end_matches('/'),
            model
        );

        info!(
            model = %cfg.model,
            endpoint = %cfg.endpoint,
            timeout_secs = timeout.as_secs(),
            has_api_key = cfg.api_key.is_some(),
            "GeminiService initialized"
        );

        Ok(Self {
            client,
            cfg,
            url_generate,
        })
    }

    /// Sends one prompt and returns the trimmed answer text.
    ///
    /// The answer is the concatenation of the text parts of the first
    /// candidate; a response without candidates yields an empty string.
    ///
    /// # Errors
    /// - [`ProviderErrorKind::MissingApiKey`] before any request if no key is configured
    /// - [`ProviderErrorKind::HttpStatus`] for non-2xx responses
    /// - [`ProviderErrorKind::Decode`] if the JSON cannot be parsed
    /// - [`AiLlmError::HttpTransport`] for client/network failures
    #[instrument(skip_all, fields(model = %self.cfg.model, prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, AiLlmError> {
        let api_key = self.cfg.api_key.as_deref().ok_or_else(|| {
            ProviderError::new(LlmProvider::Gemini, ProviderErrorKind::MissingApiKey)
        })?;

        let started = Instant::now();
        let body = GenerateContentRequest::new(prompt, params);
        debug!("POST {}", self.url_generate);

        let resp = self
            .client
            .post(&self.url_generate)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let url = self.url_generate.clone();
            let text = resp.text().await.unwrap_or_default();
            let snippet = make_snippet(&text);

            error!(
                %status,
                %url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Gemini generateContent returned non-success status"
            );

            return Err(ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::HttpStatus(HttpError {
                    status,
                    url,
                    snippet,
                }),
            )
            .into());
        }

        let out: GenerateContentResponse = resp.json().await.map_err(|e| {
            error!(error = %e, "failed to decode generateContent response");
            ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::Decode(format!(
                    "serde error: {e}; expected `candidates[0].content.parts[*].text`"
                )),
            )
        })?;

        let answer = out.first_text();
        info!(
            latency_ms = started.elapsed().as_millis(),
            answer_len = answer.len(),
            "generateContent completed"
        );
        Ok(answer)
    }
}

/* ===========================================================================
HTTP payloads
======================================================================== */

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

impl<'a> GenerateContentRequest<'a> {
    fn new(prompt: &'a str, params: &GenerationParams) -> Self {
        Self {
            contents: [Content {
                role: "user",
                parts: [Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_tokens,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'a str,
    parts: [Part<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

impl GenerateContentResponse {
    fn first_text(self) -> String {
        let Some(candidate) = self.candidates.into_iter().next() else {
            return String::new();
        };
        let joined: String = candidate
            .content
            .map(|c| c.parts)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|p| p.text)
            .collect();
        joined.trim().to_string()
    }
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<PartOut>,
}

#[derive(Debug, Deserialize)]
struct PartOut {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use super::*;

    type Seen = Arc<Mutex<Vec<(Option<String>, Value)>>>;

    async fn fake_gemini(status: StatusCode, reply: Value) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let captured = seen.clone();
        let app = Router::new().route(
            "/v1beta/models/gemini-test:generateContent",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                let reply = reply.clone();
                async move {
                    let key = headers
                        .get("x-goog-api-key")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    captured.lock().unwrap().push((key, body));
                    (status, Json(reply))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn cfg(endpoint: &str, api_key: Option<&str>) -> LlmModelConfig {
        LlmModelConfig {
            provider: LlmProvider::Gemini,
            model: "gemini-test".into(),
            endpoint: endpoint.into(),
            api_key: api_key.map(str::to_string),
            timeout_secs: Some(5),
        }
    }

    #[tokio::test]
    async fn sends_prompt_and_sampling_and_joins_parts() {
        let reply = json!({
            "candidates": [
                {"content": {"parts": [{"text": "  Paris"}, {"text": " is the capital. "}]}},
                {"content": {"parts": [{"text": "ignored"}]}}
            ]
        });
        let (endpoint, seen) = fake_gemini(StatusCode::OK, reply).await;
        let svc = GeminiService::new(cfg(&endpoint, Some("k-1"))).unwrap();
        let params = GenerationParams {
            temperature: 0.3,
            top_p: 0.5,
            top_k: 7,
            max_tokens: 99,
        };

        let answer = svc.generate("the prompt", &params).await.unwrap();
        assert_eq!(answer, "Paris is the capital.");

        let seen = seen.lock().unwrap();
        let (key, body) = &seen[0];
        assert_eq!(key.as_deref(), Some("k-1"));
        assert_eq!(body["contents"][0]["role"], "user");
        assert_eq!(body["contents"][0]["parts"][0]["text"], "the prompt");
        let gc = &body["generationConfig"];
        assert_eq!(gc["topK"], 7);
        assert_eq!(gc["maxOutputTokens"], 99);
        assert!((gc["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);
        assert!((gc["topP"].as_f64().unwrap() - 0.5).abs() < 1e-6);
    }

    #[tokio::test]
    async fn no_candidates_is_an_empty_answer() {
        let (endpoint, _) = fake_gemini(StatusCode::OK, json!({})).await;
        let svc = GeminiService::new(cfg(&endpoint, Some("k"))).unwrap();
        let answer = svc
            .generate("p", &GenerationParams::default())
            .await
            .unwrap();
        assert_eq!(answer, "");
    }

    #[tokio::test]
    async fn non_success_status_is_reported() {
        let (endpoint, _) =
            fake_gemini(StatusCode::FORBIDDEN, json!({"error": "bad key"})).await;
        let svc = GeminiService::new(cfg(&endpoint, Some("k"))).unwrap();
        let err = svc
            .generate("p", &GenerationParams::default())
            .await
            .unwrap_err();
        match err {
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::HttpStatus(http),
                ..
            }) => {
                assert_eq!(http.status, StatusCode::FORBIDDEN);
                assert!(http.snippet.contains("bad key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let (endpoint, seen) = fake_gemini(StatusCode::OK, json!({})).await;
        let svc = GeminiService::new(cfg(&endpoint, None)).unwrap();
        let err = svc
            .generate("p", &GenerationParams::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                kind: ProviderErrorKind::MissingApiKey,
                ..
            })
        ));
        assert!(seen.lock().unwrap().is_empty());
    }

    #[test]
    fn bare_model_names_get_the_models_prefix() {
        let svc = GeminiService::new(cfg("http://localhost:1/", Some("k"))).unwrap();
        assert_eq!(
            svc.url_generate,
            "http://localhost:1/v1beta/models/gemini-test:generateContent"
        );
    }
}
