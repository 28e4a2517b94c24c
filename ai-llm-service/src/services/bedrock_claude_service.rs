//! Anthropic Claude on Amazon Bedrock.
//!
//! Calls `InvokeModel` with the Anthropic Messages body:
//!
//! ```json
//! {"anthropic_version": "bedrock-2023-05-31", "max_tokens": 1024,
//!  "temperature": 1.0, "top_p": 0.95, "top_k": 40,
//!  "messages": [{"role": "user", "content": "<prompt>"}]}
//! ```
//!
//! Credentials and region come from the shared AWS config; the answer is
//! `content[0].text`, trimmed.

use std::time::Instant;

use aws_config::SdkConfig;
use aws_sdk_bedrockruntime::{Client, error::DisplayErrorContext, primitives::Blob};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument};

use crate::{
    config::{
        generation_params::GenerationParams, llm_model_config::LlmModelConfig,
        llm_provider::LlmProvider,
    },
    error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind},
};

const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

/// Bedrock runtime client bound to one Claude model id.
#[derive(Debug)]
pub struct BedrockClaudeService {
    client: Client,
    model_id: String,
}

impl BedrockClaudeService {
    /// Creates the service from a Bedrock config and the shared AWS config.
    ///
    /// # Errors
    /// [`ConfigError::InvalidFormat`] if `cfg.provider` is not Bedrock Claude.
    pub fn new(cfg: LlmModelConfig, aws: &SdkConfig) -> Result<Self, AiLlmError> {
        if cfg.provider != LlmProvider::BedrockClaude {
            return Err(ConfigError::InvalidFormat {
                var: "USE_BEDROCK_LLM",
                reason: "Bedrock service built for a non-Bedrock provider",
            }
            .into());
        }
        info!(
            model_id = %cfg.model,
            region = ?aws.region(),
            "BedrockClaudeService initialized"
        );
        Ok(Self {
            client: Client::new(aws),
            model_id: cfg.model,
        })
    }

    /// Sends one prompt through `InvokeModel` and returns the trimmed answer.
    ///
    /// # Errors
    /// - [`ProviderErrorKind::Sdk`] for any SDK/service failure
    /// - [`ProviderErrorKind::Decode`] if the response body is not the expected shape
    /// - [`AiLlmError::Json`] if the request body cannot be serialized
    #[instrument(skip_all, fields(model_id = %self.model_id, prompt_len = prompt.len()))]
    pub async fn generate(
        &self,
        prompt: &str,
        params: &GenerationParams,
    ) -> Result<String, AiLlmError> {
        let started = Instant::now();
        let body = build_invoke_body(prompt, params)?;
        debug!(body_len = body.len(), "InvokeModel");

        let resp = self
            .client
            .invoke_model()
            .model_id(&self.model_id)
            .content_type("application/json")
            .accept("application/json")
            .body(Blob::new(body))
            .send()
            .await
            .map_err(|e| {
                let msg = DisplayErrorContext(&e).to_string();
                error!(error = %msg, latency_ms = started.elapsed().as_millis(), "InvokeModel failed");
                ProviderError::new(LlmProvider::BedrockClaude, ProviderErrorKind::Sdk(msg))
            })?;

        let answer = parse_invoke_response(resp.body().as_ref())?;
        info!(
            latency_ms = started.elapsed().as_millis(),
            answer_len = answer.len(),
            "InvokeModel completed"
        );
        Ok(answer)
    }
}

/// Serializes the Anthropic Messages request body.
pub(crate) fn build_invoke_body(
    prompt: &str,
    params: &GenerationParams,
) -> Result<Vec<u8>, AiLlmError> {
    let req = InvokeRequest {
        anthropic_version: ANTHROPIC_VERSION,
        max_tokens: params.max_tokens,
        temperature: params.temperature,
        top_p: params.top_p,
        top_k: params.top_k,
        messages: [Message {
            role: "user",
            content: prompt,
        }],
    };
    Ok(serde_json::to_vec(&req)?)
}

/// Extracts `content[0].text`, trimmed.
pub(crate) fn parse_invoke_response(bytes: &[u8]) -> Result<String, AiLlmError> {
    let out: InvokeResponse = serde_json::from_slice(bytes).map_err(|e| {
        ProviderError::new(
            LlmProvider::BedrockClaude,
            ProviderErrorKind::Decode(format!("serde error: {e}; expected `content[0].text`")),
        )
    })?;
    out.content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .map(|t| t.trim().to_string())
        .ok_or_else(|| {
            ProviderError::new(
                LlmProvider::BedrockClaude,
                ProviderErrorKind::Decode("empty `content` in InvokeModel response".into()),
            )
            .into()
        })
}

#[derive(Debug, Serialize)]
struct InvokeRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use aws_config::{BehaviorVersion, Region};
    use aws_sdk_bedrockruntime::config::{Credentials, SharedCredentialsProvider};
    use axum::{
        Json, Router,
        body::Bytes,
        http::{HeaderMap, HeaderValue, StatusCode, Uri},
    };
    use serde_json::{Value, json};

    use super::*;

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// Bedrock runtime stand-in answering every request with `reply`.
    async fn fake_runtime(
        status: StatusCode,
        error_type: Option<&'static str>,
        reply: Value,
    ) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let captured = seen.clone();
        let app = Router::new().fallback(move |uri: Uri, body: Bytes| {
            let captured = captured.clone();
            let reply = reply.clone();
            async move {
                let sent: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
                captured.lock().unwrap().push((uri.path().to_string(), sent));
                let mut headers = HeaderMap::new();
                if let Some(t) = error_type {
                    headers.insert("x-amzn-errortype", HeaderValue::from_static(t));
                }
                (status, headers, Json(reply))
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}"), seen)
    }

    fn service_at(endpoint: &str) -> BedrockClaudeService {
        let aws = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("us-east-1"))
            .endpoint_url(endpoint)
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "AKIDEXAMPLE",
                "SECRET",
                None,
                None,
                "test",
            )))
            .build();
        let cfg = LlmModelConfig {
            provider: LlmProvider::BedrockClaude,
            model: "anthropic.claude-test".into(),
            endpoint: String::new(),
            api_key: None,
            timeout_secs: None,
        };
        BedrockClaudeService::new(cfg, &aws).unwrap()
    }

    #[tokio::test]
    async fn invoke_model_round_trip() {
        let reply = json!({"id": "msg_1", "content": [{"type": "text", "text": "  Berlin. \n"}]});
        let (url, seen) = fake_runtime(StatusCode::OK, None, reply).await;
        let svc = service_at(&url);
        let params = GenerationParams {
            max_tokens: 64,
            ..Default::default()
        };

        let answer = svc.generate("What is the capital?", &params).await.unwrap();

        assert_eq!(answer, "Berlin.");
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "/model/anthropic.claude-test/invoke");
        assert_eq!(seen[0].1["max_tokens"], 64);
        assert_eq!(seen[0].1["messages"][0]["content"], "What is the capital?");
    }

    #[tokio::test]
    async fn service_errors_surface_as_sdk_errors() {
        let (url, seen) = fake_runtime(
            StatusCode::BAD_REQUEST,
            Some("ValidationException"),
            json!({"message": "malformed input"}),
        )
        .await;
        let svc = service_at(&url);

        let err = svc.generate("q", &GenerationParams::default()).await.unwrap_err();

        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                provider: LlmProvider::BedrockClaude,
                kind: ProviderErrorKind::Sdk(_),
            })
        ));
        assert_eq!(seen.lock().unwrap().len(), 1);
    }

    #[test]
    fn body_carries_every_sampling_field() {
        let params = GenerationParams {
            temperature: 0.5,
            top_p: 0.25,
            top_k: 12,
            max_tokens: 300,
        };
        let bytes = build_invoke_body("hello", &params).unwrap();
        let v: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(v["anthropic_version"], "bedrock-2023-05-31");
        assert_eq!(v["max_tokens"], 300);
        assert_eq!(v["top_k"], 12);
        assert_eq!(v["temperature"], 0.5);
        assert_eq!(v["top_p"], 0.25);
        assert_eq!(v["messages"][0]["role"], "user");
        assert_eq!(v["messages"][0]["content"], "hello");
    }

    #[test]
    fn answer_is_first_text_block_trimmed() {
        let raw = br#"{"id":"x","content":[{"type":"text","text":"  42 \n"},{"type":"text","text":"no"}]}"#;
        assert_eq!(parse_invoke_response(raw).unwrap(), "42");
    }

    #[test]
    fn empty_content_is_a_decode_error() {
        let err = parse_invoke_response(br#"{"content":[]}"#).unwrap_err();
        assert!(matches!(
            err,
            AiLlmError::Provider(ProviderError {
                provider: LlmProvider::BedrockClaude,
                kind: ProviderErrorKind::Decode(_),
            })
        ));
        assert!(parse_invoke_response(b"not json").is_err());
    }
}
