//! SigV4-signed JSON transport for the Bedrock Agent REST APIs.
//!
//! Both `bedrock-agent` (ingestion jobs) and `bedrock-agent-runtime`
//! (retrieve) sign under the `bedrock` service name.

use std::time::{Instant, SystemTime};

use aws_config::SdkConfig;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::{
    http_request::{SignableBody, SignableRequest, SigningParams, SigningSettings, sign},
    sign::v4,
};
use aws_smithy_runtime_api::client::identity::Identity;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::errors::{KbError, KbResult, make_snippet};

const SIGNING_NAME: &str = "bedrock";

/// Shared HTTP client plus the credentials to sign with.
#[derive(Clone, Debug)]
pub(crate) struct AgentHttp {
    client: reqwest::Client,
    credentials: Option<SharedCredentialsProvider>,
    region: String,
}

impl AgentHttp {
    /// Builds the transport from the loaded AWS config.
    pub(crate) fn new(aws: &SdkConfig, region: &str) -> KbResult<Self> {
        Self::with_credentials(aws.credentials_provider(), region)
    }

    pub(crate) fn with_credentials(
        credentials: Option<SharedCredentialsProvider>,
        region: &str,
    ) -> KbResult<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            credentials,
            region: region.to_string(),
        })
    }

    /// Sends a signed JSON request and decodes a 2xx body as `T`.
    ///
    /// # Errors
    /// - [`KbError::HttpStatus`] for non-2xx answers (see [`KbError::is_not_found`])
    /// - [`KbError::Credentials`] / [`KbError::Signing`] before anything is sent
    /// - [`KbError::Transport`] / [`KbError::Parse`] otherwise
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        service: &'static str,
        method: Method,
        url: &str,
        body: Option<&Value>,
    ) -> KbResult<T> {
        let started = Instant::now();
        let payload = match body {
            Some(v) => serde_json::to_vec(v)?,
            None => Vec::new(),
        };

        let signed = self.sign_headers(method.as_str(), url, &payload).await?;
        debug!(service, %method, url, body_len = payload.len(), "signed request");

        let mut req = self.client.request(method, url);
        if body.is_some() {
            req = req.header("content-type", "application/json").body(payload);
        }
        for (name, value) in signed {
            req = req.header(name, value);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            let snippet = make_snippet(&text);
            error!(
                service,
                %status,
                url,
                %snippet,
                latency_ms = started.elapsed().as_millis(),
                "Bedrock Agent call returned non-success status"
            );
            return Err(KbError::HttpStatus {
                service,
                status,
                snippet,
            });
        }

        debug!(
            service,
            latency_ms = started.elapsed().as_millis(),
            "Bedrock Agent call completed"
        );
        Ok(serde_json::from_str(&text)?)
    }

    /// Computes the SigV4 headers (`authorization`, `x-amz-date`, ...) for one request.
    async fn sign_headers(
        &self,
        method: &str,
        url: &str,
        payload: &[u8],
    ) -> KbResult<Vec<(String, String)>> {
        let provider = self
            .credentials
            .as_ref()
            .ok_or_else(|| KbError::Credentials("no AWS credentials provider configured".into()))?;
        let creds = provider
            .provide_credentials()
            .await
            .map_err(|e| KbError::Credentials(e.to_string()))?;
        let identity = Identity::from(creds);

        let content_type = [("content-type", "application/json")];
        let headers = if payload.is_empty() {
            &content_type[..0]
        } else {
            &content_type[..]
        };

        let signable = SignableRequest::new(
            method,
            url,
            headers.iter().copied(),
            SignableBody::Bytes(payload),
        )
        .map_err(|e| KbError::Signing(e.to_string()))?;

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SIGNING_NAME)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| KbError::Signing(e.to_string()))?
            .into();

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| KbError::Signing(e.to_string()))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}

#[cfg(test)]
pub(crate) fn test_transport() -> AgentHttp {
    use aws_credential_types::Credentials;

    let creds = Credentials::new("AKIDEXAMPLE", "SECRET", None, None, "test");
    AgentHttp::with_credentials(Some(SharedCredentialsProvider::new(creds)), "us-east-1")
        .expect("test transport")
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use axum::{Json, Router, http::HeaderMap, http::StatusCode, routing::post};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn requests_carry_a_sigv4_authorization_header() {
        let seen: Arc<Mutex<Option<String>>> = Arc::default();
        let captured = seen.clone();
        let app = Router::new().route(
            "/echo",
            post(move |headers: HeaderMap, Json(body): Json<Value>| {
                let captured = captured.clone();
                async move {
                    *captured.lock().unwrap() = headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    (StatusCode::OK, Json(body))
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        let http = test_transport();
        let out: Value = http
            .call(
                "test",
                Method::POST,
                &format!("http://{addr}/echo"),
                Some(&json!({"a": 1})),
            )
            .await
            .unwrap();
        assert_eq!(out, json!({"a": 1}));

        let auth = seen.lock().unwrap().clone().unwrap();
        assert!(auth.starts_with("AWS4-HMAC-SHA256 Credential=AKIDEXAMPLE/"), "{auth}");
        assert!(auth.contains("/us-east-1/bedrock/aws4_request"), "{auth}");
    }

    #[tokio::test]
    async fn missing_credentials_fail_before_sending() {
        let http = AgentHttp::with_credentials(None, "us-east-1").unwrap();
        let err = http
            .call::<Value>("test", Method::GET, "http://127.0.0.1:9/none", None)
            .await
            .unwrap_err();
        assert!(matches!(err, KbError::Credentials(_)));
    }
}
