//! Configuration for the knowledge base, its data source and the document bucket.

/// Default AWS region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Object prefix for uploaded documents.
pub const DOCUMENT_PREFIX: &str = "documents/";

/// Identifiers and endpoints for the Bedrock Knowledge Base and S3 bucket.
///
/// Identifiers are optional at startup; operations that need one fail with
/// [`crate::KbError::NotConfigured`] when it is missing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KbConfig {
    pub region: String,
    pub knowledge_base_id: Option<String>,
    pub data_source_id: Option<String>,
    pub bucket: Option<String>,
    /// Base URL for the ingestion-job API (`bedrock-agent`).
    pub agent_endpoint: String,
    /// Base URL for the retrieve API (`bedrock-agent-runtime`).
    pub agent_runtime_endpoint: String,
    /// Model ARN used when reranking is requested.
    pub rerank_model_arn: String,
}

impl KbConfig {
    /// Loads from the process environment.
    ///
    /// Env:
    /// - `AWS_REGION` (default `us-east-1`)
    /// - `KNOWLEDGE_BASE_ID`, `DATA_SOURCE_ID`, `S3_BUCKET_NAME` (optional)
    /// - `BEDROCK_AGENT_ENDPOINT`, `BEDROCK_AGENT_RUNTIME_ENDPOINT` (regional defaults)
    /// - `RERANK_MODEL_ARN` (defaults to `amazon.rerank-v1:0` in the region)
    pub fn from_env() -> Result<Self, crate::KbError> {
        Self::from_lookup(&|name: &str| std::env::var(name).ok())
    }

    /// Same as [`KbConfig::from_env`] over an arbitrary lookup.
    pub fn from_lookup<F>(env: &F) -> Result<Self, crate::KbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| env(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let region = var("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        let agent_endpoint = var("BEDROCK_AGENT_ENDPOINT")
            .unwrap_or_else(|| format!("https://bedrock-agent.{region}.amazonaws.com"));
        let agent_runtime_endpoint = var("BEDROCK_AGENT_RUNTIME_ENDPOINT")
            .unwrap_or_else(|| format!("https://bedrock-agent-runtime.{region}.amazonaws.com"));
        let rerank_model_arn = var("RERANK_MODEL_ARN").unwrap_or_else(|| {
            format!("arn:aws:bedrock:{region}::foundation-model/amazon.rerank-v1:0")
        });

        Ok(Self {
            knowledge_base_id: var("KNOWLEDGE_BASE_ID"),
            data_source_id: var("DATA_SOURCE_ID"),
            bucket: var("S3_BUCKET_NAME"),
            agent_endpoint: agent_endpoint.trim_end_matches('/').to_string(),
            agent_runtime_endpoint: agent_runtime_endpoint.trim_end_matches('/').to_string(),
            rerank_model_arn,
            region,
        })
    }

    pub(crate) fn require_kb(&self) -> Result<&str, crate::KbError> {
        self.knowledge_base_id
            .as_deref()
            .ok_or(crate::KbError::NotConfigured("KNOWLEDGE_BASE_ID"))
    }

    pub(crate) fn require_data_source(&self) -> Result<&str, crate::KbError> {
        self.data_source_id
            .as_deref()
            .ok_or(crate::KbError::NotConfigured("DATA_SOURCE_ID"))
    }
}
