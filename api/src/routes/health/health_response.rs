use serde::Serialize;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    /// Documents under `documents/`; `0` when the count could not be taken.
    pub document_count: u64,
    pub knowledge_base_configured: bool,
    pub s3_bucket_configured: bool,
    /// `"gemini"` or `"bedrock"`.
    pub llm: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_ingestion: Option<LastIngestion>,
}

#[derive(Debug, Serialize)]
pub struct LastIngestion {
    pub status: String,
    pub started_at: String,
}
