//! In-memory capability fakes and request helpers for handler tests.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use ai_llm_service::{
    AiLlmError, AnswerGenerator, GenerationParams,
    config::llm_provider::LlmProvider,
    error_handler::{ProviderError, ProviderErrorKind},
};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bytes::Bytes;
use contextor::AskDefaults;
use knowledge_base::{
    DocumentStore, IngestionJob, KbError, KbResult, KnowledgeBase, RetrievalRequest, SearchType,
    object_key,
};
use serde_json::Value;
use tower::ServiceExt;

use crate::{AppConfig, AppState, router};

pub const BOUNDARY: &str = "rag-web-test-boundary";

pub fn downstream(msg: &str) -> KbError {
    KbError::Sdk {
        service: "fake",
        message: msg.to_string(),
    }
}

pub fn job(id: &str, status: &str) -> IngestionJob {
    serde_json::from_value(serde_json::json!({
        "ingestionJobId": id,
        "status": status,
        "startedAt": "2025-03-01T12:00:00Z",
        "updatedAt": "2025-03-01T12:05:00Z",
    }))
    .unwrap()
}

#[derive(Clone, Debug, PartialEq)]
pub struct SeenQuery {
    pub query: String,
    pub top_k: u32,
    pub search_type: SearchType,
    pub reranking: bool,
    pub filter: Option<Value>,
}

#[derive(Default)]
pub struct FakeKb {
    pub configured: bool,
    pub chunks: Vec<String>,
    pub fail_retrieve: bool,
    pub fail_start: bool,
    pub latest: Option<IngestionJob>,
    pub fail_latest: bool,
    pub jobs: Vec<IngestionJob>,
    pub fail_lookup: bool,
    pub queries: Mutex<Vec<SeenQuery>>,
    pub starts: AtomicUsize,
}

impl FakeKb {
    pub fn with_chunks(chunks: &[&str]) -> Self {
        Self {
            configured: true,
            chunks: chunks.iter().map(|c| c.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn start_calls(&self) -> usize {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<SeenQuery> {
        self.queries.lock().unwrap().clone()
    }
}

impl KnowledgeBase for FakeKb {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn retrieve(&self, req: &RetrievalRequest<'_>) -> KbResult<Vec<String>> {
        self.queries.lock().unwrap().push(SeenQuery {
            query: req.query.to_string(),
            top_k: req.top_k,
            search_type: req.search_type,
            reranking: req.reranking,
            filter: req.filter.cloned(),
        });
        if self.fail_retrieve {
            return Err(downstream("retrieve failed"));
        }
        Ok(self.chunks.clone())
    }

    async fn start_ingestion(&self) -> KbResult<String> {
        let n = self.starts.fetch_add(1, Ordering::SeqCst);
        if self.fail_start {
            return Err(downstream("sync refused"));
        }
        Ok(format!("job-{}", n + 1))
    }

    async fn latest_ingestion(&self) -> KbResult<Option<IngestionJob>> {
        if self.fail_latest {
            return Err(downstream("list failed"));
        }
        Ok(self.latest.clone())
    }

    async fn ingestion_job(&self, job_id: &str) -> KbResult<Option<IngestionJob>> {
        if self.fail_lookup {
            return Err(downstream("lookup failed"));
        }
        Ok(self.jobs.iter().find(|j| j.job_id == job_id).cloned())
    }
}

#[derive(Default)]
pub struct FakeDocs {
    pub configured: bool,
    pub count: u64,
    pub fail_count: bool,
    /// Filename whose upload fails.
    pub fail_put_for: Option<String>,
    pub stored: Mutex<Vec<(String, Bytes)>>,
}

impl FakeDocs {
    pub fn stored_keys(&self) -> Vec<String> {
        self.stored.lock().unwrap().iter().map(|(k, _)| k.clone()).collect()
    }
}

impl DocumentStore for FakeDocs {
    fn is_configured(&self) -> bool {
        self.configured
    }

    async fn put_document(&self, filename: &str, body: Bytes) -> KbResult<String> {
        if self.fail_put_for.as_deref() == Some(filename) {
            return Err(downstream("access denied"));
        }
        let key = object_key(filename)
            .ok_or_else(|| KbError::InvalidRequest(format!("bad filename `{filename}`")))?;
        self.stored.lock().unwrap().push((key.clone(), body));
        Ok(key)
    }

    async fn document_count(&self) -> KbResult<u64> {
        if self.fail_count {
            return Err(downstream("list objects failed"));
        }
        Ok(self.count)
    }
}

#[derive(Clone, Debug)]
pub struct SeenGeneration {
    pub context: String,
    pub question: String,
    pub params: GenerationParams,
}

pub struct FakeLlm {
    pub name: &'static str,
    pub fail: bool,
    pub calls: Mutex<Vec<SeenGeneration>>,
}

impl FakeLlm {
    pub fn named(name: &'static str) -> Self {
        Self {
            name,
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> Vec<SeenGeneration> {
        self.calls.lock().unwrap().clone()
    }
}

impl AnswerGenerator for FakeLlm {
    fn backend_name(&self) -> &'static str {
        self.name
    }

    async fn generate(
        &self,
        context: &str,
        question: &str,
        params: &GenerationParams,
    ) -> Result<String, AiLlmError> {
        self.calls.lock().unwrap().push(SeenGeneration {
            context: context.to_string(),
            question: question.to_string(),
            params: *params,
        });
        if self.fail {
            return Err(ProviderError::new(
                LlmProvider::Gemini,
                ProviderErrorKind::Sdk("quota exceeded".into()),
            )
            .into());
        }
        Ok(format!("{} says hi", self.name))
    }
}

pub type TestState = Arc<AppState<FakeKb, FakeDocs, FakeLlm>>;

pub fn state(kb: FakeKb, docs: FakeDocs, llm: FakeLlm) -> TestState {
    let config = AppConfig::from_lookup(&|_: &str| None).unwrap();
    Arc::new(AppState::new(kb, docs, llm, AskDefaults::default(), config))
}

/// Sends `req` through a fresh router and returns status and JSON body.
pub async fn call(state: &TestState, req: Request<Body>) -> (StatusCode, Value) {
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

pub fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

pub fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Multipart request with one part per `(field, filename, content)`.
pub fn post_multipart(uri: &str, parts: &[(&str, &str, &str)]) -> Request<Body> {
    let mut body = String::new();
    for (field, filename, content) in parts {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n{content}\r\n"
        ));
    }
    body.push_str(&format!("--{BOUNDARY}--\r\n"));

    Request::post(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}
