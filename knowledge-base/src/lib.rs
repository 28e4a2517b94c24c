//! Bedrock Knowledge Base access: retrieval, ingestion jobs and document storage.
//!
//! This crate provides:
//! - [`KnowledgeBase`]: retrieve chunks and drive ingestion jobs
//! - [`DocumentStore`]: put documents into the source bucket and count them
//!
//! The production implementations are [`BedrockKnowledgeBase`] (SigV4-signed
//! REST calls) and [`S3DocumentStore`] (AWS SDK). Handlers depend only on the
//! traits, so tests can substitute in-memory fakes.

mod config;
mod documents;
mod errors;
mod filters;
mod ingestion;
mod record;
mod retrieve;
mod signing;

use std::{future::Future, time::Instant};

use aws_config::SdkConfig;
use bytes::Bytes;
use reqwest::Method;
use tracing::{debug, info, instrument};

pub use config::{DEFAULT_REGION, DOCUMENT_PREFIX, KbConfig};
pub use documents::{S3DocumentStore, object_key};
pub use errors::{KbError, KbResult};
pub use filters::normalize_filter;
pub use record::{IngestionJob, RetrievalRequest, SearchType};
pub use retrieve::{MAX_RESULTS, build_retrieve_body};

use crate::{
    ingestion::{JobEnvelope, JobList, job_url, jobs_url, latest_job_query, start_job_body},
    retrieve::RetrieveResponse,
    signing::AgentHttp,
};

/// Retrieval and ingestion-job operations against one knowledge base.
pub trait KnowledgeBase: Send + Sync + 'static {
    /// `true` when a knowledge-base id is configured.
    fn is_configured(&self) -> bool;

    /// Ordered chunk texts for `req`; an empty vector means "no matches".
    fn retrieve(
        &self,
        req: &RetrievalRequest<'_>,
    ) -> impl Future<Output = KbResult<Vec<String>>> + Send;

    /// Starts an ingestion job and returns its id.
    fn start_ingestion(&self) -> impl Future<Output = KbResult<String>> + Send;

    /// Most recently started job, or `None` when there is none (or ids are unset).
    fn latest_ingestion(&self) -> impl Future<Output = KbResult<Option<IngestionJob>>> + Send;

    /// Job by id; `Ok(None)` only when the service reports it does not exist.
    fn ingestion_job(
        &self,
        job_id: &str,
    ) -> impl Future<Output = KbResult<Option<IngestionJob>>> + Send;
}

/// Object storage holding the knowledge base's source documents.
pub trait DocumentStore: Send + Sync + 'static {
    /// `true` when a bucket is configured.
    fn is_configured(&self) -> bool;

    /// Stores `body` under `documents/<basename>` and returns the key.
    fn put_document(
        &self,
        filename: &str,
        body: Bytes,
    ) -> impl Future<Output = KbResult<String>> + Send;

    /// Number of documents under the `documents/` prefix.
    fn document_count(&self) -> impl Future<Output = KbResult<u64>> + Send;
}

/// [`KnowledgeBase`] backed by the Bedrock Agent REST APIs.
#[derive(Clone, Debug)]
pub struct BedrockKnowledgeBase {
    cfg: KbConfig,
    http: AgentHttp,
}

impl BedrockKnowledgeBase {
    /// Builds the client; credentials are resolved from `aws` on each call.
    ///
    /// # Errors
    /// [`KbError::Transport`] if the HTTP client cannot be built.
    pub fn new(cfg: KbConfig, aws: &SdkConfig) -> KbResult<Self> {
        let http = AgentHttp::new(aws, &cfg.region)?;
        Ok(Self { cfg, http })
    }

    #[cfg(test)]
    fn with_transport(cfg: KbConfig, http: AgentHttp) -> Self {
        Self { cfg, http }
    }
}

impl KnowledgeBase for BedrockKnowledgeBase {
    fn is_configured(&self) -> bool {
        self.cfg.knowledge_base_id.is_some()
    }

    #[instrument(skip_all, fields(top_k = req.top_k, search_type = %req.search_type, reranking = req.reranking))]
    async fn retrieve(&self, req: &RetrievalRequest<'_>) -> KbResult<Vec<String>> {
        let kb = self.cfg.require_kb()?;
        let body = build_retrieve_body(req, &self.cfg.rerank_model_arn)?;
        let url = format!(
            "{}/knowledgebases/{}/retrieve",
            self.cfg.agent_runtime_endpoint,
            urlencoding::encode(kb)
        );
        let started = Instant::now();

        let resp: RetrieveResponse = self
            .http
            .call("bedrock-agent-runtime", Method::POST, &url, Some(&body))
            .await?;
        let chunks = resp.into_chunks();

        info!(
            chunks = chunks.len(),
            latency_ms = started.elapsed().as_millis(),
            "retrieval completed"
        );
        Ok(chunks)
    }

    #[instrument(skip_all)]
    async fn start_ingestion(&self) -> KbResult<String> {
        let kb = self.cfg.require_kb()?;
        let ds = self.cfg.require_data_source()?;
        let url = jobs_url(&self.cfg.agent_endpoint, kb, ds);

        let out: JobEnvelope = self
            .http
            .call("bedrock-agent", Method::PUT, &url, Some(&start_job_body()))
            .await?;
        info!(job_id = %out.ingestion_job.job_id, status = %out.ingestion_job.status, "ingestion job started");
        Ok(out.ingestion_job.job_id)
    }

    #[instrument(skip_all)]
    async fn latest_ingestion(&self) -> KbResult<Option<IngestionJob>> {
        let (Some(kb), Some(ds)) = (
            self.cfg.knowledge_base_id.as_deref(),
            self.cfg.data_source_id.as_deref(),
        ) else {
            debug!("ids unset, no latest ingestion job");
            return Ok(None);
        };
        let url = jobs_url(&self.cfg.agent_endpoint, kb, ds);

        let out: JobList = self
            .http
            .call("bedrock-agent", Method::POST, &url, Some(&latest_job_query()))
            .await?;
        Ok(out.ingestion_job_summaries.into_iter().next())
    }

    #[instrument(skip(self))]
    async fn ingestion_job(&self, job_id: &str) -> KbResult<Option<IngestionJob>> {
        let kb = self.cfg.require_kb()?;
        let ds = self.cfg.require_data_source()?;
        let url = job_url(&self.cfg.agent_endpoint, kb, ds, job_id);

        match self
            .http
            .call::<JobEnvelope>("bedrock-agent", Method::GET, &url, None)
            .await
        {
            Ok(out) => Ok(Some(out.ingestion_job)),
            Err(e) if e.is_not_found() => {
                debug!(error = %e, "ingestion job not found");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}
