//! RAG answer orchestration with a single public entry point.
//!
//! Public API: [`ask_with_opts`]. It retrieves chunks from the knowledge base,
//! joins them into a context, asks the generation backend, and returns the
//! answer together with the chunks that were used.

mod api_types;
mod cfg;
mod error;

pub use api_types::{AskOptions, QaAnswer};
pub use cfg::AskDefaults;
pub use error::ContextorError;

use std::time::Instant;

use ai_llm_service::AnswerGenerator;
use knowledge_base::{KnowledgeBase, RetrievalRequest};
use tracing::{debug, info, instrument};

/// Answer `question` from retrieved context.
///
/// Steps:
/// 1. reject a blank question and invalid sampling parameters (no downstream calls)
/// 2. retrieve `opts.top_k` chunks; none found is [`ContextorError::NoContext`]
/// 3. join chunks with `\n` and generate with `opts.generation`
///
/// # Errors
/// Propagates [`ContextorError`] from validation, retrieval, or generation.
#[instrument(skip_all, fields(top_k = opts.top_k, search_type = %opts.search_type, reranking = opts.reranking))]
pub async fn ask_with_opts<K, G>(
    kb: &K,
    llm: &G,
    question: &str,
    opts: &AskOptions,
) -> Result<QaAnswer, ContextorError>
where
    K: KnowledgeBase,
    G: AnswerGenerator,
{
    let question = question.trim();
    if question.is_empty() {
        return Err(ContextorError::EmptyQuestion);
    }
    opts.generation.validate()?;

    let started = Instant::now();
    let chunks = kb
        .retrieve(&RetrievalRequest {
            query: question,
            top_k: opts.top_k,
            search_type: opts.search_type,
            reranking: opts.reranking,
            filter: opts.metadata_filter.as_ref(),
        })
        .await?;
    if chunks.is_empty() {
        debug!("no chunks retrieved");
        return Err(ContextorError::NoContext);
    }

    let context = chunks.join("\n");
    let answer = llm.generate(&context, question, &opts.generation).await?;

    info!(
        chunks = chunks.len(),
        backend = llm.backend_name(),
        latency_ms = started.elapsed().as_millis(),
        "question answered"
    );
    Ok(QaAnswer {
        answer,
        context: chunks,
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ai_llm_service::{AiLlmError, GenerationParams};
    use knowledge_base::{IngestionJob, KbError, KbResult, SearchType};
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct FakeKb {
        chunks: Vec<String>,
        queries: Mutex<Vec<(String, u32, Option<serde_json::Value>)>>,
    }

    impl KnowledgeBase for FakeKb {
        fn is_configured(&self) -> bool {
            true
        }

        async fn retrieve(&self, req: &RetrievalRequest<'_>) -> KbResult<Vec<String>> {
            self.queries.lock().unwrap().push((
                req.query.to_string(),
                req.top_k,
                req.filter.cloned(),
            ));
            Ok(self.chunks.clone())
        }

        async fn start_ingestion(&self) -> KbResult<String> {
            Err(KbError::NotConfigured("DATA_SOURCE_ID"))
        }

        async fn latest_ingestion(&self) -> KbResult<Option<IngestionJob>> {
            Ok(None)
        }

        async fn ingestion_job(&self, _job_id: &str) -> KbResult<Option<IngestionJob>> {
            Ok(None)
        }
    }

    #[derive(Default)]
    struct EchoLlm {
        calls: Mutex<Vec<(String, String, GenerationParams)>>,
    }

    impl AnswerGenerator for EchoLlm {
        fn backend_name(&self) -> &'static str {
            "echo"
        }

        async fn generate(
            &self,
            context: &str,
            question: &str,
            params: &GenerationParams,
        ) -> Result<String, AiLlmError> {
            self.calls
                .lock()
                .unwrap()
                .push((context.to_string(), question.to_string(), *params));
            Ok(format!("answer to {question}"))
        }
    }

    fn opts() -> AskOptions {
        AskOptions::from_defaults(&AskDefaults::default())
    }

    #[tokio::test]
    async fn joins_chunks_and_returns_them_as_context() {
        let kb = FakeKb {
            chunks: vec!["one".into(), "two".into()],
            ..Default::default()
        };
        let llm = EchoLlm::default();
        let mut o = opts();
        o.top_k = 7;
        o.metadata_filter = Some(json!({"equals": {"key": "k", "value": "v"}}));

        let qa = ask_with_opts(&kb, &llm, "  what?  ", &o).await.unwrap();
        assert_eq!(qa.answer, "answer to what?");
        assert_eq!(qa.context, vec!["one", "two"]);

        let (query, top_k, filter) = kb.queries.lock().unwrap()[0].clone();
        assert_eq!(query, "what?");
        assert_eq!(top_k, 7);
        assert_eq!(filter, o.metadata_filter);

        let calls = llm.calls.lock().unwrap();
        assert_eq!(calls[0].0, "one\ntwo");
        assert_eq!(calls[0].2, GenerationParams::default());
    }

    #[tokio::test]
    async fn blank_question_makes_no_calls() {
        let kb = FakeKb::default();
        let llm = EchoLlm::default();
        let err = ask_with_opts(&kb, &llm, "   ", &opts()).await.unwrap_err();
        assert!(matches!(err, ContextorError::EmptyQuestion));
        assert!(err.is_invalid_input());
        assert!(kb.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn no_chunks_skips_generation() {
        let kb = FakeKb::default();
        let llm = EchoLlm::default();
        let err = ask_with_opts(&kb, &llm, "q", &opts()).await.unwrap_err();
        assert!(matches!(err, ContextorError::NoContext));
        assert!(llm.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn invalid_sampling_is_rejected_before_retrieval() {
        let kb = FakeKb {
            chunks: vec!["c".into()],
            ..Default::default()
        };
        let llm = EchoLlm::default();
        let mut o = opts();
        o.search_type = SearchType::Hybrid;
        o.generation.max_tokens = 0;

        let err = ask_with_opts(&kb, &llm, "q", &o).await.unwrap_err();
        assert!(err.is_invalid_input());
        assert!(kb.queries.lock().unwrap().is_empty());
    }
}
