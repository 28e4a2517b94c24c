//! Ingestion-job endpoints of the Bedrock Agent API.
//!
//! - start:  `PUT  {agent}/knowledgebases/{kb}/datasources/{ds}/ingestionjobs/`
//! - list:   `POST {agent}/knowledgebases/{kb}/datasources/{ds}/ingestionjobs/`
//! - get:    `GET  {agent}/knowledgebases/{kb}/datasources/{ds}/ingestionjobs/{job}`

use serde::Deserialize;
use serde_json::{Value, json};

use crate::record::IngestionJob;

/// Collection URL for the jobs of one data source (trailing slash included).
pub(crate) fn jobs_url(agent_endpoint: &str, kb: &str, ds: &str) -> String {
    format!(
        "{}/knowledgebases/{}/datasources/{}/ingestionjobs/",
        agent_endpoint,
        urlencoding::encode(kb),
        urlencoding::encode(ds)
    )
}

/// URL of a single job.
pub(crate) fn job_url(agent_endpoint: &str, kb: &str, ds: &str, job_id: &str) -> String {
    format!(
        "{}{}",
        jobs_url(agent_endpoint, kb, ds),
        urlencoding::encode(job_id)
    )
}

/// Body for listing only the most recently started job.
pub(crate) fn latest_job_query() -> Value {
    json!({
        "maxResults": 1,
        "sortBy": {"attribute": "STARTED_AT", "order": "DESCENDING"}
    })
}

/// Body for starting a job.
pub(crate) fn start_job_body() -> Value {
    json!({})
}

/// `StartIngestionJob` / `GetIngestionJob` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobEnvelope {
    pub(crate) ingestion_job: IngestionJob,
}

/// `ListIngestionJobs` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct JobList {
    #[serde(default)]
    pub(crate) ingestion_job_summaries: Vec<IngestionJob>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_encode_ids() {
        assert_eq!(
            jobs_url("https://bedrock-agent.us-east-1.amazonaws.com", "KB1", "DS1"),
            "https://bedrock-agent.us-east-1.amazonaws.com/knowledgebases/KB1/datasources/DS1/ingestionjobs/"
        );
        assert_eq!(job_url("http://h", "KB", "DS", "a b"), "http://h/knowledgebases/KB/datasources/DS/ingestionjobs/a%20b");
    }

    #[test]
    fn list_query_asks_for_newest_job_only() {
        let q = latest_job_query();
        assert_eq!(q["maxResults"], 1);
        assert_eq!(q["sortBy"]["attribute"], "STARTED_AT");
        assert_eq!(q["sortBy"]["order"], "DESCENDING");
    }

    #[test]
    fn list_without_summaries_is_empty() {
        let list: JobList = serde_json::from_str("{}").unwrap();
        assert!(list.ingestion_job_summaries.is_empty());
    }
}
