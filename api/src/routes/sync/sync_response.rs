use chrono::{DateTime, SecondsFormat, Utc};
use knowledge_base::IngestionJob;
use serde::Serialize;

pub const SYNC_STARTED_MSG: &str = "Ingestion job started.";

/// RFC 3339 in UTC, or `""` when the service did not report a time.
pub fn render_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map(|t| t.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_default()
}

/// Response body for POST /sync.
#[derive(Debug, Serialize)]
pub struct SyncStartedResponse {
    pub ingestion_job_id: String,
    pub message: String,
}

/// Response body for GET /sync/status.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SyncStatusResponse {
    Latest {
        status: String,
        started_at: String,
        updated_at: String,
    },
    NoJobs {
        status: &'static str,
    },
}

impl SyncStatusResponse {
    pub fn no_jobs() -> Self {
        SyncStatusResponse::NoJobs {
            status: "no_jobs_found",
        }
    }
}

impl From<IngestionJob> for SyncStatusResponse {
    fn from(job: IngestionJob) -> Self {
        SyncStatusResponse::Latest {
            status: job.status,
            started_at: render_timestamp(job.started_at),
            updated_at: render_timestamp(job.updated_at),
        }
    }
}

/// Response body for GET /ingestion-status/{job_id}.
#[derive(Debug, Serialize)]
pub struct JobStatusResponse {
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub failure_reasons: Vec<String>,
}

impl From<IngestionJob> for JobStatusResponse {
    fn from(job: IngestionJob) -> Self {
        Self {
            status: job.status,
            started_at: render_timestamp(job.started_at),
            updated_at: render_timestamp(job.updated_at),
            failure_reasons: job.failure_reasons,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_render_as_utc_rfc3339() {
        let t = Utc.with_ymd_and_hms(2025, 3, 1, 12, 30, 5).unwrap();
        assert_eq!(render_timestamp(Some(t)), "2025-03-01T12:30:05Z");
        assert_eq!(render_timestamp(None), "");
    }
}
