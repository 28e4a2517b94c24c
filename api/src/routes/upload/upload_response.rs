use serde::Serialize;

pub const INGESTION_STARTED_MSG: &str =
    "Documents uploaded. Ingestion started - this may take a few minutes.";

/// Response body for /upload.
///
/// Storage succeeded in both variants; they differ in whether the follow-up
/// ingestion sync could be started.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum UploadResponse {
    Started {
        /// Accepted filenames, in submission order.
        uploaded: Vec<String>,
        ingestion_job_id: String,
        message: String,
    },
    SyncFailed {
        uploaded: Vec<String>,
        warning: String,
    },
}
