//! S3-backed document storage: uploads and document counting.

use std::time::Instant;

use aws_config::SdkConfig;
use aws_sdk_s3::{Client, error::DisplayErrorContext, primitives::ByteStream};
use bytes::Bytes;
use tracing::{debug, info, instrument};

use crate::{
    DocumentStore,
    config::{DOCUMENT_PREFIX, KbConfig},
    errors::{KbError, KbResult},
};

/// Storage key for an uploaded file: `documents/<final path component>`.
///
/// Returns `None` when the name has no usable final component.
pub fn object_key(filename: &str) -> Option<String> {
    let base = filename
        .rsplit(['/', '\\'])
        .next()
        .map(str::trim)
        .filter(|b| !b.is_empty() && *b != "." && *b != "..")?;
    Some(format!("{DOCUMENT_PREFIX}{base}"))
}

/// Counts real documents among listed keys (folder markers end with `/`).
pub(crate) fn count_documents<'a>(keys: impl IntoIterator<Item = &'a str>) -> u64 {
    keys.into_iter().filter(|k| !k.ends_with('/')).count() as u64
}

/// Document store over one S3 bucket.
#[derive(Clone, Debug)]
pub struct S3DocumentStore {
    client: Client,
    bucket: Option<String>,
}

impl S3DocumentStore {
    pub fn new(cfg: &KbConfig, aws: &SdkConfig) -> Self {
        Self {
            client: Client::new(aws),
            bucket: cfg.bucket.clone(),
        }
    }

    fn require_bucket(&self) -> KbResult<&str> {
        self.bucket
            .as_deref()
            .ok_or(KbError::NotConfigured("S3_BUCKET_NAME"))
    }
}

fn s3_error<E>(e: E) -> KbError
where
    E: std::error::Error,
{
    KbError::Sdk {
        service: "s3",
        message: DisplayErrorContext(&e).to_string(),
    }
}

impl DocumentStore for S3DocumentStore {
    fn is_configured(&self) -> bool {
        self.bucket.is_some()
    }

    #[instrument(skip(self, body), fields(size = body.len()))]
    async fn put_document(&self, filename: &str, body: Bytes) -> KbResult<String> {
        let bucket = self.require_bucket()?;
        let key = object_key(filename)
            .ok_or_else(|| KbError::InvalidRequest(format!("unusable filename `{filename}`")))?;
        let started = Instant::now();

        self.client
            .put_object()
            .bucket(bucket)
            .key(&key)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(s3_error)?;

        info!(
            %key,
            latency_ms = started.elapsed().as_millis(),
            "document stored"
        );
        Ok(key)
    }

    #[instrument(skip(self))]
    async fn document_count(&self) -> KbResult<u64> {
        let bucket = self.require_bucket()?;
        let mut total = 0u64;
        let mut token: Option<String> = None;

        loop {
            let page = self
                .client
                .list_objects_v2()
                .bucket(bucket)
                .prefix(DOCUMENT_PREFIX)
                .set_continuation_token(token.take())
                .send()
                .await
                .map_err(s3_error)?;

            total += count_documents(page.contents().iter().filter_map(|o| o.key()));
            debug!(total, "listed documents page");

            match (page.is_truncated(), page.next_continuation_token()) {
                (Some(true), Some(next)) => token = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(total)
    }
}
