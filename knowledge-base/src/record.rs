//! Core data models used by the library.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Search mode used by the vector store.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SearchType {
    #[default]
    Semantic,
    Hybrid,
}

impl SearchType {
    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Semantic => "SEMANTIC",
            SearchType::Hybrid => "HYBRID",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    /// Case-insensitive: `semantic` and `SEMANTIC` are the same mode.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SEMANTIC" => Ok(SearchType::Semantic),
            "HYBRID" => Ok(SearchType::Hybrid),
            other => Err(format!("search_type must be SEMANTIC or HYBRID, got `{other}`")),
        }
    }
}

/// Query parameters for knowledge-base retrieval.
#[derive(Clone, Debug)]
pub struct RetrievalRequest<'a> {
    pub query: &'a str,
    /// Number of results, `1..=100`.
    pub top_k: u32,
    pub search_type: SearchType,
    pub reranking: bool,
    /// Opaque metadata filter, forwarded verbatim after a structural check.
    pub filter: Option<&'a Value>,
}

/// Snapshot of one ingestion job as reported by Bedrock.
///
/// `status` is passed through untouched (`STARTING`, `IN_PROGRESS`,
/// `COMPLETE`, `FAILED`, ...).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestionJob {
    #[serde(rename = "ingestionJobId")]
    pub job_id: String,
    pub status: String,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "de_timestamp")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub failure_reasons: Vec<String>,
}

/// Accepts RFC 3339 strings and epoch seconds (integer or fractional).
fn de_timestamp<'de, D>(de: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Seconds(f64),
    }

    match Option::<Raw>::deserialize(de)? {
        None => Ok(None),
        Some(Raw::Text(s)) => DateTime::parse_from_rfc3339(&s)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom),
        Some(Raw::Seconds(secs)) => {
            let whole = secs.trunc() as i64;
            let nanos = ((secs - secs.trunc()) * 1e9).round() as u32;
            DateTime::from_timestamp(whole, nanos.min(999_999_999))
                .map(Some)
                .ok_or_else(|| serde::de::Error::custom(format!("timestamp out of range: {secs}")))
        }
    }
}
