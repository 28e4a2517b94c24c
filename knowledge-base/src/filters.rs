//! Structural checks for retrieval metadata filters.
//!
//! Filters are forwarded to Bedrock verbatim; this module only rejects shapes
//! the service would refuse anyway, so the caller gets a 400 instead of a
//! downstream failure.
//!
//! Accepted shape (one operator per object):
//! - comparison: `{"equals": {"key": "k", "value": v}}` and the other scalar operators
//! - set: `{"in": {"key": "k", "value": [..]}}`, same for `notIn`
//! - logical: `{"andAll": [f1, f2, ..]}` / `{"orAll": [..]}` with at least two members

use serde_json::Value;
use tracing::debug;

use crate::errors::{KbError, KbResult};

const COMPARISON_OPS: &[&str] = &[
    "equals",
    "notEquals",
    "greaterThan",
    "greaterThanOrEquals",
    "lessThan",
    "lessThanOrEquals",
    "startsWith",
    "listContains",
    "stringContains",
];
const SET_OPS: &[&str] = &["in", "notIn"];
const LOGICAL_OPS: &[&str] = &["andAll", "orAll"];

/// Returns the filter to send, or `None` when the caller supplied nothing.
///
/// `null` and `{}` both mean "no filter".
///
/// # Errors
/// [`KbError::InvalidFilter`] describing the first problem found.
pub fn normalize_filter(filter: Option<&Value>) -> KbResult<Option<Value>> {
    match filter {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) if map.is_empty() => Ok(None),
        Some(f) => {
            validate(f, "metadata_filter")?;
            debug!("filters::normalize_filter accepted");
            Ok(Some(f.clone()))
        }
    }
}

fn validate(f: &Value, path: &str) -> KbResult<()> {
    let Value::Object(map) = f else {
        return Err(invalid(path, "must be an object"));
    };
    if map.len() != 1 {
        return Err(invalid(path, "must contain exactly one operator"));
    }
    let Some((op, arg)) = map.iter().next() else {
        return Err(invalid(path, "must contain exactly one operator"));
    };
    let here = format!("{path}.{op}");

    if LOGICAL_OPS.contains(&op.as_str()) {
        let Value::Array(items) = arg else {
            return Err(invalid(&here, "must be an array of filters"));
        };
        if items.len() < 2 {
            return Err(invalid(&here, "needs at least two filters"));
        }
        for (i, item) in items.iter().enumerate() {
            validate(item, &format!("{here}[{i}]"))?;
        }
        return Ok(());
    }

    let is_set = SET_OPS.contains(&op.as_str());
    if !is_set && !COMPARISON_OPS.contains(&op.as_str()) {
        return Err(invalid(path, &format!("unknown operator `{op}`")));
    }

    let Value::Object(attr) = arg else {
        return Err(invalid(&here, "must be an object with `key` and `value`"));
    };
    match attr.get("key") {
        Some(Value::String(k)) if !k.trim().is_empty() => {}
        _ => return Err(invalid(&here, "`key` must be a non-empty string")),
    }
    match attr.get("value") {
        None | Some(Value::Null) => Err(invalid(&here, "`value` is required")),
        Some(Value::Array(_)) => Ok(()),
        Some(_) if is_set => Err(invalid(&here, "`value` must be an array")),
        Some(_) => Ok(()),
    }
}

fn invalid(path: &str, reason: &str) -> KbError {
    KbError::InvalidFilter(format!("{path} {reason}"))
}
