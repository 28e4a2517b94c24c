use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error_handler::AppError;

/// JSON body extractor that forgives unparsable input.
///
/// A body that is empty, not JSON, or not a JSON object is read as `{}`, so
/// the handler reports the missing field instead of a parse failure. A valid
/// object whose fields have the wrong types is still a 400.
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state).await.map_err(|e| AppError::Http {
            status: e.status(),
            code: "BODY_ERROR",
            message: e.body_text(),
        })?;

        let value = match serde_json::from_slice::<Value>(&bytes) {
            Ok(v @ Value::Object(_)) => v,
            _ => Value::Object(Map::new()),
        };

        serde_json::from_value(value)
            .map(LenientJson)
            .map_err(|e| AppError::BadRequest(format!("Invalid request body: {e}")))
    }
}
