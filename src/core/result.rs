//! Uniform success/failure shape returned by every accessor

use std::fmt;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use tracing::warn;

/// Message used when a backend error renders as an empty string
const UNKNOWN_ERROR: &str = "Unknown error";

/// Outcome of an accessor call
///
/// Exactly one variant is populated. Failures carry only a message; the
/// backend's error type never reaches the caller.
///
/// Serializes as `{"success": true, "data": .., "id": ..}` (absent fields
/// omitted) or `{"success": false, "error": ".."}`.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationResult<T> {
    Success {
        data: Option<T>,
        id: Option<String>,
    },
    Failure {
        error: String,
    },
}

impl<T> OperationResult<T> {
    /// Success carrying a payload
    pub fn ok(data: T) -> Self {
        OperationResult::Success {
            data: Some(data),
            id: None,
        }
    }

    /// Success carrying only an identifier
    pub fn with_id(id: impl Into<String>) -> Self {
        OperationResult::Success {
            data: None,
            id: Some(id.into()),
        }
    }

    /// Success with nothing to report
    pub fn empty() -> Self {
        OperationResult::Success {
            data: None,
            id: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        let error = error.into();
        OperationResult::Failure {
            error: if error.is_empty() {
                UNKNOWN_ERROR.to_string()
            } else {
                error
            },
        }
    }

    /// Translate a backend call's outcome into an `OperationResult`
    ///
    /// This is the only place backend errors are consumed: the failure is
    /// logged and reduced to its display text.
    pub fn capture<E: fmt::Display>(operation: &'static str, result: Result<Self, E>) -> Self {
        match result {
            Ok(outcome) => outcome,
            Err(err) => {
                let message = err.to_string();
                warn!(operation, error = %message, "backend call failed");
                Self::failure(message)
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, OperationResult::Success { .. })
    }

    pub fn is_failure(&self) -> bool {
        !self.is_success()
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            OperationResult::Success { data, .. } => data.as_ref(),
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn into_data(self) -> Option<T> {
        match self {
            OperationResult::Success { data, .. } => data,
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn id(&self) -> Option<&str> {
        match self {
            OperationResult::Success { id, .. } => id.as_deref(),
            OperationResult::Failure { .. } => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OperationResult::Success { .. } => None,
            OperationResult::Failure { error } => Some(error),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> OperationResult<U> {
        match self {
            OperationResult::Success { data, id } => OperationResult::Success {
                data: data.map(f),
                id,
            },
            OperationResult::Failure { error } => OperationResult::Failure { error },
        }
    }

    /// Convert into a std `Result`, keeping the failure message as the error
    pub fn into_result(self) -> Result<(Option<T>, Option<String>), String> {
        match self {
            OperationResult::Success { data, id } => Ok((data, id)),
            OperationResult::Failure { error } => Err(error),
        }
    }
}

impl<T: Serialize> Serialize for OperationResult<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            OperationResult::Success { data, id } => {
                let len = 1 + usize::from(data.is_some()) + usize::from(id.is_some());
                let mut state = serializer.serialize_struct("OperationResult", len)?;
                state.serialize_field("success", &true)?;
                match data {
                    Some(data) => state.serialize_field("data", data)?,
                    None => state.skip_field("data")?,
                }
                match id {
                    Some(id) => state.serialize_field("id", id)?,
                    None => state.skip_field("id")?,
                }
                state.end()
            }
            OperationResult::Failure { error } => {
                let mut state = serializer.serialize_struct("OperationResult", 2)?;
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
                state.end()
            }
        }
    }
}

impl<T: Serialize> IntoResponse for OperationResult<T> {
    fn into_response(self) -> Response {
        let status = if self.is_success() {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::StoreError;
    use serde_json::json;

    #[test]
    fn test_success_serialization_omits_absent_fields() {
        let result: OperationResult<()> = OperationResult::with_id("abc");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": true, "id": "abc"})
        );

        let result = OperationResult::ok(json!({"name": "x"}));
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": true, "data": {"name": "x"}})
        );

        let result: OperationResult<()> = OperationResult::empty();
        assert_eq!(serde_json::to_value(&result).unwrap(), json!({"success": true}));
    }

    #[test]
    fn test_failure_serialization() {
        let result: OperationResult<u32> = OperationResult::failure("boom");
        assert_eq!(
            serde_json::to_value(&result).unwrap(),
            json!({"success": false, "error": "boom"})
        );
    }

    #[test]
    fn test_failure_never_empty() {
        let result: OperationResult<()> = OperationResult::failure("");
        assert_eq!(result.error(), Some(UNKNOWN_ERROR));
    }

    #[test]
    fn test_capture_flattens_backend_error() {
        let result: OperationResult<u32> =
            OperationResult::capture("read", Err(StoreError::unavailable()));
        assert!(result.is_failure());
        assert!(result.data().is_none());
        assert!(result.id().is_none());
        assert!(result.error().unwrap().contains("offline"));

        let result: OperationResult<u32> =
            OperationResult::capture::<StoreError>("read", Ok(OperationResult::ok(7)));
        assert_eq!(result.data(), Some(&7));
    }

    #[test]
    fn test_map_and_into_result() {
        let result = OperationResult::ok(2).map(|n| n * 10);
        assert_eq!(result.clone().into_data(), Some(20));
        assert_eq!(result.into_result(), Ok((Some(20), None)));

        let failed: OperationResult<i32> = OperationResult::failure("nope");
        assert_eq!(failed.map(|n| n + 1).into_result(), Err("nope".to_string()));
    }

    #[test]
    fn test_into_response_status() {
        let ok: OperationResult<()> = OperationResult::empty();
        assert_eq!(ok.into_response().status(), StatusCode::OK);

        let failed: OperationResult<()> = OperationResult::failure("denied");
        assert_eq!(failed.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
