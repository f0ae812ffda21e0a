use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use evlog::meta;
use serde_json::json;

use crate::db::StoreError;
use crate::runtime::get_logger;
use crate::support::fields::FieldErrors;
use crate::support::payload::PayloadError;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Missing record, or an id/filter that is not an integer.
    #[error("not found")]
    NotFound,
    #[error("invalid fields")]
    Fields(FieldErrors),
    /// A well-formed request that cannot be carried out, such as a response
    /// to a full survey.
    #[error("{0}")]
    Rejected(String),
    #[error(transparent)]
    Payload(#[from] PayloadError),
    #[error("{0}")]
    Unsupported(&'static str),
    #[error("store failure: {0}")]
    Internal(StoreError),
}

impl From<FieldErrors> for ApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::Fields(errors)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::SurveyNotFound => Self::Rejected("Survey does not exist".to_owned()),
            StoreError::NoPlacesRemaining => Self::Rejected("No places remaining".to_owned()),
            StoreError::UnknownUser(id) => {
                let mut errors = FieldErrors::default();
                errors.add("user_id", format!("Invalid pk \"{}\" - object does not exist.", id));
                Self::Fields(errors)
            }
            StoreError::Database(_) => Self::Internal(e),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, Json(json!({"detail": "Not found."}))).into_response(),
            ApiError::Fields(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
            ApiError::Rejected(message) => (StatusCode::BAD_REQUEST, Json(vec![message])).into_response(),
            ApiError::Payload(e @ PayloadError::Malformed(_)) => {
                (StatusCode::BAD_REQUEST, Json(json!({"detail": e.to_string()}))).into_response()
            }
            ApiError::Payload(e @ PayloadError::NotAnObject(_)) => {
                (StatusCode::BAD_REQUEST, Json(json!({"non_field_errors": [e.to_string()]}))).into_response()
            }
            ApiError::Payload(e @ PayloadError::UnsupportedMediaType(_)) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, Json(json!({"detail": e.to_string()}))).into_response()
            }
            ApiError::Unsupported(message) => {
                (StatusCode::NOT_IMPLEMENTED, Json(json!({"detail": message}))).into_response()
            }
            ApiError::Internal(e) => {
                get_logger().error("Store operation failed.", meta! {
                    "Error" => e,
                });
                (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({"detail": "A server error occurred."}))).into_response()
            }
        }
    }
}

/// Record ids and the `user_id` filter must be integers; anything else is
/// treated as a lookup that matched nothing.
pub fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.trim().parse::<i64>().map_err(|_| ApiError::NotFound)
}
