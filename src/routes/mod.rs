pub mod error;
pub mod survey;
pub mod survey_response;

use axum::http::header::CONTENT_TYPE;
use axum::http::HeaderMap;
use axum::routing::get;
use axum::Router;

use crate::handler::ShareData;
use crate::routes::error::{parse_id, ApiError};

pub fn router() -> Router<ShareData> {
    Router::new()
        .route("/surveys/", get(survey::list).post(survey::create))
        .route(
            "/surveys/:id/",
            get(survey::retrieve)
                .put(survey::update)
                .patch(survey::update)
                .delete(survey::destroy),
        )
        .route("/survey-responses/", get(survey_response::list).post(survey_response::create))
        .route(
            "/survey-responses/:id/",
            get(survey_response::retrieve)
                .put(survey_response::update)
                .patch(survey_response::update)
                .delete(survey_response::destroy),
        )
}

/// The request's `Content-Type`. A header that is not visible ASCII is
/// passed on as an empty media type, which no parser accepts.
pub fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).map(|v| v.to_str().unwrap_or_default())
}

/// The `user_id` filter of the list endpoints. When the parameter repeats,
/// the last value wins.
pub fn user_filter(params: &[(String, String)]) -> Result<Option<i64>, ApiError> {
    params.iter()
        .rev()
        .find(|(k, _)| k == "user_id")
        .map(|(_, v)| parse_id(v))
        .transpose()
}
