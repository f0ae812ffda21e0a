use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use evlog::meta;
use serde_json::{Map, Value};

use crate::db::schema::{NewSurveyResponse, SurveyResponse};
use crate::db::StoreError;
use crate::handler::ShareData;
use crate::routes::error::{parse_id, ApiError};
use crate::routes::{content_type, user_filter};
use crate::runtime::get_logger;
use crate::support::fields::{FieldErrors, FieldReader};
use crate::support::payload::read_object;

pub fn validate(data: &Map<String, Value>) -> Result<NewSurveyResponse, FieldErrors> {
    let mut fields = FieldReader::new(data);

    let survey_id = fields.integer("survey_id");
    let user_id = fields.integer("user_id");

    let errors = fields.into_errors();
    match (survey_id, user_id) {
        (Some(survey_id), Some(user_id)) if errors.is_empty() => Ok(NewSurveyResponse {
            survey_id,
            user_id,
        }),
        _ => Err(errors),
    }
}

pub async fn list(
    State(data): State<ShareData>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<SurveyResponse>>, ApiError> {
    let user_id = user_filter(&params)?;

    Ok(Json(data.store.list_survey_responses(user_id).await?))
}

pub async fn retrieve(State(data): State<ShareData>, Path(id): Path<String>) -> Result<Json<SurveyResponse>, ApiError> {
    let id = parse_id(&id)?;

    match data.store.get_survey_response(id).await? {
        None => Err(ApiError::NotFound),
        Some(v) => Ok(Json(v)),
    }
}

pub async fn create(State(data): State<ShareData>, headers: HeaderMap, body: Bytes) -> Result<(StatusCode, Json<SurveyResponse>), ApiError> {
    let payload = read_object(content_type(&headers), &body)?;
    let new_response = validate(&payload)?;

    let response = match data.store.add_survey_response(&new_response).await {
        Ok(v) => v,
        Err(e @ (StoreError::SurveyNotFound | StoreError::NoPlacesRemaining)) => {
            get_logger().info("Rejected survey response.", meta! {
                "SurveyID" => new_response.survey_id,
                "UserID" => new_response.user_id,
                "Reason" => e,
            });
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    get_logger().info("Created survey response.", meta! {
        "SurveyResponseID" => response.id,
        "SurveyID" => response.survey_id,
        "UserID" => response.user_id,
    });

    Ok((StatusCode::CREATED, Json(response)))
}

pub async fn update(State(data): State<ShareData>, Path(id): Path<String>) -> Result<Json<SurveyResponse>, ApiError> {
    let id = parse_id(&id)?;

    if data.store.get_survey_response(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    Err(ApiError::Unsupported("Updating survey responses is not supported."))
}

pub async fn destroy(State(data): State<ShareData>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    if !data.store.delete_survey_response(id).await? {
        return Err(ApiError::NotFound);
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn survey_and_user_are_required() {
        let data = match json!({"survey_id": "prr"}) {
            Value::Object(m) => m,
            _ => unreachable!(),
        };

        let errors = validate(&data).unwrap_err();
        assert_eq!(errors.get("survey_id"), Some(&["A valid integer is required.".to_owned()][..]));
        assert_eq!(errors.get("user_id"), Some(&["This field is required.".to_owned()][..]));
    }
}
