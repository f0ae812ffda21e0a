use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use evlog::meta;
use serde_json::{Map, Value};

use crate::db::schema::{NewSurvey, Survey};
use crate::handler::ShareData;
use crate::routes::error::{parse_id, ApiError};
use crate::routes::{content_type, user_filter};
use crate::runtime::get_logger;
use crate::support::fields::{FieldErrors, FieldReader};
use crate::support::payload::read_object;

pub const NAME_MAX_LENGTH: usize = 500;

pub fn validate(data: &Map<String, Value>) -> Result<NewSurvey, FieldErrors> {
    let mut fields = FieldReader::new(data);

    let name = fields.string("name", NAME_MAX_LENGTH);
    let available_places = fields.integer_in("available_places", 1, i64::from(i32::MAX));
    let user_id = fields.integer("user_id");

    let errors = fields.into_errors();
    match (name, available_places, user_id) {
        (Some(name), Some(available_places), Some(user_id)) if errors.is_empty() => Ok(NewSurvey {
            name,
            available_places: available_places as i32,
            user_id,
        }),
        _ => Err(errors),
    }
}

pub async fn list(
    State(data): State<ShareData>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<Vec<Survey>>, ApiError> {
    let user_id = user_filter(&params)?;

    Ok(Json(data.store.list_surveys(user_id).await?))
}

pub async fn retrieve(State(data): State<ShareData>, Path(id): Path<String>) -> Result<Json<Survey>, ApiError> {
    let id = parse_id(&id)?;

    match data.store.get_survey(id).await? {
        None => Err(ApiError::NotFound),
        Some(v) => Ok(Json(v)),
    }
}

pub async fn create(State(data): State<ShareData>, headers: HeaderMap, body: Bytes) -> Result<(StatusCode, Json<Survey>), ApiError> {
    let payload = read_object(content_type(&headers), &body)?;
    let new_survey = validate(&payload)?;

    let survey = data.store.add_survey(&new_survey).await?;

    get_logger().info("Created survey.", meta! {
        "SurveyID" => survey.id,
        "UserID" => survey.user_id,
        "AvailablePlaces" => survey.available_places,
    });

    Ok((StatusCode::CREATED, Json(survey)))
}

pub async fn update(State(data): State<ShareData>, Path(id): Path<String>) -> Result<Json<Survey>, ApiError> {
    let id = parse_id(&id)?;

    if data.store.get_survey(id).await?.is_none() {
        return Err(ApiError::NotFound);
    }

    Err(ApiError::Unsupported("Updating surveys is not supported."))
}

pub async fn destroy(State(data): State<ShareData>, Path(id): Path<String>) -> Result<StatusCode, ApiError> {
    let id = parse_id(&id)?;

    if !data.store.delete_survey(id).await? {
        return Err(ApiError::NotFound);
    }

    get_logger().info("Deleted survey.", meta! {
        "SurveyID" => id,
    });

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn object(v: Value) -> Map<String, Value> {
        match v {
            Value::Object(m) => m,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn valid_survey() {
        let survey = validate(&object(json!({
            "name": " Test Survey ",
            "available_places": "20",
            "user_id": 3,
        }))).unwrap();

        assert_eq!(survey, NewSurvey {
            name: "Test Survey".to_owned(),
            available_places: 20,
            user_id: 3,
        });
    }

    #[test]
    fn every_bad_field_is_reported() {
        let errors = validate(&object(json!({
            "name": "x".repeat(NAME_MAX_LENGTH + 1),
            "available_places": 0,
        }))).unwrap_err();

        assert!(errors.get("name").is_some());
        assert_eq!(
            errors.get("available_places"),
            Some(&["Ensure this value is greater than or equal to 1.".to_owned()][..])
        );
        assert_eq!(errors.get("user_id"), Some(&["This field is required.".to_owned()][..]));
    }

    #[test]
    fn name_may_use_the_full_length() {
        let name = "é".repeat(NAME_MAX_LENGTH);
        let survey = validate(&object(json!({
            "name": name,
            "available_places": 1,
            "user_id": 1,
        }))).unwrap();

        assert_eq!(survey.name, name);
    }

    #[test]
    fn available_places_fits_the_column() {
        let errors = validate(&object(json!({
            "name": "Big",
            "available_places": 2147483648i64,
            "user_id": 1,
        }))).unwrap_err();

        assert_eq!(
            errors.get("available_places"),
            Some(&["Ensure this value is less than or equal to 2147483647.".to_owned()][..])
        );
    }
}
