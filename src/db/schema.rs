use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Survey {
    pub id: i64,
    pub name: String,
    pub available_places: i32,
    pub user_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct SurveyResponse {
    pub id: i64,
    pub survey_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

/// A validated survey that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSurvey {
    pub name: String,
    pub available_places: i32,
    pub user_id: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewSurveyResponse {
    pub survey_id: i64,
    pub user_id: i64,
}
