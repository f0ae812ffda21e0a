pub mod dbclient;
pub mod memory;
pub mod model;
pub mod schema;

use async_trait::async_trait;

use crate::db::schema::{NewSurvey, NewSurveyResponse, Survey, SurveyResponse};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("survey does not exist")]
    SurveyNotFound,
    #[error("no places remaining")]
    NoPlacesRemaining,
    #[error("user {0} does not exist")]
    UnknownUser(i64),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Typed access to the survey tables.
///
/// `add_survey_response` must check the survey's capacity and insert the
/// response as one atomic step: two concurrent calls for a survey with one
/// place left may not both succeed.
#[async_trait]
pub trait Store: Send + Sync {
    async fn list_surveys(&self, user_id: Option<i64>) -> Result<Vec<Survey>, StoreError>;

    async fn get_survey(&self, id: i64) -> Result<Option<Survey>, StoreError>;

    async fn add_survey(&self, survey: &NewSurvey) -> Result<Survey, StoreError>;

    /// Removes the survey and every response to it. Returns false if no
    /// survey had that id.
    async fn delete_survey(&self, id: i64) -> Result<bool, StoreError>;

    async fn list_survey_responses(&self, user_id: Option<i64>) -> Result<Vec<SurveyResponse>, StoreError>;

    async fn get_survey_response(&self, id: i64) -> Result<Option<SurveyResponse>, StoreError>;

    async fn add_survey_response(&self, response: &NewSurveyResponse) -> Result<SurveyResponse, StoreError>;

    async fn delete_survey_response(&self, id: i64) -> Result<bool, StoreError>;
}
