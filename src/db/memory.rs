use std::collections::{BTreeMap, BTreeSet};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::db::schema::{NewSurvey, NewSurveyResponse, Survey, SurveyResponse};
use crate::db::{Store, StoreError};

#[derive(Default)]
struct Tables {
    // None when user ids are not checked.
    users: Option<BTreeSet<i64>>,
    last_user_id: i64,
    last_survey_id: i64,
    last_response_id: i64,
    surveys: BTreeMap<i64, Survey>,
    responses: BTreeMap<i64, SurveyResponse>,
}

impl Tables {
    fn check_user(&self, user_id: i64) -> Result<(), StoreError> {
        match &self.users {
            Some(users) if !users.contains(&user_id) => Err(StoreError::UnknownUser(user_id)),
            _ => Ok(()),
        }
    }
}

/// In-process `Store`. Every operation runs under one lock, which also makes
/// the capacity check and the insert in `add_survey_response` atomic.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    /// A store that accepts any user id.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that, like the database, rejects user ids that were not
    /// registered with `add_user`.
    pub fn with_users() -> Self {
        Self {
            tables: Mutex::new(Tables {
                users: Some(BTreeSet::new()),
                ..Tables::default()
            }),
        }
    }

    pub async fn add_user(&self) -> i64 {
        let mut tables = self.tables.lock().await;

        tables.last_user_id += 1;
        let id = tables.last_user_id;
        if let Some(users) = tables.users.as_mut() {
            users.insert(id);
        }

        id
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_surveys(&self, user_id: Option<i64>) -> Result<Vec<Survey>, StoreError> {
        let tables = self.tables.lock().await;

        Ok(tables.surveys.values()
            .filter(|s| user_id.map_or(true, |u| s.user_id == u))
            .cloned()
            .collect())
    }

    async fn get_survey(&self, id: i64) -> Result<Option<Survey>, StoreError> {
        Ok(self.tables.lock().await.surveys.get(&id).cloned())
    }

    async fn add_survey(&self, survey: &NewSurvey) -> Result<Survey, StoreError> {
        let mut tables = self.tables.lock().await;
        tables.check_user(survey.user_id)?;

        tables.last_survey_id += 1;
        let r = Survey {
            id: tables.last_survey_id,
            name: survey.name.clone(),
            available_places: survey.available_places,
            user_id: survey.user_id,
        };
        tables.surveys.insert(r.id, r.clone());

        Ok(r)
    }

    async fn delete_survey(&self, id: i64) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;

        if tables.surveys.remove(&id).is_none() {
            return Ok(false);
        }
        tables.responses.retain(|_, r| r.survey_id != id);

        Ok(true)
    }

    async fn list_survey_responses(&self, user_id: Option<i64>) -> Result<Vec<SurveyResponse>, StoreError> {
        let tables = self.tables.lock().await;

        Ok(tables.responses.values()
            .filter(|r| user_id.map_or(true, |u| r.user_id == u))
            .cloned()
            .collect())
    }

    async fn get_survey_response(&self, id: i64) -> Result<Option<SurveyResponse>, StoreError> {
        Ok(self.tables.lock().await.responses.get(&id).cloned())
    }

    async fn add_survey_response(&self, response: &NewSurveyResponse) -> Result<SurveyResponse, StoreError> {
        let mut tables = self.tables.lock().await;

        let available_places = match tables.surveys.get(&response.survey_id) {
            None => return Err(StoreError::SurveyNotFound),
            Some(v) => v.available_places,
        };

        let taken = tables.responses.values()
            .filter(|r| r.survey_id == response.survey_id)
            .count();
        if taken >= available_places as usize {
            return Err(StoreError::NoPlacesRemaining);
        }

        tables.check_user(response.user_id)?;

        tables.last_response_id += 1;
        let r = SurveyResponse {
            id: tables.last_response_id,
            survey_id: response.survey_id,
            user_id: response.user_id,
            created_at: Utc::now(),
        };
        tables.responses.insert(r.id, r.clone());

        Ok(r)
    }

    async fn delete_survey_response(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.tables.lock().await.responses.remove(&id).is_some())
    }
}
