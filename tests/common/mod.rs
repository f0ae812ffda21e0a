#![allow(dead_code)]

use std::sync::Arc;

use axum_test::TestServer;
use survey_api::db::memory::MemoryStore;
use survey_api::db::schema::{NewSurvey, NewSurveyResponse, Survey, SurveyResponse};
use survey_api::db::Store;
use survey_api::handler::ShareData;

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
}

pub fn test_app() -> TestApp {
    let store = Arc::new(MemoryStore::with_users());
    let server = TestServer::new(survey_api::app(ShareData::new(store.clone()))).unwrap();

    TestApp {
        server,
        store,
    }
}

impl TestApp {
    pub async fn make_user(&self) -> i64 {
        self.store.add_user().await
    }

    /// A survey owned by a fresh user.
    pub async fn make_survey(&self, available_places: i32) -> Survey {
        let user_id = self.make_user().await;

        self.store.add_survey(&NewSurvey {
            name: format!("Survey of user {}", user_id),
            available_places,
            user_id,
        }).await.unwrap()
    }

    /// A response by a fresh user to a fresh survey.
    pub async fn make_survey_response(&self) -> SurveyResponse {
        let survey = self.make_survey(10).await;
        let user_id = self.make_user().await;

        self.store.add_survey_response(&NewSurveyResponse {
            survey_id: survey.id,
            user_id,
        }).await.unwrap()
    }

    pub async fn survey_count(&self) -> usize {
        self.store.list_surveys(None).await.unwrap().len()
    }

    pub async fn survey_response_count(&self) -> usize {
        self.store.list_survey_responses(None).await.unwrap().len()
    }
}
