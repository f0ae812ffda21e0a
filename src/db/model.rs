use async_trait::async_trait;
use sqlx::{query, query_as, query_scalar, PgPool};
use tokio_stream::StreamExt;

use crate::db::dbclient::DBClient;
use crate::db::schema::{NewSurvey, NewSurveyResponse, Survey, SurveyResponse};
use crate::db::{Store, StoreError};

const FOREIGN_KEY_VIOLATION: &str = "23503";

// The only foreign key a caller controls on insert is user_id; survey_id is
// checked under a row lock before the response insert runs.
fn map_user_fk(e: sqlx::Error, user_id: i64) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code().as_deref() == Some(FOREIGN_KEY_VIOLATION) {
            return StoreError::UnknownUser(user_id);
        }
    }

    StoreError::Database(e)
}

pub async fn list_surveys(conn: &PgPool, user_id: Option<i64>) -> Result<Vec<Survey>, StoreError> {
    let mut stream = query_as::<_, Survey>(
        "SELECT id, name, available_places, user_id FROM survey
         WHERE ($1::BIGINT IS NULL OR user_id=$1)
         ORDER BY id;")
        .bind(user_id)
        .fetch(conn);

    let mut result = Vec::new();
    while let Some(row) = stream.try_next().await? {
        result.push(row);
    }

    Ok(result)
}

pub async fn get_survey(conn: &PgPool, id: i64) -> Result<Option<Survey>, StoreError> {
    let r = query_as::<_, Survey>("SELECT id, name, available_places, user_id FROM survey WHERE id=$1;")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(r)
}

pub async fn add_survey(conn: &PgPool, survey: &NewSurvey) -> Result<Survey, StoreError> {
    query_as::<_, Survey>(
        "INSERT INTO survey (name, available_places, user_id)
         VALUES ($1, $2, $3)
         RETURNING id, name, available_places, user_id;")
        .bind(&survey.name)
        .bind(survey.available_places)
        .bind(survey.user_id)
        .fetch_one(conn)
        .await
        .map_err(|e| map_user_fk(e, survey.user_id))
}

pub async fn delete_survey(conn: &PgPool, id: i64) -> Result<bool, StoreError> {
    // survey_response rows go with it through ON DELETE CASCADE.
    let r = query("DELETE FROM survey WHERE id=$1;")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(r.rows_affected() > 0)
}

pub async fn list_survey_responses(conn: &PgPool, user_id: Option<i64>) -> Result<Vec<SurveyResponse>, StoreError> {
    let mut stream = query_as::<_, SurveyResponse>(
        "SELECT id, survey_id, user_id, created_at FROM survey_response
         WHERE ($1::BIGINT IS NULL OR user_id=$1)
         ORDER BY id;")
        .bind(user_id)
        .fetch(conn);

    let mut result = Vec::new();
    while let Some(row) = stream.try_next().await? {
        result.push(row);
    }

    Ok(result)
}

pub async fn get_survey_response(conn: &PgPool, id: i64) -> Result<Option<SurveyResponse>, StoreError> {
    let r = query_as::<_, SurveyResponse>("SELECT id, survey_id, user_id, created_at FROM survey_response WHERE id=$1;")
        .bind(id)
        .fetch_optional(conn)
        .await?;

    Ok(r)
}

pub async fn add_survey_response(conn: &PgPool, response: &NewSurveyResponse) -> Result<SurveyResponse, StoreError> {
    let mut tx = conn.begin().await?;

    // Holding the survey row lock until commit serializes concurrent
    // responses to the same survey, so the count below stays accurate.
    let available_places: Option<i32> = query_scalar("SELECT available_places FROM survey WHERE id=$1 FOR UPDATE;")
        .bind(response.survey_id)
        .fetch_optional(&mut *tx)
        .await?;

    let available_places = match available_places {
        None => return Err(StoreError::SurveyNotFound),
        Some(v) => v,
    };

    let taken: i64 = query_scalar("SELECT COUNT(*) FROM survey_response WHERE survey_id=$1;")
        .bind(response.survey_id)
        .fetch_one(&mut *tx)
        .await?;

    if taken >= i64::from(available_places) {
        return Err(StoreError::NoPlacesRemaining);
    }

    let r = query_as::<_, SurveyResponse>(
        "INSERT INTO survey_response (survey_id, user_id, created_at)
         VALUES ($1, $2, NOW())
         RETURNING id, survey_id, user_id, created_at;")
        .bind(response.survey_id)
        .bind(response.user_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_user_fk(e, response.user_id))?;

    tx.commit().await?;

    Ok(r)
}

pub async fn delete_survey_response(conn: &PgPool, id: i64) -> Result<bool, StoreError> {
    let r = query("DELETE FROM survey_response WHERE id=$1;")
        .bind(id)
        .execute(conn)
        .await?;

    Ok(r.rows_affected() > 0)
}

#[async_trait]
impl Store for DBClient {
    async fn list_surveys(&self, user_id: Option<i64>) -> Result<Vec<Survey>, StoreError> {
        list_surveys(self.conn(), user_id).await
    }

    async fn get_survey(&self, id: i64) -> Result<Option<Survey>, StoreError> {
        get_survey(self.conn(), id).await
    }

    async fn add_survey(&self, survey: &NewSurvey) -> Result<Survey, StoreError> {
        add_survey(self.conn(), survey).await
    }

    async fn delete_survey(&self, id: i64) -> Result<bool, StoreError> {
        delete_survey(self.conn(), id).await
    }

    async fn list_survey_responses(&self, user_id: Option<i64>) -> Result<Vec<SurveyResponse>, StoreError> {
        list_survey_responses(self.conn(), user_id).await
    }

    async fn get_survey_response(&self, id: i64) -> Result<Option<SurveyResponse>, StoreError> {
        get_survey_response(self.conn(), id).await
    }

    async fn add_survey_response(&self, response: &NewSurveyResponse) -> Result<SurveyResponse, StoreError> {
        add_survey_response(self.conn(), response).await
    }

    async fn delete_survey_response(&self, id: i64) -> Result<bool, StoreError> {
        delete_survey_response(self.conn(), id).await
    }
}
