use sqlx::postgres::PgPoolOptions;
use sqlx::{Executor, PgPool};

const SCHEMA: &str = include_str!("schema.sql");

pub struct DBClient {
    pool: PgPool,
}

impl DBClient {
    pub async fn new(db_url: &str, max_connections: u32) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(db_url)
            .await?;

        Ok(Self {
            pool,
        })
    }

    pub fn conn(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the survey tables if they are missing. Safe to run on every start.
    pub async fn apply_schema(&self) -> anyhow::Result<()> {
        self.pool.execute(SCHEMA).await?;

        Ok(())
    }
}
