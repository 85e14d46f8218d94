use async_trait::async_trait;
use btechverse_core::AppError;
use sqlx::{PgPool, Postgres};

/// Name of the counter tracking distinct student visits.
pub const STUDENTS_COUNTER: &str = "students";

/// Named monotonically increasing counters.
#[async_trait]
pub trait StudentCounterRepository: Send + Sync {
    /// Increment the counter and return the new value.
    async fn increment(&self, name: &str) -> Result<i64, AppError>;

    /// Current value; zero when the counter has never been incremented.
    async fn get(&self, name: &str) -> Result<i64, AppError>;
}

#[derive(Clone)]
pub struct PgStudentCounterRepository {
    pool: PgPool,
}

impl PgStudentCounterRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentCounterRepository for PgStudentCounterRepository {
    #[tracing::instrument(skip(self), fields(db.table = "counters", db.operation = "upsert"))]
    async fn increment(&self, name: &str) -> Result<i64, AppError> {
        let value = sqlx::query_scalar::<Postgres, i64>(
            r#"
            INSERT INTO counters (name, value) VALUES ($1, 1)
            ON CONFLICT (name) DO UPDATE SET value = counters.value + 1
            RETURNING value
            "#,
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await?;

        Ok(value)
    }

    #[tracing::instrument(skip(self), fields(db.table = "counters", db.operation = "select"))]
    async fn get(&self, name: &str) -> Result<i64, AppError> {
        let value =
            sqlx::query_scalar::<Postgres, i64>("SELECT value FROM counters WHERE name = $1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(value.unwrap_or(0))
    }
}
