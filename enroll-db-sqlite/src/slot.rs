use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use enroll_core::{AnswerSlot, EnrollmentAnswer, StoreError};
use sqlx::FromRow;
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use tracing::debug;

/// [`AnswerSlot`] backed by the `enrollment_slot` table.
pub struct SqliteSlot {
    pool: SqlitePool,
}

#[derive(FromRow)]
struct SlotRow {
    payload: String,
}

impl SqliteSlot {
    /// Connects over a single-connection pool. Each connection to
    /// `sqlite::memory:` is its own database, so one is all a slot may use.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await
            .with_context(|| format!("Failed to connect to database: {database_url}"))?;
        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run database migrations")?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// When the record under `key` was last written.
    pub async fn updated_at(
        &self,
        key: &str,
    ) -> Result<Option<DateTime<Utc>>, StoreError> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            "SELECT updated_at FROM enrollment_slot WHERE key = ?",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))
    }
}

#[async_trait]
impl AnswerSlot for SqliteSlot {
    async fn load(
        &self,
        key: &str,
    ) -> Result<Option<EnrollmentAnswer>, StoreError> {
        let row = sqlx::query_as::<_, SlotRow>("SELECT payload FROM enrollment_slot WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;

        match row {
            Some(row) => Ok(Some(serde_json::from_str(&row.payload)?)),
            None => Ok(None),
        }
    }

    async fn save(
        &self,
        key: &str,
        answer: &EnrollmentAnswer,
    ) -> Result<(), StoreError> {
        let payload = serde_json::to_string(answer)?;
        sqlx::query(
            "INSERT INTO enrollment_slot (key, payload, updated_at) VALUES (?, ?, ?)
             ON CONFLICT(key) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(&payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| StoreError::Storage(e.to_string()))?;

        debug!(key, bytes = payload.len(), "sqlite slot written");
        Ok(())
    }

    async fn clear(
        &self,
        key: &str,
    ) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM enrollment_slot WHERE key = ?")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Storage(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use enroll_core::{EnrollmentStore, ExamGoal, Grade};
    use pretty_assertions::assert_eq;

    use super::*;

    async fn setup_test_db() -> SqliteSlot {
        let slot = SqliteSlot::connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        slot.run_migrations()
            .await
            .expect("Failed to run migrations");
        slot
    }

    fn sample_answer() -> EnrollmentAnswer {
        EnrollmentAnswer {
            full_name: Some("Asha Rao".to_string()),
            grade: Some(Grade::Nine),
            subjects: vec!["Maths".to_string(), "English".to_string()],
            exam_goal: Some(ExamGoal::ConceptMastery),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_empty_slot_loads_none() {
        let slot = setup_test_db().await;

        assert_eq!(slot.load("enrollment-storage").await.unwrap(), None);
        assert_eq!(slot.updated_at("enrollment-storage").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let slot = setup_test_db().await;

        slot.save("k", &sample_answer()).await.unwrap();

        assert_eq!(slot.load("k").await.unwrap(), Some(sample_answer()));
        assert!(slot.updated_at("k").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_save_overwrites_existing_row() {
        let slot = setup_test_db().await;
        slot.save("k", &sample_answer()).await.unwrap();

        slot.save("k", &EnrollmentAnswer::default()).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM enrollment_slot")
            .fetch_one(slot.pool())
            .await
            .unwrap();
        assert_eq!(count, 1);
        assert_eq!(slot.load("k").await.unwrap(), Some(EnrollmentAnswer::default()));
    }

    #[tokio::test]
    async fn test_clear_removes_row_and_is_idempotent() {
        let slot = setup_test_db().await;
        slot.save("k", &sample_answer()).await.unwrap();

        slot.clear("k").await.unwrap();
        slot.clear("k").await.unwrap();

        assert_eq!(slot.load("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_corrupt_payload_is_serialization_error() {
        let slot = setup_test_db().await;
        sqlx::query("INSERT INTO enrollment_slot (key, payload, updated_at) VALUES ('k', '{oops', ?)")
            .bind(Utc::now())
            .execute(slot.pool())
            .await
            .unwrap();

        let err = slot.load("k").await.unwrap_err();

        assert!(matches!(err, StoreError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_store_reset_persists_defaults() {
        let slot = setup_test_db().await;
        let pool = slot.pool().clone();
        slot.save("enrollment-storage", &sample_answer()).await.unwrap();

        let mut store = EnrollmentStore::open(Box::new(slot)).await.unwrap();
        assert_eq!(store.state().grade, Some(Grade::Nine));
        store.reset().await.unwrap();

        let payload: String =
            sqlx::query_scalar("SELECT payload FROM enrollment_slot WHERE key = 'enrollment-storage'")
                .fetch_one(&pool)
                .await
                .unwrap();
        assert_eq!(payload, r#"{"subjects":[],"isScholarship":false}"#);
    }
}
