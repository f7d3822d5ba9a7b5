use async_trait::async_trait;
use enroll_core::{AnswerSlot, SlotConfig, SlotFactory, StoreError};
use tracing::info;

use crate::slot::SqliteSlot;

/// [`SlotFactory`] for SQLite.
///
/// Register this with a [`enroll_core::SlotRegistry`] to make the
/// `"sqlite"` backend available:
///
/// ```rust,no_run
/// use enroll_core::SlotRegistry;
/// use enroll_db_sqlite::SqliteSlotFactory;
///
/// let mut registry = SlotRegistry::with_builtin();
/// registry.register(Box::new(SqliteSlotFactory));
/// ```
pub struct SqliteSlotFactory;

/// Maps `config.location` to a sqlx connection URL.
///
/// * A bare file path, e.g. `"enroll.db"`. The file is created if missing.
/// * `":memory:"`, an ephemeral database that lives as long as the slot.
/// * A full `sqlite:` URL, passed through untouched.
fn database_url(location: &str) -> Result<String, StoreError> {
    let location = location.trim();
    match location {
        "" => Err(StoreError::Configuration(
            "sqlite backend needs a database path".to_string(),
        )),
        ":memory:" => Ok("sqlite::memory:".to_string()),
        url if url.starts_with("sqlite:") => Ok(url.to_string()),
        path => Ok(format!("sqlite:{path}?mode=rwc")),
    }
}

#[async_trait]
impl SlotFactory for SqliteSlotFactory {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    /// Opens the database described by `config.location` and runs the
    /// migrations.
    async fn create(
        &self,
        config: &SlotConfig,
    ) -> Result<Box<dyn AnswerSlot>, StoreError> {
        let url = database_url(&config.location)?;
        let slot = SqliteSlot::connect(&url)
            .await
            .map_err(|e| StoreError::Connection(format!("{e:#}")))?;
        slot.run_migrations()
            .await
            .map_err(|e| StoreError::Storage(format!("{e:#}")))?;

        info!(location = %config.location, "sqlite slot ready");
        Ok(Box::new(slot))
    }
}
