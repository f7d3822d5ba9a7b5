use tracing::{debug, info};

use super::slot::{AnswerSlot, StoreError};
use crate::models::{EnrollmentAnswer, EnrollmentPatch};

/// Slot key the enrollment record is persisted under.
pub const STORAGE_KEY: &str = "enrollment-storage";

/// Owns the accumulated enrollment record and keeps its slot in sync.
///
/// Every mutation writes the full record to the slot before returning. If
/// the write fails the in-memory record is left unchanged, so memory and
/// storage never disagree.
pub struct EnrollmentStore {
    slot: Box<dyn AnswerSlot>,
    key: String,
    state: EnrollmentAnswer,
}

impl EnrollmentStore {
    /// Loads the record from `slot`, falling back to defaults when the
    /// slot is empty.
    pub async fn open(slot: Box<dyn AnswerSlot>) -> Result<Self, StoreError> {
        Self::open_with_key(slot, STORAGE_KEY).await
    }

    pub async fn open_with_key(
        slot: Box<dyn AnswerSlot>,
        key: impl Into<String>,
    ) -> Result<Self, StoreError> {
        let key = key.into();
        let state = match slot.load(&key).await? {
            Some(state) => {
                debug!(key = %key, "restored enrollment record");
                state
            }
            None => {
                debug!(key = %key, "no stored enrollment record, starting fresh");
                EnrollmentAnswer::default()
            }
        };
        Ok(Self { slot, key, state })
    }

    /// Wraps `slot` without reading it; the record starts at the defaults.
    ///
    /// For replacing or deleting a record that may no longer deserialize.
    /// The next `reset` or `purge` overwrites whatever the slot holds.
    pub fn detached(slot: Box<dyn AnswerSlot>) -> Self {
        Self {
            slot,
            key: STORAGE_KEY.to_string(),
            state: EnrollmentAnswer::default(),
        }
    }

    /// The full accumulated record.
    pub fn state(&self) -> &EnrollmentAnswer {
        &self.state
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Shallow-merges `patch` into the record and persists the result.
    pub async fn merge(
        &mut self,
        patch: EnrollmentPatch,
    ) -> Result<(), StoreError> {
        let next = self.state.merged(patch);
        self.slot.save(&self.key, &next).await?;
        self.state = next;
        debug!(key = %self.key, "merged enrollment patch");
        Ok(())
    }

    /// Replaces the record with the defaults and persists them.
    pub async fn reset(&mut self) -> Result<(), StoreError> {
        let fresh = EnrollmentAnswer::default();
        self.slot.save(&self.key, &fresh).await?;
        self.state = fresh;
        info!(key = %self.key, "enrollment record reset");
        Ok(())
    }

    /// Deletes the stored record altogether. The in-memory record returns to
    /// the defaults; the next open starts from an empty slot.
    pub async fn purge(&mut self) -> Result<(), StoreError> {
        self.slot.clear(&self.key).await?;
        self.state = EnrollmentAnswer::default();
        info!(key = %self.key, "enrollment record purged");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::models::{Grade, PaymentPlan};
    use crate::store::MemorySlot;

    /// A slot whose writes always fail.
    struct ReadOnlySlot;

    #[async_trait]
    impl AnswerSlot for ReadOnlySlot {
        async fn load(
            &self,
            _key: &str,
        ) -> Result<Option<EnrollmentAnswer>, StoreError> {
            Ok(None)
        }
        async fn save(
            &self,
            _key: &str,
            _answer: &EnrollmentAnswer,
        ) -> Result<(), StoreError> {
            Err(StoreError::Storage("read-only".to_string()))
        }
        async fn clear(
            &self,
            _key: &str,
        ) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn grade_patch(grade: Grade) -> EnrollmentPatch {
        EnrollmentPatch {
            grade: Some(grade),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn empty_slot_opens_with_defaults() {
        let store = EnrollmentStore::open(Box::new(MemorySlot::new()))
            .await
            .unwrap();

        assert_eq!(store.state(), &EnrollmentAnswer::default());
        assert_eq!(store.key(), STORAGE_KEY);
    }

    #[tokio::test]
    async fn merge_is_persisted_and_restored_on_reopen() {
        let slot = MemorySlot::new();
        let mut store = EnrollmentStore::open(Box::new(slot.clone())).await.unwrap();

        store.merge(grade_patch(Grade::Eleven)).await.unwrap();
        store
            .merge(EnrollmentPatch {
                payment_plan: Some(PaymentPlan::Annual),
                ..Default::default()
            })
            .await
            .unwrap();

        let reopened = EnrollmentStore::open(Box::new(slot)).await.unwrap();
        assert_eq!(reopened.state().grade, Some(Grade::Eleven));
        assert_eq!(reopened.state().payment_plan, Some(PaymentPlan::Annual));
    }

    #[tokio::test]
    async fn reset_restores_exact_defaults() {
        let slot = MemorySlot::new();
        let mut store = EnrollmentStore::open(Box::new(slot.clone())).await.unwrap();
        store.merge(grade_patch(Grade::Nine)).await.unwrap();

        store.reset().await.unwrap();

        assert_eq!(store.state(), &EnrollmentAnswer::default());
        let stored: serde_json::Value =
            serde_json::from_str(&slot.raw(STORAGE_KEY).unwrap()).unwrap();
        assert_eq!(
            stored,
            serde_json::json!({ "subjects": [], "isScholarship": false })
        );
    }

    #[tokio::test]
    async fn failed_write_leaves_state_untouched() {
        let mut store = EnrollmentStore::open(Box::new(ReadOnlySlot)).await.unwrap();

        let result = store.merge(grade_patch(Grade::Ten)).await;

        assert_eq!(result, Err(StoreError::Storage("read-only".to_string())));
        assert_eq!(store.state().grade, None);
    }

    #[tokio::test]
    async fn corrupt_record_is_surfaced_not_replaced() {
        let slot = MemorySlot::new();
        slot.put_raw(STORAGE_KEY, "{\"grade\": \"13\"}").unwrap();

        let result = EnrollmentStore::open(Box::new(slot.clone())).await;

        assert!(matches!(result, Err(StoreError::Serialization(_))));
        assert_eq!(slot.raw(STORAGE_KEY).as_deref(), Some("{\"grade\": \"13\"}"));
    }

    #[tokio::test]
    async fn detached_store_overwrites_unreadable_record() {
        let slot = MemorySlot::new();
        slot.put_raw(STORAGE_KEY, "{\"grade\": \"1").unwrap();

        let mut store = EnrollmentStore::detached(Box::new(slot.clone()));
        store.reset().await.unwrap();

        let reopened = EnrollmentStore::open(Box::new(slot.clone())).await.unwrap();
        assert!(reopened.state().is_pristine());

        slot.put_raw(STORAGE_KEY, "not json").unwrap();
        EnrollmentStore::detached(Box::new(slot.clone())).purge().await.unwrap();
        assert_eq!(slot.raw(STORAGE_KEY), None);
    }

    #[tokio::test]
    async fn purge_empties_the_slot() {
        let slot = MemorySlot::new();
        let mut store = EnrollmentStore::open(Box::new(slot.clone())).await.unwrap();
        store.merge(grade_patch(Grade::Nine)).await.unwrap();

        store.purge().await.unwrap();

        assert!(store.state().is_pristine());
        assert_eq!(slot.raw(STORAGE_KEY), None);
    }

    #[tokio::test]
    async fn custom_key_keeps_records_apart() {
        let slot = MemorySlot::new();
        let mut a = EnrollmentStore::open_with_key(Box::new(slot.clone()), "a")
            .await
            .unwrap();
        a.merge(grade_patch(Grade::Twelve)).await.unwrap();

        let b = EnrollmentStore::open_with_key(Box::new(slot), "b")
            .await
            .unwrap();

        assert!(b.state().is_pristine());
    }
}
