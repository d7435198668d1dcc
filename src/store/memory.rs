use super::{RuleStore, StoreError, StoreResult};
use crate::record::RuleRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Process-local [`RuleStore`], used for tests and dry runs
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: Mutex<BTreeMap<String, RuleRecord>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-populated with records
    pub fn with_records(records: impl IntoIterator<Item = RuleRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|record| (record.id.clone(), record))
            .collect();
        Self {
            records: Mutex::new(records),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Check if the store is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Look up a record by id
    pub fn get(&self, id: &str) -> Option<RuleRecord> {
        self.lock().get(id).cloned()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, RuleRecord>> {
        // a poisoned map is still structurally valid
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl RuleStore for InMemoryStore {
    async fn scan_all(&self) -> StoreResult<Vec<RuleRecord>> {
        Ok(self.lock().values().cloned().collect())
    }

    async fn put_if_absent(&self, record: &RuleRecord) -> StoreResult<()> {
        let mut records = self.lock();
        if records.contains_key(&record.id) {
            return Err(StoreError::ConditionalCheckFailed);
        }
        records.insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.lock().remove(id);
        Ok(())
    }

    async fn batch_put(&self, records: &[RuleRecord]) -> StoreResult<usize> {
        let mut stored = self.lock();
        for record in records {
            stored.insert(record.id.clone(), record.clone());
        }
        Ok(records.len())
    }

    async fn batch_delete(&self, ids: &[String]) -> StoreResult<usize> {
        let mut stored = self.lock();
        let removed = ids.iter().filter(|id| stored.remove(*id).is_some()).count();
        Ok(removed)
    }
}
