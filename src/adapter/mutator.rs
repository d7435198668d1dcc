use super::Adapter;
use crate::error::{AdapterError, AdapterResult};
use crate::record::RuleRecord;
use crate::store::{RuleStore, StoreError};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

impl Adapter {
    /// Add one rule. Adding a rule that is already stored succeeds.
    pub async fn add_rule<S: AsRef<str>>(&self, ptype: &str, rule: &[S]) -> AdapterResult<()> {
        let record = RuleRecord::encode(ptype, rule)?;
        insert_record(self.store.as_ref(), &record).await
    }

    /// Add a batch of rules concurrently, one conditional write per rule.
    ///
    /// Every rule is encoded before any write starts, so an oversized rule
    /// fails the call without touching the store. Otherwise all writes run to
    /// completion and the first error is returned; rules that were written
    /// stay written. Dropping the returned future aborts unfinished writes.
    pub async fn add_rules<S: AsRef<str>>(
        &self,
        ptype: &str,
        rules: &[Vec<S>],
    ) -> AdapterResult<()> {
        let records = encode_all(ptype, rules)?;

        let mut tasks = JoinSet::new();
        for record in records {
            let store = Arc::clone(&self.store);
            tasks.spawn(async move { insert_record(store.as_ref(), &record).await });
        }

        let mut first_error = None;
        while let Some(joined) = tasks.join_next().await {
            let outcome = joined.map_err(AdapterError::from).and_then(|result| result);
            if let Err(err) = outcome {
                first_error.get_or_insert(err);
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Remove one rule. Removing a rule that is not stored succeeds.
    pub async fn remove_rule<S: AsRef<str>>(
        &self,
        ptype: &str,
        rule: &[S],
    ) -> AdapterResult<()> {
        let record = RuleRecord::encode(ptype, rule)?;
        self.store.delete(&record.id).await?;
        Ok(())
    }

    /// Remove a batch of rules in one bulk delete.
    ///
    /// Fails with [`AdapterError::CountMismatch`] unless the store reports
    /// exactly one removal per rule, which also covers rules that were not
    /// stored.
    pub async fn remove_rules<S: AsRef<str>>(
        &self,
        ptype: &str,
        rules: &[Vec<S>],
    ) -> AdapterResult<()> {
        let ids: Vec<String> = encode_all(ptype, rules)?
            .into_iter()
            .map(|record| record.id)
            .collect();
        self.delete_ids(&ids).await
    }

    /// Delete every stored rule, returning how many were removed
    pub async fn clear_rules(&self) -> AdapterResult<usize> {
        let ids: Vec<String> = self
            .load_records()
            .await?
            .into_iter()
            .map(|record| record.id)
            .collect();
        self.delete_ids(&ids).await?;
        Ok(ids.len())
    }

    /// Bulk delete by id, checking the removed count
    pub(super) async fn delete_ids(&self, ids: &[String]) -> AdapterResult<()> {
        if ids.is_empty() {
            return Ok(());
        }

        let removed = self.store.batch_delete(ids).await?;
        if removed != ids.len() {
            warn!(expected = ids.len(), actual = removed, "batch delete count mismatch");
            return Err(AdapterError::CountMismatch {
                expected: ids.len(),
                actual: removed,
            });
        }
        Ok(())
    }
}

fn encode_all<S: AsRef<str>>(ptype: &str, rules: &[Vec<S>]) -> AdapterResult<Vec<RuleRecord>> {
    rules
        .iter()
        .map(|rule| RuleRecord::encode(ptype, rule))
        .collect()
}

async fn insert_record(store: &dyn RuleStore, record: &RuleRecord) -> AdapterResult<()> {
    match store.put_if_absent(record).await {
        Ok(()) => Ok(()),
        Err(StoreError::ConditionalCheckFailed) => {
            debug!(id = %record.id, ptype = %record.ptype, "rule already stored");
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}
