use super::ChClient;
use crate::config::AdapterConfig;
use crate::record::RuleRecord;
use crate::store::{RuleStore, StoreError, StoreResult};
use anyhow::{Context, Result};
use async_trait::async_trait;
use clickhouse::Row;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// [`RuleStore`] backed by a ClickHouse table.
///
/// Expected schema:
///
/// ```sql
/// CREATE TABLE casbin_rule (
///     ID String, PType String,
///     V0 String, V1 String, V2 String, V3 String, V4 String, V5 String
/// ) ENGINE = ReplacingMergeTree ORDER BY ID
/// ```
///
/// ClickHouse has no conditional insert, so `put_if_absent` checks for the
/// id first. Two writers racing on the same rule may both insert; the
/// replacing engine collapses the duplicates since the rows are identical.
#[derive(Clone)]
pub struct ClickHouseStore {
    client: ChClient,
    table: String,
    batch_size: usize,
}

#[derive(Debug, Row, Serialize, Deserialize)]
struct CountRow {
    count: u64,
}

impl ClickHouseStore {
    /// Wrap an existing client
    pub fn new(client: ChClient, table: &str, batch_size: usize) -> Self {
        Self {
            client,
            table: table.to_string(),
            batch_size: batch_size.max(1),
        }
    }

    /// Validate the configuration, connect and ping the server
    pub async fn connect(config: &AdapterConfig) -> Result<Self> {
        config.validate()?;
        let client = ChClient::from_config(config);
        client.ping().await?;
        debug!(endpoint = %client.endpoint(), table = %config.table, "connected rule store");
        Ok(Self::new(client, &config.table, config.batch_size))
    }

    /// Table the rules live in
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Build the SQL for a full table scan
    pub fn scan_query(table: &str) -> String {
        format!("SELECT ?fields FROM {} FINAL", table)
    }

    /// Build the SQL counting rows whose id is in a bound array
    pub fn count_query(table: &str) -> String {
        format!(
            "SELECT count() AS count FROM {} FINAL WHERE has(?, ID)",
            table
        )
    }

    /// Build the SQL deleting rows whose id is in a bound array
    pub fn delete_query(table: &str) -> String {
        format!("DELETE FROM {} WHERE has(?, ID)", table)
    }

    async fn count_ids(&self, ids: &[String]) -> Result<usize> {
        let row: CountRow = self
            .client
            .query(&Self::count_query(&self.table))
            .bind(ids)
            .fetch_one()
            .await
            .with_context(|| format!("Failed to count rules in {}", self.table))?;

        Ok(row.count as usize)
    }

    async fn delete_ids(&self, ids: &[String]) -> Result<()> {
        self.client
            .query(&Self::delete_query(&self.table))
            .bind(ids)
            .execute()
            .await
            .with_context(|| format!("Failed to delete rules from {}", self.table))
    }
}

#[async_trait]
impl RuleStore for ClickHouseStore {
    async fn scan_all(&self) -> StoreResult<Vec<RuleRecord>> {
        let records = self
            .client
            .query(&Self::scan_query(&self.table))
            .fetch_all::<RuleRecord>()
            .await
            .with_context(|| format!("Failed to scan rules from {}", self.table))?;

        Ok(records)
    }

    async fn put_if_absent(&self, record: &RuleRecord) -> StoreResult<()> {
        let ids = [record.id.clone()];
        if self.count_ids(&ids).await? > 0 {
            return Err(StoreError::ConditionalCheckFailed);
        }
        self.client
            .insert_rows(&self.table, std::slice::from_ref(record))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.delete_ids(&[id.to_string()]).await?;
        Ok(())
    }

    async fn batch_put(&self, records: &[RuleRecord]) -> StoreResult<usize> {
        for chunk in records.chunks(self.batch_size) {
            self.client.insert_rows(&self.table, chunk).await?;
        }
        Ok(records.len())
    }

    async fn batch_delete(&self, ids: &[String]) -> StoreResult<usize> {
        let mut removed = 0;
        for chunk in ids.chunks(self.batch_size) {
            let present = self.count_ids(chunk).await?;
            self.delete_ids(chunk).await?;
            removed += present;
        }
        Ok(removed)
    }
}
