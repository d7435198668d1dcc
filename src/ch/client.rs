use crate::config::AdapterConfig;
use anyhow::{Context, Result};
use clickhouse::query::Query;
use clickhouse::{Client, Row};
use serde::{Deserialize, Serialize};

/// ClickHouse HTTP client wrapper
#[derive(Clone)]
pub struct ChClient {
    client: Client,
    endpoint: String,
}

impl ChClient {
    /// Create a new ClickHouse client
    pub fn new(endpoint: &str, user: &str, password: &str, database: &str) -> Self {
        let client = Client::default()
            .with_url(endpoint)
            .with_user(user)
            .with_password(password)
            .with_database(database);

        Self {
            client,
            endpoint: endpoint.to_string(),
        }
    }

    /// Create a client from adapter configuration
    pub fn from_config(config: &AdapterConfig) -> Self {
        Self::new(
            &config.endpoint,
            &config.user,
            &config.password,
            &config.database,
        )
    }

    /// Test connection with SELECT 1
    pub async fn ping(&self) -> Result<()> {
        #[derive(Debug, Deserialize, Row)]
        struct PingResult {
            result: u8,
        }

        let result: PingResult = self
            .client
            .query("SELECT 1 AS result")
            .fetch_one()
            .await
            .with_context(|| format!("Failed to connect to ClickHouse at {}", self.endpoint))?;

        anyhow::ensure!(
            result.result == 1,
            "Unexpected ping result: {}",
            result.result
        );

        Ok(())
    }

    /// Start a query; `?` placeholders are filled with `bind`
    pub fn query(&self, sql: &str) -> Query {
        self.client.query(sql)
    }

    /// Insert rows into a table in a single request
    pub async fn insert_rows<T>(&self, table: &str, rows: &[T]) -> Result<()>
    where
        T: Row + Serialize,
    {
        let mut insert = self
            .client
            .insert(table)
            .with_context(|| format!("Failed to prepare insert into {}", table))?;

        for row in rows {
            insert
                .write(row)
                .await
                .with_context(|| format!("Failed to write row into {}", table))?;
        }

        insert
            .end()
            .await
            .with_context(|| format!("Failed to finish insert into {}", table))?;

        Ok(())
    }

    /// Get the endpoint URL
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}
