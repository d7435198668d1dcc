use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};

/// Connection and table settings for the rule store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdapterConfig {
    pub endpoint: String,
    pub user: String,
    pub password: String,
    pub database: String,
    /// Table holding the rules, optionally qualified as `database.table`
    pub table: String,
    /// Maximum records per insert or delete request
    pub batch_size: usize,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8123".to_string(),
            user: "default".to_string(),
            password: String::new(),
            database: "default".to_string(),
            table: "casbin_rule".to_string(),
            batch_size: 1000,
        }
    }
}

impl AdapterConfig {
    /// Check settings that would otherwise fail on first use.
    ///
    /// The table name is spliced into SQL, so it must be a plain identifier.
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("batch_size must be greater than zero");
        }
        if !is_table_name(&self.table) {
            bail!("invalid table name: {:?}", self.table);
        }
        Ok(())
    }
}

fn is_table_name(name: &str) -> bool {
    let parts: Vec<&str> = name.split('.').collect();
    parts.len() <= 2
        && parts.iter().all(|part| {
            !part.is_empty()
                && !part.starts_with(|c: char| c.is_ascii_digit())
                && part.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
        })
}
