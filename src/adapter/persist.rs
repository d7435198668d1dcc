use super::Adapter;
use async_trait::async_trait;
use casbin::{Filter, Model, Result};
use tracing::debug;

/// Plugs the store into a casbin `Enforcer`.
///
/// The policy type already names its section, so `sec` is only logged.
/// Mutations report `true` whenever the store call succeeds, which keeps the
/// enforcer's in-memory model in step with the store.
#[async_trait]
impl casbin::Adapter for Adapter {
    async fn load_policy(&mut self, m: &mut dyn Model) -> Result<()> {
        self.load_rules(m).await?;
        self.is_filtered = false;
        Ok(())
    }

    async fn load_filtered_policy<'a>(&mut self, m: &mut dyn Model, f: Filter<'a>) -> Result<()> {
        self.load_filtered_rules(m, &f).await?;
        self.is_filtered = true;
        Ok(())
    }

    async fn save_policy(&mut self, m: &mut dyn Model) -> Result<()> {
        self.save_rules(m).await?;
        Ok(())
    }

    async fn clear_policy(&mut self) -> Result<()> {
        self.clear_rules().await?;
        Ok(())
    }

    fn is_filtered(&self) -> bool {
        self.is_filtered
    }

    async fn add_policy(&mut self, sec: &str, ptype: &str, rule: Vec<String>) -> Result<bool> {
        debug!(sec, ptype, "adding rule");
        self.add_rule(ptype, &rule).await?;
        Ok(true)
    }

    async fn add_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> Result<bool> {
        debug!(sec, ptype, count = rules.len(), "adding rules");
        self.add_rules(ptype, &rules).await?;
        Ok(true)
    }

    async fn remove_policy(&mut self, sec: &str, ptype: &str, rule: Vec<String>) -> Result<bool> {
        debug!(sec, ptype, "removing rule");
        self.remove_rule(ptype, &rule).await?;
        Ok(true)
    }

    async fn remove_policies(
        &mut self,
        sec: &str,
        ptype: &str,
        rules: Vec<Vec<String>>,
    ) -> Result<bool> {
        debug!(sec, ptype, count = rules.len(), "removing rules");
        self.remove_rules(ptype, &rules).await?;
        Ok(true)
    }

    async fn remove_filtered_policy(
        &mut self,
        sec: &str,
        ptype: &str,
        field_index: usize,
        field_values: Vec<String>,
    ) -> Result<bool> {
        let removed = self
            .remove_filtered_rules(ptype, field_index, &field_values)
            .await?;
        debug!(sec, ptype, removed, "removed filtered rules");
        Ok(true)
    }
}
