use super::Adapter;
use crate::error::AdapterResult;
use crate::model::{section_rules, GROUPING_SECTION, POLICY_SECTION};
use crate::record::RuleRecord;
use casbin::Model;
use tracing::info;

impl Adapter {
    /// Write every rule of the `p` and `g` sections to the store.
    ///
    /// This is append-only, not a resync: rules already stored but missing
    /// from `model` are left in place. Rewriting an existing rule lands on the
    /// same id and changes nothing. Returns the number of records submitted.
    pub async fn save_rules(&self, model: &dyn Model) -> AdapterResult<usize> {
        let records = encode_model(model)?;
        if records.is_empty() {
            return Ok(0);
        }

        let written = self.store.batch_put(&records).await?;
        info!(count = written, "saved policy rules");
        Ok(written)
    }
}

fn encode_model(model: &dyn Model) -> AdapterResult<Vec<RuleRecord>> {
    let mut records = Vec::new();
    for sec in [POLICY_SECTION, GROUPING_SECTION] {
        for (ptype, rules) in section_rules(model, sec) {
            for rule in &rules {
                records.push(RuleRecord::encode(&ptype, rule)?);
            }
        }
    }
    Ok(records)
}
