use super::filter::window_matches;
use super::Adapter;
use crate::error::AdapterResult;
use crate::model::{add_record, GROUPING_SECTION, POLICY_SECTION};
use crate::record::RuleRecord;
use casbin::{Filter, Model};
use tracing::{debug, info};

impl Adapter {
    /// Load every stored rule into `model`, returning how many were added.
    ///
    /// Records are fetched before anything is added, so a failed scan leaves
    /// the model untouched; callers must still not enforce with a model whose
    /// load returned an error. Rules whose type the model does not define are
    /// skipped.
    pub async fn load_rules(&self, model: &mut dyn Model) -> AdapterResult<usize> {
        let records = self.load_records().await?;
        let added = add_records(model, records.iter());

        info!(stored = records.len(), added, "loaded policy rules");
        Ok(added)
    }

    /// Load only stored rules matching `filter`.
    ///
    /// `filter.p` and `filter.g` are compared positionally from the first
    /// field against rules of the `p` and `g` sections; empty values match
    /// anything.
    pub async fn load_filtered_rules(
        &self,
        model: &mut dyn Model,
        filter: &Filter<'_>,
    ) -> AdapterResult<usize> {
        let records = self.load_records().await?;
        let selected = records.iter().filter(|record| {
            let values: &[&str] = if record.ptype.starts_with(POLICY_SECTION) {
                &filter.p
            } else if record.ptype.starts_with(GROUPING_SECTION) {
                &filter.g
            } else {
                return false;
            };
            window_matches(values, &record.fields())
        });
        let added = add_records(model, selected);

        info!(stored = records.len(), added, "loaded filtered policy rules");
        Ok(added)
    }

    /// Fetch every stored record without decoding
    pub async fn load_records(&self) -> AdapterResult<Vec<RuleRecord>> {
        Ok(self.store.scan_all().await?)
    }
}

fn add_records<'a>(
    model: &mut dyn Model,
    records: impl Iterator<Item = &'a RuleRecord>,
) -> usize {
    let mut added = 0;
    for record in records {
        if add_record(model, record) {
            added += 1;
        } else {
            debug!(line = %record.to_line(), "rule not added to model");
        }
    }
    added
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{load_model, PolicySnapshot};
    use crate::store::InMemoryStore;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn record(ptype: &str, fields: &[&str]) -> RuleRecord {
        RuleRecord::encode(ptype, fields).unwrap()
    }

    fn adapter_with(records: Vec<RuleRecord>) -> Adapter {
        Adapter::new(Arc::new(InMemoryStore::with_records(records)))
    }

    #[tokio::test]
    async fn test_load_rules_sorts_into_sections() {
        let adapter = adapter_with(vec![
            record("p", &["alice", "data1", "read"]),
            record("p", &["bob", "data2", "write"]),
            record("g", &["alice", "admin"]),
        ]);
        let mut model = load_model(None).await.unwrap();

        let added = adapter.load_rules(&mut model).await.unwrap();

        assert_eq!(added, 3);
        let snapshot = PolicySnapshot::from_model(&model);
        assert_eq!(snapshot.get("p", "p").unwrap().len(), 2);
        assert_eq!(
            snapshot.get("g", "g").unwrap(),
            &[strings(&["alice", "admin"])]
        );
    }

    #[tokio::test]
    async fn test_load_rules_empty_store() {
        let adapter = adapter_with(vec![]);
        let mut model = load_model(None).await.unwrap();

        assert_eq!(adapter.load_rules(&mut model).await.unwrap(), 0);
        assert!(PolicySnapshot::from_model(&model).is_empty());
    }

    #[tokio::test]
    async fn test_load_rules_counts_only_added() {
        let adapter = adapter_with(vec![
            record("p", &["alice", "data1", "read"]),
            record("p7", &["bob", "data2"]),
            record("", &["carol"]),
        ]);
        let mut model = load_model(None).await.unwrap();

        let added = adapter.load_rules(&mut model).await.unwrap();

        assert_eq!(added, 1);
    }

    #[tokio::test]
    async fn test_load_rules_preserves_interior_empty() {
        let adapter = adapter_with(vec![record("p", &["alice", "", "read"])]);
        let mut model = load_model(None).await.unwrap();

        adapter.load_rules(&mut model).await.unwrap();

        assert_eq!(
            model.get_policy("p", "p"),
            vec![strings(&["alice", "", "read"])]
        );
    }

    #[tokio::test]
    async fn test_load_filtered_rules() {
        let adapter = adapter_with(vec![
            record("p", &["alice", "data1", "read"]),
            record("p", &["bob", "data2", "write"]),
            record("g", &["alice", "admin"]),
            record("g", &["bob", "staff"]),
        ]);
        let mut model = load_model(None).await.unwrap();
        let filter = Filter {
            p: vec!["", "data1"],
            g: vec!["bob"],
        };

        let added = adapter.load_filtered_rules(&mut model, &filter).await.unwrap();

        assert_eq!(added, 2);
        assert_eq!(
            model.get_policy("p", "p"),
            vec![strings(&["alice", "data1", "read"])]
        );
        assert_eq!(model.get_policy("g", "g"), vec![strings(&["bob", "staff"])]);
    }
}
