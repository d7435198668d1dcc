use crate::record::RuleRecord;
use casbin::{DefaultModel, Model};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

/// Section holding permission rules
pub const POLICY_SECTION: &str = "p";
/// Section holding grouping (role inheritance) rules
pub const GROUPING_SECTION: &str = "g";

const MODEL: &str = r#"
[request_definition]
r = sub, obj, act

[policy_definition]
p = sub, obj, act

[role_definition]
g = _, _

[policy_effect]
e = some(where (p.eft == allow))

[matchers]
m = g(r.sub, p.sub) && r.obj == p.obj && r.act == p.act
"#;

/// RBAC model used when no model file is given
pub fn default_model_string() -> &'static str {
    MODEL
}

/// Build the model from a file, or the default RBAC model
pub async fn load_model(path: Option<&Path>) -> casbin::Result<DefaultModel> {
    match path {
        Some(path) => DefaultModel::from_file(path).await,
        None => DefaultModel::from_str(MODEL).await,
    }
}

/// Add a stored record to the model under the section named by the first
/// character of its policy type.
///
/// Returns false when the record was not added: its type is empty, not
/// defined by the model, or the rule is already present.
pub fn add_record(model: &mut dyn Model, record: &RuleRecord) -> bool {
    let Some(sec) = record.ptype.chars().next().map(String::from) else {
        warn!(id = %record.id, "skipping stored rule with empty policy type");
        return false;
    };

    if !model
        .get_model()
        .get(&sec)
        .is_some_and(|types| types.contains_key(&record.ptype))
    {
        warn!(id = %record.id, ptype = %record.ptype, "skipping stored rule of type not in model");
        return false;
    }

    model.add_policy(&sec, &record.ptype, record.rule())
}

/// Rules of one section, grouped by policy type and sorted by type
pub fn section_rules(model: &dyn Model, sec: &str) -> Vec<(String, Vec<Vec<String>>)> {
    let mut rules: Vec<(String, Vec<Vec<String>>)> = model
        .get_model()
        .get(sec)
        .map(|types| {
            types
                .iter()
                .map(|(ptype, ast)| (ptype.clone(), ast.get_policy().iter().cloned().collect()))
                .collect()
        })
        .unwrap_or_default();
    rules.sort_by(|a, b| a.0.cmp(&b.0));
    rules
}

/// Serializable copy of the `p` and `g` rules of a model
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PolicySnapshot {
    pub sections: BTreeMap<String, BTreeMap<String, Vec<Vec<String>>>>,
}

impl PolicySnapshot {
    /// Capture the rules currently held by a model
    pub fn from_model(model: &dyn Model) -> Self {
        let mut sections = BTreeMap::new();
        for sec in [POLICY_SECTION, GROUPING_SECTION] {
            let types: BTreeMap<_, _> = section_rules(model, sec).into_iter().collect();
            if !types.is_empty() {
                sections.insert(sec.to_string(), types);
            }
        }
        Self { sections }
    }

    /// Rules under a section and policy type
    pub fn get(&self, sec: &str, ptype: &str) -> Option<&[Vec<String>]> {
        self.sections
            .get(sec)
            .and_then(|types| types.get(ptype))
            .map(Vec::as_slice)
    }

    /// Total number of rules
    pub fn len(&self) -> usize {
        self.sections
            .values()
            .flat_map(|types| types.values())
            .map(Vec::len)
            .sum()
    }

    /// Check if the snapshot holds no rules
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
