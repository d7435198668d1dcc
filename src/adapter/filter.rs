use super::Adapter;
use crate::error::{AdapterError, AdapterResult};
use crate::record::{RuleRecord, MAX_FIELDS};
use tracing::info;

/// Partial rule pattern used for filtered removal.
///
/// Values are compared against positions `field_index..`; positions outside
/// that window and empty values match anything. Values that would land past
/// the last field are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleFilter {
    ptype: String,
    field_index: usize,
    values: Vec<String>,
}

impl RuleFilter {
    /// Build a filter, rejecting a start index past the last field
    pub fn new<S: AsRef<str>>(ptype: &str, field_index: usize, values: &[S]) -> AdapterResult<Self> {
        if field_index >= MAX_FIELDS {
            return Err(AdapterError::InvalidFieldIndex(field_index));
        }

        let values = values
            .iter()
            .take(MAX_FIELDS - field_index)
            .map(|v| v.as_ref().to_string())
            .collect();

        Ok(Self {
            ptype: ptype.to_string(),
            field_index,
            values,
        })
    }

    /// Check whether a stored record matches the pattern
    pub fn matches(&self, record: &RuleRecord) -> bool {
        if record.ptype != self.ptype {
            return false;
        }

        window_matches(&self.values, &record.fields()[self.field_index..])
    }
}

/// Compare `values` against `fields` position by position; empty values
/// match anything and fields past the end of `values` are not compared.
pub(super) fn window_matches<S: AsRef<str>>(values: &[S], fields: &[&str]) -> bool {
    values
        .iter()
        .zip(fields)
        .all(|(want, have)| want.as_ref().is_empty() || want.as_ref() == *have)
}

impl Adapter {
    /// Remove every stored rule of `ptype` whose fields starting at
    /// `field_index` equal `values`, returning how many were removed.
    ///
    /// Empty values act as wildcards. The store is scanned on every call and
    /// matches are removed in one bulk delete, which must report exactly the
    /// number of matches like [`Adapter::remove_rules`].
    pub async fn remove_filtered_rules<S: AsRef<str>>(
        &self,
        ptype: &str,
        field_index: usize,
        values: &[S],
    ) -> AdapterResult<usize> {
        let filter = RuleFilter::new(ptype, field_index, values)?;

        let ids: Vec<String> = self
            .load_records()
            .await?
            .into_iter()
            .filter(|record| filter.matches(record))
            .map(|record| record.id)
            .collect();

        if ids.is_empty() {
            return Ok(0);
        }

        self.delete_ids(&ids).await?;
        info!(ptype = %ptype, field_index, count = ids.len(), "removed filtered rules");
        Ok(ids.len())
    }
}
