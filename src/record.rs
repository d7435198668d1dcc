use crate::error::{AdapterError, AdapterResult};
use clickhouse::Row;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};

/// Number of positional fields a stored rule carries
pub const MAX_FIELDS: usize = 6;

/// Storage form of a policy rule, one row per rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Row, Serialize, Deserialize)]
pub struct RuleRecord {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(rename = "PType")]
    pub ptype: String,
    #[serde(rename = "V0")]
    pub v0: String,
    #[serde(rename = "V1")]
    pub v1: String,
    #[serde(rename = "V2")]
    pub v2: String,
    #[serde(rename = "V3")]
    pub v3: String,
    #[serde(rename = "V4")]
    pub v4: String,
    #[serde(rename = "V5")]
    pub v5: String,
}

impl RuleRecord {
    /// Build the record for a rule, deriving its content id.
    ///
    /// Rules with more than [`MAX_FIELDS`] fields are rejected rather than
    /// truncated.
    pub fn encode<S: AsRef<str>>(ptype: &str, fields: &[S]) -> AdapterResult<Self> {
        if fields.len() > MAX_FIELDS {
            return Err(AdapterError::TooManyFields {
                ptype: ptype.to_string(),
                count: fields.len(),
            });
        }

        let mut values: [String; MAX_FIELDS] = Default::default();
        for (slot, field) in values.iter_mut().zip(fields) {
            *slot = field.as_ref().to_string();
        }
        let [v0, v1, v2, v3, v4, v5] = values;

        let mut record = Self {
            id: String::new(),
            ptype: ptype.to_string(),
            v0,
            v1,
            v2,
            v3,
            v4,
            v5,
        };
        record.id = rule_id(&record.ptype, &record.fields());
        Ok(record)
    }

    /// The six positional fields in order
    pub fn fields(&self) -> [&str; MAX_FIELDS] {
        [
            self.v0.as_str(),
            self.v1.as_str(),
            self.v2.as_str(),
            self.v3.as_str(),
            self.v4.as_str(),
            self.v5.as_str(),
        ]
    }

    /// Render the record as a policy line, e.g. `p, alice, data1, read`.
    ///
    /// Trailing empty fields are dropped. Interior empty fields are kept as
    /// empty tokens so later fields stay in position.
    pub fn to_line(&self) -> String {
        let fields = self.fields();
        let used = fields
            .iter()
            .rposition(|f| !f.is_empty())
            .map_or(0, |last| last + 1);

        let mut line = self.ptype.clone();
        for field in &fields[..used] {
            line.push_str(", ");
            line.push_str(&quote_field(field));
        }
        line
    }

    /// Decoded rule: fields up to the last non-empty one, as owned strings
    pub fn rule(&self) -> Vec<String> {
        let fields = self.fields();
        let used = fields
            .iter()
            .rposition(|f| !f.is_empty())
            .map_or(0, |last| last + 1);
        fields[..used].iter().map(|f| f.to_string()).collect()
    }
}

/// Content id of a rule: hex md5 over `{ ptype v0 v1 v2 v3 v4 v5}`.
///
/// The leading blank stands for the id slot, which is empty while hashing.
/// Existing tables are keyed by this exact text, so it must not change.
pub fn rule_id(ptype: &str, fields: &[&str; MAX_FIELDS]) -> String {
    let text = format!("{{ {} {}}}", ptype, fields.join(" "));
    hex::encode(Md5::digest(text.as_bytes()))
}

fn quote_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field != field.trim() {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
