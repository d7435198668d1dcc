use crate::model::PolicySnapshot;
use anyhow::{Context, Result};
use std::path::Path;

/// Write a loaded policy to a JSON file
pub fn write_policy(policy: &PolicySnapshot, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(policy)
        .context("Failed to serialize policy to JSON")?;

    std::fs::write(path, &json)
        .with_context(|| format!("Failed to write policy to {:?}", path))?;

    Ok(())
}
