use crate::adapter::Adapter;
use crate::ch::ChClient;
use crate::config::AdapterConfig;
use crate::model::{load_model, PolicySnapshot};
use crate::output::{print_summary, write_policy};
use anyhow::{Context, Result};
use casbin::{Adapter as _, DefaultModel, FileAdapter};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "policy-adapter")]
#[command(about = "Manage authorization policy rules stored in ClickHouse")]
#[command(version)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Casbin model file; the built-in RBAC model is used when omitted
    #[arg(long, env = "POLICY_MODEL", global = true)]
    pub model: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// ClickHouse connection settings
#[derive(Args, Debug)]
pub struct ConnectionArgs {
    /// ClickHouse HTTP endpoint
    #[arg(long, env = "POLICY_CH_URL", default_value = "http://localhost:8123")]
    pub endpoint: String,

    #[arg(long, env = "POLICY_CH_USER", default_value = "default")]
    pub user: String,

    #[arg(long, env = "POLICY_CH_PASSWORD", default_value = "", hide_env_values = true)]
    pub password: String,

    #[arg(long, env = "POLICY_CH_DATABASE", default_value = "default")]
    pub database: String,

    /// Table holding the rules
    #[arg(long, env = "POLICY_TABLE", default_value = "casbin_rule")]
    pub table: String,

    /// Maximum records per insert or delete request
    #[arg(long, default_value_t = 1000)]
    pub batch_size: usize,
}

impl ConnectionArgs {
    /// Convert the flags into adapter settings
    pub fn to_config(&self) -> AdapterConfig {
        AdapterConfig {
            endpoint: self.endpoint.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            database: self.database.clone(),
            table: self.table.clone(),
            batch_size: self.batch_size,
        }
    }
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Check that ClickHouse is reachable
    Ping,
    /// Load all rules and print a summary
    Load {
        /// Also write the loaded policy as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },
    /// Append the rules of a policy file (`p, alice, data1, read` per line)
    Import { file: PathBuf },
    /// Add a single rule
    Add {
        ptype: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Remove a single rule
    Remove {
        ptype: String,
        #[arg(required = true)]
        fields: Vec<String>,
    },
    /// Remove every rule whose fields from FIELD_INDEX on match VALUES
    RemoveFiltered {
        ptype: String,
        field_index: usize,
        values: Vec<String>,
    },
}

/// Execute a parsed command line
pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.connection.to_config();

    if cli.command == Command::Ping {
        config.validate()?;
        ChClient::from_config(&config).ping().await?;
        println!("ClickHouse at {} is reachable", config.endpoint);
        return Ok(());
    }

    let adapter = Adapter::connect(&config).await?;
    execute(&adapter, cli.command, &config.table, cli.model.as_deref()).await
}

/// Run a command against an adapter
pub async fn execute(
    adapter: &Adapter,
    command: Command,
    source: &str,
    model_path: Option<&Path>,
) -> Result<()> {
    match command {
        Command::Ping => {}
        Command::Load { json } => {
            let mut model = build_model(model_path).await?;
            adapter.load_rules(&mut model).await?;
            let policy = PolicySnapshot::from_model(&model);
            print_summary(&policy, source);
            if let Some(path) = json {
                write_policy(&policy, &path)?;
                info!(path = %path.display(), "wrote policy JSON");
            }
        }
        Command::Import { file } => {
            let mut model = build_model(model_path).await?;
            FileAdapter::new(file.clone())
                .load_policy(&mut model)
                .await
                .with_context(|| format!("Failed to read policy file {:?}", file))?;
            let written = adapter.save_rules(&model).await?;
            println!("Imported {} rules from {}", written, file.display());
        }
        Command::Add { ptype, fields } => {
            adapter.add_rule(&ptype, &fields).await?;
        }
        Command::Remove { ptype, fields } => {
            adapter.remove_rule(&ptype, &fields).await?;
        }
        Command::RemoveFiltered {
            ptype,
            field_index,
            values,
        } => {
            let removed = adapter
                .remove_filtered_rules(&ptype, field_index, &values)
                .await?;
            println!("Removed {} rules", removed);
        }
    }
    Ok(())
}

async fn build_model(path: Option<&Path>) -> Result<DefaultModel> {
    load_model(path)
        .await
        .with_context(|| match path {
            Some(path) => format!("Failed to load model {:?}", path),
            None => "Failed to build default model".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_add() {
        let cli = Cli::try_parse_from(["policy-adapter", "add", "p", "alice", "data1", "read"])
            .unwrap();

        assert_eq!(
            cli.command,
            Command::Add {
                ptype: "p".to_string(),
                fields: vec!["alice".into(), "data1".into(), "read".into()],
            }
        );
        assert_eq!(cli.connection.table, "casbin_rule");
    }

    #[test]
    fn test_parse_add_requires_fields() {
        assert!(Cli::try_parse_from(["policy-adapter", "add", "p"]).is_err());
    }

    #[test]
    fn test_parse_remove_filtered() {
        let cli = Cli::try_parse_from([
            "policy-adapter",
            "--table",
            "authz.rules",
            "remove-filtered",
            "p",
            "1",
            "read",
        ])
        .unwrap();

        assert_eq!(
            cli.command,
            Command::RemoveFiltered {
                ptype: "p".to_string(),
                field_index: 1,
                values: vec!["read".into()],
            }
        );
        assert_eq!(cli.connection.to_config().table, "authz.rules");
    }

    #[tokio::test]
    async fn test_execute_import_then_filtered_remove() {
        let store = Arc::new(InMemoryStore::new());
        let adapter = Adapter::new(store.clone());
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "p, alice, data1, read").unwrap();
        writeln!(file, "p, bob, data2, write").unwrap();
        writeln!(file, "g, alice, admin").unwrap();

        execute(
            &adapter,
            Command::Import {
                file: file.path().to_path_buf(),
            },
            "memory",
            None,
        )
        .await
        .unwrap();
        assert_eq!(store.len(), 3);

        execute(
            &adapter,
            Command::RemoveFiltered {
                ptype: "p".to_string(),
                field_index: 0,
                values: vec!["alice".into()],
            },
            "memory",
            None,
        )
        .await
        .unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_parse_model_flag_after_subcommand() {
        let cli = Cli::try_parse_from([
            "policy-adapter",
            "load",
            "--model",
            "rbac.conf",
        ])
        .unwrap();

        assert_eq!(cli.model, Some(PathBuf::from("rbac.conf")));
        assert_eq!(cli.command, Command::Load { json: None });
    }

    #[tokio::test]
    async fn test_execute_load_writes_json() {
        let store = Arc::new(InMemoryStore::with_records([
            crate::record::RuleRecord::encode("p", &["alice", "data1", "read"]).unwrap(),
            crate::record::RuleRecord::encode("p9", &["bob", "data2"]).unwrap(),
        ]));
        let adapter = Adapter::new(store);
        let out = NamedTempFile::new().unwrap();

        execute(
            &adapter,
            Command::Load {
                json: Some(out.path().to_path_buf()),
            },
            "memory",
            None,
        )
        .await
        .unwrap();

        let content = std::fs::read_to_string(out.path()).unwrap();
        let policy: PolicySnapshot = serde_json::from_str(&content).unwrap();
        assert_eq!(policy.len(), 1);
    }

    #[tokio::test]
    async fn test_execute_with_missing_model_fails() {
        let adapter = Adapter::new(Arc::new(InMemoryStore::new()));

        let result = execute(
            &adapter,
            Command::Load { json: None },
            "memory",
            Some(Path::new("/nonexistent/model.conf")),
        )
        .await;

        assert!(result.is_err());
    }
}
