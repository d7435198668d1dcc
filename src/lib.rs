//! Persist authorization policy rules in ClickHouse and load them back.
//!
//! Each rule (`p, alice, data1, read`) is stored as one [`RuleRecord`] whose
//! id is a hash of its content, which makes repeated writes of the same rule
//! idempotent. The [`Adapter`] implements [`casbin::Adapter`]: it loads the
//! whole table into a casbin model, saves a model back, and applies single,
//! batch and filtered mutations made through an `Enforcer`.
//!
//! ```no_run
//! use casbin::{CoreApi, Enforcer, MgmtApi};
//! use policy_adapter::{load_model, Adapter, AdapterConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let adapter = Adapter::connect(&AdapterConfig::default()).await?;
//! let mut enforcer = Enforcer::new(load_model(None).await?, adapter).await?;
//!
//! enforcer
//!     .add_policy(vec!["alice".into(), "data1".into(), "read".into()])
//!     .await?;
//! assert!(enforcer.enforce(("alice", "data1", "read"))?);
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod ch;
pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod output;
pub mod record;
pub mod store;

pub use adapter::{Adapter, RuleFilter};
pub use config::AdapterConfig;
pub use error::{AdapterError, AdapterResult};
pub use model::{load_model, PolicySnapshot};
pub use record::RuleRecord;
pub use store::{InMemoryStore, RuleStore, StoreError};
