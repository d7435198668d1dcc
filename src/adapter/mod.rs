//! Policy persistence on top of a [`RuleStore`].
//!
//! Rules are stored one record per rule, keyed by a hash of their content, so
//! writing the same rule twice never creates a second row. The adapter keeps
//! no policy state between calls; loading and filtered removal re-read the
//! store every time.
//!
//! No operation is atomic across rules. Batch adds and removes may apply
//! partially, and concurrent callers are not isolated from each other.
//!
//! [`Adapter`] implements [`casbin::Adapter`], so it can back an `Enforcer`
//! directly. The inherent methods are the same operations without the casbin
//! section argument.

mod filter;
mod loader;
mod mutator;
mod persist;
mod writer;

pub use filter::RuleFilter;

use crate::ch::ClickHouseStore;
use crate::config::AdapterConfig;
use crate::store::RuleStore;
use anyhow::Result;
use std::sync::Arc;

/// Reads and writes policy rules through a shared store handle
#[derive(Clone)]
pub struct Adapter {
    store: Arc<dyn RuleStore>,
    is_filtered: bool,
}

impl Adapter {
    /// Create an adapter over any store implementation
    pub fn new(store: Arc<dyn RuleStore>) -> Self {
        Self {
            store,
            is_filtered: false,
        }
    }

    /// Connect to ClickHouse with the given settings.
    ///
    /// Fails if the configuration is invalid or the server is unreachable.
    pub async fn connect(config: &AdapterConfig) -> Result<Self> {
        let store = ClickHouseStore::connect(config).await?;
        Ok(Self::new(Arc::new(store)))
    }
}
