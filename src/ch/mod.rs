mod client;
mod store;

pub use client::ChClient;
pub use store::ClickHouseStore;
