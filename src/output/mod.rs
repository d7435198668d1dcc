mod json;
mod summary;

pub use json::write_policy;
pub use summary::{format_summary, print_summary};
