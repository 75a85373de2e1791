pub mod config;
pub mod extract;
pub mod fetch;
pub mod outcome;
pub mod tool;

pub use config::Config;
pub use extract::{extract_tables, RowRecord};
pub use fetch::{run_query, AdminerClient};
pub use outcome::{Failure, QueryOutcome};
