// src/outcome.rs

use std::fmt;

use tracing::debug;

use crate::extract::RowRecord;

pub const NO_ROWS: &str = "No data rows found in tables";
pub const NO_RESULT: &str = "No result";

/// Result of one query, kept structured until it is rendered for the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// At least one row was recovered.
    Rows(Vec<RowRecord>),
    /// The result container was found but no table produced rows.
    NoRows,
    /// The page had no result container.
    NoResult,
    Failed(Failure),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Failure {
    /// Network or HTTP status failure talking to Adminer.
    Request(String),
    /// Anything else: missing CSRF token, bad configuration, I/O.
    Other(String),
}

impl QueryOutcome {
    /// Concatenate per-table rows in table order.
    pub fn assemble<I>(per_table: I) -> Self
    where
        I: IntoIterator<Item = Vec<RowRecord>>,
    {
        let rows: Vec<RowRecord> = per_table.into_iter().flatten().collect();
        debug!(total = rows.len(), "result rows");
        if rows.is_empty() {
            QueryOutcome::NoRows
        } else {
            QueryOutcome::Rows(rows)
        }
    }

    /// Classify a fault raised while talking to Adminer or reading the page.
    pub fn from_error(err: &anyhow::Error) -> Self {
        let message = format!("{:#}", err);
        if err.chain().any(|cause| cause.is::<reqwest::Error>()) {
            QueryOutcome::Failed(Failure::Request(message))
        } else {
            QueryOutcome::Failed(Failure::Other(message))
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, QueryOutcome::Failed(_))
    }

    /// The text handed back to the caller: pretty JSON rows or a fixed message.
    pub fn render(&self) -> String {
        match self {
            QueryOutcome::Rows(rows) => serde_json::to_string_pretty(rows)
                .unwrap_or_else(|e| format!("Error: {}", e)),
            QueryOutcome::NoRows => NO_ROWS.to_string(),
            QueryOutcome::NoResult => NO_RESULT.to_string(),
            QueryOutcome::Failed(Failure::Request(msg)) => format!("Request error: {}", msg),
            QueryOutcome::Failed(Failure::Other(msg)) => format!("Error: {}", msg),
        }
    }
}

impl fmt::Display for QueryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}
