// src/config.rs

use anyhow::{Context, Result};
use std::{env, time::Duration};
use url::Url;

const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Connection settings for the Adminer instance, read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub host: Url,
    /// `(name, value)` session cookies replayed on every request.
    pub cookies: Vec<(String, String)>,
    pub server: String,
    pub username: String,
    pub database: String,
    pub schema: String,
    pub verify_tls: bool,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key → value source; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("adminer_host").context("adminer_host is not set")?;
        let host = Url::parse(host.trim_end_matches('/'))
            .with_context(|| format!("parsing adminer_host {}", host))?;

        let cookies = ["adminer_key", "adminer_version", "adminer_sid", "adminer_permanent"]
            .into_iter()
            .filter_map(|name| lookup(name).map(|value| (name.to_string(), value)))
            .collect();

        let verify_tls = match lookup("adminer_verify_tls") {
            Some(v) => parse_bool(&v).with_context(|| format!("adminer_verify_tls={}", v))?,
            None => false,
        };

        let timeout = match lookup("adminer_timeout_secs") {
            Some(v) => v
                .trim()
                .parse::<u64>()
                .with_context(|| format!("adminer_timeout_secs={}", v))?,
            None => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            host,
            cookies,
            server: lookup("mssql_host").unwrap_or_default(),
            username: lookup("mssql_username").unwrap_or_default(),
            database: lookup("mssql_db").unwrap_or_default(),
            schema: lookup("mssql_ns").unwrap_or_default(),
            verify_tls,
            timeout: Duration::from_secs(timeout),
        })
    }

    /// Adminer's routing parameters for the configured MS SQL connection.
    pub fn query_params<'a>(&'a self, sql: &'a str) -> [(&'static str, &'a str); 5] {
        [
            ("mssql", self.server.as_str()),
            ("username", self.username.as_str()),
            ("db", self.database.as_str()),
            ("ns", self.schema.as_str()),
            ("sql", sql),
        ]
    }

    /// Origin without a trailing slash, as browsers send it.
    pub fn origin(&self) -> String {
        self.host.as_str().trim_end_matches('/').to_string()
    }

    /// Referer of the SQL command page this client pretends to submit from.
    pub fn referer(&self) -> String {
        format!(
            "{}/?mssql={}&username={}&db={}&ns={}&sql=",
            self.origin(),
            self.server,
            self.username,
            self.database,
            self.schema
        )
    }
}

fn parse_bool(s: &str) -> Result<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(anyhow::anyhow!("not a boolean: {}", other)),
    }
}
