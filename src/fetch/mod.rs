// src/fetch/mod.rs

pub mod token;

use anyhow::{anyhow, Context, Result};
use reqwest::{
    cookie::Jar,
    header::{
        HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, ORIGIN, REFERER,
        UPGRADE_INSECURE_REQUESTS,
    },
    Client,
};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};
use url::Url;

use crate::{config::Config, extract::extract_tables, outcome::QueryOutcome};
use token::extract_csrf_token;

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/139.0.0.0 Safari/537.36";

/// An authenticated session against one Adminer instance.
#[derive(Debug, Clone)]
pub struct AdminerClient {
    http: Client,
    endpoint: Url,
    config: Arc<Config>,
}

impl AdminerClient {
    pub fn new(config: Config) -> Result<Self> {
        let endpoint = Url::parse(&format!("{}/", config.origin()))
            .with_context(|| format!("building endpoint from {}", config.host))?;

        let jar = Arc::new(Jar::default());
        for (name, value) in &config.cookies {
            jar.add_cookie_str(&format!("{}={}", name, value), &endpoint);
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
        headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
        headers.insert(
            ORIGIN,
            HeaderValue::from_str(&config.origin()).context("Origin header")?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer()).context("Referer header")?,
        );

        let http = Client::builder()
            .cookie_provider(jar)
            .default_headers(headers)
            .user_agent(BROWSER_USER_AGENT)
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            http,
            endpoint,
            config: Arc::new(config),
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Submit `query` through Adminer's SQL command form and return the
    /// result page.
    ///
    /// The form is loaded first to pick up a fresh CSRF token.
    #[instrument(level = "info", skip(self, query), fields(query_len = query.len()))]
    pub async fn execute(&self, query: &str) -> Result<String> {
        let params = self.config.query_params(query);

        let form_page = self
            .http
            .get(self.endpoint.clone())
            .query(&params)
            .send()
            .await
            .with_context(|| format!("GET {}", self.endpoint))?
            .error_for_status()?
            .text()
            .await
            .with_context(|| format!("reading body from {}", self.endpoint))?;
        debug!(len = form_page.len(), "fetched SQL command page");

        let token = extract_csrf_token(&form_page)
            .ok_or_else(|| anyhow!("Could not extract CSRF token from page"))?;

        let form = [("query", query), ("limit", ""), ("token", token.as_str())];
        let resp = self
            .http
            .post(self.endpoint.clone())
            .query(&params)
            .form(&form)
            .send()
            .await
            .with_context(|| format!("POST {}", self.endpoint))?
            .error_for_status()?;

        info!(status = %resp.status(), url = %resp.url(), "query submitted");

        resp.text()
            .await
            .with_context(|| format!("reading result page from {}", self.endpoint))
    }
}

/// Run one query end to end. Never fails: faults become `QueryOutcome::Failed`.
pub async fn run_query(client: &AdminerClient, query: &str) -> QueryOutcome {
    match client.execute(query).await {
        Ok(page) => extract_tables(&page),
        Err(e) => {
            let outcome = QueryOutcome::from_error(&e);
            error!(error = ?e, "{}", outcome);
            outcome
        }
    }
}
