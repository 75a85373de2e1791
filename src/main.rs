use adminer_scrape::{tool::ToolServer, AdminerClient, Config};
use anyhow::Result;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging (stdout carries the protocol) ──────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();
    info!("startup");

    // ─── 2) configure the Adminer session ───────────────────────────
    // A bad configuration is reported on each tool call, not at startup.
    let client = Config::from_env()
        .inspect(|config| info!(host = %config.host, db = %config.database, "adminer configured"))
        .and_then(AdminerClient::new);
    if let Err(e) = &client {
        warn!(error = %e, "adminer not configured");
    }

    // ─── 3) serve tool calls until stdin closes ─────────────────────
    ToolServer::new(client).serve_stdio().await?;

    info!("all done");
    Ok(())
}
