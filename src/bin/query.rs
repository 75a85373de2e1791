use adminer_scrape::{run_query, AdminerClient, Config};
use std::{env, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <SQL>", args[0]);
        exit(1);
    }

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    let client = match Config::from_env().and_then(AdminerClient::new) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit(1);
        }
    };

    let outcome = run_query(&client, &args[1]).await;
    println!("{}", outcome);
    if outcome.is_failure() {
        exit(2);
    }
}
