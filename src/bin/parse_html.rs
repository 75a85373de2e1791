use adminer_scrape::extract::extract_file;
use std::{env, path::Path, process::exit};
use tracing_subscriber::{fmt, EnvFilter};

fn main() {
    // Expect exactly one CLI argument: a saved Adminer result page.
    let args: Vec<String> = env::args().collect();
    if args.len() != 2 {
        eprintln!("Usage: {} <HTML_FILE>", args[0]);
        exit(1);
    }

    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_writer(std::io::stderr)
        .init();

    println!("{}", extract_file(Path::new(&args[1])));
}
