mod cli;
mod config;
mod connectivity;
mod coordinator;
mod model;
mod performance;
mod planner;
mod policy;
mod recorder;
mod storage;
mod workout;

use std::process;

use tracing_subscriber::EnvFilter;

use config::Config;
use storage::Storage;

#[tokio::main]
async fn main() {
    let filter = EnvFilter::try_from_env("COACH_LOG")
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    };

    let Some(path) = config.database.clone().or_else(Storage::default_path) else {
        eprintln!("Could not determine home directory.");
        process::exit(1);
    };

    let storage = match Storage::open(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to open {}: {e}", path.display());
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(&config, storage).await {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
