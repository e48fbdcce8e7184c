mod catalog;
mod checklist;
mod cli;
mod config;
mod model;
mod photo;
mod session;
mod shift;
mod sync;
mod team;
mod works;

use std::io;
use std::process;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use config::Config;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter)
        .init();
}

fn main() {
    init_tracing();

    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            process::exit(1);
        }
    };

    if let Err(e) = cli::run(config) {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}
