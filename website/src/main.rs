mod config;
mod error;
mod models;
mod run;
mod services;
mod web;

use clap::Parser;
use snafu::ErrorCompat;
use std::process;

use config::{Args, Config};
use run::run;

// Re-exports
pub use error::{Error, Result};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_target(false)
        .compact()
        .init();

    let args = Args::parse();

    if let Err(e) = run_command(args).await {
        eprintln!("Application error: {e}");
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("{}", bt);
        }
        process::exit(1);
    }
}

async fn run_command(args: Args) -> Result<()> {
    let config = Config::build(&args.config)?;
    run(config).await
}
