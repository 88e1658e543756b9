use clap::Parser;
use log::{LevelFilter, info};
use notemap::cli::Args;
use std::{process, str::FromStr};

fn main() {
    let args = Args::parse();

    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level: {}. Using 'warn' instead.",
            args.log_level
        );
        LevelFilter::Warn
    });

    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(log_level)
        .init();

    info!(log_level:% = log_level; "Starting notemap");

    if let Err(err) = notemap::run(&args) {
        eprintln!("error: {err:#}");
        process::exit(1);
    }
}
