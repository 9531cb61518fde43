use std::process;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use gh2jira::cli::Args;

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(err) = gh2jira::app::run(args) {
        tracing::debug!(error = ?err, "run failed");
        eprintln!("{} {}", "x".bright_red(), err);
        process::exit(1);
    }
}

/// Log to stderr; RUST_LOG takes precedence over -v flags
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("gh2jira={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
