mod categorize;
mod config;
mod db;
mod error;
mod import;
mod ledger;
mod models;
mod rules;
mod run;

use anyhow::Result;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> Result<()> {
    let mut args: Vec<String> = std::env::args().collect();
    let verbose = take_flag(&mut args, &["-v", "--verbose"]);
    init_logging(verbose);

    if args.len() < 2 {
        run::print_usage();
        return Ok(());
    }

    let config = config::Config::load()?;
    let mut session = run::Session::open(config)?;
    run::as_cli(&args, &mut session)
}

/// Remove every occurrence of the given flags, returning whether any was present.
fn take_flag(args: &mut Vec<String>, names: &[&str]) -> bool {
    let before = args.len();
    args.retain(|a| !names.contains(&a.as_str()));
    args.len() != before
}

/// Priority: RUST_LOG env var > --verbose flag > default (info).
/// Logs go to stderr so command output on stdout stays clean.
fn init_logging(verbose: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();
}
