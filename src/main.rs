use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use tidemark::config::{load_config, Cli};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{:#}", err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let mut config = load_config(&cli.config).context("loadConfig error")?;
    config.dry_run = cli.dry_run;

    tidemark::commands::sync::run(&config).context("syncDir error")?;

    if config.dry_run {
        println!("Dry-run mode: no changes were made.");
    } else {
        println!("Sync completed.");
    }
    Ok(())
}

/// Diagnostics go to stderr; stdout only carries the copy report.
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
