//! flowstore CLI entry point.

use clap::Parser;
use flowstore::cli::commands;
use flowstore::cli::{Cli, Commands};
use flowstore::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": {
                            "message": e.to_string(),
                            "exit_code": e.exit_code(),
                        }
                    })
                );
            } else if !cli.quiet {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let config = cli.store_config();
    match &cli.command {
        Commands::Split => commands::split::execute(&config, cli.json),
        Commands::Join => commands::join::execute(&config, cli.json),
        Commands::Status => commands::status::execute(&config, cli.json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
