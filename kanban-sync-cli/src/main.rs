mod cli;
mod commands;

use clap::Parser;
use cli::Cli;
use std::process::ExitCode;

fn configure_logging(cli: &Cli) {
    use tracing::Level;
    use tracing_subscriber::{fmt, prelude::*, registry, EnvFilter};

    let log_level = if cli.quiet {
        Level::ERROR
    } else if cli.debug {
        Level::DEBUG
    } else if cli.verbose {
        Level::INFO
    } else {
        Level::WARN
    };

    registry()
        .with(EnvFilter::new(format!("hyper=warn,reqwest=warn,{log_level}")))
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    configure_logging(&cli);

    match commands::run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!("command failed: {e:?}");
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
