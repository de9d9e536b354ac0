//! Arbiter CLI entry point.

use clap::Parser;

use arbiter::cli::{Cli, Commands};
use arbiter::infrastructure::logging::{LogConfig, LoggerImpl};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli.load_config() {
        Ok(config) => config,
        Err(err) => arbiter::cli::handle_error(err, cli.json),
    };

    let _logger = match LoggerImpl::init(&LogConfig::from(&config.logging)) {
        Ok(logger) => logger,
        Err(err) => arbiter::cli::handle_error(err, cli.json),
    };

    let result = match cli.command {
        Commands::Compare(args) => {
            arbiter::cli::commands::compare::execute(args, &config, cli.json).await
        }
        Commands::Tlp(args) => arbiter::cli::commands::tlp::execute(args, &config, cli.json).await,
        Commands::Probe(args) => {
            arbiter::cli::commands::probe::execute(args, &config, cli.json).await
        }
    };

    match result {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => arbiter::cli::handle_error(err, cli.json),
    }
}
