//! Flaketrace CLI entry point.

use anyhow::Result;
use clap::Parser;

use flaketrace::cli::{commands, handle_error, Cli, Commands};
use flaketrace::infrastructure::logging::{LogConfig, LoggerImpl};
use flaketrace::{Config, ConfigLoader};

fn load_config(cli: &Cli) -> Result<Config> {
    match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

fn init_logging(config: &Config, verbose: u8) -> Result<LoggerImpl> {
    let log_config = LogConfig::try_from(&config.logging)?.with_verbosity(verbose);
    LoggerImpl::init(&log_config)
}

fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    let config = load_config(&cli).unwrap_or_else(|err| handle_error(err, json));
    let logger = init_logging(&config, cli.verbose).unwrap_or_else(|err| handle_error(err, json));

    let result = match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args, &config, json),
        Commands::Deadlocks(args) => commands::deadlocks::execute(args, &config, json),
        Commands::Classify(args) => commands::classify::execute(args, &config, json),
    };

    if let Err(err) = result {
        // Flush the file writer before exiting
        drop(logger);
        handle_error(err, json);
    }
}
