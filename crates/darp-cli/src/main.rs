//! DARP CLI binary entrypoint.
//!
//! This is the main entry point for the `darp` command-line tool.

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, warn};

use darp_cli::cli::{Cli, Commands};
use darp_cli::commands::{
    ConfigCommand, ConnectCommand, DisconnectCommand, FirewallCommand, InfoCommand,
    KeygenCommand, OptimizeCommand, StatusCommand, TestCommand,
};
use darp_cli::output::OutputFormat;
use darp_cli::{CliError, logging, startup};
use darp_config::{Config, default_config_path};
use darp_validation::SystemRunner;

fn main() -> ExitCode {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Run async runtime
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Failed to create async runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config_path = cli.config.clone().or_else(default_config_path);
    let config = Config::load(config_path.as_deref())?;
    let editing_config = matches!(cli.command, Some(Commands::Config { .. }));

    if let Err(e) = logging::init(&config.logging, cli.verbose) {
        if !editing_config {
            return Err(e);
        }
        logging::init(&logging::stderr_fallback(&config.logging), cli.verbose)?;
        warn!(error = %e, "logging to stderr instead of the configured output");
    }
    debug!(path = ?config_path, "configuration loaded");

    if !editing_config {
        config.validate()?;

        let mut stderr = io::stderr().lock();
        for warning in startup::host_warnings(&SystemRunner).await {
            writeln!(stderr, "{warning}")?;
        }
    }

    let format = OutputFormat::new(cli.format);
    let mut stdout = io::stdout().lock();

    let Some(command) = cli.command else {
        return format.write(&mut stdout, &startup::welcome());
    };

    match command {
        Commands::Connect => {
            let cmd = ConnectCommand::from_config(&config)?;
            cmd.execute(&mut stdout, &format).await?;
        }
        Commands::Disconnect => {
            let cmd = DisconnectCommand::from_config(&config)?;
            cmd.execute(&mut stdout, &format).await?;
        }
        Commands::Status => {
            let cmd = StatusCommand::from_config(&config)?;
            cmd.execute(&mut stdout, &format).await?;
        }
        Commands::Config { command } => {
            let cmd = ConfigCommand::new(config, config_path);
            cmd.execute(&mut stdout, &format, &command)?;
        }
        Commands::Test { command } => {
            let cmd = TestCommand::from_config(&config);
            cmd.execute(&mut stdout, &format, &command).await?;
        }
        Commands::Optimize => {
            let cmd = OptimizeCommand::from_config(&config);
            cmd.execute(&mut stdout, &format).await?;
        }
        Commands::Keygen => {
            let cmd = KeygenCommand::new();
            cmd.execute(&mut stdout, &format)?;
        }
        Commands::Info => {
            let cmd = InfoCommand::from_config(&config);
            cmd.execute(&mut stdout, &format).await?;
        }
        Commands::Firewall => {
            let cmd = FirewallCommand::from_config(&config);
            cmd.execute(&mut stdout, &format).await?;
        }
    }

    Ok(())
}
