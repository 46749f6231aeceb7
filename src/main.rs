use clap::Parser;
use shapegate::cli::{run_cli, Cli};
use shapegate::logging::{init_logging_with_config, LogConfig};
use shapegate::runtime_config::RuntimeConfig;
use std::process::ExitCode;

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Keep the writer guard alive until exit so buffered lines are flushed.
    let _log_guard = init_logging_with_config(&LogConfig::from_env())?;

    let config = RuntimeConfig::from_env();
    let status = run_cli(cli, &config, &mut std::io::stdout().lock())?;
    Ok(ExitCode::from(status.exit_code()))
}
