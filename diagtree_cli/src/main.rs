mod cli;
mod commands;
mod errors;
mod render;
mod ui;

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;

use cli::{DiagTreeCli, DiagTreeCommand};
use errors::CliError;

fn main() -> ExitCode {
    let cli = DiagTreeCli::parse();
    initialize_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            debug!("Exiting with error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn run(cli: DiagTreeCli) -> Result<(), CliError> {
    let workspace_path = get_workspace_path(cli.workspace)?;
    debug!("Using workspace {}", workspace_path.display());

    match cli.command {
        DiagTreeCommand::Show(args) => commands::show(&workspace_path, &args, cli.format),
        DiagTreeCommand::Watch {
            diagnostics,
            poll_ms,
        } => commands::watch(&workspace_path, &diagnostics, cli.format, poll_ms),
    }
}

fn get_workspace_path(workspace: Option<PathBuf>) -> Result<PathBuf, CliError> {
    match workspace {
        Some(path) => Ok(path),
        None => env::current_dir().map_err(|e| {
            ui::error_with_details("Cannot determine the current directory", &e.to_string());
            CliError::FileError
        }),
    }
}

fn log_level(verbose: bool) -> log::LevelFilter {
    if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    }
}

fn initialize_logging(verbose: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    builder
        .filter_level(log_level(verbose))
        .format_timestamp_secs()
        .target(env_logger::Target::Stderr)
        .init();
}
