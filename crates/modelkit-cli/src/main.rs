//! # modelkit CLI entry point
//!
//! Parses command-line arguments, resolves library settings from the
//! environment and dispatches to subcommand handlers.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use modelkit_cli::settings::{run_settings, SettingsArgs};
use modelkit_cli::validate::{run_validate, ValidateArgs};
use modelkit_core::LibrarySettings;

/// modelkit: validate documents the way model boundaries do.
#[derive(Parser, Debug)]
#[command(name = "modelkit", version, about, long_about = None)]
struct Cli {
    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Validate JSON/YAML documents against a JSON Schema.
    Validate(ValidateArgs),

    /// Print the effective library settings as JSON.
    Settings(SettingsArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    let result = LibrarySettings::from_env()
        .context("invalid library settings")
        .and_then(|settings| match &cli.command {
            Commands::Validate(args) => run_validate(args, &settings),
            Commands::Settings(args) => run_settings(args, &settings),
        });

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
