//! # Settings Subcommand
//!
//! Prints the effective library settings, as resolved from the environment.

use anyhow::{Context, Result};
use clap::Args;

use modelkit_core::LibrarySettings;

/// Arguments for the `modelkit settings` subcommand.
#[derive(Args, Debug)]
pub struct SettingsArgs {
    /// Print compact JSON on one line.
    #[arg(long)]
    pub compact: bool,
}

/// Render `settings` as JSON.
pub fn render_settings(args: &SettingsArgs, settings: &LibrarySettings) -> Result<String> {
    let rendered = if args.compact {
        serde_json::to_string(settings)
    } else {
        serde_json::to_string_pretty(settings)
    };
    rendered.context("failed to serialize settings")
}

/// Execute the settings subcommand.
pub fn run_settings(args: &SettingsArgs, settings: &LibrarySettings) -> Result<u8> {
    println!("{}", render_settings(args, settings)?);
    Ok(0)
}
