//! Sassforge - a build tool for Sass/SCSS stylesheets.

#![allow(dead_code)]

mod cli;
mod compiler;
mod config;
mod lint;
mod logger;
mod resource;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::ProjectConfig;

fn main() -> Result<()> {
    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = ProjectConfig::load(cli)?;

    match &cli.command {
        Commands::Compile { .. } => cli::compile::run(&config),
        Commands::Watch { .. } => cli::watch::run(&config),
        Commands::Lint { .. } => {
            let exit_code = lint::run(&config)?;
            lint::apply_outcome(exit_code, config.lint.fail_on_error, true)
        }
        Commands::LintReport { .. } => {
            let exit_code = lint::run(&config)?;
            lint::apply_outcome(exit_code, config.lint.fail_on_error, false)?;
            lint::report::generate(&config.lint.output, &config.lint.report, "scss-lint report")
        }
    }
}
