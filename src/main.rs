//! Kiln - an incremental static site builder.

mod actor;
mod asset;
mod cli;
mod config;
mod content;
mod core;
mod embed;
mod generator;
mod logger;
mod reload;
mod search;
mod task;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::SiteConfig;

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let overrides = cli.overrides();
    let config = SiteConfig::discover(&cli.config, &overrides)?;

    match &cli.command {
        Commands::Build => cli::build::build_site(&config, &overrides).map(|_| ()),
        Commands::Serve { .. } => cli::serve::serve(config, overrides),
        Commands::Deploy { target } => {
            cli::build::build_site(&config, &overrides)?;
            cli::deploy::deploy(&config, *target)
        }
        Commands::Search { query, limit } => {
            cli::search::search(&config, &query.join(" "), *limit)
        }
        Commands::Tasks => cli::tasks::print_tasks(&config),
        Commands::Clean => cli::build::clean(&config),
    }
}
