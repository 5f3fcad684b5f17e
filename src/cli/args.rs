//! Command-line interface definitions.

use std::net::IpAddr;
use std::path::PathBuf;

use clap::{ColorChoice, Parser, Subcommand};

use crate::config::{CONFIG_FILE, Overrides};

/// Kiln static site builder CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path, searched upward from the current directory
    #[arg(short = 'C', long, global = true, default_value = CONFIG_FILE, value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Output directory path (relative to project root)
    #[arg(short, long, global = true, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Minify HTML, XML, scripts and styles (`--minify=false` to disable)
    #[arg(short, long, global = true, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = true)]
    pub minify: Option<bool>,

    /// Include draft posts
    #[arg(short, long, global = true)]
    pub drafts: bool,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build the site from scratch
    #[command(visible_alias = "b")]
    Build,

    /// Build, serve and rebuild on change
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Build, then publish the output directory
    #[command(visible_alias = "d")]
    Deploy {
        #[command(subcommand)]
        target: DeployTarget,
    },

    /// Query the built search index
    Search {
        /// Search terms
        #[arg(required = true)]
        query: Vec<String>,

        /// Maximum number of results
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Print the task graph in execution order
    Tasks,

    /// Remove the output directory
    Clean,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeployTarget {
    /// Sync to `[deploy.rsync]` with rsync
    Rsync,
    /// Push to the `[deploy.pages]` git branch
    Pages,
}

impl Cli {
    /// Flags that take precedence over `kiln.toml`.
    pub fn overrides(&self) -> Overrides {
        let (interface, port) = match &self.command {
            Commands::Serve { interface, port } => (*interface, *port),
            _ => (None, None),
        };
        Overrides {
            output: self.output.clone(),
            minify: self.minify,
            drafts: self.drafts.then_some(true),
            port,
            interface,
        }
    }
}
