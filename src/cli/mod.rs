//! Command-line interface module.

mod args;
pub mod build;
pub mod deploy;
pub mod search;
pub mod serve;
pub mod tasks;

pub use args::{Cli, Commands, DeployTarget};
