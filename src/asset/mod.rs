//! Asset pipeline: script bundling, stylesheet compilation, static copy.
//!
//! Each concern is its own task, so an SCSS edit never re-bundles scripts.
//! Failures here abort only the task that hit them.

pub mod bundle;
pub mod copy;
pub mod minify;
pub mod style;

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("cannot resolve `{specifier}` imported from {}", importer.display())]
    Unresolved { specifier: String, importer: PathBuf },
    #[error("only relative imports are bundled, found `{specifier}` in {}", importer.display())]
    BareSpecifier { specifier: String, importer: PathBuf },
    #[error("unsupported module syntax in {}: `{statement}`", path.display())]
    Unsupported { path: PathBuf, statement: String },
    #[error("module cycle: {}", format_cycle(.0))]
    Cycle(Vec<PathBuf>),
    #[error("syntax error in {}: {message}", path.display())]
    Syntax { path: PathBuf, message: String },
    #[error("failed to compile {}: {message}", path.display())]
    Style { path: PathBuf, message: String },
    #[error("failed to minify {}: {message}", path.display())]
    Minify { path: PathBuf, message: String },
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn format_cycle(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" -> ")
}
