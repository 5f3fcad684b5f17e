//! Discovery of content sources on disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use jwalk::WalkDir;

use super::document::DocumentKind;
use crate::config::SiteConfig;
use crate::utils::path::relative_slash;

/// Extensions recognised as markdown content.
pub const EXTENSIONS: [&str; 2] = ["md", "markdown"];

/// One content file, located but not yet read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub path: PathBuf,
    /// Path relative to the site root with `/` separators
    pub rel: String,
    pub kind: DocumentKind,
}

impl Source {
    pub fn new(root: &Path, path: PathBuf, kind: DocumentKind) -> Self {
        let rel = relative_slash(&path, root).unwrap_or_else(|| path.display().to_string());
        Self { path, rel, kind }
    }
}

/// Every post and page source, sorted by relative path.
///
/// A missing posts or pages directory is treated as empty.
pub fn scan(config: &SiteConfig) -> Result<Vec<Source>> {
    let mut sources = Vec::new();

    for (dir, kind) in [
        (config.root_join(config.build.posts_dir()), DocumentKind::Post),
        (config.root_join(config.build.pages_dir()), DocumentKind::Page),
    ] {
        if !dir.is_dir() {
            continue;
        }
        for path in markdown_files(&dir)? {
            sources.push(Source::new(&config.root, path, kind));
        }
    }

    sources.sort_by(|a, b| a.rel.cmp(&b.rel));
    Ok(sources)
}

fn markdown_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).skip_hidden(true) {
        let entry = entry.with_context(|| format!("failed to walk {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if is_markdown(&path) {
            files.push(path);
        }
    }
    Ok(files)
}

pub fn is_markdown(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.contains(&ext))
}
