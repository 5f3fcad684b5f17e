//! Path helpers shared by the pipeline, router and server.

use std::{
    fs,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result};

/// Normalize a file system path to absolute form.
///
/// Tries `canonicalize()` first, falling back to joining with the current
/// directory for paths that do not exist (yet, or any more).
pub fn normalize_path(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
        }
    })
}

/// Path of `path` relative to `base`, with `/` separators.
///
/// Returns `None` when `path` is not under `base`. This is the form glob
/// patterns and output manifests are written in.
pub fn relative_slash(path: &Path, base: &Path) -> Option<String> {
    let rel = path.strip_prefix(base).ok()?;
    let parts: Vec<_> = rel
        .components()
        .filter_map(|c| match c {
            Component::Normal(s) => Some(s.to_string_lossy()),
            _ => None,
        })
        .collect();
    Some(parts.join("/"))
}

/// Output file for a site URL: `/blog/x/` -> `<output>/blog/x/index.html`.
///
/// URLs with an extension (`/robots.txt`) map to that file directly.
pub fn url_to_output(output: &Path, url: &str) -> PathBuf {
    let trimmed = url.trim_matches('/');
    let path = output.join(trimmed);
    let has_extension = trimmed
        .rsplit('/')
        .next()
        .is_some_and(|last| last.contains('.'));

    if has_extension { path } else { path.join("index.html") }
}

/// Write `contents` to `path`, creating parent directories as needed.
pub fn write_file(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}
