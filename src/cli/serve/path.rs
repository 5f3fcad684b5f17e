//! Request URL to output file resolution.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

/// File under `root` that answers `url`, or `None`.
///
/// Directory URLs resolve to their `index.html`. Anything that escapes
/// `root`, through `..` or a symlink, is rejected.
pub fn resolve(url: &str, root: &Path) -> Option<PathBuf> {
    let rel = request_path(url);
    if rel.split('/').any(|segment| segment == "..") {
        return None;
    }

    let root = root.canonicalize().ok()?;
    let candidate = root.join(rel.as_ref()).canonicalize().ok()?;
    if !candidate.starts_with(&root) {
        return None;
    }

    if candidate.is_file() {
        return Some(candidate);
    }
    let index = candidate.join("index.html");
    index.is_file().then_some(index)
}

/// Decoded path of `url` without query, fragment or surrounding slashes.
fn request_path(url: &str) -> Cow<'_, str> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let path = path.trim_matches('/');
    percent_decode_str(path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn site() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("public/blog/hello world")).unwrap();
        fs::write(dir.path().join("public/index.html"), "home").unwrap();
        fs::write(dir.path().join("public/blog/hello world/index.html"), "post").unwrap();
        fs::write(dir.path().join("public/search.json"), "{}").unwrap();
        fs::write(dir.path().join("secret.txt"), "no").unwrap();
        dir
    }

    #[test]
    fn test_resolve_index_and_files() {
        let dir = site();
        let root = dir.path().join("public");

        let home = resolve("/", &root).unwrap();
        assert!(home.ends_with("public/index.html"));
        assert!(resolve("/search.json?v=1", &root).unwrap().ends_with("search.json"));
        assert!(resolve("/blog/hello%20world/", &root).unwrap().ends_with("index.html"));
    }

    #[test]
    fn test_resolve_missing() {
        let dir = site();
        assert_eq!(resolve("/nope/", &dir.path().join("public")), None);
        assert_eq!(resolve("/blog/", &dir.path().join("public")), None);
    }

    #[test]
    fn test_resolve_rejects_traversal() {
        let dir = site();
        let root = dir.path().join("public");
        assert_eq!(resolve("/../secret.txt", &root), None);
        assert_eq!(resolve("/%2e%2e/secret.txt", &root), None);
    }

    #[test]
    fn test_request_path() {
        assert_eq!(request_path("/a/b/?q=1#top"), "a/b");
        assert_eq!(request_path("/caf%C3%A9/"), "café");
    }
}
