//! `[build]` section configuration.
//!
//! Directory fields are relative to the site root (the directory holding
//! `kiln.toml`); output-side paths are relative to `output`.
//!
//! # Example
//!
//! ```toml
//! [build]
//! content = "content"          # holds posts/ and pages/
//! templates = "templates"
//! output = "public"
//! root_files = ["CNAME", "favicon.ico"]
//! minify = true
//! parallel = false             # run independent tasks concurrently
//! drafts = false
//! posts_per_page = 10
//!
//! [build.scripts]
//! entry = "assets/js/main.js"
//! output = "assets/js/all.min.js"
//!
//! [build.feed]
//! limit = 20
//! ```

use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub content: PathBuf,
    /// Post directory, relative to `content`.
    pub posts: PathBuf,
    /// Page directory, relative to `content`.
    pub pages: PathBuf,
    pub templates: PathBuf,
    pub assets: PathBuf,
    #[serde(rename = "static")]
    pub static_dir: PathBuf,
    pub output: PathBuf,
    /// Files copied verbatim into the output root.
    pub root_files: Vec<PathBuf>,
    pub minify: bool,
    pub parallel: bool,
    pub drafts: bool,
    pub posts_per_page: usize,
    pub scripts: ScriptsConfig,
    pub styles: StylesConfig,
    pub feed: FeedConfig,
    pub sitemap: SitemapConfig,
    pub search: SearchConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            content: "content".into(),
            posts: "posts".into(),
            pages: "pages".into(),
            templates: "templates".into(),
            assets: "assets".into(),
            static_dir: "static".into(),
            output: "public".into(),
            root_files: vec!["CNAME".into(), "favicon.ico".into()],
            minify: true,
            parallel: false,
            drafts: false,
            posts_per_page: 10,
            scripts: ScriptsConfig::default(),
            styles: StylesConfig::default(),
            feed: FeedConfig::default(),
            sitemap: SitemapConfig::default(),
            search: SearchConfig::default(),
        }
    }
}

impl BuildConfig {
    pub fn posts_dir(&self) -> PathBuf {
        self.content.join(&self.posts)
    }

    pub fn pages_dir(&self) -> PathBuf {
        self.content.join(&self.pages)
    }

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        let relative_inputs = [
            ("build.content", &self.content),
            ("build.posts", &self.posts),
            ("build.pages", &self.pages),
            ("build.templates", &self.templates),
            ("build.assets", &self.assets),
            ("build.static", &self.static_dir),
            ("build.scripts.entry", &self.scripts.entry),
            ("build.styles.entry", &self.styles.entry),
        ];
        for (field, path) in relative_inputs {
            if !is_plain_relative(path) {
                diag.error(field, format!("`{}` must be relative to the site root", path.display()));
            }
        }

        let relative_outputs = [
            ("build.scripts.output", &self.scripts.output),
            ("build.styles.output", &self.styles.output),
            ("build.feed.rss", &self.feed.rss),
            ("build.feed.atom", &self.feed.atom),
            ("build.sitemap.path", &self.sitemap.path),
            ("build.search.path", &self.search.path),
            ("build.search.script", &self.search.script),
        ];
        for (field, path) in relative_outputs {
            if !is_plain_relative(path) || path.as_os_str().is_empty() {
                diag.error(field, format!("`{}` must be relative to the output directory", path.display()));
            }
        }

        for file in &self.root_files {
            if !is_plain_relative(file) {
                diag.error("build.root_files", format!("`{}` must be relative", file.display()));
            }
        }

        if self.posts_per_page == 0 {
            diag.error("build.posts_per_page", "must be at least 1");
        }
        if self.feed.limit == 0 {
            diag.error("build.feed.limit", "must be at least 1");
        }
    }
}

/// Relative and free of `..`, so globs built from it stay inside the root.
fn is_plain_relative(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// `[build.scripts]`: one ES module entry bundled into one file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScriptsConfig {
    pub enable: bool,
    pub entry: PathBuf,
    pub output: PathBuf,
}

impl Default for ScriptsConfig {
    fn default() -> Self {
        Self {
            enable: true,
            entry: "assets/js/main.js".into(),
            output: "assets/js/all.min.js".into(),
        }
    }
}

/// `[build.styles]`: one SCSS entry compiled into one stylesheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    pub enable: bool,
    pub entry: PathBuf,
    pub output: PathBuf,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            enable: true,
            entry: "assets/scss/style.scss".into(),
            output: "assets/css/style.min.css".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    pub enable: bool,
    pub rss: PathBuf,
    pub atom: PathBuf,
    /// Newest posts included per feed.
    pub limit: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            enable: true,
            rss: "rss.xml".into(),
            atom: "atom.xml".into(),
            limit: 20,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SitemapConfig {
    pub enable: bool,
    pub path: PathBuf,
}

impl Default for SitemapConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "sitemap.xml".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub enable: bool,
    /// Index artifact, fetched by the client from `/<path>`.
    pub path: PathBuf,
    /// Browser search client script.
    pub script: PathBuf,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            enable: true,
            path: "search.json".into(),
            script: "assets/js/search.js".into(),
        }
    }
}
