//! `[site]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [site]
//! title = "My Blog"
//! author = "Alice"
//! url = "https://example.com"     # absolute, used for feeds and sitemap
//! description = "Notes on systems programming"
//! language = "en"
//! keywords = ["rust", "systems"]
//!
//! [site.extra]                     # free-form, exposed to templates
//! github = "alice"
//! ```

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::ConfigDiagnostics;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteInfo {
    pub title: String,
    pub author: String,
    pub email: Option<String>,
    /// Absolute base URL of the deployed site.
    pub url: String,
    pub description: String,
    pub language: String,
    pub keywords: Vec<String>,
    pub extra: toml::Table,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            title: String::new(),
            author: String::new(),
            email: None,
            url: String::new(),
            description: String::new(),
            language: "en".to_string(),
            keywords: Vec::new(),
            extra: toml::Table::new(),
        }
    }
}

impl SiteInfo {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.title.trim().is_empty() {
            diag.error("site.title", "must not be empty");
        }

        match Url::parse(&self.url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") && url.has_host() => {}
            Ok(_) => diag.error("site.url", format!("`{}` must be an http(s) URL", self.url)),
            Err(_) if self.url.is_empty() => {
                diag.error("site.url", "is required (absolute URL for feeds and sitemap)");
            }
            Err(e) => diag.error("site.url", format!("`{}` is not absolute: {e}", self.url)),
        }
    }

    /// Base URL with a trailing slash, so relative joins keep any path prefix.
    pub fn base_url(&self) -> Option<Url> {
        let mut url = Url::parse(&self.url).ok()?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Some(url)
    }

    /// Site path including any prefix from `site.url`, for links that must
    /// work on any host (the dev server included).
    pub fn rooted(&self, path: &str) -> String {
        let prefix = self
            .base_url()
            .map(|base| base.path().trim_end_matches('/').to_string())
            .unwrap_or_default();
        format!("{prefix}/{}", path.trim_start_matches('/'))
    }

    /// Absolute URL for a site path such as `/blog/2013/03/14/hello/`.
    pub fn absolute(&self, path: &str) -> String {
        match self.base_url() {
            Some(base) => base
                .join(path.trim_start_matches('/'))
                .map_or_else(|_| format!("{}{path}", self.url), String::from),
            None => path.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_site_fields() {
        let config = test_parse_config(
            "[site.extra]\ngithub = \"alice\"",
        );
        assert_eq!(config.site.title, "Test");
        assert_eq!(config.site.language, "en");
        assert_eq!(config.site.extra["github"].as_str(), Some("alice"));
    }

    #[test]
    fn test_relative_url_rejected() {
        let mut diag = ConfigDiagnostics::new();
        let site = SiteInfo {
            title: "t".into(),
            url: "/blog".into(),
            ..Default::default()
        };
        site.validate(&mut diag);
        assert_eq!(diag.errors().len(), 1);
        assert_eq!(diag.errors()[0].field, "site.url");
    }

    #[test]
    fn test_missing_url_and_title_rejected() {
        let mut diag = ConfigDiagnostics::new();
        SiteInfo::default().validate(&mut diag);
        let fields: Vec<_> = diag.errors().iter().map(|d| d.field).collect();
        assert_eq!(fields, ["site.title", "site.url"]);
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        let mut diag = ConfigDiagnostics::new();
        let site = SiteInfo {
            title: "t".into(),
            url: "mailto:me@example.com".into(),
            ..Default::default()
        };
        site.validate(&mut diag);
        assert!(!diag.is_empty());
    }

    #[test]
    fn test_absolute_keeps_prefix() {
        let site = SiteInfo {
            url: "https://example.github.io/blog".into(),
            ..Default::default()
        };
        assert_eq!(
            site.absolute("/blog/archive/"),
            "https://example.github.io/blog/blog/archive/"
        );

        let site = SiteInfo {
            url: "https://example.com/".into(),
            ..Default::default()
        };
        assert_eq!(site.absolute("/"), "https://example.com/");
        assert_eq!(site.absolute("/about/"), "https://example.com/about/");
    }

    #[test]
    fn test_rooted() {
        let site = SiteInfo {
            url: "https://example.github.io/blog".into(),
            ..Default::default()
        };
        assert_eq!(site.rooted("search.json"), "/blog/search.json");

        let site = SiteInfo {
            url: "https://example.com".into(),
            ..Default::default()
        };
        assert_eq!(site.rooted("/search.json"), "/search.json");
    }
}
