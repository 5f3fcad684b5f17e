//! What a feed is made of, independent of the format.

use std::{path::PathBuf, sync::Arc};

use crate::config::SiteConfig;
use crate::content::{Document, RenderedSite};
use crate::utils::date::DateTimeUtc;

/// One feed: the site-wide one or a category's.
pub struct FeedScope<'a> {
    pub title: String,
    /// Site-relative URL of the HTML page this feed mirrors
    pub page_url: String,
    /// Output directory relative to the output root, `""` for the site feed
    pub dir: String,
    pub posts: &'a [Arc<Document>],
}

impl<'a> FeedScope<'a> {
    /// The site feed followed by one feed per category.
    pub fn all(config: &SiteConfig, site: &'a RenderedSite) -> Vec<Self> {
        let mut scopes = vec![FeedScope {
            title: config.site.title.clone(),
            page_url: "/".to_string(),
            dir: String::new(),
            posts: &site.posts,
        }];

        scopes.extend(site.categories.iter().map(|group| FeedScope {
            title: format!("{}: {}", config.site.title, group.category.name),
            page_url: group.category.url.clone(),
            dir: group.category.url.trim_matches('/').to_string(),
            posts: &group.posts,
        }));
        scopes
    }

    /// Output path of a feed file, relative to the output root.
    pub fn file(&self, name: &std::path::Path) -> PathBuf {
        if self.dir.is_empty() {
            name.to_path_buf()
        } else {
            PathBuf::from(&self.dir).join(name)
        }
    }

    /// Absolute URL of a feed file.
    pub fn file_url(&self, config: &SiteConfig, name: &std::path::Path) -> String {
        let rel = self.file(name);
        let rel = rel.to_string_lossy().replace('\\', "/");
        config.site.absolute(&format!("/{rel}"))
    }
}

/// A post prepared for a feed entry.
#[derive(Debug, Clone)]
pub struct FeedPost {
    pub title: String,
    /// Absolute permalink
    pub link: String,
    pub date: DateTimeUtc,
    pub updated: DateTimeUtc,
    pub summary: Option<String>,
    /// Rendered HTML body
    pub content: String,
    pub author: Option<String>,
    pub categories: Vec<String>,
}

impl FeedPost {
    /// `None` for undated documents, which never appear in feeds.
    pub fn from_document(doc: &Document, config: &SiteConfig) -> Option<Self> {
        let date = doc.date?;
        Some(Self {
            title: doc.title.clone(),
            link: config.site.absolute(&doc.url),
            date,
            updated: doc.updated.unwrap_or(date).max(date),
            summary: doc.summary.clone(),
            content: doc.content.clone(),
            author: doc.author.clone(),
            categories: doc.categories.clone(),
        })
    }
}

/// The newest `limit` posts of a scope.
pub fn feed_posts(scope: &FeedScope<'_>, config: &SiteConfig) -> Vec<FeedPost> {
    scope
        .posts
        .iter()
        .filter_map(|doc| FeedPost::from_document(doc, config))
        .take(config.build.feed.limit)
        .collect()
}

/// Feed timestamp: the latest entry update, so rebuilds are reproducible.
pub fn feed_updated(posts: &[FeedPost]) -> Option<DateTimeUtc> {
    posts.iter().map(|p| p.updated).max()
}
