//! Content pipeline: markdown sources to rendered HTML pages.
//!
//! ```text
//! content/posts/**/*.md ─┐                   ┌─► post pages
//!                        ├─► Document ──────►├─► index, archive, categories, 404
//! content/pages/**/*.md ─┘   (front matter,  └─► RenderedSite (feeds, sitemap, search)
//!                             markdown)
//! ```
//!
//! A document that fails to parse or render is reported as a warning and
//! left out of every output. A missing required template fails the whole
//! task before anything is written.

mod aggregate;
pub mod document;
mod frontmatter;
mod markdown;
mod render;
pub mod source;
pub mod template;


pub use aggregate::{Category, CategoryPosts, Listing};
pub use document::{Document, DocumentError, DocumentKind};
pub use render::run;

use std::{path::PathBuf, sync::Arc};

use thiserror::Error;

/// Failures that stop the content task as a whole.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("required template `{name}` not found in {}", dir.display())]
    MissingTemplate { name: String, dir: PathBuf },
    #[error("template `{name}` is invalid: {message}")]
    Template { name: String, message: String },
    #[error("failed to render {url} with `{template}`: {message}")]
    Aggregate {
        url: String,
        template: &'static str,
        message: String,
    },
}

/// Result of the last successful content run, shared with later tasks.
#[derive(Debug, Default)]
pub struct RenderedSite {
    /// Posts, newest first
    pub posts: Vec<Arc<Document>>,
    /// Pages, by source path
    pub pages: Vec<Arc<Document>>,
    pub categories: Vec<CategoryPosts>,
    /// Index, archive and category pages
    pub listings: Vec<Listing>,
}

impl RenderedSite {
    /// Posts followed by pages.
    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.posts.iter().chain(&self.pages)
    }
}
