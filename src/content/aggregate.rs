//! Listing pages built from the set of posts: the paginated index, the
//! archive and one page per category.

use std::{cmp::Ordering, collections::BTreeMap, sync::Arc};

use serde::Serialize;

use super::Document;
use crate::utils::{date::DateTimeUtc, slug::slugify};

pub const ARCHIVE_URL: &str = "/blog/archive/";
pub const NOT_FOUND_URL: &str = "/404.html";

/// Newest first; equal dates fall back to the source path so the order is
/// total and reproducible.
pub fn compare_posts(a: &Document, b: &Document) -> Ordering {
    b.date
        .cmp(&a.date)
        .then_with(|| a.source.cmp(&b.source))
}

/// URL of index page `n` (1-based).
pub fn index_url(n: usize) -> String {
    if n <= 1 {
        "/".to_string()
    } else {
        format!("/posts/{n}/")
    }
}

pub fn category_url(slug: &str) -> String {
    format!("/blog/categories/{slug}/")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Category {
    /// Name as first written in front matter
    pub name: String,
    pub slug: String,
    pub url: String,
    pub count: usize,
}

/// A category with its posts, in post order.
#[derive(Debug, Clone)]
pub struct CategoryPosts {
    pub category: Category,
    pub posts: Vec<Arc<Document>>,
}

/// Group sorted posts by category slug.
///
/// Names that slugify alike (`Rust`, `rust`) share one category. The result
/// is ordered by slug.
pub fn group_categories(posts: &[Arc<Document>]) -> Vec<CategoryPosts> {
    let mut groups: BTreeMap<String, CategoryPosts> = BTreeMap::new();

    for post in posts {
        for name in &post.categories {
            let slug = slugify(name);
            if slug.is_empty() {
                continue;
            }
            let group = groups.entry(slug.clone()).or_insert_with(|| CategoryPosts {
                category: Category {
                    name: name.clone(),
                    url: category_url(&slug),
                    slug,
                    count: 0,
                },
                posts: Vec::new(),
            });
            if !group.posts.iter().any(|p| Arc::ptr_eq(p, post)) {
                group.posts.push(Arc::clone(post));
                group.category.count += 1;
            }
        }
    }

    groups.into_values().collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: usize,
    pub total: usize,
    pub prev: Option<String>,
    pub next: Option<String>,
}

/// Split `count` posts into index pages of `per_page`.
///
/// Always yields at least one page so the site has a home page.
pub fn paginate(count: usize, per_page: usize) -> Vec<(Pagination, std::ops::Range<usize>)> {
    let per_page = per_page.max(1);
    let total = count.div_ceil(per_page).max(1);

    (1..=total)
        .map(|n| {
            let start = (n - 1) * per_page;
            let end = (start + per_page).min(count);
            let pagination = Pagination {
                current: n,
                total,
                prev: (n > 1).then(|| index_url(n - 1)),
                next: (n < total).then(|| index_url(n + 1)),
            };
            (pagination, start..end)
        })
        .collect()
}

/// An aggregate page as listed in the sitemap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub url: String,
    /// Latest modification among the listed posts
    pub lastmod: Option<DateTimeUtc>,
}

impl Listing {
    pub fn new(url: String, posts: &[Arc<Document>]) -> Self {
        let lastmod = posts.iter().filter_map(|p| p.last_modified()).max();
        Self { url, lastmod }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::DocumentKind;
    use serde_json::Map;

    fn post(source: &str, date: Option<&str>, categories: &[&str]) -> Arc<Document> {
        Arc::new(Document {
            source: source.to_string(),
            kind: DocumentKind::Post,
            url: format!("/{source}/"),
            title: source.to_string(),
            date: date.map(|d| DateTimeUtc::parse(d).unwrap()),
            updated: None,
            slug: source.to_string(),
            categories: categories.iter().map(ToString::to_string).collect(),
            summary: None,
            author: None,
            draft: false,
            template: None,
            content: String::new(),
            extra: Map::new(),
        })
    }

    #[test]
    fn test_compare_posts_date_desc_then_source() {
        let mut posts = vec![
            post("b", Some("2013-03-14"), &[]),
            post("c", Some("2014-01-01"), &[]),
            post("a", Some("2013-03-14"), &[]),
        ];
        posts.sort_by(|a, b| compare_posts(a, b));
        let order: Vec<_> = posts.iter().map(|p| p.source.as_str()).collect();
        assert_eq!(order, ["c", "a", "b"]);
    }

    #[test]
    fn test_index_urls() {
        assert_eq!(index_url(1), "/");
        assert_eq!(index_url(2), "/posts/2/");
    }

    #[test]
    fn test_paginate() {
        let pages = paginate(5, 2);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].1, 0..2);
        assert_eq!(pages[2].1, 4..5);
        assert_eq!(pages[0].0.prev, None);
        assert_eq!(pages[0].0.next.as_deref(), Some("/posts/2/"));
        assert_eq!(pages[1].0.prev.as_deref(), Some("/"));
        assert_eq!(pages[2].0.next, None);
    }

    #[test]
    fn test_paginate_empty_site_has_home() {
        let pages = paginate(0, 10);
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].1, 0..0);
        assert_eq!(pages[0].0.total, 1);
    }

    #[test]
    fn test_group_categories() {
        let posts = vec![
            post("a", Some("2014-01-01"), &["Rust", "Web Dev"]),
            post("b", Some("2013-01-01"), &["rust"]),
        ];
        let groups = group_categories(&posts);

        let slugs: Vec<_> = groups.iter().map(|g| g.category.slug.as_str()).collect();
        assert_eq!(slugs, ["rust", "web-dev"]);
        assert_eq!(groups[0].category.name, "Rust");
        assert_eq!(groups[0].category.count, 2);
        assert_eq!(groups[0].category.url, "/blog/categories/rust/");
        assert_eq!(groups[1].posts.len(), 1);
    }

    #[test]
    fn test_listing_lastmod() {
        let posts = vec![
            post("a", Some("2013-01-01"), &[]),
            post("b", Some("2014-06-01"), &[]),
        ];
        let listing = Listing::new("/".into(), &posts);
        assert_eq!(listing.lastmod, Some(DateTimeUtc::from_ymd(2014, 6, 1)));
        assert_eq!(Listing::new("/".into(), &[]).lastmod, None);
    }
}
