//! A single post or page: front matter validated, body rendered to HTML.

use std::path::Path;

use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

use super::{frontmatter, markdown, source::Source};
use crate::utils::date::{DateError, DateTimeUtc};
use crate::utils::slug::slugify;

/// Why a single document was excluded from the build.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed front matter: {0}")]
    FrontMatter(String),
    #[error("front matter field `{field}` must be {expected}")]
    InvalidField { field: String, expected: &'static str },
    #[error("missing required field `title`")]
    MissingTitle,
    #[error("missing required field `date`")]
    MissingDate,
    #[error("invalid `{field}`: {source}")]
    InvalidDate {
        field: &'static str,
        #[source]
        source: DateError,
    },
    #[error("cannot derive a slug from the title or file name")]
    EmptySlug,
    #[error("template `{0}` not found")]
    MissingTemplate(String),
    #[error("failed to render template `{template}`: {message}")]
    Render { template: String, message: String },
    #[error("failed to read source: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    Post,
    Page,
}

impl DocumentKind {
    /// Template used when the document does not name one.
    pub const fn default_template(self) -> &'static str {
        match self {
            Self::Post => "post.html",
            Self::Page => "page.html",
        }
    }
}

/// A parsed, not yet templated, document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    /// Source path relative to the site root
    pub source: String,
    pub kind: DocumentKind,
    /// Site-relative URL, always `/`-terminated
    pub url: String,
    pub title: String,
    #[serde(serialize_with = "serialize_date")]
    pub date: Option<DateTimeUtc>,
    #[serde(serialize_with = "serialize_date")]
    pub updated: Option<DateTimeUtc>,
    pub slug: String,
    pub categories: Vec<String>,
    pub summary: Option<String>,
    pub author: Option<String>,
    #[serde(skip)]
    pub draft: bool,
    #[serde(skip)]
    pub template: Option<String>,
    /// Rendered markdown body
    pub content: String,
    pub extra: Map<String, Value>,
}

impl Document {
    /// Parse front matter and render the markdown body.
    pub fn parse(source: &Source, text: &str) -> Result<Self, DocumentError> {
        let (meta, body) = frontmatter::extract(text)?;

        let title = meta.title.ok_or(DocumentError::MissingTitle)?;
        let date = parse_date("date", meta.date.as_deref())?;
        let updated = parse_date("updated", meta.updated.as_deref())?;

        let slug = match &meta.slug {
            Some(slug) => slugify(slug),
            None => slugify(&file_stem(&source.path)),
        };
        if slug.is_empty() {
            return Err(DocumentError::EmptySlug);
        }

        let url = match source.kind {
            DocumentKind::Post => {
                let date = date.ok_or(DocumentError::MissingDate)?;
                format!("/blog/{}/{slug}/", date.url_segment())
            }
            DocumentKind::Page => format!("/{slug}/"),
        };

        Ok(Self {
            source: source.rel.clone(),
            kind: source.kind,
            url,
            title,
            date,
            updated,
            slug,
            categories: dedup(meta.categories),
            summary: meta.summary,
            author: meta.author,
            draft: meta.draft,
            template: meta.template,
            content: markdown::render(body),
            extra: meta.extra,
        })
    }

    /// Template chosen by `template:` or by kind.
    pub fn template_name(&self) -> &str {
        self.template
            .as_deref()
            .unwrap_or_else(|| self.kind.default_template())
    }

    /// Latest known modification: `updated`, falling back to `date`.
    pub fn last_modified(&self) -> Option<DateTimeUtc> {
        self.updated.or(self.date)
    }
}

fn parse_date(field: &'static str, value: Option<&str>) -> Result<Option<DateTimeUtc>, DocumentError> {
    value
        .map(|s| DateTimeUtc::parse(s).map_err(|source| DocumentError::InvalidDate { field, source }))
        .transpose()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Drop blank and repeated categories, keeping first-seen order.
fn dedup(categories: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(categories.len());
    for category in categories {
        let category = category.trim();
        if !category.is_empty() && !seen.iter().any(|c: &String| c == category) {
            seen.push(category.to_string());
        }
    }
    seen
}

fn serialize_date<S: serde::Serializer>(
    date: &Option<DateTimeUtc>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match date {
        Some(date) => serializer.collect_str(date),
        None => serializer.serialize_none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn post(name: &str) -> Source {
        Source::new(
            Path::new("/site"),
            PathBuf::from(format!("/site/content/posts/{name}")),
            DocumentKind::Post,
        )
    }

    fn page(name: &str) -> Source {
        Source::new(
            Path::new("/site"),
            PathBuf::from(format!("/site/content/pages/{name}")),
            DocumentKind::Page,
        )
    }

    #[test]
    fn test_post_url() {
        let doc = Document::parse(
            &post("hello.md"),
            "---\ntitle: Hello World\ndate: 2013-03-14\n---\nSome *text*",
        )
        .unwrap();

        assert_eq!(doc.url, "/blog/2013/03/14/hello/");
        assert_eq!(doc.source, "content/posts/hello.md");
        assert_eq!(doc.template_name(), "post.html");
        assert!(doc.content.contains("<em>text</em>"));
    }

    #[test]
    fn test_slug_override() {
        let doc = Document::parse(
            &post("x.md"),
            "---\ntitle: T\ndate: 2013-03-14T08:00:00Z\nslug: Custom Slug\n---\n",
        )
        .unwrap();
        assert_eq!(doc.url, "/blog/2013/03/14/custom-slug/");
    }

    #[test]
    fn test_page_url_without_date() {
        let doc = Document::parse(&page("About Me.md"), "---\ntitle: About\n---\nHi").unwrap();
        assert_eq!(doc.url, "/about-me/");
        assert_eq!(doc.date, None);
        assert_eq!(doc.template_name(), "page.html");
    }

    #[test]
    fn test_missing_title() {
        let err = Document::parse(&post("a.md"), "---\ndate: 2013-03-14\n---\n").unwrap_err();
        assert!(matches!(err, DocumentError::MissingTitle));
    }

    #[test]
    fn test_post_requires_date() {
        let err = Document::parse(&post("a.md"), "---\ntitle: A\n---\n").unwrap_err();
        assert!(matches!(err, DocumentError::MissingDate));
    }

    #[test]
    fn test_invalid_date() {
        let err = Document::parse(&post("a.md"), "---\ntitle: A\ndate: 2013-02-30\n---\n")
            .unwrap_err();
        assert!(matches!(err, DocumentError::InvalidDate { field: "date", .. }));
    }

    #[test]
    fn test_categories_deduplicated() {
        let doc = Document::parse(
            &post("a.md"),
            "---\ntitle: A\ndate: 2013-03-14\ncategories: rust, web, rust\n---\n",
        )
        .unwrap();
        assert_eq!(doc.categories, ["rust", "web"]);
    }

    #[test]
    fn test_template_override_and_last_modified() {
        let doc = Document::parse(
            &post("a.md"),
            "---\ntitle: A\ndate: 2013-03-14\nupdated: 2013-04-01\ntemplate: custom.html\n---\n",
        )
        .unwrap();
        assert_eq!(doc.template_name(), "custom.html");
        assert_eq!(doc.last_modified(), Some(DateTimeUtc::from_ymd(2013, 4, 1)));
    }

    #[test]
    fn test_serialized_dates_are_strings() {
        let doc = Document::parse(&post("a.md"), "---\ntitle: A\ndate: 2013-03-14\n---\n").unwrap();
        let value = serde_json::to_value(&doc).unwrap();
        assert_eq!(value["date"], "2013-03-14");
        assert_eq!(value["updated"], Value::Null);
        assert_eq!(value["kind"], "post");
    }
}
