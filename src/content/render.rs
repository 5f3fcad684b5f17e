//! The `content` task: scan, parse, render and write every document and
//! listing page, then publish the [`RenderedSite`].

use std::{collections::HashMap, fs, path::Path, sync::Arc};

use anyhow::Result;
use globset::{GlobBuilder, GlobSetBuilder};
use minijinja::context;
use rayon::prelude::*;

use super::{
    ContentError, Document, DocumentError, DocumentKind, RenderedSite,
    aggregate::{self, ARCHIVE_URL, CategoryPosts, Listing, NOT_FOUND_URL},
    source::{self, Source},
    template::{Templates, describe},
};
use crate::asset::minify::minify_html;
use crate::config::SiteConfig;
use crate::task::{BuildContext, TaskOutput, Warning, site};
use crate::utils::path::{url_to_output, write_file};
use crate::{debug, log};

/// A page ready to be written.
struct Page {
    url: String,
    html: String,
}

pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    let templates = Templates::load(&config.templates_dir(), &config.site)?;

    let sources = source::scan(&config)?;
    let mut warnings = Vec::new();

    let documents = parse_all(&sources, &config, &mut warnings);
    let documents = drop_duplicate_urls(documents, &mut warnings);
    let documents = drop_reserved_urls(documents, &config, &mut warnings)?;
    let (documents, mut pages) = render_documents(&templates, documents, &mut warnings);

    let mut site = assemble(documents);
    pages.extend(render_listings(&templates, &config, &mut site)?);

    let output = config.output_dir();
    let mut written = Vec::with_capacity(pages.len());
    for page in &pages {
        let path = url_to_output(&output, &page.url);
        if config.build.minify {
            write_file(&path, minify_html(&page.html))?;
        } else {
            write_file(&path, &page.html)?;
        }
        written.push(path);
    }

    for warning in &warnings {
        log!("warn"; "{warning}");
    }
    debug!(
        "content";
        "{} posts, {} pages, {} categories",
        site.posts.len(),
        site.pages.len(),
        site.categories.len()
    );

    ctx.publish_site(site);
    Ok(TaskOutput { written, warnings })
}

fn warn(source: &str, error: &DocumentError) -> Warning {
    Warning {
        source: source.to_string(),
        message: error.to_string(),
    }
}

/// Read and parse every source in parallel, keeping source order.
fn parse_all(sources: &[Source], config: &SiteConfig, warnings: &mut Vec<Warning>) -> Vec<Document> {
    let parsed: Vec<_> = sources
        .par_iter()
        .map(|source| -> Result<Document, DocumentError> {
            let text = fs::read_to_string(&source.path)?;
            Document::parse(source, &text)
        })
        .collect();

    let mut documents = Vec::with_capacity(parsed.len());
    for (source, result) in sources.iter().zip(parsed) {
        match result {
            Ok(doc) if doc.draft && !config.build.drafts => {
                debug!("content"; "skipping draft {}", source.rel);
            }
            Ok(doc) => documents.push(doc),
            Err(e) => warnings.push(warn(&source.rel, &e)),
        }
    }
    documents
}

/// The first document (by source path) keeps a contested URL.
fn drop_duplicate_urls(documents: Vec<Document>, warnings: &mut Vec<Warning>) -> Vec<Document> {
    let mut owners: HashMap<String, String> = HashMap::new();
    let mut kept = Vec::with_capacity(documents.len());

    for doc in documents {
        if let Some(first) = owners.get(&doc.url) {
            warnings.push(Warning {
                source: doc.source.clone(),
                message: format!("URL `{}` is already used by {first}", doc.url),
            });
            continue;
        }
        owners.insert(doc.url.clone(), doc.source.clone());
        kept.push(doc);
    }
    kept
}

/// Pages may not land on a file another task writes.
fn drop_reserved_urls(
    documents: Vec<Document>,
    config: &SiteConfig,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<Document>> {
    let reserved = site::reserved_outputs(config);
    let mut builder = GlobSetBuilder::new();
    for (_, pattern) in &reserved {
        builder.add(GlobBuilder::new(pattern).literal_separator(true).build()?);
    }
    let set = builder.build()?;

    let mut kept = Vec::with_capacity(documents.len());
    for doc in documents {
        let rel = url_to_output(Path::new(""), &doc.url);
        let rel = rel.to_string_lossy().replace('\\', "/");
        if let Some(&i) = set.matches(&rel).first() {
            let (owner, pattern) = &reserved[i];
            warnings.push(Warning {
                source: doc.source.clone(),
                message: format!("URL `{}` collides with output `{pattern}` of task `{owner}`", doc.url),
            });
            continue;
        }
        kept.push(doc);
    }
    Ok(kept)
}

fn render_document(templates: &Templates, doc: &Document) -> Result<String, DocumentError> {
    let name = doc.template_name();
    if !templates.has(name) {
        return Err(DocumentError::MissingTemplate(name.to_string()));
    }
    templates
        .render(name, context! { page => doc })
        .map_err(|e| DocumentError::Render {
            template: name.to_string(),
            message: describe(&e),
        })
}

fn render_documents(
    templates: &Templates,
    documents: Vec<Document>,
    warnings: &mut Vec<Warning>,
) -> (Vec<Arc<Document>>, Vec<Page>) {
    let rendered: Vec<_> = documents
        .into_par_iter()
        .map(|doc| {
            let html = render_document(templates, &doc);
            (doc, html)
        })
        .collect();

    let mut kept = Vec::with_capacity(rendered.len());
    let mut pages = Vec::with_capacity(rendered.len());
    for (doc, html) in rendered {
        match html {
            Ok(html) => {
                pages.push(Page {
                    url: doc.url.clone(),
                    html,
                });
                kept.push(Arc::new(doc));
            }
            Err(e) => warnings.push(warn(&doc.source, &e)),
        }
    }
    (kept, pages)
}

fn assemble(documents: Vec<Arc<Document>>) -> RenderedSite {
    let (mut posts, pages): (Vec<_>, Vec<_>) = documents
        .into_iter()
        .partition(|doc| doc.kind == DocumentKind::Post);
    posts.sort_by(|a, b| aggregate::compare_posts(a, b));

    let categories = aggregate::group_categories(&posts);
    RenderedSite {
        posts,
        pages,
        categories,
        listings: Vec::new(),
    }
}

/// Render the index pages, archive, category pages and 404 page.
///
/// Records each listing in `site.listings` for the sitemap.
fn render_listings(
    templates: &Templates,
    config: &SiteConfig,
    site: &mut RenderedSite,
) -> Result<Vec<Page>> {
    let categories: Vec<_> = site.categories.iter().map(|c| &c.category).collect();
    let mut pages = Vec::new();
    let mut listings = Vec::new();

    let render = |url: String, template: &'static str, html: Result<String, minijinja::Error>| {
        match html {
            Ok(html) => Ok(Page { url, html }),
            Err(e) => Err(ContentError::Aggregate {
                url,
                template,
                message: describe(&e),
            }),
        }
    };

    for (pagination, range) in aggregate::paginate(site.posts.len(), config.build.posts_per_page) {
        let url = aggregate::index_url(pagination.current);
        let posts = &site.posts[range];
        listings.push(Listing::new(url.clone(), posts));
        let html = templates.render(
            "index.html",
            context! { posts, pagination, categories => &categories },
        );
        pages.push(render(url, "index.html", html)?);
    }

    listings.push(Listing::new(ARCHIVE_URL.to_string(), &site.posts));
    let html = templates.render(
        "archive.html",
        context! { posts => &site.posts, categories => &categories },
    );
    pages.push(render(ARCHIVE_URL.to_string(), "archive.html", html)?);

    for CategoryPosts { category, posts } in &site.categories {
        listings.push(Listing::new(category.url.clone(), posts));
        let html = templates.render(
            "category.html",
            context! { category, posts, categories => &categories },
        );
        pages.push(render(category.url.clone(), "category.html", html)?);
    }

    let html = templates.render("404.html", context! { categories => &categories });
    pages.push(render(NOT_FOUND_URL.to_string(), "404.html", html)?);

    site.listings = listings;
    Ok(pages)
}
