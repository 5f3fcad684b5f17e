//! Template environment over the site's `templates/` directory.
//!
//! Templates are minijinja files. Every template sees a `site` global (the
//! `[site]` table) plus the `slugify` filter and the `absolute_url`
//! function. Rendered markdown is passed as HTML, so templates print it
//! with `{{ page.content|safe }}`.

use std::path::Path;

use minijinja::{Environment, ErrorKind, path_loader, value::Value};
use serde::Serialize;

use super::ContentError;
use crate::config::SiteInfo;
use crate::utils::{html::escape, slug::slugify};

/// Templates the content task cannot run without.
pub const REQUIRED: [&str; 6] = [
    "post.html",
    "page.html",
    "index.html",
    "archive.html",
    "category.html",
    "404.html",
];

pub struct Templates {
    env: Environment<'static>,
}

impl Templates {
    /// Load templates from `dir`, failing on the first required one that is
    /// missing or does not parse.
    pub fn load(dir: &Path, site: &SiteInfo) -> Result<Self, ContentError> {
        let templates = Self::open(dir, site);
        for name in REQUIRED {
            templates.check(name, dir)?;
        }
        Ok(templates)
    }

    /// Environment over `dir` without checking for any template.
    pub fn open(dir: &Path, site: &SiteInfo) -> Self {
        let mut env = Environment::new();
        env.set_loader(path_loader(dir));
        env.add_global("site", Value::from_serialize(site));
        env.add_filter("slugify", |text: &str| slugify(text));

        let base = site.clone();
        env.add_function("absolute_url", move |path: &str| {
            Value::from_safe_string(escape(&base.absolute(path)).into_owned())
        });

        Self { env }
    }

    /// Whether `name` exists and parses.
    pub fn has(&self, name: &str) -> bool {
        self.env.get_template(name).is_ok()
    }

    fn check(&self, name: &str, dir: &Path) -> Result<(), ContentError> {
        match self.env.get_template(name) {
            Ok(_) => Ok(()),
            Err(e) if e.kind() == ErrorKind::TemplateNotFound => Err(ContentError::MissingTemplate {
                name: name.to_string(),
                dir: dir.to_path_buf(),
            }),
            Err(e) => Err(ContentError::Template {
                name: name.to_string(),
                message: describe(&e),
            }),
        }
    }

    /// Render `name` with `context` merged over the globals.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String, minijinja::Error> {
        self.env.get_template(name)?.render(context)
    }
}

/// Error text including the template line, when minijinja knows it.
pub fn describe(error: &minijinja::Error) -> String {
    match (error.name(), error.line()) {
        (Some(name), Some(line)) => format!("{error} ({name}:{line})"),
        _ => error.to_string(),
    }
}
