//! Feed generation (RSS 2.0 and Atom 1.0).
//!
//! One pair of feeds for the whole site at the output root, and one pair
//! per category next to its listing page:
//!
//! ```text
//! public/rss.xml, public/atom.xml
//! public/blog/categories/<slug>/rss.xml, .../atom.xml
//! ```

pub mod atom;
mod common;
pub mod rss;

use anyhow::{Context, Result};

pub use common::FeedScope;

use super::minify_xml;
use crate::task::{BuildContext, TaskOutput};
use crate::utils::path::write_file;
use crate::debug;

/// The `feeds` task.
pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    if !config.build.feed.enable {
        return Ok(TaskOutput::default());
    }

    let site = ctx.site()?;
    let output = config.output_dir();
    let mut written = Vec::new();

    for scope in FeedScope::all(&config, &site) {
        let posts = common::feed_posts(&scope, &config);

        let rss = rss::to_xml(&config, &scope, &posts)?;
        let atom = atom::to_xml(&config, &scope, &posts)
            .with_context(|| format!("failed to build Atom feed for {}", scope.page_url))?;

        for (name, xml) in [(&config.build.feed.rss, rss), (&config.build.feed.atom, atom)] {
            let path = output.join(scope.file(name));
            write_file(&path, minify_xml(&xml, config.build.minify).as_bytes())?;
            written.push(path);
        }
    }

    debug!("feed"; "{} feeds", written.len());
    Ok(TaskOutput::with_written(written))
}
