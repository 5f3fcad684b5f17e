//! Full-text search: an index built at build time, queried in the browser.
//!
//! ```text
//! RenderedSite ──tokenize──► SearchIndex ──► search.json
//!                                        └─► search.js (same tokenizer, same ranking)
//! ```

pub mod client;
mod index;
mod tokenize;

pub use client::{ClientError, ClientState, Effect, Event, SearchClient, SearchHit, rank};
pub use index::SearchIndex;
pub use tokenize::{STOP_WORDS, tokenize};

use anyhow::Result;

use crate::debug;
use crate::embed::search::{SEARCH_JS, SearchVars};
use crate::task::{BuildContext, TaskOutput};
use crate::utils::path::write_file;

/// The `search` task: index artifact plus client script.
pub fn run(ctx: &BuildContext) -> Result<TaskOutput> {
    let config = ctx.config();
    let search = &config.build.search;
    if !search.enable {
        return Ok(TaskOutput::default());
    }

    let site = ctx.site()?;
    let index = SearchIndex::build(site.documents().map(|doc| &**doc));

    let output = config.output_dir();
    let index_path = output.join(&search.path);
    write_file(&index_path, index.to_json()?)?;

    let index_url = config.site.rooted(&search.path.to_string_lossy().replace('\\', "/"));
    let script_path = output.join(&search.script);
    write_file(&script_path, SEARCH_JS.render(&SearchVars { index_url: &index_url }))?;

    debug!("search"; "{} terms over {} documents", index.index.len(), index.store.len());
    Ok(TaskOutput::with_written(vec![index_path, script_path]))
}
