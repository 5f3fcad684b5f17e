//! `kiln search`: run the search client against the built index.

use std::fs;

use anyhow::{Result, bail};
use owo_colors::{OwoColorize, Stream};

use crate::config::SiteConfig;
use crate::search::{ClientError, ClientState, Effect, Event, SearchClient, SearchHit, rank};

pub fn search(config: &SiteConfig, query: &str, limit: usize) -> Result<()> {
    let hits = query_index(config, query)?;
    if hits.is_empty() {
        println!("no results for \"{query}\"");
        return Ok(());
    }
    for hit in hits.iter().take(limit) {
        let url = config.site.absolute(&hit.url);
        println!(
            "{:>4}  {}  {}",
            hit.score,
            hit.title.if_supports_color(Stream::Stdout, |t| t.bold()),
            url.if_supports_color(Stream::Stdout, |t| t.dimmed())
        );
    }
    Ok(())
}

/// Load `search.json` the way the browser does, then rank.
fn query_index(config: &SiteConfig, query: &str) -> Result<Vec<SearchHit>> {
    let path = config.output_dir().join(&config.build.search.path);
    let mut client = SearchClient::new();

    if client.handle(Event::PageLoaded) == Effect::FetchIndex {
        let body = fs::read_to_string(&path).map_err(|e| ClientError::Fetch {
            url: path.display().to_string(),
            message: e.to_string(),
        });
        client.loaded(body);
    }

    match client.state() {
        ClientState::Ready(index) => Ok(rank(index, query)),
        ClientState::Failed(err) => bail!("{err} (run `kiln build` first)"),
        state => bail!("search index not loaded: {state:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_site_config;

    #[test]
    fn test_query_built_index() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_site_config(dir.path(), "");
        let path = config.output_dir().join(&config.build.search.path);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(
            &path,
            r#"{"index":{"proxy":[{"ref":"/a/","weight":1},{"ref":"/b/","weight":2}]},
               "store":{"/a/":{"title":"A","url":"/a/"},"/b/":{"title":"B","url":"/b/"}}}"#,
        )
        .unwrap();

        let hits = query_index(&config, "Proxy").unwrap();
        let urls: Vec<_> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(urls, ["/b/", "/a/"]);
    }

    #[test]
    fn test_missing_index_fails() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_site_config(dir.path(), "");
        let err = query_index(&config, "x").unwrap_err();
        assert!(err.to_string().contains("kiln build"));
    }
}
