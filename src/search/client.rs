//! Query-side search state machine.
//!
//! The browser script implements the same machine; this one drives
//! `kiln search` and pins the ranking down in tests.
//!
//! ```text
//! Uninitialized ──PageLoaded──► Loading ──IndexLoaded──► Ready ◄─┐
//!                                  │                        │     │
//!                                  └──LoadFailed──► Failed  └─QueryChanged
//! ```
//!
//! Transitions are pure: [`ClientState::on`] consumes the state and an
//! event and returns the next state plus an [`Effect`] for the host to
//! perform. Querying is instantaneous, so `Ready` answers a query and stays
//! `Ready`.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use super::index::SearchIndex;
use super::tokenize::tokenize;
use crate::utils::html::escape;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    #[error("failed to fetch search index from {url}: {message}")]
    Fetch { url: String, message: String },
    #[error("malformed search index: {0}")]
    Parse(String),
}

/// Client lifecycle.
///
/// There is no separate querying state: ranking runs synchronously inside
/// [`ClientState::on`], so a query leaves `Ready` and returns to it within
/// one transition.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ClientState {
    #[default]
    Uninitialized,
    Loading,
    Ready(SearchIndex),
    Failed(ClientError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    PageLoaded,
    IndexLoaded(SearchIndex),
    LoadFailed(ClientError),
    QueryChanged(String),
}

/// Work the host performs after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    None,
    /// Fetch the index exactly once
    FetchIndex,
    Render(ResultsPanel),
}

/// What the results container shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsPanel {
    Hidden,
    /// Escaped `<li>` list markup
    Visible(String),
}

impl ResultsPanel {
    pub fn from_hits(hits: &[SearchHit]) -> Self {
        if hits.is_empty() {
            return Self::Hidden;
        }
        let items = hits
            .iter()
            .map(|hit| {
                format!(
                    "<li><a href=\"{}\">{}</a></li>",
                    escape(&hit.url),
                    escape(&hit.title)
                )
            })
            .collect();
        Self::Visible(items)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub reference: String,
    pub title: String,
    pub url: String,
    pub score: u32,
    /// Distinct query terms this document matched
    pub matched: usize,
}

impl ClientState {
    pub fn on(self, event: Event) -> (Self, Effect) {
        match (self, event) {
            (Self::Uninitialized, Event::PageLoaded) => (Self::Loading, Effect::FetchIndex),
            (Self::Loading, Event::IndexLoaded(index)) => (Self::Ready(index), Effect::None),
            (Self::Loading, Event::LoadFailed(err)) => (Self::Failed(err), Effect::None),
            (Self::Ready(index), Event::QueryChanged(query)) => {
                let panel = ResultsPanel::from_hits(&rank(&index, &query));
                (Self::Ready(index), Effect::Render(panel))
            }
            // Queries before the index arrives, or after it failed, show nothing
            (state @ (Self::Uninitialized | Self::Loading | Self::Failed(_)), Event::QueryChanged(_)) => {
                (state, Effect::Render(ResultsPanel::Hidden))
            }
            (state, _) => (state, Effect::None),
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}

/// Owns the state between events.
#[derive(Debug, Default)]
pub struct SearchClient {
    state: ClientState,
}

impl SearchClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    pub fn handle(&mut self, event: Event) -> Effect {
        let (next, effect) = std::mem::take(&mut self.state).on(event);
        self.state = next;
        effect
    }

    /// Feed the result of a fetch back in.
    pub fn loaded(&mut self, body: Result<String, ClientError>) -> Effect {
        let event = match body.and_then(|json| {
            SearchIndex::from_json(&json).map_err(|e| ClientError::Parse(e.to_string()))
        }) {
            Ok(index) => Event::IndexLoaded(index),
            Err(err) => Event::LoadFailed(err),
        };
        self.handle(event)
    }
}

/// Score every document matching at least one query term.
///
/// Query terms are deduplicated; a document's score sums its weights over
/// the terms it matched. Order: score descending, matched-term count
/// descending, reference ascending.
pub fn rank(index: &SearchIndex, query: &str) -> Vec<SearchHit> {
    let terms: BTreeSet<String> = tokenize(query).into_iter().collect();

    let mut scores: BTreeMap<&str, (u32, usize)> = BTreeMap::new();
    for term in &terms {
        for posting in index.postings(term) {
            let entry = scores.entry(posting.reference.as_str()).or_default();
            entry.0 += posting.weight;
            entry.1 += 1;
        }
    }

    let mut hits: Vec<SearchHit> = scores
        .into_iter()
        .filter_map(|(reference, (score, matched))| {
            let stored = index.store.get(reference)?;
            Some(SearchHit {
                reference: reference.to_string(),
                title: stored.title.clone(),
                url: stored.url.clone(),
                score,
                matched,
            })
        })
        .collect();

    hits.sort_by(compare_hits);
    hits
}

fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    b.score
        .cmp(&a.score)
        .then_with(|| b.matched.cmp(&a.matched))
        .then_with(|| a.reference.cmp(&b.reference))
}
