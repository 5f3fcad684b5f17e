//! Inverted index plus document store, serialized as one JSON artifact.
//!
//! ```json
//! {
//!   "index": { "proxy": [{ "ref": "/blog/2013/03/14/a/", "weight": 2 }] },
//!   "store": { "/blog/2013/03/14/a/": { "title": "A", "url": "/blog/2013/03/14/a/" } }
//! }
//! ```
//!
//! Both maps are `BTreeMap`s and postings are sorted by reference, so the
//! file is byte-identical for identical documents.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::tokenize::tokenize;
use crate::content::Document;
use crate::utils::html::strip_tags;

/// A title occurrence counts this many body occurrences.
pub const TITLE_WEIGHT: u32 = 10;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    #[serde(rename = "ref")]
    pub reference: String,
    pub weight: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreEntry {
    pub title: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchIndex {
    pub index: BTreeMap<String, Vec<Posting>>,
    pub store: BTreeMap<String, StoreEntry>,
}

impl SearchIndex {
    /// Index every document: `weight = body count + TITLE_WEIGHT * title count`.
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut index: BTreeMap<String, BTreeMap<String, u32>> = BTreeMap::new();
        let mut store = BTreeMap::new();

        for doc in documents {
            let reference = doc.url.clone();

            for term in tokenize(&strip_tags(&doc.content)) {
                *index
                    .entry(term)
                    .or_default()
                    .entry(reference.clone())
                    .or_default() += 1;
            }
            for term in tokenize(&doc.title) {
                *index
                    .entry(term)
                    .or_default()
                    .entry(reference.clone())
                    .or_default() += TITLE_WEIGHT;
            }

            store.insert(
                reference.clone(),
                StoreEntry {
                    title: doc.title.clone(),
                    url: reference,
                },
            );
        }

        let index = index
            .into_iter()
            .map(|(term, postings)| {
                let postings = postings
                    .into_iter()
                    .map(|(reference, weight)| Posting { reference, weight })
                    .collect();
                (term, postings)
            })
            .collect();

        Self { index, store }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn postings(&self, term: &str) -> &[Posting] {
        self.index.get(term).map_or(&[], Vec::as_slice)
    }
}
