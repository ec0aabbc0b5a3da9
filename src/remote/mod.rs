mod errors;
mod pocketbase;

pub use errors::FetchError;
pub use pocketbase::PocketBase;

use serde::{Deserialize, Serialize};
use std::{collections::HashSet, time::Instant};

use crate::{
    entry::{Corpus, Entry},
    normalize::normalize,
};

/// Upper bound the remote accepts for `perPage`.
pub const MAX_PER_PAGE: u32 = 500;

/// A record as the bookmark store returns it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RemoteRecord {
    #[serde(default)]
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ogdate: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub items: Vec<RemoteRecord>,
    pub page: u32,
    pub total_pages: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageRequest {
    pub page: u32,
    pub per_page: u32,
    pub sort: String,
    pub filter: Option<String>,
}

impl PageRequest {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("perPage", self.per_page.min(MAX_PER_PAGE).to_string()),
            ("sort", self.sort.clone()),
        ];

        if let Some(filter) = &self.filter {
            pairs.push(("filter", filter.clone()));
        }

        pairs
    }
}

/// Where pages of bookmark records come from.
pub trait RecordSource: Send + Sync {
    fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError>;

    fn per_page(&self) -> u32 {
        MAX_PER_PAGE
    }

    fn sort(&self) -> String {
        "-ogdate".to_string()
    }
}

/// Server-side predicate matching `query` against title or link substrings.
pub fn filter_expression(query: &str) -> String {
    let escaped = query.replace('\\', "\\\\").replace('"', "\\\"");
    format!("(title ~ \"{escaped}\" || link ~ \"{escaped}\")")
}

/// Fetch the whole collection (empty query) or the single filtered page
/// for `query`. The first failing page aborts the whole fetch.
pub fn fetch_all(source: &dyn RecordSource, query: &str) -> Result<Corpus, FetchError> {
    let now = Instant::now();
    let query = query.trim();

    let filter = if query.is_empty() {
        None
    } else {
        Some(filter_expression(query))
    };

    let mut records = vec![];
    let mut page = 1;

    loop {
        let request = PageRequest {
            page,
            per_page: source.per_page(),
            sort: source.sort(),
            filter: filter.clone(),
        };

        let response = source.fetch_page(&request).map_err(|err| {
            log::error!("fetching page {page} failed: {err}");
            err
        })?;

        let received = response.items.len();
        records.extend(response.items);

        // filtered results are accepted as one page
        if filter.is_some() {
            break;
        }

        if received == 0 || response.total_pages == 0 || response.page >= response.total_pages {
            break;
        }

        page += 1;
    }

    let corpus = build_corpus(records);

    log::info!(
        "fetched {} entries in {}ms",
        corpus.len(),
        now.elapsed().as_micros() as f64 / 1000.0
    );

    Ok(corpus)
}

fn build_corpus(records: Vec<RemoteRecord>) -> Corpus {
    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(records.len());

    for record in records {
        if record.link.trim().is_empty() {
            log::debug!("skipping record without link: {record:?}");
            continue;
        }

        let entry: Entry = normalize(record);
        if seen.insert(entry.url.clone()) {
            entries.push(entry);
        }
    }

    Corpus::new(entries)
}
