use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{hash::Hash, ops::Deref, sync::Arc};

#[derive(Debug, Clone, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub url: String,
    pub title: String,
    pub date: Option<DateTime<Utc>>,
}

impl Hash for Entry {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.url.hash(state)
    }
}

impl PartialEq for Entry {
    fn eq(&self, other: &Self) -> bool {
        self.url == other.url
    }
}

impl Entry {
    /// Link to show and open. arXiv pdf links point at the abstract page
    /// without a version suffix.
    pub fn display_url(&self) -> String {
        crate::normalize::display_url(&self.url)
    }

    /// Calendar day in UTC.
    pub fn display_date(&self) -> String {
        self.date
            .map(|date| date.format("%Y-%m-%d").to_string())
            .unwrap_or_default()
    }
}

/// The session's entries in fetch order.
///
/// Replaced wholesale on every successful fetch. Clones share the same
/// allocation, so a derivation running against an older snapshot keeps
/// reading it while a newer one is installed.
#[derive(Debug, Clone, Default)]
pub struct Corpus(Arc<Vec<Entry>>);

impl Corpus {
    pub fn new(entries: Vec<Entry>) -> Corpus {
        Corpus(Arc::new(entries))
    }

    pub fn empty() -> Corpus {
        Corpus::default()
    }

    /// True when both handles point at the same snapshot.
    pub fn same_snapshot(&self, other: &Corpus) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Deref for Corpus {
    type Target = [Entry];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}
