//! In-memory search over the corpus.
//!
//! Two tiers, in this order:
//! - substring: the whitespace-stripped, lowercased query is contained in the
//!   equally folded title (or url). Kept in corpus order.
//! - fuzzy: everything else scored with nucleo, kept when the score reaches
//!   `fuzzy_min_score`, ordered by score then corpus order.
//!
//! Substring matches therefore always rank above fuzzy-only matches, and
//! ranking has no randomness in it.
//!
//! In server mode the remote filter has already narrowed the corpus by a
//! plain substring, so the fuzzy tier is off and only the substring tier
//! ranks what came back.

use nucleo_matcher::{
    pattern::{AtomKind, CaseMatching, Normalization, Pattern},
    Matcher, Utf32Str,
};
use std::{ops::Deref, time::Instant};

use crate::{
    config::SearchConfig,
    entry::{Corpus, Entry},
};

/// Entries ranked against a query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResult {
    pub entries: Vec<Entry>,
    /// Leading entries that matched as substrings
    pub substring_matches: usize,
}

impl Deref for SearchResult {
    type Target = [Entry];

    fn deref(&self) -> &Self::Target {
        &self.entries
    }
}

/// Lowercase and drop all whitespace.
pub fn fold(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

#[derive(Debug, Clone)]
struct Document {
    title: String,
    url: String,
}

/// Folded fields of a corpus snapshot, rebuilt whenever the corpus changes.
#[derive(Debug, Clone)]
pub struct SearchIndex {
    corpus: Corpus,
    docs: Vec<Document>,
    config: SearchConfig,
}

impl SearchIndex {
    pub fn build(corpus: &Corpus, config: &SearchConfig) -> SearchIndex {
        let now = Instant::now();

        let docs = corpus
            .iter()
            .map(|entry| Document {
                title: fold(&entry.title),
                url: fold(&entry.url),
            })
            .collect::<Vec<_>>();

        log::debug!(
            "indexed {} entries in {}ms",
            docs.len(),
            now.elapsed().as_micros() as f64 / 1000.0
        );

        SearchIndex {
            corpus: corpus.clone(),
            docs,
            config: config.clone(),
        }
    }

    pub fn search(&self, query: &str) -> SearchResult {
        let needle = fold(query);

        if needle.is_empty() {
            return SearchResult {
                entries: self.corpus.to_vec(),
                substring_matches: 0,
            };
        }

        let now = Instant::now();
        let mut matched = vec![false; self.docs.len()];
        let mut entries = vec![];

        for (idx, doc) in self.docs.iter().enumerate() {
            if doc.title.contains(&needle) || (self.config.match_urls && doc.url.contains(&needle))
            {
                matched[idx] = true;
                entries.push(self.corpus[idx].clone());
            }
        }

        let substring_matches = entries.len();

        if self.config.fuzzy_enabled() && needle.chars().count() >= self.config.min_fuzzy_len {
            for idx in self.fuzzy_matches(query, &matched) {
                entries.push(self.corpus[idx].clone());
            }
        }

        log::debug!(
            "search {query:?}: {} results ({substring_matches} substring) in {}ms",
            entries.len(),
            now.elapsed().as_micros() as f64 / 1000.0
        );

        SearchResult {
            entries,
            substring_matches,
        }
    }

    /// Corpus indices of fuzzy-only matches, best first.
    fn fuzzy_matches(&self, query: &str, skip: &[bool]) -> Vec<usize> {
        let pattern = Pattern::new(
            query.trim(),
            CaseMatching::Ignore,
            Normalization::Smart,
            AtomKind::Fuzzy,
        );
        let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
        let mut utf32buf = Vec::new();
        let mut scored: Vec<(u32, usize)> = vec![];

        for (idx, entry) in self.corpus.iter().enumerate() {
            if skip[idx] {
                continue;
            }

            let title_score = pattern.score(Utf32Str::new(&entry.title, &mut utf32buf), &mut matcher);
            let url_score = if self.config.match_urls {
                pattern.score(Utf32Str::new(&entry.url, &mut utf32buf), &mut matcher)
            } else {
                None
            };

            let score = match (title_score, url_score) {
                (Some(a), Some(b)) => a.max(b),
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => continue,
            };

            if score >= self.config.fuzzy_min_score {
                scored.push((score, idx));
            }
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
        scored.into_iter().map(|(_, idx)| idx).collect()
    }
}

/// One-shot search; builds a throwaway index.
pub fn search(corpus: &Corpus, query: &str, config: &SearchConfig) -> SearchResult {
    SearchIndex::build(corpus, config).search(query)
}
