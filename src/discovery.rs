use rand::{seq::index, Rng};
use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use crate::entry::{Corpus, Entry};

const MIN_TERM_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    "about", "after", "again", "also", "among", "another", "been", "before", "being", "best",
    "between", "both", "came", "come", "could", "does", "doing", "down", "each", "even", "ever",
    "every", "from", "further", "gets", "give", "going", "have", "having", "here", "himself",
    "http", "https", "into", "itself", "just", "know", "like", "made", "make", "many", "more",
    "most", "much", "must", "need", "next", "only", "other", "ours", "over", "part", "same",
    "says", "should", "show", "since", "some", "such", "take", "than", "that", "their", "them",
    "then", "there", "these", "they", "thing", "things", "this", "those", "through", "under",
    "until", "upon", "very", "want", "ways", "well", "were", "what", "when", "where", "which",
    "while", "whom", "why", "will", "with", "within", "without", "would", "your", "yours",
];

/// Random subset of the corpus: a uniform permutation cut to `min(n, |corpus|)`.
pub fn sample(corpus: &Corpus, n: usize) -> Vec<Entry> {
    sample_with(corpus, n, &mut rand::rng())
}

pub fn sample_with<R: Rng + ?Sized>(corpus: &[Entry], n: usize, rng: &mut R) -> Vec<Entry> {
    let amount = n.min(corpus.len());

    index::sample(rng, corpus.len(), amount)
        .into_iter()
        .map(|idx| corpus[idx].clone())
        .collect()
}

/// Lowercased title words worth suggesting, in order of appearance.
fn title_terms(title: &str) -> impl Iterator<Item = String> + '_ {
    title
        .split(|c: char| !c.is_alphanumeric())
        .map(|s| s.to_lowercase())
        .filter(|s| s.chars().count() >= MIN_TERM_LEN)
        .filter(|s| !s.chars().all(|c| c.is_numeric()))
        .filter(|s| !STOP_WORDS.contains(&s.as_str()))
}

/// Deduplicated suggestion candidates mined from `pool` random entries.
pub fn candidate_terms<R: Rng + ?Sized>(corpus: &[Entry], pool: usize, rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut terms = vec![];

    for entry in sample_with(corpus, pool, rng) {
        for term in title_terms(&entry.title) {
            if seen.insert(term.clone()) {
                terms.push(term);
            }
        }
    }

    terms
}

/// A window of `k` suggestion terms that moves forward every `interval`.
///
/// Candidates are computed once per corpus; reading the window is cheap.
#[derive(Debug, Clone)]
pub struct SuggestionRotor {
    candidates: Vec<String>,
    epoch: Instant,
    interval: Duration,
    k: usize,
}

impl SuggestionRotor {
    pub fn new(candidates: Vec<String>, k: usize, interval: Duration, epoch: Instant) -> Self {
        SuggestionRotor {
            candidates,
            epoch,
            interval,
            k,
        }
    }

    pub fn empty(k: usize, interval: Duration, epoch: Instant) -> Self {
        SuggestionRotor::new(vec![], k, interval, epoch)
    }

    pub fn from_corpus(
        corpus: &Corpus,
        pool: usize,
        k: usize,
        interval: Duration,
        epoch: Instant,
    ) -> Self {
        let rotor = SuggestionRotor::new(
            candidate_terms(corpus, pool, &mut rand::rng()),
            k,
            interval,
            epoch,
        );
        log::debug!("{} suggestion candidates", rotor.candidates().len());
        rotor
    }

    pub fn candidates(&self) -> &[String] {
        &self.candidates
    }

    /// Number of whole intervals elapsed since the epoch.
    pub fn step(&self, now: Instant) -> u64 {
        let interval = self.interval.as_millis().max(1);
        (now.saturating_duration_since(self.epoch).as_millis() / interval) as u64
    }

    pub fn window(&self, now: Instant) -> Vec<&str> {
        let len = self.candidates.len();
        if len == 0 || self.k == 0 {
            return vec![];
        }

        let k = self.k.min(len);
        let start = ((self.step(now) % len as u64) as usize * k) % len;

        (0..k)
            .map(|offset| self.candidates[(start + offset) % len].as_str())
            .collect()
    }
}

/// Current suggestion window for a corpus.
pub fn suggest_terms(corpus: &Corpus, k: usize, pool: usize, interval: Duration) -> Vec<String> {
    let now = Instant::now();
    SuggestionRotor::from_corpus(corpus, pool, k, interval, now)
        .window(now)
        .into_iter()
        .map(String::from)
        .collect()
}
