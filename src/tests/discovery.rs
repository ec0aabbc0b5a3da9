use rand::{rngs::StdRng, SeedableRng};
use std::{
    collections::HashSet,
    time::{Duration, Instant},
};

use super::{corpus, mixed};
use crate::discovery::{candidate_terms, sample, sample_with, SuggestionRotor};

#[test]
pub fn test_sample_size_and_membership() {
    let corpus = mixed();
    let all = corpus.iter().map(|e| e.url.clone()).collect::<HashSet<_>>();

    for n in [0, 1, 5, 10, 25] {
        let picked = sample(&corpus, n);
        assert_eq!(picked.len(), n.min(corpus.len()), "n = {n}");

        let urls = picked.iter().map(|e| e.url.clone()).collect::<HashSet<_>>();
        assert_eq!(urls.len(), picked.len(), "duplicates for n = {n}");
        assert!(urls.is_subset(&all));
    }
}

#[test]
pub fn test_sample_whole_corpus_is_permutation() {
    let corpus = mixed();
    let picked = sample(&corpus, corpus.len() + 3);

    let mut expected = corpus.iter().map(|e| e.url.clone()).collect::<Vec<_>>();
    let mut actual = picked.iter().map(|e| e.url.clone()).collect::<Vec<_>>();
    expected.sort();
    actual.sort();
    assert_eq!(actual, expected);
}

#[test]
pub fn test_sample_empty_corpus() {
    assert!(sample(&corpus(&[]), 10).is_empty());
}

#[test]
pub fn test_seeded_sample_is_reproducible() {
    let corpus = mixed();

    let a = sample_with(&corpus, 4, &mut StdRng::seed_from_u64(7));
    let b = sample_with(&corpus, 4, &mut StdRng::seed_from_u64(7));
    assert_eq!(a, b);
}

#[test]
pub fn test_candidate_terms_filtering() {
    let corpus = corpus(&[
        ("https://a.test", "Scaling Laws for Neural Language Models"),
        ("https://b.test", "The 2024 state of GPU kernels, with notes"),
        ("https://c.test", "neural nets from scratch"),
    ]);

    let terms = candidate_terms(&corpus, 100, &mut StdRng::seed_from_u64(1));

    let unique = terms.iter().collect::<HashSet<_>>();
    assert_eq!(unique.len(), terms.len());

    let expected = [
        "scaling", "laws", "neural", "language", "models", "state", "kernels", "notes", "nets",
        "scratch",
    ]
    .into_iter()
    .map(String::from)
    .collect::<HashSet<_>>();

    assert_eq!(terms.into_iter().collect::<HashSet<_>>(), expected);
}

#[test]
pub fn test_rotor_windows_advance_and_wrap() {
    let epoch = Instant::now();
    let candidates = ["a", "b", "c", "d", "e"].map(String::from).to_vec();
    let rotor = SuggestionRotor::new(candidates, 2, Duration::from_secs(8), epoch);

    assert_eq!(rotor.window(epoch), vec!["a", "b"]);
    assert_eq!(rotor.window(epoch + Duration::from_millis(7900)), vec!["a", "b"]);
    assert_eq!(rotor.window(epoch + Duration::from_secs(8)), vec!["c", "d"]);
    assert_eq!(rotor.window(epoch + Duration::from_secs(16)), vec!["e", "a"]);
    assert_eq!(rotor.step(epoch + Duration::from_secs(16)), 2);
}

#[test]
pub fn test_rotor_window_is_capped() {
    let epoch = Instant::now();
    let candidates = ["a", "b", "c"].map(String::from).to_vec();
    let rotor = SuggestionRotor::new(candidates, 10, Duration::from_secs(8), epoch);

    for offset in [0, 8, 30] {
        let window = rotor.window(epoch + Duration::from_secs(offset));
        assert_eq!(window.len(), 3);
        assert_eq!(window.into_iter().collect::<HashSet<_>>().len(), 3);
    }
}

#[test]
pub fn test_empty_rotor() {
    let epoch = Instant::now();
    let rotor = SuggestionRotor::empty(6, Duration::from_secs(8), epoch);
    assert!(rotor.window(epoch + Duration::from_secs(100)).is_empty());
    assert!(rotor.candidates().is_empty());
}
