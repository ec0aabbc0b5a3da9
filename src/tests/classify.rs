use std::collections::HashSet;

use super::{entry, mixed, paper_and_pasta};
use crate::classify::{Bucket, BucketRule, Classifier, ClassifierRules, Target, RULES_VERSION};
use crate::config::SearchConfig;
use crate::search::search;

#[test]
pub fn test_paper_and_recipe() {
    let corpus = paper_and_pasta();
    let buckets = Classifier::default().classify(&corpus);

    assert_eq!(buckets.primary_source, vec![corpus[0].clone()]);
    assert!(buckets.domain.is_empty());
    assert_eq!(buckets.general, vec![corpus[1].clone()]);
}

#[test]
pub fn test_pasta_query() {
    let corpus = paper_and_pasta();
    let results = search(&corpus, "pasta", &SearchConfig::default());
    let buckets = Classifier::default().classify(&results);

    assert_eq!(
        buckets.counts(),
        [
            (Bucket::PrimarySource, 0),
            (Bucket::Domain, 0),
            (Bucket::General, 1)
        ]
    );
}

#[test]
pub fn test_mixed_corpus() {
    let corpus = mixed();
    let buckets = Classifier::default().classify(&corpus);

    let urls = |entries: &[crate::entry::Entry]| {
        entries.iter().map(|e| e.url.clone()).collect::<Vec<_>>()
    };

    assert_eq!(
        urls(&buckets.primary_source),
        vec![
            "https://arxiv.org/abs/1706.03762",
            "https://www.openreview.net/forum?id=abc",
            "https://arxiv.org/pdf/2401.00001v2",
        ]
    );
    assert_eq!(
        urls(&buckets.domain),
        vec![
            "https://blog.rust-lang.org/2024/01/01/release.html",
            "https://news.ycombinator.com/item?id=1",
            "https://github.com/pytorch/pytorch",
        ]
    );
    assert_eq!(buckets.general.len(), 4);
}

#[test]
pub fn test_buckets_partition_results() {
    let corpus = mixed();
    let classifier = Classifier::default();
    let config = SearchConfig {
        fuzzy_min_score: 0,
        ..Default::default()
    };

    for query in ["", "pasta", "ar", "neural", "cooking", "nothing-matches-this"] {
        let results = search(&corpus, query, &config);
        let buckets = classifier.classify(&results);

        assert_eq!(buckets.len(), results.len(), "query {query:?}");

        let mut seen = HashSet::new();
        for (_, entries) in buckets.iter() {
            for entry in entries {
                assert!(seen.insert(entry.url.clone()), "{} in two buckets", entry.url);
            }
        }

        let expected = results.iter().map(|e| e.url.clone()).collect::<HashSet<_>>();
        assert_eq!(seen, expected, "query {query:?}");
    }
}

#[test]
pub fn test_classify_is_idempotent() {
    let corpus = mixed();
    let classifier = Classifier::default();

    let first = classifier.classify(&corpus);
    for (bucket, entries) in first.iter() {
        let again = classifier.classify(entries);
        assert_eq!(again.get(bucket), entries);
        assert_eq!(again.len(), entries.len());
    }
}

#[test]
pub fn test_preserves_input_order() {
    let corpus = mixed();
    let classifier = Classifier::default();

    let mut reversed = corpus.to_vec();
    reversed.reverse();

    let forward = classifier.classify(&corpus);
    let backward = classifier.classify(&reversed);

    for bucket in Bucket::ALL {
        let mut expected = forward.get(bucket).to_vec();
        expected.reverse();
        assert_eq!(backward.get(bucket), expected.as_slice());
    }
}

#[test]
pub fn test_first_rule_wins() {
    let classifier = Classifier::default();
    let paper = entry("https://arxiv.org/abs/2", "LLM agents that write compilers");
    assert_eq!(classifier.bucket_of(&paper), Bucket::PrimarySource);

    let rules = ClassifierRules {
        version: RULES_VERSION,
        rules: vec![
            BucketRule {
                bucket: Bucket::Domain,
                target: Target::TitleOrUrl,
                patterns: vec!["llm".to_string()],
            },
            BucketRule {
                bucket: Bucket::PrimarySource,
                target: Target::Url,
                patterns: vec!["arxiv.org".to_string()],
            },
        ],
    };
    let reordered = Classifier::new(&rules).unwrap();
    assert_eq!(reordered.bucket_of(&paper), Bucket::Domain);
}

#[test]
pub fn test_no_rules_means_general() {
    let rules = ClassifierRules {
        version: RULES_VERSION,
        rules: vec![],
    };
    let classifier = Classifier::new(&rules).unwrap();
    let buckets = classifier.classify(&mixed());

    assert_eq!(buckets.general.len(), 10);
    assert!(buckets.primary_source.is_empty());
    assert!(buckets.domain.is_empty());
}

#[test]
pub fn test_newer_rules_version_rejected() {
    let rules = ClassifierRules {
        version: RULES_VERSION + 1,
        ..Default::default()
    };
    assert!(Classifier::new(&rules).is_err());
}
