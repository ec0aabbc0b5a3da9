use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use url::Url;

use crate::{config::ConfigError, entry::Entry};

pub const RULES_VERSION: u32 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bucket {
    PrimarySource,
    Domain,
    General,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::PrimarySource, Bucket::Domain, Bucket::General];

    pub fn as_str(&self) -> &'static str {
        match self {
            Bucket::PrimarySource => "primary-source",
            Bucket::Domain => "domain",
            Bucket::General => "general",
        }
    }

    pub fn parse(name: &str) -> Option<Bucket> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.as_str().eq_ignore_ascii_case(name.trim()))
    }
}

impl Display for Bucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which part of an entry a rule looks at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Host and path of the url
    Url,
    TitleOrUrl,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BucketRule {
    pub bucket: Bucket,
    pub target: Target,
    /// Case-insensitive substrings, or regexes written as `r/<regex>/`
    pub patterns: Vec<String>,
}

/// Ordered classification rules. Entries matching no rule land in
/// [`Bucket::General`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClassifierRules {
    #[serde(default = "rules_version")]
    pub version: u32,
    pub rules: Vec<BucketRule>,
}

fn rules_version() -> u32 {
    RULES_VERSION
}

const PRIMARY_SOURCE_MARKERS: &[&str] = &[
    "arxiv.org",
    "openreview.net",
    "aclanthology.org",
    "biorxiv.org",
    "medrxiv.org",
    "papers.nips.cc",
    "proceedings.neurips.cc",
    "proceedings.mlr.press",
    "dl.acm.org",
    "semanticscholar.org",
    "jmlr.org",
];

const DOMAIN_KEYWORDS: &[&str] = &[
    "llm",
    "gpt",
    "transformer",
    "attention",
    "neural",
    "diffusion",
    "embedding",
    "inference",
    "fine-tun",
    "finetun",
    "pretrain",
    "reinforcement",
    "tokeniz",
    "quantiz",
    "agent",
    "prompt",
    "machine learning",
    "deep learning",
    "pytorch",
    "tensorflow",
    "jax",
    "cuda",
    "gpu",
    "nvidia",
    "openai",
    "anthropic",
    "claude",
    "deepmind",
    "huggingface",
    "hugging face",
    "mistral",
    "llama",
    "kubernetes",
    "rust",
    "compiler",
    "database",
];

impl Default for ClassifierRules {
    fn default() -> Self {
        Self {
            version: RULES_VERSION,
            rules: vec![
                BucketRule {
                    bucket: Bucket::PrimarySource,
                    target: Target::Url,
                    patterns: PRIMARY_SOURCE_MARKERS.iter().map(|s| s.to_string()).collect(),
                },
                BucketRule {
                    bucket: Bucket::Domain,
                    target: Target::TitleOrUrl,
                    patterns: DOMAIN_KEYWORDS.iter().map(|s| s.to_string()).collect(),
                },
            ],
        }
    }
}

#[derive(Debug, Clone)]
enum Pattern {
    /// lowercased
    Substring(String),
    Regex(Regex),
}

impl Pattern {
    fn compile(rule: usize, pattern: &str) -> Result<Pattern, ConfigError> {
        if pattern.trim().is_empty() {
            return Err(ConfigError::Invalid(format!(
                "classifier rule #{rule} has an empty pattern"
            )));
        }

        if pattern.len() > 3 && pattern.starts_with("r/") && pattern.ends_with('/') {
            let mut chars = pattern.chars();

            // remove prefix and postfix
            chars.next();
            chars.next();
            chars.next_back();

            let regex = Regex::new(&format!("(?i){}", chars.as_str())).map_err(|source| {
                ConfigError::InvalidPattern {
                    rule,
                    pattern: pattern.to_string(),
                    source,
                }
            })?;
            Ok(Pattern::Regex(regex))
        } else {
            Ok(Pattern::Substring(pattern.to_lowercase()))
        }
    }

    /// `input` must already be lowercased.
    fn is_match(&self, input: &str) -> bool {
        match self {
            Pattern::Substring(needle) => input.contains(needle.as_str()),
            Pattern::Regex(regex) => regex.is_match(input),
        }
    }
}

#[derive(Debug, Clone)]
struct CompiledRule {
    bucket: Bucket,
    target: Target,
    patterns: Vec<Pattern>,
}

/// Entries split into disjoint buckets, each keeping input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Buckets {
    pub primary_source: Vec<Entry>,
    pub domain: Vec<Entry>,
    pub general: Vec<Entry>,
}

impl Buckets {
    pub fn get(&self, bucket: Bucket) -> &[Entry] {
        match bucket {
            Bucket::PrimarySource => &self.primary_source,
            Bucket::Domain => &self.domain,
            Bucket::General => &self.general,
        }
    }

    fn get_mut(&mut self, bucket: Bucket) -> &mut Vec<Entry> {
        match bucket {
            Bucket::PrimarySource => &mut self.primary_source,
            Bucket::Domain => &mut self.domain,
            Bucket::General => &mut self.general,
        }
    }

    pub fn counts(&self) -> [(Bucket, usize); 3] {
        Bucket::ALL.map(|bucket| (bucket, self.get(bucket).len()))
    }

    pub fn len(&self) -> usize {
        self.primary_source.len() + self.domain.len() + self.general.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Bucket, &[Entry])> {
        Bucket::ALL.into_iter().map(|bucket| (bucket, self.get(bucket)))
    }
}

#[derive(Debug, Clone)]
pub struct Classifier {
    rules: Vec<CompiledRule>,
}

impl Default for Classifier {
    fn default() -> Self {
        Classifier::new(&ClassifierRules::default()).expect("default classifier rules compile")
    }
}

impl Classifier {
    pub fn new(config: &ClassifierRules) -> Result<Classifier, ConfigError> {
        if config.version > RULES_VERSION {
            return Err(ConfigError::Invalid(format!(
                "classifier rules version {} is newer than supported version {RULES_VERSION}",
                config.version
            )));
        }

        let mut rules = Vec::with_capacity(config.rules.len());

        for (idx, rule) in config.rules.iter().enumerate() {
            let idx = idx + 1;
            if rule.patterns.is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "classifier rule #{idx} has no patterns"
                )));
            }

            let patterns = rule
                .patterns
                .iter()
                .map(|pattern| Pattern::compile(idx, pattern))
                .collect::<Result<Vec<_>, _>>()?;

            rules.push(CompiledRule {
                bucket: rule.bucket,
                target: rule.target,
                patterns,
            });
        }

        Ok(Classifier { rules })
    }

    /// Bucket for a single entry: first matching rule wins.
    pub fn bucket_of(&self, entry: &Entry) -> Bucket {
        let url = entry.url.to_lowercase();
        let mut host_path: Option<String> = None;
        let mut title: Option<String> = None;

        for rule in &self.rules {
            let matched = match rule.target {
                Target::Url => {
                    let host_path = host_path.get_or_insert_with(|| url_host_path(&url));
                    rule.patterns.iter().any(|p| p.is_match(host_path))
                }
                Target::TitleOrUrl => {
                    let title = title.get_or_insert_with(|| entry.title.to_lowercase());
                    rule.patterns
                        .iter()
                        .any(|p| p.is_match(title) || p.is_match(&url))
                }
            };

            if matched {
                return rule.bucket;
            }
        }

        Bucket::General
    }

    pub fn classify(&self, results: &[Entry]) -> Buckets {
        let mut buckets = Buckets::default();

        for entry in results {
            buckets.get_mut(self.bucket_of(entry)).push(entry.clone());
        }

        buckets
    }
}

/// `host/path` of a lowercased url, or the url itself when it does not parse.
fn url_host_path(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{host}{}", parsed.path()),
            None => url.to_string(),
        },
        Err(_) => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::entry;

    #[test]
    fn test_bucket_names_roundtrip() {
        for bucket in Bucket::ALL {
            assert_eq!(Bucket::parse(bucket.as_str()), Some(bucket));
        }
        assert_eq!(Bucket::parse(" Domain "), Some(Bucket::Domain));
        assert_eq!(Bucket::parse("papers"), None);
    }

    #[test]
    fn test_marker_only_counts_in_host_or_path() {
        let classifier = Classifier::default();
        let query_only = entry("https://example.com/?ref=arxiv.org", "Cooking pasta");
        assert_eq!(classifier.bucket_of(&query_only), Bucket::General);

        let path = entry("https://example.com/mirror/arxiv.org/1", "Cooking pasta");
        assert_eq!(classifier.bucket_of(&path), Bucket::PrimarySource);
    }

    #[test]
    fn test_regex_pattern() {
        let rules = ClassifierRules {
            version: RULES_VERSION,
            rules: vec![BucketRule {
                bucket: Bucket::Domain,
                target: Target::TitleOrUrl,
                patterns: vec!["r/\\bgo(lang)?\\b/".to_string()],
            }],
        };
        let classifier = Classifier::new(&rules).unwrap();
        assert_eq!(
            classifier.bucket_of(&entry("https://go.dev", "Go Generics")),
            Bucket::Domain
        );
        assert_eq!(
            classifier.bucket_of(&entry("https://example.com", "Good morning")),
            Bucket::General
        );
    }

    #[test]
    fn test_invalid_rules_rejected() {
        let malformed = ClassifierRules {
            version: RULES_VERSION,
            rules: vec![BucketRule {
                bucket: Bucket::Domain,
                target: Target::Url,
                patterns: vec!["r/(unclosed/".to_string()],
            }],
        };
        assert!(matches!(
            Classifier::new(&malformed),
            Err(ConfigError::InvalidPattern { rule: 1, .. })
        ));

        let empty = ClassifierRules {
            version: RULES_VERSION,
            rules: vec![BucketRule {
                bucket: Bucket::Domain,
                target: Target::Url,
                patterns: vec![],
            }],
        };
        assert!(Classifier::new(&empty).is_err());

        let future = ClassifierRules {
            version: RULES_VERSION + 1,
            rules: vec![],
        };
        assert!(Classifier::new(&future).is_err());
    }
}
