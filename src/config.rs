use crate::classify::{ClassifierRules, Classifier};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_ADDR: &str = "https://pb.voidterminal.app";
const DEFAULT_COLLECTION: &str = "links";
const DEFAULT_PER_PAGE: u32 = 500;
/// Descending by origin date
const DEFAULT_SORT: &str = "-ogdate";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Minimum nucleo score for a fuzzy-only match
const DEFAULT_FUZZY_MIN_SCORE: u32 = 40;
const DEFAULT_MIN_FUZZY_LEN: usize = 2;

const DEFAULT_SAMPLE_SIZE: usize = 25;
const DEFAULT_SUGGESTION_COUNT: usize = 6;
const DEFAULT_SUGGESTION_POOL: usize = 150;
const DEFAULT_ROTATION_SECS: u64 = 8;

const DEFAULT_DEBOUNCE_MS: u64 = 300;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("io error reading {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("{0}")]
    Invalid(String),

    #[error("classifier rule #{rule} has an invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        rule: usize,
        pattern: String,
        source: regex::Error,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base url of the bookmark store
    #[serde(default = "default_addr")]
    pub addr: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    /// Page size for full fetches, at most 500
    #[serde(default = "default_per_page")]
    pub per_page: u32,

    #[serde(default = "default_sort")]
    pub sort: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            per_page: DEFAULT_PER_PAGE,
            sort: DEFAULT_SORT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Where query filtering happens.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SearchMode {
    /// Fetch everything once, filter in memory on every keystroke
    #[default]
    Client,
    /// Refetch with a server-side filter after every debounced edit
    Server,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub mode: SearchMode,

    /// Enable approximate matching below the substring tier. Client mode only.
    #[serde(default = "default_true")]
    pub fuzzy: bool,

    /// Permissiveness of the fuzzy tier. Lower admits more matches.
    #[serde(default = "default_fuzzy_min_score")]
    pub fuzzy_min_score: u32,

    /// Queries shorter than this never match fuzzily
    #[serde(default = "default_min_fuzzy_len")]
    pub min_fuzzy_len: usize,

    /// Whether urls participate in matching alongside titles
    #[serde(default = "default_true")]
    pub match_urls: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::default(),
            fuzzy: true,
            fuzzy_min_score: DEFAULT_FUZZY_MIN_SCORE,
            min_fuzzy_len: DEFAULT_MIN_FUZZY_LEN,
            match_urls: true,
        }
    }
}

impl SearchConfig {
    /// The remote filter is a literal substring match, so fuzzy results
    /// could never reach the client in server mode.
    pub fn fuzzy_enabled(&self) -> bool {
        self.fuzzy && self.mode == SearchMode::Client
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Entries shown in discovery mode
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Suggested terms visible at a time
    #[serde(default = "default_suggestion_count")]
    pub suggestion_count: usize,

    /// Entries drawn from the corpus to mine suggestion terms from
    #[serde(default = "default_suggestion_pool")]
    pub suggestion_pool: usize,

    #[serde(default = "default_rotation_secs")]
    pub rotation_secs: u64,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            suggestion_count: DEFAULT_SUGGESTION_COUNT,
            suggestion_pool: DEFAULT_SUGGESTION_POOL,
            rotation_secs: DEFAULT_ROTATION_SECS,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct InteractionConfig {
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub remote: RemoteConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    #[serde(default)]
    pub interaction: InteractionConfig,
    #[serde(default)]
    pub classifier: ClassifierRules,
}

fn default_addr() -> String {
    DEFAULT_ADDR.to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_per_page() -> u32 {
    DEFAULT_PER_PAGE
}

fn default_sort() -> String {
    DEFAULT_SORT.to_string()
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

fn default_true() -> bool {
    true
}

fn default_fuzzy_min_score() -> u32 {
    DEFAULT_FUZZY_MIN_SCORE
}

fn default_min_fuzzy_len() -> usize {
    DEFAULT_MIN_FUZZY_LEN
}

fn default_sample_size() -> usize {
    DEFAULT_SAMPLE_SIZE
}

fn default_suggestion_count() -> usize {
    DEFAULT_SUGGESTION_COUNT
}

fn default_suggestion_pool() -> usize {
    DEFAULT_SUGGESTION_POOL
}

fn default_rotation_secs() -> u64 {
    DEFAULT_ROTATION_SECS
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let remote = &self.remote;
        if !(1..=crate::remote::MAX_PER_PAGE).contains(&remote.per_page) {
            return Err(ConfigError::Invalid(format!(
                "remote.per_page must be between 1 and {}, got {}",
                crate::remote::MAX_PER_PAGE,
                remote.per_page
            )));
        }

        if remote.addr.trim().is_empty() {
            return Err(ConfigError::Invalid("remote.addr must not be empty".into()));
        }

        if remote.timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "remote.timeout_secs must be greater than 0".into(),
            ));
        }

        if self.search.min_fuzzy_len < DEFAULT_MIN_FUZZY_LEN {
            return Err(ConfigError::Invalid(format!(
                "search.min_fuzzy_len must be at least {DEFAULT_MIN_FUZZY_LEN}, got {}",
                self.search.min_fuzzy_len
            )));
        }

        if self.discovery.rotation_secs == 0 {
            return Err(ConfigError::Invalid(
                "discovery.rotation_secs must be greater than 0".into(),
            ));
        }

        if self.interaction.debounce_ms == 0 {
            return Err(ConfigError::Invalid(
                "interaction.debounce_ms must be greater than 0".into(),
            ));
        }

        // compiling catches empty and malformed patterns
        Classifier::new(&self.classifier)?;

        Ok(())
    }

    /// Read `config.yaml` from `base_path`. A missing file yields defaults;
    /// nothing is ever written back.
    pub fn load_with(base_path: &Path) -> Result<Self, ConfigError> {
        let path = base_path.join(CONFIG_FILE);

        let mut config: Self = match std::fs::read_to_string(&path) {
            Ok(config_str) => serde_yml::from_str(&config_str)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                Self::default()
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };

        if let Ok(addr) = std::env::var("RSRCH_ADDR") {
            log::info!("Using remote from RSRCH_ADDR: {addr}");
            config.remote.addr = addr;
        }

        config.validate()?;

        Ok(config)
    }

    pub fn load() -> anyhow::Result<Self> {
        let base_path = base_path()?;
        Ok(Self::load_with(&base_path)?)
    }
}

/// `$RSRCH_BASE_PATH`, or `~/.config/rsrch`.
pub fn base_path() -> anyhow::Result<PathBuf> {
    if let Ok(base_path) = std::env::var("RSRCH_BASE_PATH") {
        return Ok(PathBuf::from(base_path));
    }

    let home = homedir::my_home()?
        .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

    Ok(home.join(".config").join("rsrch"))
}
