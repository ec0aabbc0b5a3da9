//! Session state for the interactive view.
//!
//! The controller does no IO and takes every timing decision from the `now`
//! its caller passes in. Callers carry out the returned [`Effect`]s. Fetch results come back
//! through [`Controller::complete_fetch`] tagged with the ticket they were
//! issued under; only the most recently issued ticket is applied.

mod debounce;
mod keys;

pub use debounce::Debouncer;
pub use keys::{resolve, Action, Key};

use rand::seq::IndexedRandom;
use std::time::{Duration, Instant};

use crate::{
    classify::{Bucket, Buckets, Classifier},
    config::{Config, ConfigError, DiscoveryConfig, SearchConfig, SearchMode},
    discovery::{self, SuggestionRotor},
    entry::{Corpus, Entry},
    remote::FetchError,
    search::{SearchIndex, SearchResult},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BucketFilter {
    #[default]
    All,
    Only(Bucket),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DiscoveryMode {
    #[default]
    Off,
    Random,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub seq: u64,
    pub query: String,
}

/// Work the controller asks its driver to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Fetch(FetchTicket),
    Open(String),
    Quit,
}

pub struct Controller {
    mode: SearchMode,
    search_config: SearchConfig,
    discovery_config: DiscoveryConfig,
    classifier: Classifier,

    /// Text in the search field
    query: String,
    /// Query the current view was derived from
    applied_query: String,
    active_bucket: BucketFilter,
    discovery: DiscoveryMode,
    corpus: Corpus,
    loading: bool,

    focused: bool,
    /// Next typed character replaces the whole field
    select_all: bool,
    selected: usize,
    status: Option<String>,

    debouncer: Debouncer<String>,
    next_seq: u64,
    latest_seq: Option<u64>,

    index: SearchIndex,
    rotor: SuggestionRotor,
    results: SearchResult,
    /// Search results, or the corpus-wide discovery sample
    displayed: Vec<Entry>,
    buckets: Buckets,
    derivations: u64,
}

impl Controller {
    /// New session plus the initial full fetch it needs.
    pub fn new(config: &Config, now: Instant) -> Result<(Controller, FetchTicket), ConfigError> {
        let classifier = Classifier::new(&config.classifier)?;
        let corpus = Corpus::empty();
        let discovery_config = config.discovery.clone();

        let mut controller = Controller {
            mode: config.search.mode,
            search_config: config.search.clone(),
            rotor: SuggestionRotor::empty(
                discovery_config.suggestion_count,
                Duration::from_secs(discovery_config.rotation_secs),
                now,
            ),
            discovery_config,
            classifier,
            query: String::new(),
            applied_query: String::new(),
            active_bucket: BucketFilter::All,
            discovery: DiscoveryMode::Off,
            index: SearchIndex::build(&corpus, &config.search),
            corpus,
            loading: true,
            focused: false,
            select_all: false,
            selected: 0,
            status: None,
            debouncer: Debouncer::new(Duration::from_millis(config.interaction.debounce_ms)),
            next_seq: 0,
            latest_seq: None,
            results: SearchResult::default(),
            displayed: vec![],
            buckets: Buckets::default(),
            derivations: 0,
        };

        let ticket = controller.begin_fetch(String::new());
        Ok((controller, ticket))
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn applied_query(&self) -> &str {
        &self.applied_query
    }

    pub fn active_bucket(&self) -> BucketFilter {
        self.active_bucket
    }

    pub fn discovery(&self) -> DiscoveryMode {
        self.discovery
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn is_selected_all(&self) -> bool {
        self.select_all
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn set_status(&mut self, status: String) {
        self.status = Some(status);
    }

    pub fn results(&self) -> &SearchResult {
        &self.results
    }

    pub fn buckets(&self) -> &Buckets {
        &self.buckets
    }

    /// Number of times the derived view has been recomputed.
    pub fn derivations(&self) -> u64 {
        self.derivations
    }

    /// Entries on screen: the displayed sequence narrowed to the active bucket.
    pub fn visible(&self) -> &[Entry] {
        match self.active_bucket {
            BucketFilter::All => &self.displayed,
            BucketFilter::Only(bucket) => self.buckets.get(bucket),
        }
    }

    pub fn suggestions(&self, now: Instant) -> Vec<&str> {
        self.rotor.window(now)
    }

    /// Earliest instant at which [`Controller::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Issue a new authoritative fetch; any in-flight one becomes stale.
    fn begin_fetch(&mut self, query: String) -> FetchTicket {
        self.next_seq += 1;
        self.latest_seq = Some(self.next_seq);
        self.loading = true;

        log::debug!("fetch #{} for {query:?}", self.next_seq);

        FetchTicket {
            seq: self.next_seq,
            query,
        }
    }

    /// Apply a fetch outcome. Returns false when the ticket was superseded
    /// and the outcome discarded.
    pub fn complete_fetch(
        &mut self,
        ticket: &FetchTicket,
        result: Result<Corpus, FetchError>,
        now: Instant,
    ) -> bool {
        if self.latest_seq != Some(ticket.seq) {
            log::debug!(
                "discarding stale fetch #{} for {:?}",
                ticket.seq,
                ticket.query
            );
            return false;
        }

        self.latest_seq = None;
        self.loading = false;

        match result {
            Ok(corpus) => {
                self.status = None;
                self.replace_corpus(corpus, now);
            }
            Err(err) => {
                log::error!("fetch for {:?} failed: {err}", ticket.query);
                self.status = Some(format!("fetch failed: {err}"));
            }
        }

        true
    }

    fn replace_corpus(&mut self, corpus: Corpus, now: Instant) {
        if corpus.same_snapshot(&self.corpus) {
            return;
        }

        self.index = SearchIndex::build(&corpus, &self.search_config);
        self.rotor = SuggestionRotor::from_corpus(
            &corpus,
            self.discovery_config.suggestion_pool,
            self.discovery_config.suggestion_count,
            Duration::from_secs(self.discovery_config.rotation_secs),
            now,
        );
        self.corpus = corpus;
        self.rederive(true);
    }

    /// Recompute search results and bucket counts. The discovery sample
    /// does not depend on the query, so it is only redrawn on `resample`.
    fn rederive(&mut self, resample: bool) {
        let now = Instant::now();

        self.results = self.index.search(&self.applied_query);
        match self.discovery {
            DiscoveryMode::Off => self.displayed = self.results.entries.clone(),
            DiscoveryMode::Random if resample => self.displayed = self.draw_sample(),
            DiscoveryMode::Random => {}
        }
        self.reclassify();
        self.derivations += 1;

        log::debug!(
            "derivation #{} for {:?}: {} results in {}ms",
            self.derivations,
            self.applied_query,
            self.results.len(),
            now.elapsed().as_micros() as f64 / 1000.0
        );
    }

    /// Fresh draw from the whole corpus, independent of the query.
    fn draw_sample(&self) -> Vec<Entry> {
        discovery::sample_with(
            &self.corpus,
            self.discovery_config.sample_size,
            &mut rand::rng(),
        )
    }

    fn reclassify(&mut self) {
        self.buckets = self.classifier.classify(&self.displayed);
        self.clamp_selection();
    }

    fn clamp_selection(&mut self) {
        let len = self.visible().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }

    /// Record a query edit; it takes effect once typing pauses.
    pub fn edit_query(&mut self, text: String, now: Instant) {
        self.query = text.clone();
        self.debouncer.schedule(text, now);
    }

    /// Fire the debounced query when its deadline has passed.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        match self.debouncer.poll(now) {
            Some(query) => self.apply_query(query),
            None => vec![],
        }
    }

    fn apply_query(&mut self, query: String) -> Vec<Effect> {
        self.applied_query = query.clone();
        self.selected = 0;

        let mut effects = vec![];
        if self.mode == SearchMode::Server {
            effects.push(Effect::Fetch(self.begin_fetch(query)));
        }

        self.rederive(false);
        effects
    }

    /// Back to the full, unfiltered view with discovery off.
    pub fn clear(&mut self) -> Vec<Effect> {
        self.debouncer.cancel();
        self.select_all = false;
        self.query.clear();
        self.discovery = DiscoveryMode::Off;
        self.applied_query.clear();
        self.selected = 0;

        let mut effects = vec![];
        if self.mode == SearchMode::Server {
            effects.push(Effect::Fetch(self.begin_fetch(String::new())));
        }

        self.rederive(false);
        effects
    }

    pub fn set_bucket(&mut self, filter: BucketFilter) {
        self.active_bucket = filter;
        self.selected = 0;
    }

    pub fn toggle_discovery(&mut self) {
        self.discovery = match self.discovery {
            DiscoveryMode::Off => DiscoveryMode::Random,
            DiscoveryMode::Random => DiscoveryMode::Off,
        };

        self.displayed = match self.discovery {
            DiscoveryMode::Off => self.results.entries.clone(),
            DiscoveryMode::Random => self.draw_sample(),
        };
        self.selected = 0;
        self.reclassify();
    }

    pub fn reload(&mut self) -> Vec<Effect> {
        let query = match self.mode {
            SearchMode::Server => self.applied_query.clone(),
            SearchMode::Client => String::new(),
        };
        vec![Effect::Fetch(self.begin_fetch(query))]
    }

    fn selected_entry(&self) -> Option<&Entry> {
        self.visible().get(self.selected)
    }

    pub fn handle_key(&mut self, key: Key, now: Instant) -> Vec<Effect> {
        let Some(action) = resolve(key, self.focused) else {
            return vec![];
        };

        match action {
            Action::FocusSearch => {
                self.focused = true;
                self.select_all = !self.query.is_empty();
            }
            Action::Blur => {
                self.focused = false;
                self.select_all = false;
            }
            Action::ToggleFocus => {
                self.focused = !self.focused;
                self.select_all = false;
            }
            Action::Clear => {
                let is_clear = self.query.is_empty()
                    && self.applied_query.is_empty()
                    && self.discovery == DiscoveryMode::Off
                    && !self.debouncer.is_pending();

                if is_clear {
                    self.focused = false;
                    self.select_all = false;
                } else {
                    return self.clear();
                }
            }
            Action::Type(c) => {
                let mut text = if self.select_all {
                    String::new()
                } else {
                    self.query.clone()
                };
                self.select_all = false;
                text.push(c);
                self.edit_query(text, now);
            }
            Action::Backspace => {
                let text = if self.select_all {
                    String::new()
                } else {
                    let mut text = self.query.clone();
                    text.pop();
                    text
                };
                self.select_all = false;
                self.edit_query(text, now);
            }
            Action::SwitchBucket(filter) => self.set_bucket(filter),
            Action::ToggleDiscovery => self.toggle_discovery(),
            Action::Shuffle => {
                if let Some(entry) = self.visible().choose(&mut rand::rng()) {
                    return vec![Effect::Open(entry.display_url())];
                }
            }
            Action::SelectNext => {
                if self.selected + 1 < self.visible().len() {
                    self.selected += 1;
                }
            }
            Action::SelectPrev => {
                self.selected = self.selected.saturating_sub(1);
            }
            Action::OpenSelected => {
                if let Some(entry) = self.selected_entry() {
                    return vec![Effect::Open(entry.display_url())];
                }
            }
            Action::Reload => return self.reload(),
            Action::Quit => return vec![Effect::Quit],
        }

        vec![]
    }
}
