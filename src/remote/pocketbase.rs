use std::time::Duration;

use super::{FetchError, Page, PageRequest, RecordSource, MAX_PER_PAGE};
use crate::config::RemoteConfig;

/// Reads the link collection from a PocketBase instance.
pub struct PocketBase {
    remote_addr: String,
    collection: String,
    per_page: u32,
    sort: String,
    client: reqwest::blocking::Client,
}

impl PocketBase {
    pub fn new(config: &RemoteConfig) -> Result<PocketBase, FetchError> {
        let addr = config.addr.as_str();
        let remote_addr = addr.strip_suffix("/").unwrap_or(addr).to_string();

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(PocketBase {
            remote_addr,
            collection: config.collection.clone(),
            per_page: config.per_page.min(MAX_PER_PAGE),
            sort: config.sort.clone(),
            client,
        })
    }

    pub fn records_url(&self) -> String {
        format!(
            "{}/api/collections/{}/records",
            self.remote_addr, self.collection
        )
    }
}

fn handle_response(response: reqwest::blocking::Response) -> Result<Page, FetchError> {
    let status = response.status();
    let text = response.text()?;

    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            body: text,
        });
    }

    serde_json::from_str::<Page>(&text).map_err(|err| {
        log::error!("{err}. tried to parse: {text:?}");
        FetchError::from(err)
    })
}

impl RecordSource for PocketBase {
    fn fetch_page(&self, request: &PageRequest) -> Result<Page, FetchError> {
        let url = self.records_url();
        log::info!("{url} page={}", request.page);

        let response = self
            .client
            .get(&url)
            .query(&request.query_pairs())
            .send()?;

        handle_response(response)
    }

    fn per_page(&self) -> u32 {
        self.per_page
    }

    fn sort(&self) -> String {
        self.sort.clone()
    }
}
