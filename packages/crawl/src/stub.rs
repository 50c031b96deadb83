//! In-memory [`Fetcher`] for tests.

use std::collections::BTreeMap;
use std::sync::Mutex;

use series_tv_scraper::{Fetcher, ScrapeError};

/// Serves canned bodies or status failures and records every requested
/// URL. Unknown URLs answer 404.
#[derive(Default)]
pub struct StubFetcher {
    responses: BTreeMap<String, Result<String, u16>>,
    requests: Mutex<Vec<String>>,
}

impl StubFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: &str, body: &str) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_string()));
        self
    }

    pub fn with_failure(mut self, url: &str, status: u16) -> Self {
        self.responses.insert(url.to_string(), Err(status));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_matching(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|url| url.starts_with(prefix))
            .count()
    }
}

impl Fetcher for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        self.requests.lock().unwrap().push(url.to_string());
        match self.responses.get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(status)) => Err(ScrapeError::Status {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(ScrapeError::Status {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
