use std::collections::HashMap;
use std::sync::Mutex;

use super::HttpFetcher;
use crate::FetchError;

/// Canned responses keyed by URL. Unknown URLs fail with a network error.
pub struct MockFetcher {
    responses: HashMap<String, Result<Vec<u8>, FetchError>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self {
            responses: HashMap::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_ok(mut self, url: &str, body: &[u8]) -> Self {
        self.responses.insert(url.to_string(), Ok(body.to_vec()));
        self
    }

    pub fn with_err(mut self, url: &str, err: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(err));
        self
    }

    /// (url, user agent) pairs in request order.
    pub fn requests(&self) -> Vec<(String, String)> {
        self.requests.lock().expect("requests lock").clone()
    }
}

impl HttpFetcher for MockFetcher {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FetchError> {
        self.requests
            .lock()
            .expect("requests lock")
            .push((url.to_string(), user_agent.to_string()));

        match self.responses.get(url) {
            Some(response) => response.clone(),
            None => Err(FetchError::Network(format!("no route to {url}"))),
        }
    }
}
