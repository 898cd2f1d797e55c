use std::io::Read;
use std::time::Duration;

use super::HttpFetcher;
use crate::config::ScrapeConfig;
use crate::FetchError;

pub struct UreqFetcher {
    agent: ureq::Agent,
    max_body_bytes: u64,
}

impl UreqFetcher {
    pub fn new(config: &ScrapeConfig) -> Self {
        let mut builder = ureq::Agent::config_builder();
        builder = builder
            .http_status_as_error(false)
            .timeout_global(Some(Duration::from_secs(config.effective_timeout_secs())));
        let agent: ureq::Agent = builder.build().into();

        Self {
            agent,
            max_body_bytes: config.max_image_bytes,
        }
    }
}

impl Default for UreqFetcher {
    fn default() -> Self {
        Self::new(&ScrapeConfig::default())
    }
}

impl HttpFetcher for UreqFetcher {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FetchError> {
        let mut response = self
            .agent
            .get(url)
            .header("User-Agent", user_agent)
            .call()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let mut body = Vec::new();
        response
            .body_mut()
            .as_reader()
            .take(self.max_body_bytes.saturating_add(1))
            .read_to_end(&mut body)
            .map_err(|e| FetchError::Body(e.to_string()))?;

        if body.len() as u64 > self.max_body_bytes {
            return Err(FetchError::TooLarge {
                limit: self.max_body_bytes,
            });
        }

        Ok(body)
    }
}
