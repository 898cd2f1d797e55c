mod ureq_fetcher;

use crate::FetchError;

pub use ureq_fetcher::UreqFetcher;

#[cfg(test)]
mod mock_fetcher;

#[cfg(test)]
pub(crate) use mock_fetcher::MockFetcher;

/// Blocking GET of one URL, returning the full body on any 2xx status.
pub trait HttpFetcher {
    fn fetch(&self, url: &str, user_agent: &str) -> Result<Vec<u8>, FetchError>;
}
