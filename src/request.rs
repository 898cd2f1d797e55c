use crate::{EngineError, Result};
use url::Url;

/// A validated user submission: the page to scrape and how many images to keep.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    url: String,
    requested_count: usize,
}

impl FetchRequest {
    pub fn new(url: &str, requested_count: usize) -> Result<Self> {
        let url = normalize_page_url(url)?;
        if requested_count == 0 {
            return Err(EngineError::Validation(
                "Number must be positive".to_string(),
            ));
        }
        Ok(Self {
            url,
            requested_count,
        })
    }

    /// Builds a request from raw text fields, with the same messages the
    /// form shows next to the offending input.
    pub fn from_form(url_text: &str, count_text: &str) -> Result<Self> {
        if url_text.trim().is_empty() {
            return Err(EngineError::Validation("URL is required".to_string()));
        }
        let count = parse_requested_count(count_text)?;
        Self::new(url_text, count)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn requested_count(&self) -> usize {
        self.requested_count
    }
}

pub fn parse_requested_count(text: &str) -> Result<usize> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("Number is required".to_string()));
    }
    let value: i64 = trimmed
        .parse()
        .map_err(|_| EngineError::Validation("Invalid number".to_string()))?;
    if value <= 0 {
        return Err(EngineError::Validation(
            "Number must be positive".to_string(),
        ));
    }
    usize::try_from(value).map_err(|_| EngineError::Validation("Invalid number".to_string()))
}

fn normalize_page_url(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::Validation("URL is required".to_string()));
    }
    let parsed = Url::parse(trimmed)
        .map_err(|_| EngineError::Validation("invalid URL format".to_string()))?;
    match parsed.scheme() {
        "http" | "https" => {}
        other => {
            return Err(EngineError::Validation(format!(
                "unsupported URL scheme {other}; only http/https are allowed"
            )));
        }
    }
    if parsed.host_str().is_none() {
        return Err(EngineError::Validation("URL is missing host".to_string()));
    }
    Ok(trimmed.to_string())
}
