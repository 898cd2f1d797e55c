use crate::extract::ExtractionPolicy;
use crate::identity::{default_user_agents, HeaderRotation, HeaderSelection};
use crate::{EngineError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_BATCH_SIZE: usize = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 30;
const MAX_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MAX_IMAGE_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    pub extraction_policy: ExtractionPolicy,
    /// `User-Agent` values rotated across requests.
    pub identification_headers: Vec<String>,
    pub header_selection: HeaderSelection,
    /// Progress is reported after every full batch of this many items.
    pub batch_size: usize,
    /// Download one image more than requested. Reproduces an observed defect
    /// in one of the mobile variants; off unless asked for.
    pub off_by_one_compat: bool,
    pub timeout_secs: u64,
    pub max_image_bytes: u64,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            extraction_policy: ExtractionPolicy::default(),
            identification_headers: default_user_agents(),
            header_selection: HeaderSelection::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            off_by_one_compat: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_image_bytes: DEFAULT_MAX_IMAGE_BYTES,
        }
    }
}

impl ScrapeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.identification_headers.is_empty() {
            return Err(EngineError::Config(
                "identification_headers must contain at least one value".to_string(),
            ));
        }
        for value in &self.identification_headers {
            if value.trim().is_empty() {
                return Err(EngineError::Config(
                    "identification_headers contains a blank value".to_string(),
                ));
            }
            if value.chars().any(|ch| ch.is_control()) {
                return Err(EngineError::Config(
                    "identification_headers contains control characters".to_string(),
                ));
            }
        }
        if self.batch_size == 0 {
            return Err(EngineError::Config("batch_size must be positive".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(EngineError::Config("timeout_secs must be positive".to_string()));
        }
        if self.max_image_bytes == 0 {
            return Err(EngineError::Config(
                "max_image_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn effective_timeout_secs(&self) -> u64 {
        self.timeout_secs.clamp(1, MAX_TIMEOUT_SECS)
    }

    /// Number of images the engine will try to save for a user request.
    pub fn effective_count(&self, requested_count: usize) -> usize {
        if self.off_by_one_compat {
            requested_count.saturating_add(1)
        } else {
            requested_count
        }
    }

    pub fn header_rotation(&self) -> HeaderRotation {
        HeaderRotation::new(self.identification_headers.clone(), self.header_selection)
    }
}

pub fn load_scrape_config(path: &Path) -> Result<ScrapeConfig> {
    if !path.exists() {
        return Ok(ScrapeConfig::default());
    }
    let bytes = std::fs::read(path)?;
    let parsed: ScrapeConfig = serde_json::from_slice(&bytes).map_err(|e| {
        EngineError::Config(format!(
            "failed to parse scrape config at {}: {e}",
            path.to_string_lossy()
        ))
    })?;
    parsed.validate()?;
    Ok(parsed)
}

pub fn save_scrape_config(path: &Path, config: &ScrapeConfig) -> Result<()> {
    config.validate()?;
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
