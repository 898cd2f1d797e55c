use serde::Serialize;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    Info,
    Success,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    pub level: LogLevel,
    /// Stable snake_case name, e.g. `image_saved`.
    pub event: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressEvent {
    pub downloaded: usize,
    pub total: usize,
    pub percent: f32,
}

impl ProgressEvent {
    pub fn new(downloaded: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            (downloaded as f32 / total as f32) * 100.0
        };
        Self {
            downloaded,
            total,
            percent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DownloadOutcome {
    Saved { path: PathBuf },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemEvent {
    /// 1-based position in the truncated candidate list.
    pub index: usize,
    pub url: String,
    pub outcome: DownloadOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub candidates_found: usize,
    pub attempted: usize,
    pub saved: usize,
    pub failed: usize,
    pub destination: PathBuf,
    pub canceled: bool,
}

impl BatchSummary {
    pub fn no_images_found(&self) -> bool {
        self.candidates_found == 0
    }
}

/// Everything a run reports back to its caller, in emission order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EngineEvent {
    Log(LogEvent),
    Progress(ProgressEvent),
    Item(ItemEvent),
    NoImagesFound,
    Completed(BatchSummary),
}

impl EngineEvent {
    pub fn info(event: &'static str, message: impl Into<String>) -> Self {
        Self::log(LogLevel::Info, event, message)
    }

    pub fn success(event: &'static str, message: impl Into<String>) -> Self {
        Self::log(LogLevel::Success, event, message)
    }

    pub fn error(event: &'static str, message: impl Into<String>) -> Self {
        Self::log(LogLevel::Error, event, message)
    }

    fn log(level: LogLevel, event: &'static str, message: impl Into<String>) -> Self {
        EngineEvent::Log(LogEvent {
            level,
            event,
            message: message.into(),
        })
    }

    pub fn level(&self) -> LogLevel {
        match self {
            EngineEvent::Log(log) => log.level,
            EngineEvent::Item(item) => match item.outcome {
                DownloadOutcome::Saved { .. } => LogLevel::Success,
                DownloadOutcome::Failed { .. } => LogLevel::Error,
            },
            EngineEvent::Completed(_) => LogLevel::Success,
            EngineEvent::Progress(_) | EngineEvent::NoImagesFound => LogLevel::Info,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            EngineEvent::Log(log) => log.event,
            EngineEvent::Progress(_) => "progress",
            EngineEvent::Item(_) => "item_outcome",
            EngineEvent::NoImagesFound => "no_images_found",
            EngineEvent::Completed(_) => "download_completed",
        }
    }

    /// Human-readable status line, as shown in the status log.
    pub fn message(&self) -> String {
        match self {
            EngineEvent::Log(log) => log.message.clone(),
            EngineEvent::Progress(p) => {
                format!("Progress: {}/{} ({:.0}%)", p.downloaded, p.total, p.percent)
            }
            EngineEvent::Item(item) => match &item.outcome {
                DownloadOutcome::Saved { path } => {
                    format!("Saved image {}: {}", item.index, path.to_string_lossy())
                }
                DownloadOutcome::Failed { reason } => {
                    format!("Error downloading image {}: {reason}", item.index)
                }
            },
            EngineEvent::NoImagesFound => "No images found on the webpage".to_string(),
            EngineEvent::Completed(summary) => format!(
                "Download completed! {} images saved to {}",
                summary.saved,
                summary.destination.to_string_lossy()
            ),
        }
    }

    /// One JSON line: `{"ts_ms", "level", "event", "data"}`.
    pub fn to_log_line(&self) -> String {
        let data = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        serde_json::json!({
            "ts_ms": now_ms(),
            "level": self.level().as_str(),
            "event": self.name(),
            "data": data,
        })
        .to_string()
    }
}

/// Reduces a URL to its origin for status messages. Credentials, path and
/// query never reach the log.
pub fn redact_url_for_log(value: &str) -> String {
    Url::parse(value)
        .ok()
        .and_then(|url| {
            let host = url.host_str()?;
            Some(match url.port() {
                Some(port) => format!("{}://{host}:{port}/...", url.scheme()),
                None => format!("{}://{host}/...", url.scheme()),
            })
        })
        .unwrap_or_else(|| "[invalid-url]".to_string())
}

fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
