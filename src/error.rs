use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to fetch page {url}: {source}")]
    PageFetch {
        url: String,
        #[source]
        source: FetchError,
    },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("download worker panicked")]
    WorkerPanicked,
}

/// Failure of a single HTTP request, page or image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP status {0}")]
    Status(u16),

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to read response body: {0}")]
    Body(String),

    #[error("response body exceeds {limit} bytes")]
    TooLarge { limit: u64 },
}

/// Failure of one candidate image. Never aborts the batch.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("{0}")]
    Fetch(#[from] FetchError),

    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EngineError>;
