pub mod config;
pub mod downloader;
mod error;
pub mod events;
pub mod extract;
pub mod fetcher;
pub mod identity;
pub mod paths;
pub mod request;
pub mod session;

pub use error::{EngineError, FetchError, ItemError, Result};
