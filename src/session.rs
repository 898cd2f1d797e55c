use crate::config::ScrapeConfig;
use crate::downloader::BatchDownloader;
use crate::events::{redact_url_for_log, BatchSummary, EngineEvent};
use crate::extract::extract_image_urls;
use crate::fetcher::HttpFetcher;
use crate::request::FetchRequest;
use crate::{EngineError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub page_url: String,
    pub requested_count: usize,
    /// Count after the off-by-one compatibility adjustment.
    pub effective_count: usize,
    pub summary: BatchSummary,
}

/// Fetches the page, extracts candidates and downloads them, all on the
/// calling thread.
pub fn run_fetch_session<F, FShouldCancel, FEvent>(
    request: &FetchRequest,
    config: &ScrapeConfig,
    fetcher: &F,
    destination: &Path,
    mut should_cancel: FShouldCancel,
    mut on_event: FEvent,
) -> Result<RunReport>
where
    F: HttpFetcher,
    FShouldCancel: FnMut() -> bool,
    FEvent: FnMut(EngineEvent),
{
    config.validate()?;
    let page_url = request.url();
    let mut headers = config.header_rotation();

    on_event(EngineEvent::info(
        "page_fetch_begin",
        format!("Fetching {}", redact_url_for_log(page_url)),
    ));

    let page = match fetcher.fetch(page_url, headers.next_user_agent()) {
        Ok(bytes) => bytes,
        Err(err) => {
            on_event(EngineEvent::error(
                "page_fetch_failed",
                format!("Error: {err}"),
            ));
            return Err(EngineError::PageFetch {
                url: page_url.to_string(),
                source: err,
            });
        }
    };

    let html = String::from_utf8_lossy(&page);
    let candidates = extract_image_urls(&html, page_url, config.extraction_policy);
    on_event(EngineEvent::info(
        "page_parsed",
        format!("Found {} image links", candidates.len()),
    ));

    let effective_count = config.effective_count(request.requested_count());
    if effective_count != request.requested_count() {
        on_event(EngineEvent::info(
            "off_by_one_compat",
            format!(
                "Compatibility mode: downloading {effective_count} images for a request of {}",
                request.requested_count()
            ),
        ));
    }

    let mut downloader = BatchDownloader::with_rotation(fetcher, headers, config.batch_size);
    let summary = downloader.download_batch(
        &candidates,
        effective_count,
        destination,
        &mut should_cancel,
        &mut on_event,
    )?;

    Ok(RunReport {
        page_url: page_url.to_string(),
        requested_count: request.requested_count(),
        effective_count,
        summary,
    })
}

/// A run executing on its own worker thread. Events arrive on the channel
/// in emission order; the caller drains them on its own thread.
pub struct SessionHandle {
    events: Receiver<EngineEvent>,
    cancel: Arc<AtomicBool>,
    worker: JoinHandle<Result<RunReport>>,
}

impl SessionHandle {
    pub fn events(&self) -> &Receiver<EngineEvent> {
        &self.events
    }

    /// Everything emitted so far, without blocking.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.events.try_iter().collect()
    }

    /// Takes effect before the next image; a write in progress completes.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::SeqCst);
    }

    pub fn is_finished(&self) -> bool {
        self.worker.is_finished()
    }

    pub fn join(self) -> Result<RunReport> {
        self.worker.join().map_err(|_| EngineError::WorkerPanicked)?
    }
}

pub fn spawn_fetch_session<F>(
    request: FetchRequest,
    config: ScrapeConfig,
    fetcher: F,
    destination: PathBuf,
) -> SessionHandle
where
    F: HttpFetcher + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_worker = cancel.clone();

    let worker = thread::spawn(move || {
        run_fetch_session(
            &request,
            &config,
            &fetcher,
            &destination,
            || cancel_worker.load(Ordering::SeqCst),
            |event| {
                // A dropped receiver means nobody is watching; keep going.
                let _ = tx.send(event);
            },
        )
    });

    SessionHandle {
        events: rx,
        cancel,
        worker,
    }
}
