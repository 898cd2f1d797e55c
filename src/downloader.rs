use crate::config::{ScrapeConfig, DEFAULT_BATCH_SIZE};
use crate::events::{BatchSummary, DownloadOutcome, EngineEvent, ItemEvent, ProgressEvent};
use crate::fetcher::HttpFetcher;
use crate::identity::HeaderRotation;
use crate::{EngineError, ItemError, Result};
use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use url::Url;

/// Fetches candidate images one at a time and writes them into a single
/// destination folder. Batching only sets how often progress is reported.
pub struct BatchDownloader<'a, F: HttpFetcher> {
    fetcher: &'a F,
    headers: HeaderRotation,
    batch_size: usize,
}

impl<'a, F: HttpFetcher> BatchDownloader<'a, F> {
    pub fn new(fetcher: &'a F, config: &ScrapeConfig) -> Self {
        Self::with_rotation(fetcher, config.header_rotation(), config.batch_size)
    }

    pub fn with_rotation(fetcher: &'a F, headers: HeaderRotation, batch_size: usize) -> Self {
        let batch_size = if batch_size == 0 {
            DEFAULT_BATCH_SIZE
        } else {
            batch_size
        };
        Self {
            fetcher,
            headers,
            batch_size,
        }
    }

    /// Saves at most `requested_count` of `candidates` into `destination`.
    ///
    /// Per-item failures are reported through `on_event` and skipped. The only
    /// errors returned are a zero `requested_count` and failure to create the
    /// destination folder. `should_cancel` is polled before each item.
    pub fn download_batch<FShouldCancel, FEvent>(
        &mut self,
        candidates: &[String],
        requested_count: usize,
        destination: &Path,
        mut should_cancel: FShouldCancel,
        mut on_event: FEvent,
    ) -> Result<BatchSummary>
    where
        FShouldCancel: FnMut() -> bool,
        FEvent: FnMut(EngineEvent),
    {
        if requested_count == 0 {
            return Err(EngineError::Validation(
                "requested image count must be positive".to_string(),
            ));
        }

        let mut summary = BatchSummary {
            candidates_found: candidates.len(),
            attempted: 0,
            saved: 0,
            failed: 0,
            destination: destination.to_path_buf(),
            canceled: false,
        };

        if candidates.is_empty() {
            on_event(EngineEvent::NoImagesFound);
            return Ok(summary);
        }

        let planned = &candidates[..requested_count.min(candidates.len())];
        std::fs::create_dir_all(destination)?;

        on_event(EngineEvent::info(
            "download_begin",
            format!(
                "Found {} images, downloading {}",
                candidates.len(),
                planned.len()
            ),
        ));

        'batches: for batch in planned.chunks(self.batch_size) {
            let full_batch = batch.len() == self.batch_size;

            for url in batch {
                if should_cancel() {
                    summary.canceled = true;
                    break 'batches;
                }

                summary.attempted += 1;
                let index = summary.attempted;
                on_event(EngineEvent::info(
                    "image_download_begin",
                    format!("Downloading image {index}/{}...", planned.len()),
                ));

                let (outcome, log) = match self.download_one(url, index, destination) {
                    Ok(path) => {
                        summary.saved += 1;
                        let log = EngineEvent::success(
                            "image_saved",
                            format!("Saved image {index}: {}", path.to_string_lossy()),
                        );
                        (DownloadOutcome::Saved { path }, log)
                    }
                    Err(err) => {
                        summary.failed += 1;
                        let reason = err.to_string();
                        let log = EngineEvent::error(
                            "image_failed",
                            format!("Error downloading image {index}: {reason}"),
                        );
                        (DownloadOutcome::Failed { reason }, log)
                    }
                };
                on_event(EngineEvent::Item(ItemEvent {
                    index,
                    url: url.clone(),
                    outcome,
                }));
                on_event(log);

                if !full_batch {
                    on_event(EngineEvent::Progress(ProgressEvent::new(
                        summary.saved,
                        requested_count,
                    )));
                }
            }

            if full_batch {
                on_event(EngineEvent::Progress(ProgressEvent::new(
                    summary.saved,
                    requested_count,
                )));
            }
        }

        if summary.canceled {
            on_event(EngineEvent::info(
                "download_canceled",
                format!(
                    "Download canceled after {} of {} images",
                    summary.attempted,
                    planned.len()
                ),
            ));
        }
        on_event(EngineEvent::Completed(summary.clone()));
        Ok(summary)
    }

    fn download_one(
        &mut self,
        url: &str,
        index: usize,
        destination: &Path,
    ) -> std::result::Result<PathBuf, ItemError> {
        let user_agent = self.headers.next_user_agent();
        let data = self.fetcher.fetch(url, user_agent)?;
        let file_name = file_name_for_url(url, index);
        Ok(save_unique(destination, &file_name, &data)?)
    }
}

/// Last path segment of `url`, or `image_<index>.jpg` when that segment is
/// empty or has no extension.
pub fn file_name_for_url(url: &str, index: usize) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut segments| segments.next_back().map(str::to_string))
        })
        .map(|name| sanitize_file_name(&name))
        .unwrap_or_default();

    if segment.is_empty() || !segment.contains('.') {
        format!("image_{index}.jpg")
    } else {
        segment
    }
}

fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect::<String>()
        .trim()
        .to_string()
}

fn split_extension(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(pos) if file_name[..pos].chars().any(|c| c != '.') => {
            (&file_name[..pos], &file_name[pos..])
        }
        _ => (file_name, ""),
    }
}

/// Writes `data` under `file_name`, or `<stem>_<n><ext>` for the first free
/// `n` when that name is taken. Existing files are never replaced.
fn save_unique(destination: &Path, file_name: &str, data: &[u8]) -> std::io::Result<PathBuf> {
    let (stem, ext) = split_extension(file_name);
    let mut counter = 0_usize;
    loop {
        let candidate = if counter == 0 {
            file_name.to_string()
        } else {
            format!("{stem}_{counter}{ext}")
        };
        counter += 1;

        let path = destination.join(candidate);
        if path.exists() {
            continue;
        }

        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::AlreadyExists => continue,
            Err(err) => return Err(err),
        };
        if let Err(err) = file.write_all(data).and_then(|_| file.flush()) {
            drop(file);
            let _ = std::fs::remove_file(&path);
            return Err(err);
        }
        return Ok(path);
    }
}
