use web_image_engine::config::ScrapeConfig;
use web_image_engine::events::{DownloadOutcome, EngineEvent};
use web_image_engine::fetcher::{HttpFetcher, UreqFetcher};
use web_image_engine::identity::HeaderSelection;
use web_image_engine::request::FetchRequest;
use web_image_engine::session::spawn_fetch_session;
use web_image_engine::{EngineError, FetchError};

#[test]
fn ureq_fetcher_sends_user_agent_and_returns_body() {
    let mut server = mockito::Server::new();
    let mock = server
        .mock("GET", "/pic.jpg")
        .match_header("user-agent", "TestAgent/1.0")
        .with_status(200)
        .with_header("content-type", "image/jpeg")
        .with_body("jpegdata")
        .create();

    let fetcher = UreqFetcher::default();
    let body = fetcher
        .fetch(&format!("{}/pic.jpg", server.url()), "TestAgent/1.0")
        .expect("body");
    assert_eq!(body, b"jpegdata");
    mock.assert();
}

#[test]
fn ureq_fetcher_maps_non_success_status() {
    let mut server = mockito::Server::new();
    let _gone = server.mock("GET", "/gone.png").with_status(404).create();

    let err = UreqFetcher::default()
        .fetch(&format!("{}/gone.png", server.url()), "TestAgent/1.0")
        .unwrap_err();
    assert_eq!(err, FetchError::Status(404));
}

#[test]
fn ureq_fetcher_caps_body_size() {
    let mut server = mockito::Server::new();
    let _big = server
        .mock("GET", "/big.jpg")
        .with_status(200)
        .with_body(vec![0_u8; 64])
        .create();

    let config = ScrapeConfig {
        max_image_bytes: 16,
        ..ScrapeConfig::default()
    };
    let err = UreqFetcher::new(&config)
        .fetch(&format!("{}/big.jpg", server.url()), "TestAgent/1.0")
        .unwrap_err();
    assert_eq!(err, FetchError::TooLarge { limit: 16 });
}

#[test]
fn session_downloads_page_images_and_skips_failures() {
    let mut server = mockito::Server::new();
    let page = r#"
    <html><body>
      <img src="/images/a.jpg">
      <img src="/images/missing.png">
      <picture><source srcset="/images/b.webp 1x"></picture>
      <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
    </body></html>
    "#;
    let _page = server
        .mock("GET", "/gallery")
        .with_status(200)
        .with_header("content-type", "text/html; charset=utf-8")
        .with_body(page)
        .create();
    let _a = server
        .mock("GET", "/images/a.jpg")
        .with_status(200)
        .with_body("aaaa")
        .create();
    let _missing = server
        .mock("GET", "/images/missing.png")
        .with_status(404)
        .create();
    let _b = server
        .mock("GET", "/images/b.webp")
        .with_status(200)
        .with_body("bbbb")
        .create();

    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("WebImages");
    let config = ScrapeConfig {
        identification_headers: vec!["UA-A".to_string(), "UA-B".to_string()],
        header_selection: HeaderSelection::RoundRobin,
        ..ScrapeConfig::default()
    };
    let request = FetchRequest::new(&format!("{}/gallery", server.url()), 10).expect("request");
    let fetcher = UreqFetcher::new(&config);
    let handle = spawn_fetch_session(request, config, fetcher, destination.clone());

    let events: Vec<EngineEvent> = handle.events().iter().collect();
    let report = handle.join().expect("report");

    assert_eq!(report.summary.candidates_found, 3);
    assert_eq!(report.summary.attempted, 3);
    assert_eq!(report.summary.saved, 2);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(std::fs::read(destination.join("a.jpg")).expect("a"), b"aaaa");
    assert_eq!(std::fs::read(destination.join("b.webp")).expect("b"), b"bbbb");

    let failed: Vec<usize> = events
        .iter()
        .filter_map(|e| match e {
            EngineEvent::Item(item) if matches!(item.outcome, DownloadOutcome::Failed { .. }) => {
                Some(item.index)
            }
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![2]);
    assert!(matches!(events.last(), Some(EngineEvent::Completed(s)) if s.saved == 2));
}

#[test]
fn session_page_error_ends_run() {
    let mut server = mockito::Server::new();
    let _down = server.mock("GET", "/down").with_status(500).create();

    let dir = tempfile::tempdir().expect("tempdir");
    let destination = dir.path().join("out");
    let config = ScrapeConfig::default();
    let request = FetchRequest::new(&format!("{}/down", server.url()), 3).expect("request");
    let handle = spawn_fetch_session(
        request,
        config.clone(),
        UreqFetcher::new(&config),
        destination.clone(),
    );

    let events: Vec<EngineEvent> = handle.events().iter().collect();
    let err = handle.join().unwrap_err();
    assert!(matches!(
        err,
        EngineError::PageFetch {
            source: FetchError::Status(500),
            ..
        }
    ));
    assert_eq!(events.last().map(|e| e.name()), Some("page_fetch_failed"));
    assert!(!destination.exists());
}
