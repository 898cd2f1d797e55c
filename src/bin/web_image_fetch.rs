use std::io::Write;
use std::path::PathBuf;

use web_image_engine::config::load_scrape_config;
use web_image_engine::events::EngineEvent;
use web_image_engine::fetcher::UreqFetcher;
use web_image_engine::paths::resolve_destination;
use web_image_engine::request::FetchRequest;
use web_image_engine::session::spawn_fetch_session;

const CONFIG_ENV_VAR: &str = "WEB_IMAGE_FETCH_CONFIG";
const LOG_ENV_VAR: &str = "WEB_IMAGE_FETCH_LOG";

fn main() -> Result<(), String> {
    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "-h" || a == "--help") {
        print_help();
        return Ok(());
    }
    if args.len() < 3 || args.len() > 4 {
        print_help();
        return Err("expected <url> <count> [destination]".to_string());
    }

    let request = FetchRequest::from_form(&args[1], &args[2]).map_err(|e| e.to_string())?;
    let destination = resolve_destination(args.get(3).map(String::as_str));

    let config = match std::env::var(CONFIG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => {
            load_scrape_config(&PathBuf::from(path)).map_err(|e| e.to_string())?
        }
        _ => Default::default(),
    };

    let mut log_file = match std::env::var(LOG_ENV_VAR) {
        Ok(path) if !path.trim().is_empty() => Some(
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path.trim())
                .map_err(|e| format!("failed to open log file: {e}"))?,
        ),
        _ => None,
    };

    println!("Starting download...");
    let fetcher = UreqFetcher::new(&config);
    let handle = spawn_fetch_session(request, config, fetcher, destination);

    for event in handle.events().iter() {
        match &event {
            EngineEvent::Progress(p) => {
                println!("[{:>5.1}%] {}/{}", p.percent, p.downloaded, p.total)
            }
            // Item outcomes are echoed by their own log events.
            EngineEvent::Item(_) => {}
            other => println!("{}", other.message()),
        }
        append_log_line(&mut log_file, &event.to_log_line());
    }

    let report = handle.join().map_err(|e| e.to_string())?;
    if report.summary.failed > 0 {
        eprintln!("{} image(s) failed", report.summary.failed);
    }
    Ok(())
}

/// Stops logging after the first failed write instead of failing every line.
fn append_log_line<W: Write>(sink: &mut Option<W>, line: &str) {
    let Some(writer) = sink.as_mut() else {
        return;
    };
    if let Err(err) = writeln!(writer, "{line}") {
        eprintln!("event log disabled after write error: {err}");
        *sink = None;
    }
}

fn print_help() {
    println!(
        r#"web_image_fetch

Downloads images linked from a web page.

Usage:
  cargo run --bin web_image_fetch -- <url> <count> [destination]

Environment:
  WEB_IMAGE_FETCH_CONFIG  Path to a JSON scrape config (defaults apply when unset)
  WEB_IMAGE_FETCH_LOG     Append one JSON line per event to this file
"#
    );
}
