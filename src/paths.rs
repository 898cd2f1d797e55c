use std::path::PathBuf;

const ANDROID_DOWNLOAD_DIR: &str = "/storage/emulated/0/Download/WebImages";
const DESKTOP_DOWNLOAD_DIR: &str = "downloads";

/// Where images go when the caller does not choose a folder.
pub fn default_destination() -> PathBuf {
    if cfg!(target_os = "android") {
        PathBuf::from(ANDROID_DOWNLOAD_DIR)
    } else {
        PathBuf::from(DESKTOP_DOWNLOAD_DIR)
    }
}

pub fn resolve_destination(override_dir: Option<&str>) -> PathBuf {
    match override_dir.map(str::trim) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => default_destination(),
    }
}
