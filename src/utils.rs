// src/utils.rs
use web_sys::window;

/// Path prefix used when the app is served from a sub-directory (GitHub Pages).
pub const DEPLOY_BASE: &str = "/deep-zoomer";

/// Get the base URL for the application
/// This handles both local development and GitHub Pages deployment
pub fn get_base_url() -> String {
    if let Some(window) = window() {
        if let Ok(location) = window.location().pathname() {
            if location == DEPLOY_BASE || location.starts_with(&format!("{}/", DEPLOY_BASE)) {
                return DEPLOY_BASE.to_string();
            }
        }
    }
    // Local development - no base path needed
    String::new()
}

/// Build a resource URL with the correct base path
pub fn resource_url(path: &str) -> String {
    join_base(&get_base_url(), path)
}

pub fn join_base(base: &str, path: &str) -> String {
    let clean_path = path.trim_start_matches('/');

    if base.is_empty() {
        format!("/{}", clean_path)
    } else {
        format!("{}/{}", base.trim_end_matches('/'), clean_path)
    }
}

/// Strip the deployment base from a location path, always leaving a leading slash.
pub fn strip_base<'a>(base: &str, path: &'a str) -> &'a str {
    if base.is_empty() {
        return path;
    }
    match path.strip_prefix(base) {
        Some("") => "/",
        Some(rest) if rest.starts_with('/') => rest,
        _ => path,
    }
}

/// `5_242_880` -> `"5.00 MB"`
pub fn format_megabytes(bytes: u64) -> String {
    format!("{:.2} MB", bytes as f64 / 1024.0 / 1024.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_base_formatting() {
        assert_eq!(join_base("", "/upload"), "/upload");
        assert_eq!(join_base("", "upload"), "/upload");
        assert_eq!(join_base("/deep-zoomer", "/viewer"), "/deep-zoomer/viewer");
        assert_eq!(join_base("/deep-zoomer/", "public/a.jpg"), "/deep-zoomer/public/a.jpg");
    }

    #[test]
    fn test_strip_base() {
        assert_eq!(strip_base("", "/gallery"), "/gallery");
        assert_eq!(strip_base("/deep-zoomer", "/deep-zoomer"), "/");
        assert_eq!(strip_base("/deep-zoomer", "/deep-zoomer/viewer"), "/viewer");
        // A sibling path that merely shares the prefix is left alone.
        assert_eq!(strip_base("/deep-zoomer", "/deep-zoomerx"), "/deep-zoomerx");
    }

    #[test]
    fn test_format_megabytes() {
        assert_eq!(format_megabytes(5 * 1024 * 1024), "5.00 MB");
        assert_eq!(format_megabytes(0), "0.00 MB");
        assert_eq!(format_megabytes(1_572_864), "1.50 MB");
    }
}
