//! Recovers a concrete watch-page URL from fetch-tool log text.
//!
//! When the fetch tool exits 0 without writing anything it usually still printed the
//! video it had matched. That URL is fed to the direct-fetch fallback.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

// scheme, optional host prefix, /watch?v=<id>, then any further query pairs
static WATCH_URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"https?://(?:www\.|music\.|m\.)?youtube\.com/watch\?v=[\w-]+(?:&[\w.-]+=[^\s&"'<>]*)*"#,
    )
    .expect("watch url pattern is valid")
});

fn is_youtube_host(host: &str) -> bool {
    let h = host.to_ascii_lowercase();
    h == "youtube.com" || h.ends_with(".youtube.com")
}

/// Parses the candidate and requires a non-empty `v` parameter on a YouTube host.
fn is_valid_watch_url(candidate: &str) -> bool {
    let Ok(u) = Url::parse(candidate) else {
        return false;
    };
    let host_ok = u.host_str().is_some_and(is_youtube_host);
    host_ok
        && u.path() == "/watch"
        && u.query_pairs().any(|(k, v)| k == "v" && !v.trim().is_empty())
}

/// First valid watch-page URL in `output`, returned exactly as printed.
pub fn extract_reference(output: &str) -> Option<String> {
    WATCH_URL_RE
        .find_iter(output)
        .map(|m| m.as_str())
        .find(|candidate| is_valid_watch_url(candidate))
        .map(str::to_string)
}
