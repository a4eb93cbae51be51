//! Wildcard URL patterns as authored in the dashboard.

use regex::Regex;

/// Match `url` against a `*` wildcard `pattern`.
///
/// Scheme and host compare case-insensitively and a trailing `/` is
/// ignored on both sides. A pattern without a scheme matches the URL with
/// its scheme removed. An empty pattern matches everything.
pub fn url_matches(pattern: &str, url: &str) -> bool {
    let pattern = pattern.trim();
    if pattern.is_empty() || pattern == "*" {
        return true;
    }

    let url = if pattern.contains("://") {
        normalize(url)
    } else {
        normalize(strip_scheme(url))
    };
    let pattern = normalize(pattern);

    let body = pattern
        .split('*')
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(".*");

    match Regex::new(&format!("^{}$", body)) {
        Ok(re) => re.is_match(&url),
        Err(_) => pattern == url,
    }
}

fn strip_scheme(url: &str) -> &str {
    url.split_once("://").map(|(_, rest)| rest).unwrap_or(url)
}

fn normalize(value: &str) -> String {
    let trimmed = value.trim();
    let (scheme, rest) = match trimmed.split_once("://") {
        Some((scheme, rest)) => (Some(scheme), rest),
        None => (None, trimmed),
    };
    let (host, path) = match rest.find('/') {
        Some(idx) => rest.split_at(idx),
        None => (rest, ""),
    };

    let mut out = String::with_capacity(trimmed.len());
    if let Some(scheme) = scheme {
        out.push_str(&scheme.to_ascii_lowercase());
        out.push_str("://");
    }
    out.push_str(&host.to_ascii_lowercase());
    out.push_str(path.strip_suffix('/').unwrap_or(path));
    out
}
