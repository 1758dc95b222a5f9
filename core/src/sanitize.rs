//! Redaction of secret query parameters before a URL reaches an error or log.

use url::form_urlencoded;

/// Query parameters whose values must never be surfaced.
const SECRET_PARAMS: &[&str] = &["client_secret"];

/// Replacement for a redacted value.
pub const REDACTED: &str = "REDACTED";

/// Return `url` with every non-empty secret query value replaced by
/// [`REDACTED`]. Every other byte of the URL is kept as is.
///
/// Works on the raw string so that it also covers URLs `url::Url` would
/// refuse to parse.
pub fn sanitize_url(url: &str) -> String {
    let (without_fragment, fragment) = match url.split_once('#') {
        Some((head, frag)) => (head, Some(frag)),
        None => (url, None),
    };
    let Some((base, query)) = without_fragment.split_once('?') else {
        return url.to_string();
    };

    let segments: Vec<String> = query.split('&').map(redact_segment).collect();

    let mut out = format!("{base}?{}", segments.join("&"));
    if let Some(frag) = fragment {
        out.push('#');
        out.push_str(frag);
    }
    out
}

/// Redact one raw `key=value` query segment, or return it unchanged.
fn redact_segment(segment: &str) -> String {
    let Some((key, value)) = form_urlencoded::parse(segment.as_bytes()).next() else {
        return segment.to_string();
    };
    if !SECRET_PARAMS.contains(&&*key) || value.is_empty() {
        return segment.to_string();
    }
    let raw_key = segment.split_once('=').map_or(segment, |(k, _)| k);
    format!("{raw_key}={REDACTED}")
}
