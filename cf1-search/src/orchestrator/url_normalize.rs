//! Canonical form of listing URLs for deduplication.
//!
//! Two providers often link the same listing with different campaign tags,
//! fragments or trailing slashes. Normalising strips those so the links
//! compare equal.

use url::Url;

/// Query parameters that only carry attribution and never change the page.
const TRACKING_PARAMS: &[&str] = &[
    "fbclid", "gclid", "msclkid", "ref", "src", "source", "cid", "mc_cid", "mc_eid",
];

fn is_tracking(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    key.starts_with("utm_") || TRACKING_PARAMS.contains(&key.as_str())
}

/// Normalise a listing URL for comparison.
///
/// Scheme and host are lowercased by parsing; default ports, the fragment,
/// tracking parameters and a trailing path slash are removed; the remaining
/// query parameters are sorted. Unparseable input is returned trimmed but
/// otherwise unchanged.
///
/// ```
/// use cf1_search::orchestrator::url_normalize::normalize_url;
///
/// let a = normalize_url("https://WWW.LoopNet.com/Listing/31244170/?utm_source=feed#photos");
/// let b = normalize_url("https://www.loopnet.com/Listing/31244170");
/// assert_eq!(a, b);
/// ```
pub fn normalize_url(raw: &str) -> String {
    let raw = raw.trim();
    let Ok(mut parsed) = Url::parse(raw) else {
        return raw.to_owned();
    };

    parsed.set_fragment(None);
    if matches!(
        (parsed.scheme(), parsed.port()),
        ("http", Some(80)) | ("https", Some(443))
    ) {
        let _ = parsed.set_port(None);
    }

    let mut params: Vec<(String, String)> = parsed
        .query_pairs()
        .filter(|(key, _)| !is_tracking(key))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    params.sort();
    if params.is_empty() {
        parsed.set_query(None);
    } else {
        parsed.query_pairs_mut().clear().extend_pairs(&params);
    }

    let path = parsed.path().to_owned();
    if path.len() > 1 && path.ends_with('/') {
        parsed.set_path(path.trim_end_matches('/'));
    }

    parsed.to_string()
}
