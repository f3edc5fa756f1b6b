//! URL normalization used for dedupe: lowercase, strip leading `www.`,
//! strip tracking params.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;
use url::Url;

static TRACKING_PARAMS: Lazy<BTreeSet<&'static str>> = Lazy::new(|| {
    [
        "utm_source", "utm_medium", "utm_campaign", "utm_term", "utm_content",
        "gclid", "fbclid", "ref", "mc_cid", "mc_eid",
    ]
    .into_iter()
    .collect()
});

pub fn normalize_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.trim().to_lowercase();
    };

    let host = url.host_str().unwrap_or_default().to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host).to_string();
    let _ = url.set_host(Some(&host));

    let retained: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !TRACKING_PARAMS.contains(k.as_ref()))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

    if retained.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(retained);
    }

    url.set_fragment(None);

    let scheme = url.scheme().to_lowercase();
    let _ = url.set_scheme(&scheme);

    let mut out = url.to_string().to_lowercase();
    if out.ends_with('/') && url.path() == "/" {
        out.pop();
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_www_and_tracking_params() {
        let a = normalize_url("https://WWW.Example.com/Article?utm_source=x&id=5");
        let b = normalize_url("https://example.com/Article?id=5");
        assert_eq!(a, b);
    }

    #[test]
    fn normalize_is_idempotent() {
        let once = normalize_url("https://www.example.com/a?utm_campaign=foo&id=1#frag");
        let twice = normalize_url(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn distinct_paths_stay_distinct() {
        assert_ne!(normalize_url("https://example.com/a"), normalize_url("https://example.com/b"));
    }
}
