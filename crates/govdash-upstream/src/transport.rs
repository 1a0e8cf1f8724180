use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL};
use serde_json::Value;
use url::Url;

/// Headers sent with every upstream request.
pub fn fixed_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
    headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
    headers
}

/// Append `limit` to the proposals endpoint, replacing any `limit` already present.
pub fn proposals_url(base: &Url, limit: &str) -> Url {
    let mut url = base.clone();
    let retained: Vec<(String, String)> = base
        .query_pairs()
        .filter(|(k, _)| k != "limit")
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        for (k, v) in &retained {
            pairs.append_pair(k, v);
        }
        pairs.append_pair("limit", limit);
    }
    url
}

/// Item count for log lines, or a marker when the body is not an array.
pub fn payload_len_for_log(body: &Value) -> String {
    match body.as_array() {
        Some(items) => items.len().to_string(),
        None => "not an array".to_string(),
    }
}
