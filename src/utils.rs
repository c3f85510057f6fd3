use axum::http::HeaderMap;
use base64::prelude::BASE64_URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::Rng;

const ID_SUFFIX_BYTES: usize = 6;

pub fn get_header(name: &str, headers: &HeaderMap) -> Option<String> {
    headers
        .get(name)
        .map(|value| value.to_str().unwrap_or_default().to_string())
}

/// Millisecond timestamp keeps ids roughly ordered, the random suffix keeps
/// ids generated within the same millisecond apart.
pub fn generate_id(now: DateTime<Utc>) -> String {
    let suffix: [u8; ID_SUFFIX_BYTES] = rand::thread_rng().gen();
    format!(
        "{}-{}",
        now.timestamp_millis(),
        BASE64_URL_SAFE_NO_PAD.encode(suffix)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn ids_start_with_the_millisecond_timestamp() {
        let now: DateTime<Utc> = "2024-01-01T00:00:00Z".parse().unwrap();
        let id = generate_id(now);
        let (millis, suffix) = id.split_once('-').unwrap();
        assert_eq!(millis, "1704067200000");
        assert_eq!(suffix.len(), 8);
    }

    #[test]
    fn ids_within_the_same_millisecond_differ() {
        let now = Utc::now();
        let ids: HashSet<String> = (0..100).map(|_| generate_id(now)).collect();
        assert_eq!(ids.len(), 100);
    }

    #[test]
    fn reads_headers() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "secret".parse().unwrap());
        assert_eq!(get_header("x-api-key", &headers).as_deref(), Some("secret"));
        assert_eq!(get_header("referer", &headers), None);
    }
}
