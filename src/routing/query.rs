//! Query string filtering.
//!
//! The front-end rewrite layer appends a parameter (conventionally `path`)
//! describing the original route. It is meaningful only to the gateway and is
//! removed before forwarding. Remaining pairs keep their original order and
//! their original encoding.

use url::form_urlencoded;

/// Drop every `key` parameter from `query`.
///
/// Returns `None` when nothing is left, so callers never emit a bare `?`.
pub fn strip_param(query: Option<&str>, key: &str) -> Option<String> {
    let query = query?;

    let kept: Vec<&str> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter(|pair| param_name(pair).as_deref() != Some(key))
        .collect();

    if kept.is_empty() {
        None
    } else {
        Some(kept.join("&"))
    }
}

/// Decoded name of a single `name=value` pair.
fn param_name(pair: &str) -> Option<String> {
    form_urlencoded::parse(pair.as_bytes())
        .next()
        .map(|(name, _)| name.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_removes_artifact_keeps_rest() {
        assert_eq!(
            strip_param(Some("path=/chat/message&limit=10"), "path").as_deref(),
            Some("limit=10")
        );
    }

    #[test]
    fn test_only_artifact_yields_none() {
        assert_eq!(strip_param(Some("path=%2Fchat"), "path"), None);
        assert_eq!(strip_param(Some(""), "path"), None);
        assert_eq!(strip_param(None, "path"), None);
    }

    #[test]
    fn test_repeated_and_encoded_names() {
        assert_eq!(
            strip_param(Some("a=1&path=x&b=2&%70ath=y&path"), "path").as_deref(),
            Some("a=1&b=2")
        );
    }

    #[test]
    fn test_preserves_order_and_values() {
        assert_eq!(
            strip_param(Some("z=last&a=first&q=hello%20world&tag=a&tag=b"), "path").as_deref(),
            Some("z=last&a=first&q=hello%20world&tag=a&tag=b")
        );
    }

    #[test]
    fn test_similar_names_kept() {
        assert_eq!(
            strip_param(Some("paths=1&subpath=2&path_id=3"), "path").as_deref(),
            Some("paths=1&subpath=2&path_id=3")
        );
    }

    #[test]
    fn test_empty_segments_dropped() {
        assert_eq!(
            strip_param(Some("&&limit=10&&path=/x&"), "path").as_deref(),
            Some("limit=10")
        );
    }
}
