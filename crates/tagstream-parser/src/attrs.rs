//! Attribute-list parsing for matched opening tags.

use std::sync::LazyLock;

use regex::Regex;
use tagstream_types::AttrMap;

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"([a-zA-Z][a-zA-Z0-9-]*)="([^"]*)""#).expect("attribute pattern is valid")
});

/// Parse the attribute-list substring of an opening tag.
///
/// Applies `key="value"` left to right, preserving first-seen order.
/// Malformed fragments are silently skipped; the tag matcher already
/// guarantees well-formed input reaches here.
pub fn parse_attributes(raw: &str) -> AttrMap {
    let mut map = AttrMap::new();
    for caps in ATTR_RE.captures_iter(raw) {
        map.insert(caps[1].to_string(), caps[2].to_string());
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_attribute() {
        let a = parse_attributes(" description=\"Update page title\"");
        assert_eq!(a.len(), 1);
        assert_eq!(a["description"], "Update page title");
    }

    #[test]
    fn test_multiple_attributes_keep_order() {
        let a = parse_attributes(" foo=\"bar\" baz=\"qux\" id=\"123\"");
        let keys: Vec<&str> = a.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["foo", "baz", "id"]);
        assert_eq!(a["baz"], "qux");
    }

    #[test]
    fn test_empty_and_none() {
        assert!(parse_attributes("").is_empty());
        assert!(parse_attributes("   ").is_empty());
    }

    #[test]
    fn test_empty_value() {
        let a = parse_attributes(" name=\"\"");
        assert_eq!(a["name"], "");
    }

    #[test]
    fn test_malformed_fragment_ignored() {
        let a = parse_attributes(" good=\"1\" broken=\"no-close");
        assert_eq!(a.len(), 1);
        assert_eq!(a["good"], "1");
    }

    #[test]
    fn test_duplicate_key_last_value_wins() {
        let a = parse_attributes(" k=\"1\" k=\"2\"");
        assert_eq!(a.len(), 1);
        assert_eq!(a["k"], "2");
    }
}
