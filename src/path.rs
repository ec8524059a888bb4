//! Path expression parsing.
//!
//! Turns XPath-like strings such as
//! `/interfaces/interface[name=eth0]/state/counters` into structured
//! [`gnmi::Path`] values for subscription requests, and renders them back for
//! logging.

use std::collections::HashMap;

use crate::gnmi::{Path, PathElem};

/// Parse an XPath-like path expression into a gNMI Path.
pub fn parse(path_str: &str) -> Path {
    let mut elems = Vec::new();

    for segment in path_str.split('/').filter(|s| !s.is_empty()) {
        let (name, keys) = parse_segment(segment);
        elems.push(PathElem { name, key: keys });
    }

    Path {
        elem: elems,
        ..Default::default()
    }
}

/// Parse `interface[name=eth0,unit=0]` into `("interface", {name: eth0, unit: 0})`.
fn parse_segment(segment: &str) -> (String, HashMap<String, String>) {
    if let Some(bracket_pos) = segment.find('[') {
        let name = segment[..bracket_pos].to_string();
        let keys_str = segment[bracket_pos + 1..].trim_end_matches(']');
        let mut keys = HashMap::new();

        for key_val in keys_str.split(',') {
            if let Some((k, v)) = key_val.split_once('=') {
                keys.insert(k.trim().to_string(), v.trim().to_string());
            }
        }

        (name, keys)
    } else {
        (segment.to_string(), HashMap::new())
    }
}

/// Render a gNMI Path in the same XPath-like form it was parsed from.
pub fn to_string(path: &Path) -> String {
    let rendered = path
        .elem
        .iter()
        .map(|elem| {
            if elem.key.is_empty() {
                elem.name.clone()
            } else {
                let mut keys: Vec<String> = elem
                    .key
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect();
                keys.sort();
                format!("{}[{}]", elem.name, keys.join(","))
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}", rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_path() {
        let path = parse("/interfaces/interface/state/counters");
        assert_eq!(path.elem.len(), 4);
        assert_eq!(path.elem[0].name, "interfaces");
        assert_eq!(path.elem[3].name, "counters");
        assert!(path.elem.iter().all(|e| e.key.is_empty()));
    }

    #[test]
    fn parse_path_with_keys() {
        let path = parse("/interfaces/interface[name=eth0]/state");
        assert_eq!(path.elem.len(), 3);
        assert_eq!(path.elem[1].name, "interface");
        assert_eq!(path.elem[1].key.get("name"), Some(&"eth0".to_string()));
    }

    #[test]
    fn parse_path_with_multiple_keys() {
        let path = parse("/a/b[x=1,y=2]/c");
        assert_eq!(path.elem[1].key.len(), 2);
        assert_eq!(path.elem[1].key.get("x"), Some(&"1".to_string()));
        assert_eq!(path.elem[1].key.get("y"), Some(&"2".to_string()));
    }

    #[test]
    fn trailing_and_leading_slashes_ignored() {
        assert_eq!(parse("/a/b/"), parse("a/b"));
    }

    #[test]
    fn equal_expressions_parse_equal() {
        // prost derives structural equality over the element sequence.
        assert_eq!(parse("/a/b[k=v]"), parse("/a/b[k=v]"));
        assert_ne!(parse("/a/b"), parse("/b/a"));
    }

    #[test]
    fn display_round_trip() {
        let s = "/interfaces/interface[name=eth0]/state/counters";
        assert_eq!(to_string(&parse(s)), s);
    }
}
