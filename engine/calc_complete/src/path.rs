//! Bracket-path parsing and payload traversal.

use calc_ir::Value;

/// One complete step of a bracket path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// Parse a run of complete bracket segments: `["key"]` or `[0]`,
/// repeated. Returns `None` on anything else; the caller treats that as
/// an unresolvable path, not an error.
pub fn parse_segments(path: &str) -> Option<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut rest = path;
    while !rest.is_empty() {
        rest = rest.strip_prefix('[')?;
        if let Some(inner) = rest.strip_prefix('"') {
            let end = inner.find('"')?;
            segments.push(Segment::Key(inner[..end].to_string()));
            rest = inner[end + 1..].strip_prefix(']')?;
        } else {
            let end = rest.find(']')?;
            let index = rest[..end].trim().parse().ok()?;
            segments.push(Segment::Index(index));
            rest = &rest[end + 1..];
        }
    }
    Some(segments)
}

#[cfg(test)]
mod segment_tests {
    use super::{parse_segments, Segment};

    #[test]
    fn mixed_segments() {
        assert_eq!(
            parse_segments(r#"["a"][0]["b c"]"#),
            Some(vec![
                Segment::Key("a".to_string()),
                Segment::Index(0),
                Segment::Key("b c".to_string()),
            ])
        );
    }

    #[test]
    fn empty_path_is_the_root() {
        assert_eq!(parse_segments(""), Some(vec![]));
    }

    #[test]
    fn rejects_unclosed_and_non_bracket_text() {
        assert_eq!(parse_segments(r#"["a""#), None);
        assert_eq!(parse_segments(".a"), None);
        assert_eq!(parse_segments("[x]"), None);
        assert_eq!(parse_segments("[-1]"), None);
    }
}

/// Walk the payload along the segments. `None` for any step that does
/// not fit the shape of the data: wrong container kind, missing key,
/// index out of range.
pub fn resolve<'a>(root: &'a Value, segments: &[Segment]) -> Option<&'a Value> {
    segments.iter().try_fold(root, |node, segment| {
        match (node, segment) {
            (Value::Object(map), Segment::Key(key)) => map.get(key.as_str()),
            (Value::Array(items), Segment::Index(index)) => items.get(*index),
            _ => None,
        }
    })
}
