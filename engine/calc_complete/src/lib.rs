//! Incremental path completion for calculated-value editors.
//!
//! Given the text before the cursor, [`complete`] recognizes a trailing
//! `datasources["..."]...` reference and suggests how to extend it:
//! datasource names while the reference is still open, then keys and
//! indices of the live payload once a datasource is selected. Only the
//! bracket reference form is completed; the dotted form evaluates fine
//! but gets no suggestions.
//!
//! The resolver is pure and infallible: an unknown datasource or a path
//! that no longer matches the payload produces an empty [`Completion`]
//! with `type_matches = false`, which callers render as a validation
//! hint rather than an error.

mod path;

use calc_engine::SnapshotStore;
use calc_ir::{ExpectedType, Value};

pub use path::{parse_segments, resolve, Segment};

/// One way to extend the reference under the cursor.
///
/// Inserting `insert_before + token + insert_after` after the last `]`
/// of the input (or at the cursor when there is none) yields the next
/// well-formed prefix.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub token: String,
    pub insert_before: &'static str,
    pub insert_after: &'static str,
    /// Rendered element value, set for array indices only.
    pub preview: Option<String>,
}

/// Result of one completion interaction.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Completion {
    pub suggestions: Vec<Suggestion>,
    /// The payload node the complete part of the path resolves to.
    pub current_value: Option<Value>,
    /// Whether `current_value` satisfies the field's expected type.
    pub type_matches: bool,
}

/// Dissected tail of the input: everything after the last
/// `datasources["` occurrence.
#[derive(Debug, PartialEq)]
enum Reference<'a> {
    /// No `datasources["` before the cursor.
    None,
    /// Name still open (or reopened): `datasources["par`
    Open { name: &'a str },
    /// Name closed with `"]`, possibly followed by more path text.
    Closed { name: &'a str, tail: &'a str },
}

fn dissect(input: &str) -> Reference<'_> {
    const OPENER: &str = "datasources[\"";
    let Some(at) = input.rfind(OPENER) else {
        return Reference::None;
    };
    let rest = &input[at + OPENER.len()..];
    match rest.find('"') {
        None => Reference::Open { name: rest },
        Some(quote) if rest[quote..].starts_with("\"]") => Reference::Closed {
            name: &rest[..quote],
            tail: &rest[quote + 2..],
        },
        // a quote not followed by `]` reopens the name portion
        Some(quote) => Reference::Open { name: &rest[..quote] },
    }
}

/// Compute suggestions for the text before the cursor.
///
/// `input_to_cursor` is everything the user has typed up to the caret;
/// `store` supplies live payloads and the datasource ordering.
pub fn complete(
    input_to_cursor: &str,
    store: &SnapshotStore,
    expected: ExpectedType,
) -> Completion {
    match dissect(input_to_cursor) {
        Reference::None => Completion::default(),
        Reference::Open { name } => complete_names(name, store),
        Reference::Closed { name, tail } => complete_path(name, tail, store, expected),
    }
}

/// Open reference: offer datasource names, in creation order.
///
/// An empty name offers everything; a partial name offers the
/// case-sensitive prefix matches, excluding an exact match (there is
/// nothing left to complete).
fn complete_names(partial: &str, store: &SnapshotStore) -> Completion {
    let suggestions = store
        .names()
        .filter(|name| partial.is_empty() || (*name != partial && name.starts_with(partial)))
        .map(|name| Suggestion {
            token: name.to_string(),
            insert_before: "",
            insert_after: "\"]",
            preview: None,
        })
        .collect();
    Completion {
        suggestions,
        current_value: None,
        type_matches: false,
    }
}

/// Closed reference: resolve the complete path segments against the
/// live payload, then enumerate the children of the resolved node.
fn complete_path(
    name: &str,
    tail: &str,
    store: &SnapshotStore,
    expected: ExpectedType,
) -> Completion {
    // the empty-name quirk: `datasources[""]` still lists everything
    if name.is_empty() {
        return complete_names(name, store);
    }
    let Some(payload) = store.payload(name) else {
        return Completion::default();
    };

    // Split the tail at the last `]`: everything before it is complete
    // path segments, everything after is the partially typed token.
    let cut = tail.rfind(']').map_or(0, |i| i + 1);
    let Some(segments) = parse_segments(&tail[..cut]) else {
        return Completion::default();
    };
    let partial = tail[cut..]
        .trim_start_matches(['[', '"'])
        .trim_end_matches(['"', ']']);

    let Some(node) = resolve(payload, &segments) else {
        return Completion::default();
    };

    let suggestions = match node {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(index, value)| {
                index.to_string().starts_with(partial) && expected.could_match(value)
            })
            .map(|(index, value)| Suggestion {
                token: index.to_string(),
                insert_before: "[",
                insert_after: "]",
                preview: Some(value.to_string()),
            })
            .collect(),
        Value::Object(map) => map
            .iter()
            .filter(|(key, value)| key.starts_with(partial) && expected.could_match(value))
            .map(|(key, _)| Suggestion {
                token: key.clone(),
                insert_before: "[\"",
                insert_after: "\"]",
                preview: None,
            })
            .collect(),
        // scalars have no children to offer
        _ => Vec::new(),
    };

    Completion {
        type_matches: expected.matches(node),
        current_value: Some(node.clone()),
        suggestions,
    }
}

#[cfg(test)]
mod tests;
