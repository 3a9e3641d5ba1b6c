#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use crate::{complete, Completion, Suggestion};
use calc_engine::SnapshotStore;
use calc_ir::{ExpectedType, Value};
use pretty_assertions::assert_eq;

fn store() -> SnapshotStore {
    let mut store = SnapshotStore::new();
    store.update(
        "temp",
        Value::from_json_str(r#"{"c": 21.5, "units": "C"}"#).unwrap(),
    );
    store.update(
        "tides",
        Value::from_json_str(r#"{"heights": [1.2, {"peak": 2.5}], "station": "PDX"}"#).unwrap(),
    );
    store.update("total", Value::from_json_str("42").unwrap());
    store
}

fn tokens(completion: &Completion) -> Vec<&str> {
    completion
        .suggestions
        .iter()
        .map(|s| s.token.as_str())
        .collect()
}

#[test]
fn no_reference_before_cursor() {
    let c = complete("5 + 3", &store(), ExpectedType::Any);
    assert_eq!(c, Completion::default());
}

#[test]
fn dotted_form_gets_no_suggestions() {
    let c = complete("datasources.temp", &store(), ExpectedType::Any);
    assert!(c.suggestions.is_empty());
}

#[test]
fn open_reference_lists_all_names_in_creation_order() {
    let c = complete(r#"datasources[""#, &store(), ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["temp", "tides", "total"]);
    assert_eq!(
        c.suggestions[0],
        Suggestion {
            token: "temp".to_string(),
            insert_before: "",
            insert_after: "\"]",
            preview: None,
        }
    );
    assert_eq!(c.current_value, None);
    assert!(!c.type_matches);
}

#[test]
fn partial_name_prefix_matches_excluding_exact() {
    let c = complete(r#"datasources["t"#, &store(), ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["temp", "tides", "total"]);

    let c = complete(r#"datasources["ti"#, &store(), ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["tides"]);

    // exact name offers nothing further
    let c = complete(r#"datasources["temp"#, &store(), ExpectedType::Any);
    assert!(c.suggestions.is_empty());

    // case sensitive
    let c = complete(r#"datasources["T"#, &store(), ExpectedType::Any);
    assert!(c.suggestions.is_empty());
}

#[test]
fn empty_closed_name_still_lists_everything() {
    let c = complete(r#"datasources[""]"#, &store(), ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["temp", "tides", "total"]);
}

#[test]
fn closed_name_lists_top_level_keys() {
    let c = complete(r#"datasources["temp"]"#, &store(), ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["c", "units"]);
    assert_eq!(
        c.suggestions[0],
        Suggestion {
            token: "c".to_string(),
            insert_before: "[\"",
            insert_after: "\"]",
            preview: None,
        }
    );
    assert!(c.type_matches);
    assert!(matches!(c.current_value, Some(Value::Object(_))));
}

#[test]
fn reopened_bracket_lists_keys_in_payload_order() {
    let c = complete(r#"datasources["temp"]["#, &store(), ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["c", "units"]);
}

#[test]
fn partial_key_filters_suggestions() {
    let c = complete(r#"datasources["temp"]["u"#, &store(), ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["units"]);
}

#[test]
fn deep_path_resolves_through_objects_and_arrays() {
    let c = complete(
        r#"datasources["tides"]["heights"]["#,
        &store(),
        ExpectedType::Any,
    );
    assert_eq!(tokens(&c), vec!["0", "1"]);
    assert_eq!(
        c.suggestions[0],
        Suggestion {
            token: "0".to_string(),
            insert_before: "[",
            insert_after: "]",
            preview: Some("1.2".to_string()),
        }
    );

    let c = complete(
        r#"datasources["tides"]["heights"][1]["#,
        &store(),
        ExpectedType::Any,
    );
    assert_eq!(tokens(&c), vec!["peak"]);
}

#[test]
fn expected_type_filters_leaves_but_not_composites() {
    // "station" is a string leaf; "heights" is an array and always passes
    let c = complete(r#"datasources["tides"]"#, &store(), ExpectedType::Number);
    assert_eq!(tokens(&c), vec!["heights"]);

    let c = complete(r#"datasources["tides"]"#, &store(), ExpectedType::String);
    assert_eq!(tokens(&c), vec!["heights", "station"]);
}

#[test]
fn type_matches_reflects_the_resolved_node() {
    let c = complete(
        r#"datasources["temp"]["c"]"#,
        &store(),
        ExpectedType::Number,
    );
    assert!(c.suggestions.is_empty());
    assert_eq!(c.current_value, Some(Value::Float(21.5)));
    assert!(c.type_matches);

    let c = complete(
        r#"datasources["temp"]["c"]"#,
        &store(),
        ExpectedType::String,
    );
    assert!(!c.type_matches);
}

#[test]
fn scalar_payload_has_no_children() {
    let c = complete(r#"datasources["total"]"#, &store(), ExpectedType::Any);
    assert!(c.suggestions.is_empty());
    assert_eq!(c.current_value, Some(Value::Int(42)));
}

#[test]
fn unknown_datasource_yields_validation_hint() {
    let c = complete(r#"datasources["nope"]"#, &store(), ExpectedType::Any);
    assert_eq!(c, Completion::default());
}

#[test]
fn unresolvable_path_yields_validation_hint() {
    let c = complete(
        r#"datasources["temp"]["missing"]["#,
        &store(),
        ExpectedType::Any,
    );
    assert_eq!(c, Completion::default());

    // index into an object
    let c = complete(r#"datasources["temp"][0]["#, &store(), ExpectedType::Any);
    assert_eq!(c, Completion::default());
}

#[test]
fn dotted_tail_matches_no_keys() {
    // the dotted segment falls into the partial token, which no key
    // starts with; the root still resolves
    let c = complete(
        r#"datasources["temp"].c["#,
        &store(),
        ExpectedType::Any,
    );
    assert!(c.suggestions.is_empty());
    assert!(matches!(c.current_value, Some(Value::Object(_))));
}

#[test]
fn garbage_segments_are_unresolvable() {
    let c = complete(
        r#"datasources["temp"].c["x"]["#,
        &store(),
        ExpectedType::Any,
    );
    assert_eq!(c, Completion::default());
}

#[test]
fn only_the_last_reference_counts() {
    let c = complete(
        r#"datasources["temp"]["c"] + datasources["ti"#,
        &store(),
        ExpectedType::Any,
    );
    assert_eq!(tokens(&c), vec!["tides"]);
}

#[test]
fn partial_index_filters_array_suggestions() {
    let mut store = SnapshotStore::new();
    store.update(
        "wide",
        Value::from_json_str(r#"[0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11]"#).unwrap(),
    );
    let c = complete(r#"datasources["wide"][1"#, &store, ExpectedType::Any);
    assert_eq!(tokens(&c), vec!["1", "10", "11"]);
}
