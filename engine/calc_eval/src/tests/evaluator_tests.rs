//! End-to-end evaluation tests: compile then evaluate against a snapshot.

use crate::{evaluate, evaluate_setting, is_bare_word};
use calc_ir::Value;
use calc_parse::compile;
use indexmap::IndexMap;
use pretty_assertions::assert_eq;

fn snapshot(entries: &[(&str, &str)]) -> IndexMap<String, Value> {
    entries
        .iter()
        .map(|(name, json)| ((*name).to_string(), Value::from_json_str(json).unwrap()))
        .collect()
}

fn eval(text: &str, datasources: &IndexMap<String, Value>) -> crate::EvalResult {
    evaluate_setting(&compile(text), text, datasources)
}

#[test]
fn reads_nested_datasource_value() {
    let ds = snapshot(&[("temp", r#"{"c": 21.5}"#)]);
    assert_eq!(eval(r#"datasources["temp"]["c"]"#, &ds).unwrap(), Value::Float(21.5));
    assert_eq!(eval("datasources.temp.c", &ds).unwrap(), Value::Float(21.5));
}

#[test]
fn arithmetic_over_datasources() {
    let ds = snapshot(&[("temp", r#"{"c": 20}"#)]);
    assert_eq!(
        eval(r#"datasources["temp"]["c"] * 9 / 5 + 32"#, &ds).unwrap(),
        Value::Int(68)
    );
}

#[test]
fn bare_word_recovers_as_literal() {
    let ds = snapshot(&[]);
    // unbound-reference failure on a bare word
    assert_eq!(eval("foo123", &ds).unwrap(), Value::string("foo123"));
    assert_eq!(eval("Hello", &ds).unwrap(), Value::string("Hello"));
}

#[test]
fn recovery_stays_narrow() {
    let ds = snapshot(&[]);
    // Unbound references inside larger expressions do not recover
    assert!(eval("foo + 1", &ds).is_err());
    assert!(eval("foo.bar", &ds).is_err());
}

#[test]
fn uncompilable_text_evaluates_to_itself() {
    let ds = snapshot(&[]);
    assert_eq!(
        eval("Hello world", &ds).unwrap(),
        Value::string("Hello world")
    );
}

#[test]
fn absent_datasource_is_undefined() {
    let ds = snapshot(&[]);
    assert_eq!(eval(r#"datasources["nope"]"#, &ds).unwrap(), Value::Undefined);
}

#[test]
fn member_of_absent_datasource_errors() {
    let ds = snapshot(&[]);
    assert!(eval(r#"datasources["nope"]["c"]"#, &ds).is_err());
    assert!(eval("datasources.nope.c", &ds).is_err());
}

#[test]
fn missing_key_is_undefined_but_deeper_access_errors() {
    let ds = snapshot(&[("temp", r#"{"c": 21.5}"#)]);
    assert_eq!(eval(r#"datasources["temp"]["f"]"#, &ds).unwrap(), Value::Undefined);
    assert!(eval(r#"datasources["temp"]["f"]["x"]"#, &ds).is_err());
}

#[test]
fn array_indexing() {
    let ds = snapshot(&[("list", r#"{"items": [10, 20, 30]}"#)]);
    assert_eq!(eval(r#"datasources["list"]["items"][1]"#, &ds).unwrap(), Value::Int(20));
    assert_eq!(
        eval(r#"datasources["list"]["items"][9]"#, &ds).unwrap(),
        Value::Undefined
    );
    assert_eq!(
        eval(r#"datasources["list"]["items"].length"#, &ds).unwrap(),
        Value::Int(3)
    );
}

#[test]
fn string_indexing_yields_single_char() {
    let ds = snapshot(&[("s", r#"{"word": "abc"}"#)]);
    assert_eq!(
        eval(r#"datasources["s"]["word"][1]"#, &ds).unwrap(),
        Value::string("b")
    );
}

#[test]
fn indexing_scalar_errors() {
    let ds = snapshot(&[("n", r#"{"x": 5}"#)]);
    assert!(eval(r#"datasources["n"]["x"][0]"#, &ds).is_err());
}

#[test]
fn ternary_and_short_circuit() {
    let ds = snapshot(&[("t", r#"{"on": true}"#)]);
    assert_eq!(
        eval(r#"datasources["t"]["on"] ? "yes" : "no""#, &ds).unwrap(),
        Value::string("yes")
    );
    // rhs would error if evaluated; && short-circuits first
    assert_eq!(
        eval(r#"false && datasources["missing"]["x"] == 1"#, &ds).unwrap(),
        Value::Bool(false)
    );
}

#[test]
fn non_boolean_condition_errors() {
    let ds = snapshot(&[("t", r#"{"n": 1}"#)]);
    assert!(eval(r#"datasources["t"]["n"] ? 1 : 2"#, &ds).is_err());
}

#[test]
fn array_literal_evaluates_elementwise() {
    let ds = snapshot(&[("a", r#"{"x": 1}"#)]);
    assert_eq!(
        eval(r#"[datasources["a"]["x"], 2, "three"]"#, &ds).unwrap(),
        Value::array(vec![Value::Int(1), Value::Int(2), Value::string("three")])
    );
}

#[test]
fn number_literals_pass_through() {
    let ds = snapshot(&[]);
    assert_eq!(eval("21.5", &ds).unwrap(), Value::Float(21.5));
    assert_eq!(eval("42", &ds).unwrap(), Value::Int(42));
    assert_eq!(eval("return 42;", &ds).unwrap(), Value::Int(42));
}

#[test]
fn bare_word_predicate() {
    assert!(is_bare_word("foo123"));
    assert!(is_bare_word("_x"));
    assert!(!is_bare_word(""));
    assert!(!is_bare_word("two words"));
    assert!(!is_bare_word("a-b"));
}

#[test]
fn plain_evaluate_does_not_recover() {
    let ds = snapshot(&[]);
    assert!(evaluate(&compile("foo123"), &ds).is_err());
}
