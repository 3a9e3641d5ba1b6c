#![allow(clippy::unwrap_used, reason = "Tests can panic")]

use crate::{BufferSink, DependencyIndex, Engine, Notification, NullSink, OwnerId, SettingId, ValueSink};
use calc_ir::{ExpectedType, Value};
use pretty_assertions::assert_eq;
use std::collections::BTreeSet;

fn json(text: &str) -> Value {
    Value::from_json_str(text).unwrap()
}

fn names(deps: &[&str]) -> BTreeSet<String> {
    deps.iter().map(|s| (*s).to_string()).collect()
}

// Dependency index

#[test]
fn register_is_idempotent() {
    let mut index = DependencyIndex::new();
    let id = SettingId::from_raw(0, 0);

    index.register(id, names(&["a", "b"]));
    index.register(id, names(&["a", "b"]));

    assert_eq!(index.dependents_snapshot("a"), vec![id]);
    assert_eq!(index.dependents_snapshot("b"), vec![id]);
    assert_eq!(index.bucket_count(), 2);
}

#[test]
fn reregistration_replaces_old_buckets() {
    let mut index = DependencyIndex::new();
    let id = SettingId::from_raw(0, 0);

    index.register(id, names(&["a", "b"]));
    index.register(id, names(&["b", "c"]));

    assert!(index.dependents_snapshot("a").is_empty());
    assert_eq!(index.dependents_snapshot("b"), vec![id]);
    assert_eq!(index.dependents_snapshot("c"), vec![id]);
}

#[test]
fn unregister_restores_prior_state() {
    let mut index = DependencyIndex::new();
    let stayer = SettingId::from_raw(0, 0);
    let goer = SettingId::from_raw(1, 0);

    index.register(stayer, names(&["a"]));
    index.register(goer, names(&["a", "b"]));
    index.unregister(goer);

    assert_eq!(index.dependents_snapshot("a"), vec![stayer]);
    // the "b" bucket emptied and was dropped
    assert_eq!(index.bucket_count(), 1);
    assert_eq!(index.dependencies_of(goer), None);
}

#[test]
fn unregister_unknown_setting_is_a_noop() {
    let mut index = DependencyIndex::new();
    index.unregister(SettingId::from_raw(7, 3));
    assert!(index.is_empty());
}

#[test]
fn empty_dependency_set_registers_nothing() {
    let mut index = DependencyIndex::new();
    index.register(SettingId::from_raw(0, 0), BTreeSet::new());
    assert!(index.is_empty());
}

// Engine scenarios

const WIDGET: OwnerId = OwnerId(1);

#[test]
fn update_triggers_recompute_and_notification() {
    let mut engine = Engine::new();
    let mut sink = BufferSink::new();

    engine.update_datasource("temp", json(r#"{"c": 21.5}"#), &mut sink);
    engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["temp"]["c"]"#,
        ExpectedType::Number,
        &mut sink,
    );
    assert_eq!(sink.values(), vec![&Value::Float(21.5)]);

    engine.update_datasource("temp", json(r#"{"c": 22.0}"#), &mut sink);
    assert_eq!(
        sink.values(),
        vec![&Value::Float(21.5), &Value::Float(22.0)]
    );
    assert_eq!(
        engine.last_good(WIDGET, "value"),
        Some(&Value::Float(22.0))
    );
}

#[test]
fn literal_setting_never_recomputes() {
    let mut engine = Engine::new();
    let mut sink = BufferSink::new();

    engine.upsert_setting(WIDGET, "title", "Hello", ExpectedType::String, &mut sink);
    assert_eq!(sink.values(), vec![&Value::string("Hello")]);
    assert!(engine.index().is_empty());

    engine.update_datasource("temp", json(r#"{"c": 1}"#), &mut sink);
    assert_eq!(sink.notifications.len(), 1);
}

#[test]
fn unchanged_value_is_not_renotified() {
    let mut engine = Engine::new();
    let mut sink = BufferSink::new();

    engine.update_datasource("temp", json(r#"{"c": 21.5}"#), &mut sink);
    engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["temp"]["c"]"#,
        ExpectedType::Number,
        &mut sink,
    );
    engine.update_datasource("temp", json(r#"{"c": 21.5, "other": 1}"#), &mut sink);
    assert_eq!(sink.notifications.len(), 1);
}

#[test]
fn failed_evaluation_retains_last_good() {
    let mut engine = Engine::new();
    let mut sink = BufferSink::new();

    engine.update_datasource("temp", json(r#"{"c": 21.5}"#), &mut sink);
    engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["temp"]["c"]["oops"]"#,
        ExpectedType::Number,
        &mut sink,
    );
    // indexing into a number fails; nothing delivered, nothing stored
    assert!(sink.notifications.is_empty());
    assert_eq!(engine.last_good(WIDGET, "value"), None);

    // now a good expression, then break it again with new data
    engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["temp"]["c"]"#,
        ExpectedType::Number,
        &mut sink,
    );
    assert_eq!(engine.last_good(WIDGET, "value"), Some(&Value::Float(21.5)));

    engine.update_datasource("temp", json(r#"{}"#), &mut sink);
    // evaluation now yields undefined; last good survives, no flicker
    assert_eq!(engine.last_good(WIDGET, "value"), Some(&Value::Float(21.5)));
    assert_eq!(sink.notifications.len(), 1);
}

#[test]
fn upsert_rewires_dependencies() {
    let mut engine = Engine::new();
    let mut sink = NullSink;

    engine.update_datasource("a", json("1"), &mut sink);
    engine.update_datasource("b", json("2"), &mut sink);

    let id = engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["a"]"#,
        ExpectedType::Any,
        &mut sink,
    );
    assert_eq!(engine.index().dependents_snapshot("a"), vec![id]);

    let id2 = engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["b"]"#,
        ExpectedType::Any,
        &mut sink,
    );
    assert_eq!(id, id2);
    assert!(engine.index().dependents_snapshot("a").is_empty());
    assert_eq!(engine.index().dependents_snapshot("b"), vec![id]);
}

#[test]
fn remove_owner_clears_settings_and_index() {
    let mut engine = Engine::new();
    let mut sink = NullSink;

    engine.upsert_setting(WIDGET, "x", r#"datasources["a"]"#, ExpectedType::Any, &mut sink);
    engine.upsert_setting(WIDGET, "y", r#"datasources["b"]"#, ExpectedType::Any, &mut sink);
    engine.upsert_setting(OwnerId(2), "z", r#"datasources["a"]"#, ExpectedType::Any, &mut sink);

    assert_eq!(engine.remove_owner(WIDGET), 2);
    assert_eq!(engine.setting_count(), 1);
    assert_eq!(engine.index().dependents_snapshot("a").len(), 1);
    assert!(engine.index().dependents_snapshot("b").is_empty());
}

#[test]
fn snapshot_revisions_are_monotonic() {
    let mut engine = Engine::new();
    let mut sink = NullSink;

    engine.update_datasource("temp", json("1"), &mut sink);
    engine.update_datasource("temp", json("2"), &mut sink);
    engine.update_datasource("temp", json("3"), &mut sink);
    assert_eq!(engine.snapshot().revision("temp"), Some(3));
    assert_eq!(engine.snapshot().revision("other"), None);
}

#[test]
fn remove_datasource_leaves_dependents_on_last_good() {
    let mut engine = Engine::new();
    let mut sink = BufferSink::new();

    engine.update_datasource("temp", json(r#"{"c": 21.5}"#), &mut sink);
    engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["temp"]["c"]"#,
        ExpectedType::Number,
        &mut sink,
    );
    assert!(engine.remove_datasource("temp", &mut sink));
    // reference now dereferences an absent value: error, value retained
    assert_eq!(engine.last_good(WIDGET, "value"), Some(&Value::Float(21.5)));
    assert_eq!(sink.notifications.len(), 1);
    assert!(!engine.remove_datasource("temp", &mut sink));
}

#[test]
fn type_match_hint() {
    let mut engine = Engine::new();
    let mut sink = NullSink;

    engine.update_datasource("temp", json(r#"{"c": 21.5}"#), &mut sink);
    engine.upsert_setting(
        WIDGET,
        "value",
        r#"datasources["temp"]["c"]"#,
        ExpectedType::Number,
        &mut sink,
    );
    engine.upsert_setting(WIDGET, "title", "Hello", ExpectedType::Number, &mut sink);

    assert!(engine.is_type_match(WIDGET, "value"));
    // "Hello" evaluates to a string but a number was expected
    assert!(!engine.is_type_match(WIDGET, "title"));
    assert_eq!(engine.expected_type(WIDGET, "title"), Some(ExpectedType::Number));
    assert!(!engine.is_type_match(WIDGET, "missing"));
}

// Re-entrant deletion from a sink callback

struct DeletingSink {
    notifications: Vec<Notification>,
    delete_on_first: Option<(OwnerId, String)>,
}

impl ValueSink for DeletingSink {
    fn value_changed(
        &mut self,
        engine: &mut Engine,
        owner: OwnerId,
        setting_name: &str,
        value: &Value,
    ) {
        self.notifications.push(Notification {
            owner,
            setting_name: setting_name.to_string(),
            value: value.clone(),
        });
        if let Some((o, n)) = self.delete_on_first.take() {
            engine.remove_setting(o, &n);
        }
    }
}

#[test]
fn callback_deletes_a_pending_dependent() {
    let mut engine = Engine::new();
    let mut sink = DeletingSink {
        notifications: Vec::new(),
        // the first notification deletes the second dependent
        delete_on_first: Some((WIDGET, "second".to_string())),
    };

    let mut quiet = NullSink;
    engine.upsert_setting(WIDGET, "first", r#"datasources["d"]"#, ExpectedType::Any, &mut quiet);
    engine.upsert_setting(WIDGET, "second", r#"datasources["d"]"#, ExpectedType::Any, &mut quiet);
    engine.upsert_setting(WIDGET, "third", r#"datasources["d"]"#, ExpectedType::Any, &mut quiet);

    engine.update_datasource("d", json("7"), &mut sink);

    let notified: Vec<&str> = sink
        .notifications
        .iter()
        .map(|n| n.setting_name.as_str())
        .collect();
    // the deleted setting was skipped; the rest of the fan-out survived
    assert_eq!(notified, vec!["first", "third"]);
    assert_eq!(engine.setting_count(), 2);
}

#[test]
fn callback_can_rewrite_a_setting_mid_fanout() {
    struct RewritingSink {
        rewritten: bool,
    }
    impl ValueSink for RewritingSink {
        fn value_changed(
            &mut self,
            engine: &mut Engine,
            _owner: OwnerId,
            setting_name: &str,
            _value: &Value,
        ) {
            if setting_name == "first" && !self.rewritten {
                self.rewritten = true;
                let mut quiet = NullSink;
                engine.upsert_setting(
                    WIDGET,
                    "second",
                    r#"datasources["other"]"#,
                    ExpectedType::Any,
                    &mut quiet,
                );
            }
        }
    }

    let mut engine = Engine::new();
    let mut quiet = NullSink;
    engine.upsert_setting(WIDGET, "first", r#"datasources["d"]"#, ExpectedType::Any, &mut quiet);
    engine.upsert_setting(WIDGET, "second", r#"datasources["d"]"#, ExpectedType::Any, &mut quiet);

    let mut sink = RewritingSink { rewritten: false };
    engine.update_datasource("d", json("1"), &mut sink);

    // the rewrite moved "second" onto a different datasource
    assert!(engine.index().dependents_snapshot("other").len() == 1);
    assert_eq!(engine.index().dependents_snapshot("d").len(), 1);
}
