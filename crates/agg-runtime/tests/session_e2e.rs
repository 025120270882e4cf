use std::io::BufReader;

use agg_config::EngineConfig;
use agg_core::Event;
use agg_lang::{Form, Specification, Value};
use agg_runtime::{ReplayReport, Session};

const SPEC: &str = r#"{
    "variables": { "adult_age": 18 },
    "functions": {
        "is_adult": [">=", "arg.0", "var.adult_age"]
    },
    "aggregators": {
        "platform": ["select_if", ["=", "event.name", "platform_changed"], "event.platform"],
        "signup_funnel": ["funnel",
            ["=", "event.name", "install"],
            ["=", "event.name", "signup"],
            ["=", "event.name", "purchase"]],
        "adult": ["select_if", ["=", "event.name", "signup"], ["func.is_adult", "event.age"]]
    }
}"#;

const EVENTS: &str = r#"{"name":"install","time":1}
{"name":"platform_changed","platform":"Android","time":2}

{"name":"signup","age":"21","time":3}
not json at all
{"name":"signup","age":"unknown","time":4}
{"name":"platform_changed","platform":"iOS","time":5}
{"name":"purchase","amount":9.99,"time":6}
"#;

fn session() -> Session {
    let mut session = Session::new(&EngineConfig::default());
    session
        .apply_spec(&SPEC.parse::<Specification>().unwrap())
        .unwrap();
    session
}

#[test]
fn replay_counts_events_and_errors() {
    let mut session = session();
    let report = session
        .replay_reader(BufReader::new(EVENTS.as_bytes()))
        .unwrap();

    // Six parsed events; one malformed line and one failed evaluation.
    assert_eq!(
        report,
        ReplayReport {
            event_count: 6,
            error_count: 2,
        }
    );
    assert_eq!(session.context().event_count(), 6);

    let values = session.current_values();
    assert_eq!(values.get("platform"), Some(&Value::from("iOS")));
    assert_eq!(values.get("signup_funnel"), Some(&Value::Number(3.0)));
    assert_eq!(values.get("adult"), Some(&Value::Bool(true)));
}

#[test]
fn spec_and_events_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let spec_path = dir.path().join("spec.json");
    let events_path = dir.path().join("events.jsonl");
    std::fs::write(&spec_path, SPEC).unwrap();
    std::fs::write(&events_path, EVENTS).unwrap();

    let mut session = Session::new(&EngineConfig::default());
    let update = session.load_spec(&spec_path).unwrap();
    assert_eq!(update.changed.len(), 3);

    let report = session.replay_file(&events_path).unwrap();
    assert_eq!(report.event_count, 6);
}

#[test]
fn missing_spec_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let mut session = Session::new(&EngineConfig::default());
    assert!(session.load_spec(&dir.path().join("absent.json")).is_err());

    let bad = dir.path().join("bad.json");
    std::fs::write(&bad, "{ not json").unwrap();
    assert!(session.load_spec(&bad).is_err());
}

#[test]
fn snapshot_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot_path = dir.path().join("snapshot.json");

    let mut first = session();
    first
        .replay_reader(BufReader::new(EVENTS.as_bytes()))
        .unwrap();
    first.save_snapshot(&snapshot_path).unwrap();

    let mut second = session();
    assert_eq!(second.load_snapshot(&snapshot_path).unwrap(), 3);
    assert_eq!(second.context().event_count(), 0);
    assert_eq!(second.current_values(), first.current_values());
}

#[test]
fn corrupt_snapshot_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("snapshot.json");
    std::fs::write(&path, r#"{"platform": {"kind": "histogram", "state": 1}}"#).unwrap();

    let mut session = session();
    assert!(session.load_snapshot(&path).is_err());
}

#[test]
fn catalog_rejects_undeclared_property_references() {
    let config: EngineConfig = r#"
[catalog]
props = { platform = "string", age = "number" }
events = { install = [], signup = ["age"], platform_changed = ["platform"], purchase = [] }
"#
    .parse()
    .unwrap();

    let mut session = Session::new(&config);
    let spec: Specification = r#"{
        "aggregators": {
            "platform": ["select_if", true, "event.platform"],
            "typo": ["select_if", true, "event.platfrom"]
        }
    }"#
    .parse()
    .unwrap();
    let update = session.apply_spec(&spec).unwrap();
    assert_eq!(update.changed, vec!["platform".to_string()]);
    assert_eq!(update.rejected.len(), 1);

    // Unknown event names are tracked anyway.
    session.track(Event::named("refund")).unwrap();
    assert_eq!(session.context().event_count(), 1);
}

#[test]
fn configured_call_depth_bounds_recursion() {
    let config: EngineConfig = "[engine]\nmax_call_depth = 8\n".parse().unwrap();
    let mut session = Session::new(&config);
    let spec: Specification = r#"{
        "functions": {
            "count_down": ["if", ["<=", "arg.0", 0], 0, ["func.count_down", ["-", "arg.0", 1]]]
        }
    }"#
    .parse()
    .unwrap();
    session.apply_spec(&spec).unwrap();

    let shallow: Form = serde_json::from_str(r#"["func.count_down", 5]"#).unwrap();
    assert_eq!(session.eval_form(&shallow).unwrap(), Value::Number(0.0));
    let deep: Form = serde_json::from_str(r#"["func.count_down", 50]"#).unwrap();
    assert!(session.eval_form(&deep).is_err());
}
