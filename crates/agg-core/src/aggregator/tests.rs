use agg_lang::AnyName;

use super::*;
use crate::eval::{EvalError, MapEnv};
use crate::event::Event;

fn form(json: &str) -> Form {
    serde_json::from_str(json).unwrap()
}

fn aggregator(json: &str) -> Aggregator {
    Aggregator::parse("test", &form(json), &AnyName).unwrap()
}

fn feed(agg: &mut Aggregator, events: &[Event]) {
    let mut stack = ArgStack::new();
    for event in events {
        let env = MapEnv::new().with_event(event.clone());
        agg.process_event(&env, &mut stack).unwrap();
    }
    assert!(stack.is_empty());
}

fn named(names: &[&str]) -> Vec<Event> {
    names.iter().map(|n| Event::named(n)).collect()
}

// ===========================================================================
// SelectIf
// ===========================================================================

#[test]
fn select_if_starts_null() {
    let agg = aggregator(r#"["select_if", true, 1]"#);
    assert_eq!(agg.current_value(), Value::Null);
}

#[test]
fn select_if_keeps_last_selected_value() {
    let mut agg = aggregator(
        r#"["select_if", ["=", "event.name", "platform_changed"], "event.platform"]"#,
    );
    feed(
        &mut agg,
        &[
            Event::named("platform_changed").with("platform", "Android"),
            Event::named("login"),
            Event::named("platform_changed").with("platform", "iOS"),
            Event::named("logout").with("platform", "ignored"),
        ],
    );
    assert_eq!(agg.current_value(), Value::from("iOS"));
}

#[test]
fn select_if_false_condition_never_selects() {
    let mut agg = aggregator(r#"["select_if", false, "event.name"]"#);
    feed(&mut agg, &named(&["a", "b", "c", "d", "e"]));
    assert_eq!(agg.current_value(), Value::Null);
}

#[test]
fn select_if_can_select_null() {
    let mut agg = aggregator(r#"["select_if", true, "event.missing"]"#);
    feed(&mut agg, &[Event::named("x").with("missing", "present")]);
    assert_eq!(agg.current_value(), Value::from("present"));
    feed(&mut agg, &named(&["y"]));
    assert_eq!(agg.current_value(), Value::Null);
}

// ===========================================================================
// Funnel
// ===========================================================================

const ABC_FUNNEL: &str = r#"["funnel",
    ["=", "event.name", "A"],
    ["=", "event.name", "B"],
    ["=", "event.name", "C"]]"#;

#[test]
fn funnel_advances_in_order() {
    let mut agg = aggregator(ABC_FUNNEL);
    feed(&mut agg, &named(&["A", "B", "C"]));
    assert_eq!(agg.current_value(), Value::Number(3.0));
}

#[test]
fn funnel_out_of_order_does_not_advance() {
    let mut agg = aggregator(ABC_FUNNEL);
    feed(&mut agg, &named(&["B"]));
    assert_eq!(agg.current_value(), Value::Number(0.0));
    feed(&mut agg, &named(&["C", "A", "C", "B"]));
    assert_eq!(agg.current_value(), Value::Number(2.0));
}

#[test]
fn funnel_counter_keeps_growing_past_one_pass() {
    let mut agg = aggregator(ABC_FUNNEL);
    feed(&mut agg, &named(&["A", "B", "C", "A", "B"]));
    // Raw counter; two full passes would read 6.
    assert_eq!(agg.current_value(), Value::Number(5.0));
}

// ===========================================================================
// StateMachine
// ===========================================================================

#[test]
fn state_machine_terminal_state_absorbs_events() {
    let mut agg = aggregator(r#"["state_machine", ["if", ["=", "event.name", "A"], 1, 0]]"#);
    feed(&mut agg, &named(&["B"]));
    assert_eq!(agg.current_value(), Value::Number(0.0));
    feed(&mut agg, &named(&["A"]));
    assert_eq!(agg.current_value(), Value::Number(1.0));
    feed(&mut agg, &named(&["A", "B", "A"]));
    assert_eq!(agg.current_value(), Value::Number(1.0));
}

#[test]
fn state_machine_walks_signup_flow() {
    let mut agg = aggregator(
        r#"["state_machine",
            ["if", ["=", "event.name", "swipe_to_login"], 1, 0],
            ["if", ["and", ["=", "event.name", "login_complete"], "event.was_signup"], 2, 1],
            ["if", ["=", "event.name", "postlogin_settings_complete"], 3, 2]]"#,
    );
    feed(
        &mut agg,
        &[
            Event::named("swipe_to_login"),
            Event::named("login_complete").with("was_signup", false),
            Event::named("login_complete").with("was_signup", true),
            Event::named("postlogin_settings_complete"),
        ],
    );
    assert_eq!(agg.current_value(), Value::Number(3.0));
}

#[test]
fn state_machine_accepts_negative_state() {
    let mut agg = aggregator(r#"["state_machine", -1, 0]"#);
    feed(&mut agg, &named(&["x", "y"]));
    assert_eq!(agg.current_value(), Value::Number(-1.0));
}

#[test]
fn state_machine_ignores_non_numeric_transition() {
    let mut agg = aggregator(r#"["state_machine", ["if", ["=", "event.name", "go"], 1, "stay"], 0]"#);
    feed(&mut agg, &named(&["wait"]));
    assert_eq!(agg.current_value(), Value::Number(0.0));
    feed(&mut agg, &named(&["go"]));
    assert_eq!(agg.current_value(), Value::Number(1.0));
}

#[test]
fn numeric_errors_propagate_from_process_event() {
    let mut agg = aggregator(r#"["select_if", [">", "event.age", 18], "event.name"]"#);
    let env = MapEnv::new().with_event(Event::named("no_age"));
    let mut stack = ArgStack::new();
    let err = agg.process_event(&env, &mut stack).unwrap_err();
    assert!(matches!(err, EvalError::NotANumber { .. }));
    assert_eq!(agg.current_value(), Value::Null);
}

// ===========================================================================
// State management
// ===========================================================================

#[test]
fn reset_returns_to_initial_state() {
    let mut agg = aggregator(ABC_FUNNEL);
    feed(&mut agg, &named(&["A", "B"]));
    agg.reset();
    assert_eq!(agg.save_state(), AggregatorState::Funnel(0));
}

#[test]
fn save_and_restore_state() {
    let mut agg = aggregator(ABC_FUNNEL);
    feed(&mut agg, &named(&["A"]));
    let saved = agg.save_state();
    feed(&mut agg, &named(&["B", "C"]));
    assert!(agg.restore_state(saved));
    assert_eq!(agg.current_value(), Value::Number(1.0));
}

#[test]
fn restoring_foreign_state_kind_resets() {
    let mut agg = aggregator(ABC_FUNNEL);
    feed(&mut agg, &named(&["A"]));
    assert!(!agg.restore_state(AggregatorState::SelectIf(Value::from("x"))));
    assert_eq!(agg.current_value(), Value::Number(0.0));
}

#[test]
fn transition_does_not_mutate() {
    let agg = aggregator(ABC_FUNNEL);
    let env = MapEnv::new().with_event(Event::named("A"));
    let mut stack = ArgStack::new();
    let next = agg.transition(&env, &mut stack).unwrap();
    assert_eq!(next, Some(AggregatorState::Funnel(1)));
    assert_eq!(agg.current_value(), Value::Number(0.0));
}

#[test]
fn state_serialises_with_kind_tag() {
    let json = serde_json::to_string(&AggregatorState::Funnel(3)).unwrap();
    assert_eq!(json, r#"{"kind":"funnel","state":3}"#);
    let back: AggregatorState = serde_json::from_str(&json).unwrap();
    assert_eq!(back, AggregatorState::Funnel(3));
}
