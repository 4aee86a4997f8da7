#![forbid(unsafe_code)]

//! Integration tests: mounting, two-way binding, teardown and boot.
//!
//! Run `BLESS=1 cargo test --package kview-harness` to create/update snapshots.

use kview_harness::models::{Calculator, Launcher, define_views};
use kview_harness::{Fixture, assert_snapshot, outline_digest};
use kview_reactive::Value;
use kview_widgets::ViewError;

fn calculator() -> (Fixture, std::rc::Rc<Calculator>) {
    let fixture = Fixture::new();
    define_views(fixture.runtime());
    let model = Calculator::new(1.0, 2.0);
    (fixture, model)
}

// ============================================================================
// Calculator
// ============================================================================

#[test]
fn snapshot_calculator_initial() {
    let (fixture, model) = calculator();
    let _handle = fixture.mount(&model).unwrap();
    assert_snapshot!("calculator", &fixture.app());
}

#[test]
fn snapshot_calculator_after_input() {
    let (fixture, model) = calculator();
    let _handle = fixture.mount(&model).unwrap();
    fixture.find("input").input_text("10");
    assert_eq!(model.state.get("a"), Value::from(10));
    assert_eq!(model.state.get("sum"), Value::from(12));
    assert_snapshot!("calculator_after_input", &fixture.app());
}

#[test]
fn model_writes_reach_the_controls() {
    let (fixture, model) = calculator();
    let _handle = fixture.mount(&model).unwrap();
    model.state.set("b", 40).unwrap();
    model.recompute();
    let inputs = fixture.app().query_selector_all("input");
    assert_eq!(inputs[1].value(), "40");
    assert_eq!(fixture.find("#sum").text(), "41");
}

#[test]
fn cleared_number_input_writes_zero() {
    let (fixture, model) = calculator();
    let _handle = fixture.mount(&model).unwrap();
    fixture.find("input").input_text("");
    assert_eq!(model.state.get("a"), Value::from(0));
    assert_eq!(fixture.find("#sum").text(), "2");
}

// ============================================================================
// Teardown
// ============================================================================

#[test]
fn stop_releases_fields_and_listeners() {
    let (fixture, model) = calculator();
    let handle = fixture.mount(&model).unwrap();
    assert!(handle.binding_count() > 0);

    handle.stop();
    assert!(handle.is_stopped());
    assert!(handle.observer().observed_fields().is_empty());
    assert!(!model.state.descriptor("a").unwrap().is_accessor());
    for input in fixture.app().query_selector_all("input") {
        assert_eq!(input.listener_count(), 0);
    }

    // A stopped view no longer follows the model.
    model.state.set("sum", 99).unwrap();
    assert_eq!(fixture.find("#sum").text(), "3");
}

#[test]
fn double_stop_is_harmless() {
    let (fixture, model) = calculator();
    let handle = fixture.mount(&model).unwrap();
    handle.stop();
    handle.stop();
    assert!(handle.is_stopped());
    assert_eq!(handle.binding_count(), 0);
}

#[test]
fn remount_replaces_the_previous_root() {
    let (fixture, model) = calculator();
    let first = fixture.mount(&model).unwrap();
    let before = outline_digest(&fixture.app());
    let second = fixture.mount(&model).unwrap();

    assert!(first.is_stopped());
    assert!(!second.is_stopped());
    assert_eq!(outline_digest(&fixture.app()), before);
    assert_eq!(fixture.app().query_selector_all("#calc").len(), 1);
    assert!(fixture.runtime().unmount(&fixture.app()));
    assert!(second.is_stopped());
    assert!(!fixture.runtime().unmount(&fixture.app()));
}

#[test]
fn unknown_model_type_is_reported() {
    let fixture = Fixture::new();
    let err = fixture.mount(&Calculator::new(0.0, 0.0)).unwrap_err();
    assert!(matches!(err, ViewError::NoViewRegistered(_)));
    assert_eq!(fixture.app().child_count(), 0);
}

// ============================================================================
// Boot
// ============================================================================

#[test]
fn boot_swaps_the_whole_container() {
    let fixture = Fixture::new();
    define_views(fixture.runtime());
    let launcher = Launcher::new();
    let handle = fixture.mount(&launcher).unwrap();
    assert_eq!(fixture.find("#title").text(), "Launcher");

    fixture.find("#boot").click();
    assert!(handle.is_stopped());
    assert!(fixture.app().query_selector("#title").is_none());
    assert_eq!(fixture.find("#sum").text(), "0");

    let booted = fixture.runtime().root_handle(&fixture.app()).unwrap();
    assert!(booted.view_name().ends_with("Calculator"));
}

#[test]
fn booted_view_stays_interactive() {
    let fixture = Fixture::new();
    define_views(fixture.runtime());
    let launcher = Launcher::new();
    let _handle = fixture.mount(&launcher).unwrap();
    fixture.find("#boot").click();

    let inputs = fixture.app().query_selector_all("input");
    inputs[0].input_text("5");
    assert_eq!(fixture.find("#sum").text(), "5");
    inputs[1].input_text("3");
    assert_eq!(fixture.find("#sum").text(), "8");

    let booted = fixture.runtime().root_handle(&fixture.app()).unwrap();
    let calculator = booted.model().unwrap().downcast::<Calculator>().unwrap();
    assert_eq!(calculator.state.get("sum"), Value::from(8));
    drop(calculator);

    assert!(fixture.runtime().unmount(&fixture.app()));
    assert!(booted.model().is_none());
}
