#![forbid(unsafe_code)]

//! Integration tests: the observer protocol against plain state objects.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use kview_reactive::{
    BindingScope, FieldDescriptor, ObserveError, Observer, ObserverRegistry, State, Value,
};
use proptest::prelude::*;
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

fn recorder() -> (Rc<RefCell<Vec<(Value, Value)>>>, impl Fn(&Value, &Value) + 'static) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let log = Rc::clone(&seen);
    (seen, move |new: &Value, old: &Value| {
        log.borrow_mut().push((new.clone(), old.clone()));
    })
}

// ============================================================================
// Notification
// ============================================================================

#[test]
fn assignment_notifies_with_new_and_old_value() {
    let state = State::new().with("count", 1);
    let observer = Observer::new(&state);
    let (seen, handler) = recorder();
    let _sub = observer.observe("count", handler).unwrap();

    state.set("count", 2).unwrap();
    state.set("count", 2).unwrap();
    state.set("count", "2").unwrap();

    assert_eq!(
        *seen.borrow(),
        [
            (Value::from(2), Value::from(1)),
            (Value::from("2"), Value::from(2)),
        ]
    );
}

#[test]
fn silent_writes_skip_handlers_but_land_in_the_state() {
    let state = State::new().with("name", "a");
    let observer = Observer::new(&state);
    let (seen, handler) = recorder();
    let _sub = observer.observe("name", handler).unwrap();

    observer.write_silently("name", "b").unwrap();
    assert_eq!(state.get("name"), Value::from("b"));
    assert!(seen.borrow().is_empty());

    state.set("name", "c").unwrap();
    assert_eq!(*seen.borrow(), [(Value::from("c"), Value::from("b"))]);
}

#[test]
fn unobserving_the_last_handler_restores_a_plain_field() {
    let state = State::new().with("x", 1);
    let observer = Observer::new(&state);
    let sub = observer.observe("x", |_: &Value, _: &Value| {}).unwrap();
    state.set("x", 5).unwrap();
    assert!(sub.unsubscribe());

    assert!(!observer.is_observed("x"));
    assert_eq!(state.get("x"), Value::from(5));
    let descriptor = state.descriptor("x").unwrap();
    assert!(!descriptor.is_accessor());

    // Re-observing instruments again from the current value.
    let (seen, handler) = recorder();
    let _sub = observer.observe("x", handler).unwrap();
    state.set("x", 6).unwrap();
    assert_eq!(*seen.borrow(), [(Value::from(6), Value::from(5))]);
}

#[test]
fn accessor_setter_receives_the_value_on_restore() {
    let backing = Rc::new(RefCell::new(Value::from(10)));
    let read = Rc::clone(&backing);
    let write = Rc::clone(&backing);
    let state = State::new().with_field(
        "level",
        FieldDescriptor::getter(move || read.borrow().clone())
            .with_setter(move |v| *write.borrow_mut() = v),
    );
    let observer = Observer::new(&state);
    let (seen, handler) = recorder();
    let sub = observer.observe("level", handler).unwrap();

    state.set("level", 11).unwrap();
    // Instrumented reads and writes go through the observer's storage.
    assert_eq!(state.get("level"), Value::from(11));
    assert_eq!(*backing.borrow(), Value::from(10));
    assert_eq!(*seen.borrow(), [(Value::from(11), Value::from(10))]);

    drop(sub);
    assert!(state.descriptor("level").unwrap().is_accessor());
    assert_eq!(*backing.borrow(), Value::from(11));
    state.set("level", 12).unwrap();
    assert_eq!(*backing.borrow(), Value::from(12));
}

#[test]
fn non_configurable_fields_are_rejected() {
    let state = State::new().with_field("id", FieldDescriptor::data(7).non_configurable());
    let observer = Observer::new(&state);
    let err = observer.observe("id", |_: &Value, _: &Value| {}).unwrap_err();
    assert_eq!(err, ObserveError::NonConfigurable { field: "id".into() });
}

// ============================================================================
// Registry and scopes
// ============================================================================

#[test]
fn registry_shares_one_observer_per_state() {
    let registry = ObserverRegistry::new();
    let a = State::new().with("v", 1);
    let b = State::new().with("v", 1);
    assert_eq!(registry.get_or_create(&a), registry.get_or_create(&a));
    assert_ne!(registry.get_or_create(&a), registry.get_or_create(&b));
    assert_eq!(registry.len(), 2);

    drop(b);
    assert_eq!(registry.prune(), 1);
    assert!(registry.forget(&a));
    assert!(!registry.has(&a));
}

#[test]
fn binding_scope_releases_everything_on_clear() {
    let state = State::new().with("a", 1).with("b", 2);
    let observer = Observer::new(&state);
    let mut scope = BindingScope::new();
    scope.observe(&observer, "a", |_: &Value, _: &Value| {}).unwrap();
    scope.observe(&observer, "b", |_: &Value, _: &Value| {}).unwrap();
    assert_eq!(scope.binding_count(), 2);

    scope.clear();
    assert!(scope.is_empty());
    assert!(observer.observed_fields().is_empty());
}

// ============================================================================
// Containment
// ============================================================================

/// Counts `warn` events.
struct Warnings(Arc<AtomicUsize>);

impl<S: tracing::Subscriber> Layer<S> for Warnings {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: Context<'_, S>) {
        if *event.metadata().level() == tracing::Level::WARN {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[test]
fn panicking_handler_is_logged_and_the_rest_still_run() {
    let warnings = Arc::new(AtomicUsize::new(0));
    let subscriber = tracing_subscriber::registry().with(Warnings(Arc::clone(&warnings)));

    let state = State::new().with("v", 0);
    let observer = Observer::new(&state);
    let ran = Rc::new(Cell::new(0));
    let counter = Rc::clone(&ran);
    let _bad = observer
        .observe("v", |_: &Value, _: &Value| panic!("handler exploded"))
        .unwrap();
    let _good = observer
        .observe("v", move |_: &Value, _: &Value| counter.set(counter.get() + 1))
        .unwrap();

    tracing::subscriber::with_default(subscriber, || {
        state.set("v", 1).unwrap();
        state.set("v", 2).unwrap();
    });

    assert_eq!(ran.get(), 2);
    assert_eq!(state.get("v"), Value::from(2));
    assert_eq!(warnings.load(Ordering::SeqCst), 2);
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn one_notification_per_distinct_write(writes in prop::collection::vec(0i32..4, 0..40)) {
        let state = State::new().with("n", 0);
        let observer = Observer::new(&state);
        let (seen, handler) = recorder();
        let _sub = observer.observe("n", handler).unwrap();

        let mut previous = 0;
        let mut expected = 0;
        for n in writes {
            if n != previous {
                expected += 1;
            }
            previous = n;
            state.set("n", n).unwrap();
        }
        prop_assert_eq!(seen.borrow().len(), expected);
    }
}
