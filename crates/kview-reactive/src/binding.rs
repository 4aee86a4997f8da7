#![forbid(unsafe_code)]

//! Lifecycle management for field subscriptions.
//!
//! # Usage
//!
//! ```ignore
//! let mut scope = BindingScope::new();
//! scope.observe(&observer, "title", |new, _| println!("title: {new}"))?;
//! // Releasing (or dropping) the scope unobserves everything it holds.
//! scope.clear();
//! ```

use std::fmt;

use kview_core::contain;

use crate::error::ObserveError;
use crate::observer::{Observer, Subscription};
use crate::value::Value;

/// Collects subscriptions for a logical scope (for example one mounted view).
///
/// # Invariants
///
/// 1. Subscriptions are released in registration order.
/// 2. A release that panics (a field restore calling a model setter) is
///    logged and the remaining subscriptions are still released.
/// 3. `clear()` leaves the scope empty and reusable.
#[derive(Default)]
pub struct BindingScope {
    subscriptions: Vec<Subscription>,
}

impl BindingScope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `sub` until the scope is cleared or dropped.
    pub fn hold(&mut self, sub: Subscription) {
        self.subscriptions.push(sub);
    }

    /// Observe `field` and hold the subscription.
    pub fn observe(
        &mut self,
        observer: &Observer,
        field: &str,
        handler: impl Fn(&Value, &Value) + 'static,
    ) -> Result<&mut Self, ObserveError> {
        let sub = observer.observe(field, handler)?;
        self.subscriptions.push(sub);
        Ok(self)
    }

    #[must_use]
    pub fn binding_count(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    /// Release all subscriptions now.
    pub fn clear(&mut self) {
        for sub in self.subscriptions.drain(..) {
            contain("binding.release", move || drop(sub));
        }
    }
}

impl Drop for BindingScope {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for BindingScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindingScope")
            .field("binding_count", &self.subscriptions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{FieldDescriptor, State};
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn scope_holds_subscriptions() {
        let state = State::new().with("x", 0);
        let observer = Observer::new(&state);
        let seen = Rc::new(Cell::new(0.0));

        let mut scope = BindingScope::new();
        let s = Rc::clone(&seen);
        scope
            .observe(&observer, "x", move |v, _| s.set(v.as_number()))
            .unwrap();
        assert_eq!(scope.binding_count(), 1);

        state.set("x", 42).unwrap();
        assert_eq!(seen.get(), 42.0);
    }

    #[test]
    fn scope_drop_releases_subscriptions() {
        let state = State::new().with("x", 0);
        let observer = Observer::new(&state);
        let seen = Rc::new(Cell::new(0));

        {
            let mut scope = BindingScope::new();
            let s = Rc::clone(&seen);
            scope
                .observe(&observer, "x", move |_, _| s.set(s.get() + 1))
                .unwrap();
            state.set("x", 1).unwrap();
            assert_eq!(seen.get(), 1);
        }

        state.set("x", 99).unwrap();
        assert_eq!(seen.get(), 1, "callback should not fire after scope dropped");
        assert!(!observer.is_observed("x"));
    }

    #[test]
    fn scope_clear_releases_and_is_reusable() {
        let state = State::new().with("x", 0);
        let observer = Observer::new(&state);
        let mut scope = BindingScope::new();
        for _ in 0..3 {
            scope.observe(&observer, "x", |_, _| {}).unwrap();
        }
        assert_eq!(observer.handler_count("x"), 3);
        scope.clear();
        assert!(scope.is_empty());
        assert_eq!(observer.handler_count("x"), 0);
        scope.observe(&observer, "x", |_, _| {}).unwrap();
        assert_eq!(scope.binding_count(), 1);
    }

    #[test]
    fn panicking_restore_does_not_stop_release() {
        let state = State::new()
            .with_field(
                "bad",
                FieldDescriptor::getter(|| Value::from(0)).with_setter(|_| panic!("setter")),
            )
            .with("good", 0);
        let observer = Observer::new(&state);
        let mut scope = BindingScope::new();
        scope.observe(&observer, "bad", |_, _| {}).unwrap();
        scope.observe(&observer, "good", |_, _| {}).unwrap();
        scope.clear();
        assert!(!observer.is_observed("good"));
    }
}
