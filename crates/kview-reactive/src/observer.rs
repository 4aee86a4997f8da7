#![forbid(unsafe_code)]

//! Per-object field observation.
//!
//! An [`Observer`] instruments individual fields of one [`State`]. The first
//! [`Observer::observe`] on a field captures the field's descriptor and
//! current value, then replaces the field with an observed cell. From then
//! on every write through the state (a plain `state.set(..)` included) goes
//! through the cell, which notifies handlers with `(new, old)`.
//!
//! # Invariants
//!
//! 1. A write notifies only when the value differs by
//!    [`Value::same_value`] and the field's mute counter is zero.
//! 2. Registering the same handler twice on a field keeps one registration.
//! 3. Removing the last handler restores the original descriptor (or a
//!    plain writable data field) carrying the last value.
//! 4. Handlers fire in registration order; a handler removed during a
//!    notification pass does not run for that pass.
//! 5. Mute counters are balanced even when the muted closure panics.
//!
//! # Failure Modes
//!
//! - Observing a non-configurable field fails with
//!   [`ObserveError::NonConfigurable`] and leaves the field untouched.
//! - A panicking handler is logged and skipped; later handlers still run.
//! - Re-entrant writes from a handler recurse synchronously. Two handlers
//!   that keep flipping each other's fields will recurse without bound.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use ahash::AHashMap;
use kview_core::contain;

use crate::error::{ObserveError, StateError};
use crate::state::{FieldDescriptor, FieldKind, Slot, State, StateInner};
use crate::value::Value;

/// Change handler: `(new, old)`.
pub type Handler = Rc<dyn Fn(&Value, &Value)>;

fn same_handler(a: &Handler, b: &Handler) -> bool {
    Rc::as_ptr(a).cast::<()>() == Rc::as_ptr(b).cast::<()>()
}

// ---------------------------------------------------------------------------
// FieldCell
// ---------------------------------------------------------------------------

/// Storage of an instrumented field. The cell is the single source of truth
/// for the value while the field is observed.
pub(crate) struct FieldCell {
    name: String,
    value: RefCell<Value>,
    handlers: RefCell<Vec<Handler>>,
    muted: Cell<u32>,
    enumerable: bool,
    original: Option<FieldDescriptor>,
}

impl FieldCell {
    fn new(name: &str, value: Value, enumerable: bool, original: Option<FieldDescriptor>) -> Self {
        Self {
            name: name.to_owned(),
            value: RefCell::new(value),
            handlers: RefCell::new(Vec::new()),
            muted: Cell::new(0),
            enumerable,
            original,
        }
    }

    pub(crate) fn get(&self) -> Value {
        self.value.borrow().clone()
    }

    pub(crate) fn enumerable(&self) -> bool {
        self.enumerable
    }

    pub(crate) fn write(&self, value: Value) {
        let old = self.value.replace(value.clone());
        if self.muted.get() > 0 || old.same_value(&value) {
            return;
        }
        tracing::trace!(
            target: "kview::observer",
            field = %self.name,
            from = old.kind_name(),
            to = value.kind_name(),
            "field changed"
        );
        let snapshot = self.handlers.borrow().clone();
        for handler in snapshot {
            if !self.has_handler(&handler) {
                continue;
            }
            contain("observer.handler", || handler(&value, &old));
        }
    }

    fn has_handler(&self, handler: &Handler) -> bool {
        self.handlers.borrow().iter().any(|h| same_handler(h, handler))
    }

    fn add_handler(&self, handler: &Handler) {
        if !self.has_handler(handler) {
            self.handlers.borrow_mut().push(Rc::clone(handler));
        }
    }

    fn remove_handler(&self, handler: &Handler) -> bool {
        let mut handlers = self.handlers.borrow_mut();
        let before = handlers.len();
        handlers.retain(|h| !same_handler(h, handler));
        before != handlers.len()
    }

    fn handler_count(&self) -> usize {
        self.handlers.borrow().len()
    }
}

/// Increments mute counters on creation and decrements exactly those
/// counters on drop.
struct MuteGuard {
    cells: Vec<Rc<FieldCell>>,
}

impl MuteGuard {
    fn new(cells: Vec<Rc<FieldCell>>) -> Self {
        for cell in &cells {
            cell.muted.set(cell.muted.get() + 1);
        }
        Self { cells }
    }
}

impl Drop for MuteGuard {
    fn drop(&mut self) {
        for cell in &self.cells {
            cell.muted.set(cell.muted.get().saturating_sub(1));
        }
    }
}

// ---------------------------------------------------------------------------
// Observer
// ---------------------------------------------------------------------------

pub(crate) struct ObserverInner {
    state: Weak<StateInner>,
    fields: RefCell<AHashMap<String, Rc<FieldCell>>>,
}

/// Field observer for one state object.
///
/// Cloning shares the same observer. Obtain the shared instance for a state
/// through [`ObserverRegistry`](crate::ObserverRegistry) so that every view
/// bound to the object uses one handler set per field.
#[derive(Clone)]
pub struct Observer {
    inner: Rc<ObserverInner>,
}

impl fmt::Debug for Observer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observer")
            .field("attached", &self.is_attached())
            .field("observed_fields", &self.observed_fields())
            .finish()
    }
}

impl PartialEq for Observer {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Observer {
    #[must_use]
    pub fn new(state: &State) -> Self {
        Self {
            inner: Rc::new(ObserverInner {
                state: state.downgrade(),
                fields: RefCell::new(AHashMap::new()),
            }),
        }
    }

    fn state(&self) -> Option<State> {
        self.inner.state.upgrade().map(State::from_inner)
    }

    /// Whether the observed state object still exists.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.inner.state.strong_count() > 0
    }

    /// Whether this observer is bound to `state`.
    #[must_use]
    pub fn observes(&self, state: &State) -> bool {
        Weak::ptr_eq(&self.inner.state, &state.downgrade())
    }

    fn cell(&self, field: &str) -> Option<Rc<FieldCell>> {
        self.inner.fields.borrow().get(field).cloned()
    }

    /// Register `handler` for changes of `field`.
    pub fn observe(
        &self,
        field: &str,
        handler: impl Fn(&Value, &Value) + 'static,
    ) -> Result<Subscription, ObserveError> {
        self.observe_shared(field, Rc::new(handler))
    }

    /// Register a shared handler. Registering the same `Rc` twice on a field
    /// keeps a single registration.
    pub fn observe_shared(&self, field: &str, handler: Handler) -> Result<Subscription, ObserveError> {
        let cell = match self.cell(field) {
            Some(cell) => cell,
            None => self.instrument(field)?,
        };
        cell.add_handler(&handler);
        Ok(Subscription {
            observer: Rc::downgrade(&self.inner),
            field: field.to_owned(),
            handler: Some(handler),
        })
    }

    fn instrument(&self, field: &str) -> Result<Rc<FieldCell>, ObserveError> {
        let state = self.state().ok_or(ObserveError::Detached)?;
        let own = state.descriptor(field);
        if own.as_ref().is_some_and(|d| !d.configurable) {
            return Err(ObserveError::NonConfigurable {
                field: field.to_owned(),
            });
        }
        let current = match own.as_ref().map(|d| &d.kind) {
            Some(FieldKind::Data { value, .. }) => value.clone(),
            Some(FieldKind::Accessor { get, .. }) => get.as_ref().map(|g| g()).unwrap_or_default(),
            None => Value::Null,
        };
        let enumerable = own.as_ref().is_none_or(|d| d.enumerable);
        let cell = Rc::new(FieldCell::new(field, current, enumerable, own));
        state.install(field, Slot::Observed(Rc::clone(&cell)));
        self.inner
            .fields
            .borrow_mut()
            .insert(field.to_owned(), Rc::clone(&cell));
        tracing::trace!(target: "kview::observer", field, "field instrumented");
        Ok(cell)
    }

    /// Remove one handler. Restores the field once no handler is left.
    pub fn unobserve(&self, field: &str, handler: &Handler) -> bool {
        let Some(cell) = self.cell(field) else {
            return false;
        };
        let removed = cell.remove_handler(handler);
        if cell.handler_count() == 0 {
            self.inner.fields.borrow_mut().remove(field);
            self.restore(field, &cell);
        }
        removed
    }

    /// Restore every instrumented field.
    pub fn stop_all(&self) {
        let fields: Vec<_> = self.inner.fields.borrow_mut().drain().collect();
        for (field, cell) in fields {
            self.restore(&field, &cell);
        }
    }

    fn restore(&self, field: &str, cell: &FieldCell) {
        let Some(state) = self.state() else {
            return;
        };
        let last = cell.get();
        match &cell.original {
            Some(original) => {
                state.install(field, Slot::Plain(original.clone()));
                // A getter-only original cannot take the value back.
                contain("observer.restore", || state.set(field, last));
            }
            None => {
                let mut plain = FieldDescriptor::data(last);
                plain.enumerable = cell.enumerable;
                state.install(field, Slot::Plain(plain));
            }
        }
        tracing::trace!(target: "kview::observer", field, "field restored");
    }

    /// Write without notifying this field's handlers.
    pub fn write_silently(&self, field: &str, value: impl Into<Value>) -> Result<(), StateError> {
        let Some(state) = self.state() else {
            return Ok(());
        };
        let _guard = MuteGuard::new(self.cell(field).into_iter().collect());
        state.set(field, value)
    }

    /// Run `f` with every currently instrumented field muted.
    pub fn mute_all<R>(&self, f: impl FnOnce() -> R) -> R {
        let cells: Vec<_> = self.inner.fields.borrow().values().cloned().collect();
        let _guard = MuteGuard::new(cells);
        f()
    }

    #[must_use]
    pub fn is_observed(&self, field: &str) -> bool {
        self.inner.fields.borrow().contains_key(field)
    }

    #[must_use]
    pub fn handler_count(&self, field: &str) -> usize {
        self.cell(field).map_or(0, |c| c.handler_count())
    }

    /// Names of the instrumented fields, sorted.
    #[must_use]
    pub fn observed_fields(&self) -> Vec<String> {
        let mut names: Vec<_> = self.inner.fields.borrow().keys().cloned().collect();
        names.sort();
        names
    }
}

// ---------------------------------------------------------------------------
// Subscription
// ---------------------------------------------------------------------------

/// RAII registration of one handler on one field.
///
/// Dropping the subscription unobserves the handler.
#[must_use = "dropping a Subscription unobserves immediately"]
pub struct Subscription {
    observer: Weak<ObserverInner>,
    field: String,
    handler: Option<Handler>,
}

impl Subscription {
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Whether the handler is still registered.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match (&self.handler, self.observer.upgrade()) {
            (Some(handler), Some(inner)) => inner
                .fields
                .borrow()
                .get(&self.field)
                .is_some_and(|c| c.has_handler(handler)),
            _ => false,
        }
    }

    /// Unobserve now. Returns whether the handler was still registered.
    pub fn unsubscribe(mut self) -> bool {
        self.release()
    }

    fn release(&mut self) -> bool {
        let Some(handler) = self.handler.take() else {
            return false;
        };
        let Some(inner) = self.observer.upgrade() else {
            return false;
        };
        Observer { inner }.unobserve(&self.field, &handler)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("field", &self.field)
            .field("active", &self.is_active())
            .finish()
    }
}
