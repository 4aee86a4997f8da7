#![forbid(unsafe_code)]

//! Plain state objects.
//!
//! A [`State`] is an ordered set of named fields. Each field is either a
//! data field (value plus writable flag) or an accessor (optional getter,
//! optional setter), and carries `configurable` and `enumerable` flags. An
//! [`Observer`](crate::Observer) instruments a field by swapping its slot for
//! an observed cell; reads and writes through the `State` keep working
//! unchanged, which is what lets plain writes on a model notify views.
//!
//! # Invariants
//!
//! 1. Reading a missing field yields [`Value::Null`].
//! 2. Writing a missing field creates a writable, configurable, enumerable
//!    data field at the end of the key order.
//! 3. Getters and setters run with no internal borrow held, so they may
//!    read or write other fields of the same state.
//!
//! # Failure Modes
//!
//! - Writing a non-writable data field or a getter-only accessor returns
//!   [`StateError::ReadOnly`] and leaves the field untouched.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::StateError;
use crate::model::Model;
use crate::observer::FieldCell;
use crate::value::Value;

/// Accessor read half.
pub type Getter = Rc<dyn Fn() -> Value>;
/// Accessor write half.
pub type Setter = Rc<dyn Fn(Value)>;

/// Storage shape of a field.
#[derive(Clone)]
pub enum FieldKind {
    Data { value: Value, writable: bool },
    Accessor {
        get: Option<Getter>,
        set: Option<Setter>,
    },
}

/// Full description of a field: shape plus flags.
#[derive(Clone)]
pub struct FieldDescriptor {
    pub kind: FieldKind,
    pub configurable: bool,
    pub enumerable: bool,
}

impl FieldDescriptor {
    /// Writable, configurable, enumerable data field.
    pub fn data(value: impl Into<Value>) -> Self {
        Self {
            kind: FieldKind::Data {
                value: value.into(),
                writable: true,
            },
            configurable: true,
            enumerable: true,
        }
    }

    /// Configurable, enumerable accessor.
    #[must_use]
    pub fn accessor(get: Option<Getter>, set: Option<Setter>) -> Self {
        Self {
            kind: FieldKind::Accessor { get, set },
            configurable: true,
            enumerable: true,
        }
    }

    /// Getter-only accessor.
    pub fn getter(get: impl Fn() -> Value + 'static) -> Self {
        Self::accessor(Some(Rc::new(get)), None)
    }

    /// Add a setter to an accessor (no effect on data fields).
    #[must_use]
    pub fn with_setter(mut self, set: impl Fn(Value) + 'static) -> Self {
        if let FieldKind::Accessor { set: slot, .. } = &mut self.kind {
            *slot = Some(Rc::new(set));
        }
        self
    }

    /// Mark a data field non-writable.
    #[must_use]
    pub fn read_only(mut self) -> Self {
        if let FieldKind::Data { writable, .. } = &mut self.kind {
            *writable = false;
        }
        self
    }

    #[must_use]
    pub fn non_configurable(mut self) -> Self {
        self.configurable = false;
        self
    }

    /// Exclude from [`State::keys`].
    #[must_use]
    pub fn hidden(mut self) -> Self {
        self.enumerable = false;
        self
    }

    #[must_use]
    pub fn is_accessor(&self) -> bool {
        matches!(self.kind, FieldKind::Accessor { .. })
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("FieldDescriptor");
        match &self.kind {
            FieldKind::Data { value, writable } => {
                s.field("value", value).field("writable", writable);
            }
            FieldKind::Accessor { get, set } => {
                s.field("get", &get.is_some()).field("set", &set.is_some());
            }
        }
        s.field("configurable", &self.configurable)
            .field("enumerable", &self.enumerable)
            .finish()
    }
}

#[derive(Clone)]
pub(crate) enum Slot {
    Plain(FieldDescriptor),
    Observed(Rc<FieldCell>),
}

impl Slot {
    fn configurable(&self) -> bool {
        match self {
            Self::Plain(desc) => desc.configurable,
            Self::Observed(_) => true,
        }
    }

    fn enumerable(&self) -> bool {
        match self {
            Self::Plain(desc) => desc.enumerable,
            Self::Observed(cell) => cell.enumerable(),
        }
    }
}

#[derive(Default)]
pub(crate) struct StateInner {
    slots: RefCell<Vec<(String, Slot)>>,
}

/// A plain state object: named fields with descriptors.
///
/// `State` is not `Clone`; its identity is what observers and the registry
/// key on.
#[derive(Default)]
pub struct State {
    inner: Rc<StateInner>,
}

impl fmt::Debug for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for key in self.keys() {
            let value = self.get(&key);
            map.entry(&key, &value);
        }
        map.finish()
    }
}

impl State {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_inner(inner: Rc<StateInner>) -> Self {
        Self { inner }
    }

    pub(crate) fn downgrade(&self) -> Weak<StateInner> {
        Rc::downgrade(&self.inner)
    }

    pub(crate) fn addr(&self) -> usize {
        Rc::as_ptr(&self.inner) as usize
    }

    /// Builder: add (or replace) a plain data field.
    #[must_use]
    pub fn with(self, name: &str, value: impl Into<Value>) -> Self {
        self.install(name, Slot::Plain(FieldDescriptor::data(value)));
        self
    }

    /// Builder: add (or replace) a field with an explicit descriptor.
    #[must_use]
    pub fn with_field(self, name: &str, descriptor: FieldDescriptor) -> Self {
        self.install(name, Slot::Plain(descriptor));
        self
    }

    /// Define or redefine a field. Fails when the existing field is
    /// non-configurable.
    pub fn define(&self, name: &str, descriptor: FieldDescriptor) -> Result<(), StateError> {
        if self.slot(name).is_some_and(|s| !s.configurable()) {
            return Err(StateError::NonConfigurable {
                field: name.to_owned(),
            });
        }
        self.install(name, Slot::Plain(descriptor));
        Ok(())
    }

    /// Delete a field. Returns whether it existed.
    pub fn remove(&self, name: &str) -> Result<bool, StateError> {
        let mut slots = self.inner.slots.borrow_mut();
        let Some(pos) = slots.iter().position(|(k, _)| k == name) else {
            return Ok(false);
        };
        if !slots[pos].1.configurable() {
            return Err(StateError::NonConfigurable {
                field: name.to_owned(),
            });
        }
        slots.remove(pos);
        Ok(true)
    }

    pub(crate) fn install(&self, name: &str, slot: Slot) {
        let mut slots = self.inner.slots.borrow_mut();
        if let Some(entry) = slots.iter_mut().find(|(k, _)| k == name) {
            entry.1 = slot;
        } else {
            slots.push((name.to_owned(), slot));
        }
    }

    pub(crate) fn slot(&self, name: &str) -> Option<Slot> {
        self.inner
            .slots
            .borrow()
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, s)| s.clone())
    }

    /// Read a field; missing fields and setter-only accessors read as Null.
    #[must_use]
    pub fn get(&self, name: &str) -> Value {
        match self.slot(name) {
            None => Value::Null,
            Some(Slot::Plain(desc)) => match desc.kind {
                FieldKind::Data { value, .. } => value,
                FieldKind::Accessor { get, .. } => get.map(|g| g()).unwrap_or_default(),
            },
            Some(Slot::Observed(cell)) => cell.get(),
        }
    }

    /// Write a field.
    pub fn set(&self, name: &str, value: impl Into<Value>) -> Result<(), StateError> {
        enum Deferred {
            Done,
            Setter(Setter, Value),
            Cell(Rc<FieldCell>, Value),
        }

        let value = value.into();
        let deferred = {
            let mut slots = self.inner.slots.borrow_mut();
            match slots.iter_mut().find(|(k, _)| k == name) {
                None => {
                    slots.push((name.to_owned(), Slot::Plain(FieldDescriptor::data(value))));
                    Deferred::Done
                }
                Some((_, Slot::Observed(cell))) => Deferred::Cell(Rc::clone(cell), value),
                Some((_, Slot::Plain(desc))) => match &mut desc.kind {
                    FieldKind::Data { value: slot, writable } => {
                        if !*writable {
                            return Err(StateError::ReadOnly {
                                field: name.to_owned(),
                            });
                        }
                        *slot = value;
                        Deferred::Done
                    }
                    FieldKind::Accessor { set: Some(set), .. } => {
                        Deferred::Setter(Rc::clone(set), value)
                    }
                    FieldKind::Accessor { set: None, .. } => {
                        return Err(StateError::ReadOnly {
                            field: name.to_owned(),
                        });
                    }
                },
            }
        };
        match deferred {
            Deferred::Done => {}
            Deferred::Setter(set, value) => set(value),
            Deferred::Cell(cell, value) => cell.write(value),
        }
        Ok(())
    }

    /// Current descriptor of a field. An observed field reports as a
    /// configurable accessor.
    #[must_use]
    pub fn descriptor(&self, name: &str) -> Option<FieldDescriptor> {
        match self.slot(name)? {
            Slot::Plain(desc) => Some(desc),
            Slot::Observed(cell) => {
                let (read, write) = (Rc::clone(&cell), Rc::clone(&cell));
                Some(FieldDescriptor {
                    kind: FieldKind::Accessor {
                        get: Some(Rc::new(move || read.get())),
                        set: Some(Rc::new(move |v| write.write(v))),
                    },
                    configurable: true,
                    enumerable: cell.enumerable(),
                })
            }
        }
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.inner.slots.borrow().iter().any(|(k, _)| k == name)
    }

    /// Enumerable field names in definition order.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        self.inner
            .slots
            .borrow()
            .iter()
            .filter(|(_, s)| s.enumerable())
            .map(|(k, _)| k.clone())
            .collect()
    }

    // --- Typed reads ---------------------------------------------------------

    /// Field coerced to a number.
    #[must_use]
    pub fn number(&self, name: &str) -> f64 {
        self.get(name).as_number()
    }

    /// Field rendered as display text.
    #[must_use]
    pub fn text(&self, name: &str) -> String {
        self.get(name).to_text()
    }

    /// Field truthiness.
    #[must_use]
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).truthy()
    }

    /// Items of a list field (empty for anything else).
    #[must_use]
    pub fn list(&self, name: &str) -> Vec<Value> {
        self.get(name).as_list().map(<[Value]>::to_vec).unwrap_or_default()
    }

    /// Object field downcast to `T`.
    #[must_use]
    pub fn object<T: Model>(&self, name: &str) -> Option<Rc<T>> {
        self.get(name).as_object().and_then(|m| m.downcast::<T>())
    }
}
