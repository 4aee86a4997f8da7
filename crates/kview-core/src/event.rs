#![forbid(unsafe_code)]

//! Events dispatched through the surface.
//!
//! An [`Event`] is created by the surface (or by a simulated user action on
//! an [`Element`]) and delivered to listeners registered for its
//! [`EventKind`]. Element events bubble from the target to the root;
//! document-level events (key presses in the capture phase, resize, scroll)
//! are delivered to surface listeners first.

use std::cell::{Cell, RefCell};

use bitflags::bitflags;

use crate::element::Element;

/// Kinds of events a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer activation.
    Click,
    /// Value of a text/number control changed while typing.
    Input,
    /// Committed change (checkbox toggle, option selection).
    Change,
    /// Key pressed.
    KeyDown,
    /// A modal dialog is about to be dismissed by Escape.
    Cancel,
    /// A dialog was closed.
    Close,
    /// Viewport resized.
    Resize,
    /// Something scrolled.
    Scroll,
}

/// Keys the surface knows how to route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Char(char),
}

bitflags! {
    /// Modifier keys held during a key press.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const CTRL  = 0b0010;
        const ALT   = 0b0100;
        const META  = 0b1000;
    }
}

/// A key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    #[must_use]
    pub const fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    #[must_use]
    pub const fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self::new(key)
    }
}

/// An event in flight.
///
/// `prevent_default` and `stop_propagation` use interior mutability so that
/// listeners only ever receive `&Event`.
#[derive(Debug)]
pub struct Event {
    kind: EventKind,
    target: Option<Element>,
    current_target: RefCell<Option<Element>>,
    key: Option<KeyEvent>,
    default_prevented: Cell<bool>,
    propagation_stopped: Cell<bool>,
}

impl Event {
    /// Create an event aimed at `target`.
    #[must_use]
    pub fn new(kind: EventKind, target: Option<Element>) -> Self {
        Self {
            kind,
            target,
            current_target: RefCell::new(None),
            key: None,
            default_prevented: Cell::new(false),
            propagation_stopped: Cell::new(false),
        }
    }

    /// Create a key-down event.
    #[must_use]
    pub fn key_down(key: KeyEvent, target: Option<Element>) -> Self {
        let mut event = Self::new(EventKind::KeyDown, target);
        event.key = Some(key);
        event
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.kind
    }

    /// The element the event was dispatched to (None for document events).
    #[must_use]
    pub fn target(&self) -> Option<&Element> {
        self.target.as_ref()
    }

    /// The element whose listener is currently running.
    #[must_use]
    pub fn current_target(&self) -> Option<Element> {
        self.current_target.borrow().clone()
    }

    pub(crate) fn set_current_target(&self, el: Option<Element>) {
        *self.current_target.borrow_mut() = el;
    }

    #[must_use]
    pub fn key(&self) -> Option<Key> {
        self.key.map(|k| k.key)
    }

    #[must_use]
    pub fn key_event(&self) -> Option<KeyEvent> {
        self.key
    }

    /// Whether the target is exactly `el`.
    #[must_use]
    pub fn targets(&self, el: &Element) -> bool {
        self.target.as_ref().is_some_and(|t| t == el)
    }

    pub fn prevent_default(&self) {
        self.default_prevented.set(true);
    }

    #[must_use]
    pub fn default_prevented(&self) -> bool {
        self.default_prevented.get()
    }

    pub fn stop_propagation(&self) {
        self.propagation_stopped.set(true);
    }

    #[must_use]
    pub fn propagation_stopped(&self) -> bool {
        self.propagation_stopped.get()
    }
}
