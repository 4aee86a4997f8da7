#![forbid(unsafe_code)]

//! Headless presentation surface for kview.
//!
//! This crate provides:
//! - [`Surface`], the document stand-in: body, viewport, focus, top layer,
//!   document listeners, and deferred task queues
//! - [`Element`], a shared handle to one node of the retained element tree
//! - [`Event`] and [`EventKind`] for listener dispatch
//! - [`contain`] for running foreign callbacks without letting a panic escape
//! - number formatting and parsing shared by form controls

pub mod contain;
pub mod element;
pub mod event;
pub mod geometry;
pub mod number;
pub mod surface;

pub use contain::{contain, panic_message};
pub use element::{Element, ListenerFn, ListenerId, TEXT_NODE, WeakElement};
pub use event::{Event, EventKind, Key, KeyEvent, Modifiers};
pub use geometry::{Point, Rect, Size, clamp_lenient};
pub use number::{format_number, parse_number};
pub use surface::{Surface, TaskId};
