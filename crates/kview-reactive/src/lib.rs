#![forbid(unsafe_code)]

//! Reactive state for kview.
//!
//! This crate provides the change-tracking layer views bind to:
//!
//! - [`Value`]: dynamically typed field value with identity-based change
//!   suppression.
//! - [`State`] and [`Model`]: plain state objects with named fields and
//!   descriptors, and the trait application types implement to expose them.
//! - [`Observer`]: instruments fields of one state object so that plain
//!   writes notify handlers, with silent writes and mute scopes.
//! - [`ObserverRegistry`]: one shared observer per state object.
//! - [`Subscription`] and [`BindingScope`]: RAII handler lifetimes.
//!
//! # Architecture
//!
//! Everything is single-threaded (`Rc`/`RefCell`). A state object owns its
//! field slots; an observer holds the state weakly and swaps instrumented
//! slots for shared cells. Handlers run synchronously, in subscription
//! order, inside [`kview_core::contain`].

pub mod binding;
pub mod error;
pub mod model;
pub mod observer;
pub mod registry;
pub mod state;
pub mod value;

pub use binding::BindingScope;
pub use error::{ObserveError, StateError};
pub use model::{AsAny, Model, ModelRef, WeakModelRef};
pub use observer::{Handler, Observer, Subscription};
pub use registry::ObserverRegistry;
pub use state::{FieldDescriptor, FieldKind, Getter, Setter, State};
pub use value::Value;
