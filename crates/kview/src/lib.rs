#![forbid(unsafe_code)]

//! kview: declarative views bound to plain state objects.
//!
//! A view is a list of node descriptors registered per model type. Mounting
//! a model interprets its view against a [`Surface`], binds every element
//! to the model's fields through an [`Observer`], and returns a
//! [`RuntimeHandle`] that releases all of it when stopped.
//!
//! ```
//! use std::rc::Rc;
//! use kview::prelude::*;
//!
//! struct Greeting {
//!     state: State,
//! }
//!
//! impl Model for Greeting {
//!     fn state(&self) -> &State {
//!         &self.state
//!     }
//! }
//!
//! let surface = Surface::default();
//! let app = surface.create_element("div");
//! app.set_id("app");
//! surface.body().append_child(&app);
//!
//! let runtime = Runtime::new(surface);
//! runtime.define_view::<Greeting>(|v| {
//!     v.label(LabelNode::new("who").id("who"));
//! });
//!
//! let model = Rc::new(Greeting { state: State::new().with("who", "world") });
//! let _handle = runtime.mount(&model, "#app").unwrap();
//! model.state.set("who", "kview").unwrap();
//! assert_eq!(app.query_selector("#who").unwrap().text(), "kview");
//! ```

#[cfg(feature = "logging")]
pub mod logging;

pub use kview_core as core;
pub use kview_reactive as reactive;
pub use kview_widgets as widgets;

pub use kview_core::{Element, Event, EventKind, Key, Surface};
pub use kview_reactive::{Model, ModelRef, Observer, ObserverRegistry, State, Value};
pub use kview_widgets::{Runtime, RuntimeConfig, RuntimeHandle, View, ViewError};

/// Everything needed to declare and mount views.
pub mod prelude {
    pub use kview_core::{
        Element, Event, EventKind, Key, Modifiers, Point, Rect, Size, Surface, contain,
    };
    pub use kview_reactive::{
        BindingScope, Model, ModelRef, ObserveError, Observer, ObserverRegistry, State,
        StateError, Subscription, Value,
    };
    pub use kview_widgets::{
        Align, BootNode, ButtonNode, Caption, ContentType, CustomNode, FlowNode, ImageNode,
        InputNode, InputType, Justify, LabelNode, Length, ListNode, ModalNode, MountTarget, Node,
        Orientation, Runtime, RuntimeConfig, RuntimeHandle, SelectMode, SelectNode, SingleNode,
        View, ViewError,
    };
}
