#![forbid(unsafe_code)]

//! Views for kview: node descriptors, the fluent [`View`] builder, and the
//! [`Runtime`] that mounts descriptor trees against live models.
//!
//! # Role in kview
//! `kview-widgets` is the interpreter layer. It sits on
//! [`kview_reactive`] for change notification and on [`kview_core`] for the
//! element tree, and turns a per-type list of [`Node`] descriptors into
//! bound elements.
//!
//! # Lifecycle
//! A mount produces a [`RuntimeHandle`]. The handle owns every data
//! subscription and listener the mount created; stopping it (explicitly or
//! by dropping the last clone) releases them all. Root mounts are also held
//! by the runtime until the container is remounted or unmounted.

mod bind;
mod builder;
pub mod config;
pub mod error;
pub mod modal;
pub mod node;
pub mod runtime;
pub mod view;

#[cfg(test)]
mod testing;

pub use config::RuntimeConfig;
#[cfg(feature = "config-file")]
pub use config::ConfigError;
pub use error::ViewError;
pub use node::{
    Align, BootNode, ButtonNode, Caption, Common, ContentType, CustomNode, DisplayFn,
    ElementFactory, FlexLayout, FlowNode, ImageNode, InputNode, InputType, Justify, LabelNode,
    Length, ListNode, Method, ModalNode, ModelFactory, Node, Orientation, SelectMode, SelectNode,
    SingleNode,
};
pub use runtime::{MountTarget, Runtime, RuntimeHandle, WeakRuntimeHandle};
pub use view::View;
