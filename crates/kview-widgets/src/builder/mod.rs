#![forbid(unsafe_code)]

//! Per-kind node builders.
//!
//! Each builder creates its element(s), renders the current model values,
//! subscribes to future changes, wires user interaction back into the model,
//! and registers teardowns on the handle being built.

mod boot;
mod button;
mod custom;
mod dialog;
mod flow;
mod image;
mod input;
mod label;
mod list;
mod menu;
mod select;
mod single;
mod slot;

use kview_reactive::Model;

use crate::error::ViewError;
use crate::node::Node;
use crate::runtime::Ctx;

/// Dispatch every descriptor, in order, to its builder.
pub(crate) fn build_nodes<T: Model>(nodes: &[Node<T>], ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    for node in nodes {
        match node {
            Node::Input(node) => input::build(node, ctx)?,
            Node::Button(node) => button::build(node, ctx)?,
            Node::Label(node) => label::build(node, ctx)?,
            Node::Image(node) => image::build(node, ctx)?,
            Node::Select(node) => select::build(node, ctx)?,
            Node::Flow(node) => flow::build(node, ctx)?,
            Node::Single(node) => single::build(node, ctx)?,
            Node::List(node) => list::build(node, ctx)?,
            Node::Dialog(node) => dialog::build(node, ctx)?,
            Node::Menu(node) => menu::build(node, ctx)?,
            Node::Custom(node) => custom::build(node, ctx)?,
            Node::Boot(node) => boot::build(node, ctx)?,
        }
    }
    Ok(())
}
