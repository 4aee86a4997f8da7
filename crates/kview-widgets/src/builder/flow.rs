#![forbid(unsafe_code)]

//! Flow: a flex container whose children share the parent's model and
//! handle.

use kview_reactive::Model;

use crate::bind::{apply_identity, apply_layout, apply_size};
use crate::error::ViewError;
use crate::node::FlowNode;
use crate::runtime::Ctx;

use super::build_nodes;

pub(super) fn build<T: Model>(node: &FlowNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let div = ctx.create("div");
    apply_identity(&div, &node.common);
    apply_layout(&div, &node.layout);
    apply_size(&div, node.common.width.as_ref(), node.common.height.as_ref());

    let mut children = Vec::new();
    build_nodes(&node.children, &mut ctx.redirect(&mut children))?;
    div.append_all(&children);

    ctx.add(div);
    Ok(())
}
