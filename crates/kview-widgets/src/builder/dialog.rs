#![forbid(unsafe_code)]

//! Dialog: a trigger button plus a `<dialog>` showing the view of the object
//! a field holds.
//!
//! # Invariants
//!
//! 1. Opening runs the node's action first, then reads the field; a null
//!    field closes the dialog instead.
//! 2. The nested view lives exactly as long as the dialog is open: closing
//!    by any path (Escape, backdrop, field set to null, teardown) stops it.
//! 3. Escape is suppressed unless the node (or the runtime config) allows
//!    it.

use std::rc::Rc;

use kview_core::{Element, EventKind, contain};
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_toggles, render_trigger, set_trigger_alt};
use crate::error::ViewError;
use crate::node::ModalNode;
use crate::runtime::Ctx;

use super::slot::Slot;

struct Overlay {
    dialog: Element,
    slot: Slot,
    modal: bool,
}

impl Overlay {
    fn close(&self) {
        self.dialog.close();
        self.slot.clear();
    }

    fn mount(&self, value: &Value) -> bool {
        match self.slot.show(value, None) {
            Ok(mounted) => mounted,
            Err(err) => {
                tracing::warn!(target: "kview::dialog", %err, "dialog content failed to mount");
                false
            }
        }
    }

    fn open(&self, value: &Value) {
        if value.is_null() {
            self.close();
            return;
        }
        if !self.mount(value) {
            return;
        }
        if self.modal {
            self.dialog.show_modal();
        } else {
            self.dialog.show();
        }
        tracing::debug!(target: "kview::dialog", modal = self.modal, "dialog opened");
    }
}

pub(super) fn build<T: Model>(node: &ModalNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let btn = ctx.create("button");
    btn.set_attribute("type", "button");
    apply_size(&btn, node.button_width.as_ref(), node.button_height.as_ref());
    render_trigger(&btn, &node.label, node.content);
    set_trigger_alt(&btn, &node.label);
    ctx.add(btn.clone());

    let dialog = ctx.create("dialog");
    apply_identity(&dialog, &node.common);
    apply_size(&dialog, node.common.width.as_ref(), node.common.height.as_ref());
    let host = ctx.create("div");
    host.set_style("min-width", "100%");
    dialog.append_child(&host);

    let overlay = Rc::new(Overlay {
        dialog: dialog.clone(),
        slot: Slot::new(ctx.runtime.downgrade(), host),
        modal: node.modal.unwrap_or(ctx.config().dialog_modal),
    });

    {
        let overlay = Rc::clone(&overlay);
        ctx.observe(&node.name, move |value: &Value, _: &Value| {
            if value.is_null() {
                overlay.close();
            } else if overlay.dialog.is_open() {
                overlay.mount(value);
            }
        })?;
    }

    bind_toggles(ctx, &node.common, &btn)?;

    if node.close_on_backdrop {
        let overlay = Rc::clone(&overlay);
        ctx.listen(&dialog, EventKind::Click, move |event| {
            if event.targets(&overlay.dialog) {
                overlay.close();
            }
        });
    }
    if !node.close_on_escape.unwrap_or(ctx.config().dialog_close_on_escape) {
        ctx.listen(&dialog, EventKind::Cancel, |event| event.prevent_default());
    }
    {
        let overlay = Rc::clone(&overlay);
        ctx.listen(&dialog, EventKind::Close, move |_| overlay.slot.clear());
    }
    {
        let overlay = Rc::clone(&overlay);
        let model = ctx.weak_model();
        let field = node.name.clone();
        let action = node.action.clone();
        ctx.listen(&btn, EventKind::Click, move |_| {
            let Some(model) = model.upgrade() else {
                return;
            };
            if let Some(action) = &action {
                contain("dialog.action", || action(&*model));
            }
            overlay.open(&model.state().get(&field));
        });
    }

    ctx.add(dialog);
    ctx.on_teardown(move || overlay.close());
    Ok(())
}
