#![forbid(unsafe_code)]

//! Boot button: asks the model for a new object and, if it gets one,
//! replaces the whole boot container with that object's view.

use kview_core::{EventKind, contain};
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_toggles, render_trigger, set_trigger_alt};
use crate::error::ViewError;
use crate::node::{BootNode, Caption};
use crate::runtime::Ctx;

pub(super) fn build<T: Model>(node: &BootNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let btn = ctx.create("button");
    apply_identity(&btn, &node.common);
    btn.set_attribute("type", "button");
    apply_size(&btn, node.common.width.as_ref(), node.common.height.as_ref());
    bind_toggles(ctx, &node.common, &btn)?;

    let content = node.content;
    match &node.caption {
        Caption::Text(label) => {
            render_trigger(&btn, label, content);
            set_trigger_alt(&btn, label);
        }
        Caption::Field(field) => {
            let label = ctx.state().get(field).to_text();
            render_trigger(&btn, &label, content);
            set_trigger_alt(&btn, &label);
            let target = btn.clone();
            ctx.observe(field, move |value: &Value, _: &Value| {
                let label = value.to_text();
                render_trigger(&target, &label, content);
                set_trigger_alt(&target, &label);
            })?;
        }
    }

    let model = ctx.weak_model();
    let runtime = ctx.runtime.downgrade();
    let handle = ctx.handle.downgrade();
    let factory = node.factory.clone();
    ctx.listen(&btn, EventKind::Click, move |_| {
        let (Some(model), Some(runtime)) = (model.upgrade(), runtime.upgrade()) else {
            return;
        };
        let next = match contain("boot.factory", || factory(&*model)) {
            Some(Ok(Some(next))) => next,
            Some(Ok(None)) => return,
            Some(Err(err)) => {
                tracing::warn!(target: "kview::boot", %err, "boot factory failed");
                return;
            }
            None => {
                tracing::warn!(target: "kview::boot", "boot factory panicked");
                return;
            }
        };
        if runtime.find_view_for_model(&next).is_none() {
            tracing::warn!(
                target: "kview::boot",
                model = next.type_name(),
                "no view for booted model; staying"
            );
            return;
        }
        if runtime.boot_container().is_none() {
            tracing::warn!(target: "kview::boot", "no boot container; staying");
            return;
        }
        if let Some(handle) = handle.upgrade() {
            handle.stop();
        }
        match runtime.boot_in_container(&next) {
            Ok(booted) => {
                tracing::debug!(target: "kview::boot", view = booted.view_name(), "booted");
            }
            Err(err) => tracing::warn!(target: "kview::boot", %err, "boot failed"),
        }
    });

    ctx.add(btn);
    Ok(())
}
