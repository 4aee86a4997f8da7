#![forbid(unsafe_code)]

//! Button: fixed or field-sourced label, optional markup or image content,
//! and a model action on click.

use kview_core::EventKind;
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_toggles, render_trigger, set_trigger_alt};
use crate::error::ViewError;
use crate::node::{ButtonNode, Caption, ContentType};
use crate::runtime::Ctx;

pub(super) fn build<T: Model>(node: &ButtonNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let btn = ctx.create("button");
    apply_identity(&btn, &node.common);
    btn.set_attribute("type", "button");
    apply_size(&btn, node.common.width.as_ref(), node.common.height.as_ref());
    ctx.add(btn.clone());

    let content = node.content;
    match &node.caption {
        Caption::Text(label) if content == ContentType::Text => {
            btn.set_text(label);
        }
        Caption::Text(label) => {
            let source = match &node.name {
                Some(name) => ctx.state().get(name).to_text(),
                None => label.clone(),
            };
            render_trigger(&btn, &source, content);
            set_trigger_alt(&btn, label);
            if let Some(name) = &node.name {
                let target = btn.clone();
                let alt = label.clone();
                ctx.observe(name, move |value: &Value, _: &Value| {
                    render_trigger(&target, &value.to_text(), content);
                    set_trigger_alt(&target, &alt);
                })?;
            }
        }
        Caption::Field(label_field) => {
            let source_field = node.name.as_ref().unwrap_or(label_field);
            render_trigger(&btn, &ctx.state().get(source_field).to_text(), content);
            set_trigger_alt(&btn, &ctx.state().get(label_field).to_text());

            let target = btn.clone();
            let model = ctx.weak_model();
            let alt_field = label_field.clone();
            ctx.observe(source_field, move |value: &Value, _: &Value| {
                render_trigger(&target, &value.to_text(), content);
                if let Some(model) = model.upgrade() {
                    set_trigger_alt(&target, &model.state().get(&alt_field).to_text());
                }
            })?;

            if content == ContentType::Image && source_field != label_field {
                let target = btn.clone();
                ctx.observe(label_field, move |value: &Value, _: &Value| {
                    set_trigger_alt(&target, &value.to_text());
                })?;
            }
        }
    }

    bind_toggles(ctx, &node.common, &btn)?;

    let model = ctx.weak_model();
    let observer = ctx.observer.clone();
    let action = node.action.clone();
    let muted = node.muted;
    ctx.listen(&btn, EventKind::Click, move |_| {
        let Some(model) = model.upgrade() else {
            return;
        };
        if muted {
            observer.mute_all(|| action(&*model));
        } else {
            action(&*model);
        }
    });
    Ok(())
}
