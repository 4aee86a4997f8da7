#![forbid(unsafe_code)]

//! Label: a `<span>` projecting a string field, or fixed text.

use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_toggles};
use crate::error::ViewError;
use crate::node::{Caption, LabelNode};
use crate::runtime::Ctx;

pub(super) fn build<T: Model>(node: &LabelNode, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let span = ctx.create("span");
    apply_identity(&span, &node.common);
    apply_size(&span, node.common.width.as_ref(), node.common.height.as_ref());
    match &node.caption {
        Caption::Text(text) => span.set_text(text),
        Caption::Field(field) => span.set_text(&ctx.state().get(field).to_text()),
    }
    ctx.add(span.clone());

    bind_toggles(ctx, &node.common, &span)?;

    if let Caption::Field(field) = &node.caption {
        let target = span.clone();
        ctx.observe(field, move |value: &Value, _: &Value| {
            let text = value.to_text();
            if target.text() != text {
                target.set_text(&text);
            }
        })?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bag, mount, runtime};
    use kview_reactive::State;

    #[test]
    fn dynamic_label_projects_field() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("status", "idle"));
        let (handle, app) = mount(&rt, &bag, |v| {
            v.label(LabelNode::new("status").class("muted"));
        });
        let span = app.first_child().unwrap();
        assert_eq!(span.tag(), "span");
        assert!(span.has_class("muted"));
        assert_eq!(span.text(), "idle");
        bag.state.set("status", 3).unwrap();
        assert_eq!(span.text(), "3");
        bag.state.set("status", Value::Null).unwrap();
        assert_eq!(span.text(), "");
        assert_eq!(handle.binding_count(), 1);
    }

    #[test]
    fn static_label_has_no_subscription() {
        let rt = runtime();
        let bag = Bag::new(State::new());
        let (handle, app) = mount(&rt, &bag, |v| {
            v.label(LabelNode::fixed("Name:"));
        });
        assert_eq!(app.text_content(), "Name:");
        assert_eq!(handle.binding_count(), 0);
    }

    #[test]
    fn non_control_enable_uses_aria() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("on", false));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.label(LabelNode::fixed("x").enable("on"));
        });
        let span = app.first_child().unwrap();
        assert_eq!(span.attribute("aria-disabled").as_deref(), Some("true"));
    }
}
