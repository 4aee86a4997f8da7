#![forbid(unsafe_code)]

//! Custom element: whatever the model's factory produces, inserted as is.
//! An optional initialiser runs once the enclosing root mount is attached.

use kview_core::contain;
use kview_reactive::Model;

use crate::bind::{apply_identity, apply_size, bind_toggles};
use crate::error::ViewError;
use crate::node::CustomNode;
use crate::runtime::Ctx;

pub(super) fn build<T: Model>(node: &CustomNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let factory = &node.factory;
    let el = match contain("custom.factory", || factory(&**ctx.model)) {
        Some(Ok(el)) => el,
        Some(Err(err)) => {
            tracing::warn!(target: "kview::custom", %err, "factory failed; nothing rendered");
            return Ok(());
        }
        None => {
            tracing::warn!(target: "kview::custom", "factory panicked; nothing rendered");
            return Ok(());
        }
    };
    if el.is_text_node() || el.parent().is_some() {
        tracing::warn!(
            target: "kview::custom",
            tag = el.tag(),
            "factory returned a text node or an attached element; nothing rendered"
        );
        return Ok(());
    }

    apply_identity(&el, &node.common);
    apply_size(&el, node.common.width.as_ref(), node.common.height.as_ref());
    ctx.add(el.clone());
    bind_toggles(ctx, &node.common, &el)?;

    if let Some(init) = node.init.clone() {
        let model = ctx.weak_model();
        ctx.post_inits.push(move || {
            if let Some(model) = model.upgrade() {
                init(&*model);
            }
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bag, Item, mount, runtime};
    use crate::node::SingleNode;
    use kview_core::Element;
    use kview_reactive::{State, Value};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use tracing_test::traced_test;

    #[test]
    fn factory_element_is_inserted_with_identity() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("show", true));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.custom(
                CustomNode::new(|_: &Bag| Ok(Element::new("canvas")))
                    .id("chart")
                    .width(320)
                    .visible("show"),
            );
        });
        let canvas = app.query_selector("#chart").unwrap();
        assert_eq!(canvas.tag(), "canvas");
        assert_eq!(canvas.style("width").as_deref(), Some("320px"));
        bag.state.set("show", false).unwrap();
        assert_eq!(canvas.style("display").as_deref(), Some("none"));
    }

    #[test]
    #[traced_test]
    fn invalid_results_render_nothing() {
        let rt = runtime();
        let bag = Bag::new(State::new());
        let attached = Element::new("div");
        let parent = Element::new("section");
        parent.append_child(&attached);
        let (_h, app) = mount(&rt, &bag, move |v| {
            v.custom(CustomNode::new(|_: &Bag| Err(ViewError::factory("no canvas"))));
            v.custom(CustomNode::new(|_: &Bag| -> Result<Element, ViewError> {
                panic!("factory exploded")
            }));
            v.custom(CustomNode::new(|_: &Bag| Ok(Element::text_node("plain"))));
            v.custom(CustomNode::new(move |_: &Bag| Ok(attached.clone())));
        });
        assert_eq!(app.child_count(), 0);
        assert!(logs_contain("factory failed"));
        assert!(logs_contain("factory panicked"));
        assert!(logs_contain("attached element"));
    }

    #[test]
    fn init_runs_after_the_whole_tree_is_attached() {
        let rt = runtime();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let log = Rc::clone(&seen);
        rt.define_view::<Item>(move |v| {
            let log = Rc::clone(&log);
            v.custom(
                CustomNode::new(|_: &Item| {
                    let el = Element::new("canvas");
                    el.set_id("inner");
                    Ok(el)
                })
                .init(move |m: &Item| {
                    log.borrow_mut().push(m.state.text("name"));
                }),
            );
        });
        let item = Item::named("nested");
        let bag = Bag::new(State::new().with("current", Value::object(&item)));
        let probe = Rc::clone(&seen);
        let seen_during_build = Rc::new(Cell::new(None));
        let during = Rc::clone(&seen_during_build);
        let (_h, app) = mount(&rt, &bag, move |v| {
            v.single(SingleNode::new("current"));
            v.custom(CustomNode::new(move |_: &Bag| {
                during.set(Some(probe.borrow().len()));
                Ok(Element::new("div"))
            }));
        });
        // Built after the single view, yet the nested init had not run.
        assert_eq!(seen_during_build.get(), Some(0));
        assert_eq!(*seen.borrow(), ["nested"]);
        assert!(app.query_selector("#inner").unwrap().is_connected());
    }
}
