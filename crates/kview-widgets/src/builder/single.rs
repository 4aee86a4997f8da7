#![forbid(unsafe_code)]

//! Single view: the view of whatever object one field holds, swapped out
//! whenever the field changes.

use std::rc::Rc;

use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size};
use crate::error::ViewError;
use crate::node::SingleNode;
use crate::runtime::Ctx;

use super::slot::Slot;

pub(super) fn build<T: Model>(node: &SingleNode, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let host = ctx.create("div");
    apply_identity(&host, &node.common);
    apply_size(&host, node.common.width.as_ref(), node.common.height.as_ref());
    ctx.add(host.clone());

    let slot = Rc::new(Slot::new(ctx.runtime.downgrade(), host));
    slot.show(&ctx.state().get(&node.name), Some(ctx.post_inits))?;

    {
        let slot = Rc::clone(&slot);
        let field = node.name.clone();
        ctx.observe(&node.name, move |value: &Value, _: &Value| {
            if let Err(err) = slot.show(value, None) {
                tracing::warn!(target: "kview::single", field = %field, %err, "nested mount failed");
            }
        })?;
    }
    ctx.on_teardown(move || slot.clear());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bag, Item, define_item_view, mount, runtime};
    use kview_reactive::State;

    #[test]
    fn null_object_null_round_trip() {
        let rt = runtime();
        define_item_view(&rt);
        let bag = Bag::new(State::new().with("current", Value::Null));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.single(SingleNode::new("current").id("slot"));
        });
        let host = app.query_selector("#slot").unwrap();
        assert_eq!(host.child_count(), 0);

        let item = Item::named("first");
        bag.state.set("current", Value::object(&item)).unwrap();
        assert_eq!(host.child_count(), 1);
        assert_eq!(host.query_selector(".item").unwrap().text(), "first");
        assert!(rt.observer_for(&item.state).is_observed("name"));

        item.state.set("name", "renamed").unwrap();
        assert_eq!(host.text_content(), "renamed");

        bag.state.set("current", Value::Null).unwrap();
        assert_eq!(host.child_count(), 0);
        assert!(!rt.observer_for(&item.state).is_observed("name"));
    }

    #[test]
    fn swapping_objects_stops_the_previous_view() {
        let rt = runtime();
        define_item_view(&rt);
        let a = Item::named("a");
        let b = Item::named("b");
        let bag = Bag::new(State::new().with("current", Value::object(&a)));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.single(SingleNode::new("current"));
        });
        assert_eq!(app.text_content(), "a");
        bag.state.set("current", Value::object(&b)).unwrap();
        assert_eq!(app.text_content(), "b");
        assert!(!rt.observer_for(&a.state).is_observed("name"));
        assert_eq!(app.query_selector_all(".item").len(), 1);
    }

    #[test]
    fn objects_without_a_view_render_nothing() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("current", Value::object(&Item::named("x"))));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.single(SingleNode::new("current"));
        });
        assert_eq!(app.first_child().unwrap().child_count(), 0);
    }

    #[test]
    fn stopping_the_parent_stops_the_child() {
        let rt = runtime();
        define_item_view(&rt);
        let item = Item::named("x");
        let bag = Bag::new(State::new().with("current", Value::object(&item)));
        let (handle, app) = mount(&rt, &bag, |v| {
            v.single(SingleNode::new("current"));
        });
        handle.stop();
        assert!(!rt.observer_for(&item.state).is_observed("name"));
        assert_eq!(app.first_child().unwrap().child_count(), 0);
    }
}
