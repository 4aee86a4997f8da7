#![forbid(unsafe_code)]

//! List of views: one wrapper per object of a list field, each holding that
//! object's view. The whole list re-renders when the field changes.

use std::cell::RefCell;
use std::rc::Rc;

use kview_core::Element;
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_layout, apply_size, apply_styles};
use crate::error::ViewError;
use crate::node::ListNode;
use crate::runtime::{Ctx, PostInitQueue, RuntimeHandle, WeakRuntime};

struct Rows {
    runtime: WeakRuntime,
    container: Element,
    node: ListNode,
    children: RefCell<Vec<RuntimeHandle>>,
}

impl Rows {
    fn clear(&self) {
        let children = std::mem::take(&mut *self.children.borrow_mut());
        for child in children {
            child.stop();
        }
        self.container.clear_children();
    }

    fn render(&self, items: &Value, post_inits: Option<&PostInitQueue>) -> Result<(), ViewError> {
        self.clear();
        let Some(runtime) = self.runtime.upgrade() else {
            return Ok(());
        };
        for item in items.as_list().unwrap_or_default() {
            if !runtime.has_view_for(item) {
                continue;
            }
            let wrapper = runtime.surface().create_element("div");
            if self.node.layout.wrap {
                wrapper.set_style("box-sizing", "border-box");
                wrapper.set_style("flex", &runtime.config().list_flex_basis);
            }
            apply_styles(&wrapper, &self.node.element_style);
            apply_size(
                &wrapper,
                self.node.element_width.as_ref(),
                self.node.element_height.as_ref(),
            );
            self.container.append_child(&wrapper);
            if let Some(child) = runtime.mount_nested(item, &wrapper, post_inits)? {
                self.children.borrow_mut().push(child);
            }
        }
        Ok(())
    }
}

pub(super) fn build<T: Model>(node: &ListNode, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let container = ctx.create("div");
    apply_identity(&container, &node.common);
    apply_layout(&container, &node.layout);
    apply_size(&container, node.common.width.as_ref(), node.common.height.as_ref());
    ctx.add(container.clone());

    let rows = Rc::new(Rows {
        runtime: ctx.runtime.downgrade(),
        container,
        node: node.clone(),
        children: RefCell::new(Vec::new()),
    });
    rows.render(&ctx.state().get(&node.list), Some(ctx.post_inits))?;

    {
        let rows = Rc::clone(&rows);
        let field = node.list.clone();
        ctx.observe(&node.list, move |items: &Value, _: &Value| {
            if let Err(err) = rows.render(items, None) {
                tracing::warn!(target: "kview::list", field = %field, %err, "list re-render failed");
            }
        })?;
    }
    ctx.on_teardown(move || rows.clear());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bag, Item, define_item_view, mount, runtime};
    use kview_reactive::State;

    fn names(container: &Element) -> Vec<String> {
        container
            .query_selector_all(".item")
            .iter()
            .map(Element::text)
            .collect()
    }

    #[test]
    fn one_wrapper_per_viewable_object() {
        let rt = runtime();
        define_item_view(&rt);
        let items = Value::list([
            Value::object(&Item::named("a")),
            Value::from(7),
            Value::object(&Item::named("b")),
        ]);
        let bag = Bag::new(State::new().with("items", items));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.list(ListNode::new("items").element_width(120).element_style("padding", "4px"));
        });
        let container = app.first_child().unwrap();
        assert_eq!(container.style("flex-wrap").as_deref(), Some("wrap"));
        assert_eq!(container.child_count(), 2);
        let wrapper = container.first_child().unwrap();
        assert_eq!(wrapper.style("flex").as_deref(), Some("1 1 12rem"));
        assert_eq!(wrapper.style("box-sizing").as_deref(), Some("border-box"));
        assert_eq!(wrapper.style("width").as_deref(), Some("120px"));
        assert_eq!(wrapper.style("padding").as_deref(), Some("4px"));
        assert_eq!(names(&container), ["a", "b"]);
    }

    #[test]
    fn non_wrapping_list_leaves_wrappers_unstyled() {
        let rt = runtime();
        define_item_view(&rt);
        let bag = Bag::new(
            State::new().with("items", Value::list([Value::object(&Item::named("a"))])),
        );
        let (_h, app) = mount(&rt, &bag, |v| {
            v.list(ListNode::new("items").wrap(false));
        });
        let wrapper = app.first_child().unwrap().first_child().unwrap();
        assert_eq!(wrapper.style("flex"), None);
    }

    #[test]
    fn replacing_the_list_re_renders_and_stops_old_children() {
        let rt = runtime();
        define_item_view(&rt);
        let old = Item::named("old");
        let bag = Bag::new(State::new().with("items", Value::list([Value::object(&old)])));
        let (handle, app) = mount(&rt, &bag, |v| {
            v.list(ListNode::new("items"));
        });
        let container = app.first_child().unwrap();
        assert!(rt.observer_for(&old.state).is_observed("name"));

        let fresh = [Item::named("x"), Item::named("y")];
        bag.state
            .set("items", Value::list(fresh.iter().map(Value::object)))
            .unwrap();
        assert_eq!(names(&container), ["x", "y"]);
        assert!(!rt.observer_for(&old.state).is_observed("name"));

        handle.stop();
        assert_eq!(container.child_count(), 0);
        assert!(!rt.observer_for(&fresh[0].state).is_observed("name"));
    }

    #[test]
    fn non_list_value_renders_empty() {
        let rt = runtime();
        define_item_view(&rt);
        let bag = Bag::new(State::new().with("items", Value::Null));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.list(ListNode::new("items"));
        });
        assert_eq!(app.first_child().unwrap().child_count(), 0);
    }
}
