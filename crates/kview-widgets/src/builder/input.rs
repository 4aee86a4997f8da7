#![forbid(unsafe_code)]

//! Input: a `<label>` wrapper around a two-way bound `<input>`.

use kview_core::{Element, EventKind, parse_number};
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_enabled, bind_visible, write_back};
use crate::error::ViewError;
use crate::node::{InputNode, InputType, Length};
use crate::runtime::Ctx;

/// Concrete control type after resolving [`InputType::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Text,
    Number,
    Checkbox,
}

impl Control {
    fn resolve(requested: InputType, current: &Value) -> Self {
        match requested {
            InputType::Text => Self::Text,
            InputType::Number => Self::Number,
            InputType::Checkbox => Self::Checkbox,
            InputType::Auto => match current {
                Value::Bool(_) => Self::Checkbox,
                Value::Number(_) => Self::Number,
                _ => Self::Text,
            },
        }
    }

    fn attr(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Number => "number",
            Self::Checkbox => "checkbox",
        }
    }

    fn event(self) -> EventKind {
        match self {
            Self::Checkbox => EventKind::Change,
            Self::Text | Self::Number => EventKind::Input,
        }
    }

    /// Model to control. Only touches the control when the shown value
    /// differs.
    fn show(self, input: &Element, value: &Value) {
        match self {
            Self::Checkbox => {
                let checked = value.truthy();
                if input.is_checked() != checked {
                    input.set_checked(checked);
                }
            }
            Self::Number => {
                let n = value.as_number();
                if !Value::Number(input.value_as_number()).same_value(&Value::Number(n)) {
                    input.set_value_as_number(n);
                }
            }
            Self::Text => {
                let text = value.to_text();
                if input.value() != text {
                    input.set_value(&text);
                }
            }
        }
    }

    /// Control to model.
    fn read(self, input: &Element) -> Value {
        match self {
            Self::Checkbox => Value::Bool(input.is_checked()),
            Self::Number => {
                let n = input.value_as_number();
                Value::Number(if n.is_finite() { n } else { parse_number(&input.value()) })
            }
            Self::Text => Value::Text(input.value()),
        }
    }
}

pub(super) fn build<T: Model>(node: &InputNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let wrapper = ctx.create("label");
    apply_identity(&wrapper, &node.common);
    wrapper.set_style("display", "block");
    if let Some(label) = node.label.as_deref().filter(|l| !l.is_empty()) {
        wrapper.append_child(&Element::text_node(format!("{label} ")));
    }

    let input = ctx.create("input");
    apply_size(&wrapper, node.common.width.as_ref(), node.common.height.as_ref());
    let full = Length::from("100%");
    apply_size(&input, Some(&full), Some(&full));

    let current = ctx.state().get(&node.name);
    let control = Control::resolve(node.input_type, &current);
    input.set_attribute("type", control.attr());
    match control {
        Control::Number => {
            let n = current.as_number();
            input.set_value_as_number(if n.is_finite() { n } else { 0.0 });
        }
        _ => control.show(&input, &current),
    }

    wrapper.append_child(&input);
    ctx.add(wrapper.clone());

    bind_visible(ctx, node.common.visible.as_deref(), &wrapper)?;
    bind_enabled(ctx, node.common.enable.as_deref(), &input)?;

    let shown = input.clone();
    ctx.observe(&node.name, move |value: &Value, _: &Value| {
        control.show(&shown, value);
    })?;

    let model = ctx.weak_model();
    let observer = ctx.observer.clone();
    let field = node.name.clone();
    let update = node.update.clone();
    let muted = node.muted;
    let source = input.downgrade();
    ctx.listen(&input, control.event(), move |_| {
        let (Some(model), Some(input)) = (model.upgrade(), source.upgrade()) else {
            return;
        };
        let next = control.read(&input);
        write_back(&*model, &observer, &field, next, muted, update.as_ref());
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Bag, mount, runtime};
    use kview_reactive::State;
    use std::cell::Cell;
    use std::rc::Rc;

    fn input_in(app: &Element) -> Element {
        app.query_selector("input").expect("input element")
    }

    #[test]
    fn type_is_guessed_from_the_current_value() {
        assert_eq!(Control::resolve(InputType::Auto, &Value::Bool(true)), Control::Checkbox);
        assert_eq!(Control::resolve(InputType::Auto, &Value::from(1)), Control::Number);
        assert_eq!(Control::resolve(InputType::Auto, &Value::Null), Control::Text);
        assert_eq!(Control::resolve(InputType::Text, &Value::from(1)), Control::Text);
    }

    #[test]
    fn wrapper_carries_label_and_size() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("title", "hello"));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.input(InputNode::new("title").label("Title").width(200).id("t"));
        });
        let wrapper = app.first_child().unwrap();
        assert_eq!(wrapper.tag(), "label");
        assert_eq!(wrapper.id().as_deref(), Some("t"));
        assert_eq!(wrapper.style("width").as_deref(), Some("200px"));
        assert_eq!(wrapper.style("display").as_deref(), Some("block"));
        assert!(wrapper.text_content().starts_with("Title "));
        let input = input_in(&app);
        assert_eq!(input.attribute("type").as_deref(), Some("text"));
        assert_eq!(input.value(), "hello");
        assert_eq!(input.style("width").as_deref(), Some("100%"));
    }

    #[test]
    fn typing_writes_the_field_then_calls_update() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("a", 1).with("b", 2).with("sum", 3));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.input(InputNode::new("a").update(|m: &Bag| {
                let sum = m.state.number("a") + m.state.number("b");
                m.state.set("sum", sum).unwrap();
            }));
            v.label(crate::node::LabelNode::new("sum").id("sum"));
        });
        let input = input_in(&app);
        assert_eq!(input.attribute("type").as_deref(), Some("number"));
        input.input_text("40");
        assert_eq!(bag.state.get("a"), Value::from(40));
        assert_eq!(bag.state.get("sum"), Value::from(42));
        assert_eq!(app.query_selector("#sum").unwrap().text(), "42");
    }

    #[test]
    fn empty_number_input_writes_zero() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("n", 5));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.input(InputNode::new("n"));
        });
        input_in(&app).input_text("");
        assert_eq!(bag.state.get("n"), Value::from(0));
    }

    #[test]
    fn programmatic_writes_reach_the_control() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("done", false).with("name", "a"));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.input(InputNode::new("done"));
            v.input(InputNode::new("name"));
        });
        let inputs = app.query_selector_all("input");
        bag.state.set("done", true).unwrap();
        assert!(inputs[0].is_checked());
        bag.state.set("name", "b").unwrap();
        assert_eq!(inputs[1].value(), "b");
        bag.state.set("name", Value::Null).unwrap();
        assert_eq!(inputs[1].value(), "");
    }

    #[test]
    fn checkbox_writes_on_change() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("done", false));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.input(InputNode::new("done"));
        });
        input_in(&app).click();
        assert_eq!(bag.state.get("done"), Value::Bool(true));
    }

    #[test]
    fn muted_input_writes_silently_and_mutes_update() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("q", "").with("hits", 0));
        let echoes = Rc::new(Cell::new(0));
        let (handle, app) = mount(&rt, &bag, |v| {
            v.input(InputNode::new("q").muted(true).update(|m: &Bag| {
                m.state.set("hits", m.state.number("hits") + 1.0).unwrap();
            }));
        });
        let e = Rc::clone(&echoes);
        let _sub = handle
            .observer()
            .observe("q", move |_, _| e.set(e.get() + 1))
            .unwrap();
        input_in(&app).input_text("abc");
        assert_eq!(bag.state.get("q"), Value::from("abc"));
        assert_eq!(bag.state.get("hits"), Value::from(1));
        assert_eq!(echoes.get(), 0);
    }

    #[test]
    fn visible_on_wrapper_enabled_on_control() {
        let rt = runtime();
        let bag = Bag::new(State::new().with("x", "").with("show", false).with("on", false));
        let (_h, app) = mount(&rt, &bag, |v| {
            v.input(InputNode::new("x").visible("show").enable("on"));
        });
        let wrapper = app.first_child().unwrap();
        let input = input_in(&app);
        assert_eq!(wrapper.style("display").as_deref(), Some("none"));
        assert!(input.is_disabled());
        bag.state.set("show", true).unwrap();
        bag.state.set("on", true).unwrap();
        assert!(wrapper.is_rendered());
        assert!(!input.is_disabled());
    }
}
