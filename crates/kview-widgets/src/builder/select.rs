#![forbid(unsafe_code)]

//! Choice list: options projected from a list field, selection kept in a
//! separate indices field.
//!
//! # Invariants
//!
//! 1. A change to the list field rebuilds every option, then re-syncs the
//!    selection; indices past the end are never shown as selected.
//! 2. A change to the selection field re-syncs without a rebuild.
//! 3. Single-selection modes show the first in-range index only.

use std::rc::Rc;

use kview_core::{Element, EventKind, contain};
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_toggles, write_back};
use crate::config::RuntimeConfig;
use crate::error::ViewError;
use crate::node::{DisplayFn, SelectMode, SelectNode};
use crate::runtime::Ctx;

struct Choices<T> {
    select: Element,
    mode: SelectMode,
    display: Option<DisplayFn<T>>,
    config: RuntimeConfig,
}

impl<T: Model> Choices<T> {
    fn rebuild(&self, model: &T, items: &Value) {
        self.select.clear_children();
        let items = items.as_list().unwrap_or(&[]);
        for (index, item) in items.iter().enumerate() {
            let option = Element::new("option");
            option.set_value(&index.to_string());
            let text = self
                .display
                .as_ref()
                .and_then(|display| contain("select.display", || display(model, item)))
                .unwrap_or_else(|| item.to_text());
            option.set_text(&text);
            self.select.append_child(&option);
        }
        let size = match self.mode {
            SelectMode::Dropdown => 1,
            SelectMode::List | SelectMode::MultiList => self.config.rows_for(items.len()),
        };
        self.select.set_size(size);
    }

    fn sync(&self, selection: &Value) {
        let indices = selection.to_indices();
        let options = self.select.options();
        if self.select.is_multiple() {
            for (index, option) in options.iter().enumerate() {
                option.set_selected(indices.contains(&index));
            }
        } else {
            let first = indices.into_iter().find(|&i| i < options.len());
            self.select.set_selected_index(first);
        }
    }

    /// Indices the user currently has selected.
    fn read(&self) -> Vec<usize> {
        if self.select.is_multiple() {
            self.select
                .selected_options()
                .iter()
                .filter_map(|option| option.value().parse().ok())
                .collect()
        } else {
            self.select.selected_index().into_iter().collect()
        }
    }
}

pub(super) fn build<T: Model>(node: &SelectNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let select = ctx.create("select");
    apply_identity(&select, &node.common);
    select.set_multiple(node.mode == SelectMode::MultiList);
    apply_size(&select, node.common.width.as_ref(), node.common.height.as_ref());
    ctx.add(select.clone());

    bind_toggles(ctx, &node.common, &select)?;

    let choices = Rc::new(Choices {
        select: select.clone(),
        mode: node.mode,
        display: node.display.clone(),
        config: ctx.config().clone(),
    });
    choices.rebuild(ctx.model, &ctx.state().get(&node.list));
    choices.sync(&ctx.state().get(&node.selection));

    {
        let choices = Rc::clone(&choices);
        let model = ctx.weak_model();
        let selection = node.selection.clone();
        ctx.observe(&node.list, move |items: &Value, _: &Value| {
            let Some(model) = model.upgrade() else {
                return;
            };
            choices.rebuild(&model, items);
            choices.sync(&model.state().get(&selection));
        })?;
    }
    {
        let choices = Rc::clone(&choices);
        ctx.observe(&node.selection, move |selection: &Value, _: &Value| {
            choices.sync(selection);
        })?;
    }

    let model = ctx.weak_model();
    let observer = ctx.observer.clone();
    let field = node.selection.clone();
    let update = node.update.clone();
    let muted = node.muted;
    ctx.listen(&select, EventKind::Change, move |_| {
        let Some(model) = model.upgrade() else {
            return;
        };
        let indices = Value::indices(&choices.read());
        write_back(&*model, &observer, &field, indices, muted, update.as_ref());
    });
    Ok(())
}
