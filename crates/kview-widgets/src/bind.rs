#![forbid(unsafe_code)]

//! Element helpers shared by node builders: identity, sizing, visibility and
//! enabled bindings, trigger rendering, and UI-to-model write-back.

use kview_core::Element;
use kview_reactive::{Model, Observer, Value};

use crate::error::ViewError;
use crate::node::{Common, ContentType, FlexLayout, Length, Method};
use crate::runtime::Ctx;

/// Apply `id` and classes.
pub(crate) fn apply_identity(el: &Element, common: &Common) {
    if let Some(id) = common.id.as_deref().filter(|id| !id.is_empty()) {
        el.set_id(id);
    }
    for class in &common.classes {
        el.add_class(class);
    }
}

pub(crate) fn apply_size(el: &Element, width: Option<&Length>, height: Option<&Length>) {
    if let Some(width) = width {
        el.set_style("width", &width.to_css());
    }
    if let Some(height) = height {
        el.set_style("height", &height.to_css());
    }
}

pub(crate) fn apply_styles(el: &Element, styles: &[(String, String)]) {
    for (property, value) in styles {
        el.set_style(property, value);
    }
}

/// Flex container styling shared by flows and lists of views.
pub(crate) fn apply_layout(el: &Element, layout: &FlexLayout) {
    el.set_style("display", "flex");
    el.set_style("flex-direction", layout.orientation.as_css());
    if let Some(gap) = &layout.gap {
        el.set_style("gap", &gap.to_css());
    }
    if let Some(justify) = layout.justify {
        el.set_style("justify-content", justify.as_css());
    }
    if let Some(align) = layout.align {
        el.set_style("align-items", align.as_css());
    }
    if layout.wrap {
        el.set_style("flex-wrap", "wrap");
    }
    apply_styles(el, &layout.style);
    if layout.panel {
        el.add_class("panel");
    }
}

/// Show or hide `el`. A no-op when the state already matches.
pub(crate) fn set_visible(el: &Element, visible: bool) {
    let hidden = el.style("display").as_deref() == Some("none");
    if hidden != visible {
        return;
    }
    el.set_style("display", if visible { "" } else { "none" });
}

/// Enable or disable `el`: the `disabled` flag on form controls,
/// `aria-disabled` elsewhere. A no-op when the state already matches.
pub(crate) fn set_enabled(el: &Element, enabled: bool) {
    if el.is_form_control() {
        if el.is_disabled() == enabled {
            el.set_disabled(!enabled);
        }
        return;
    }
    let value = if enabled { "false" } else { "true" };
    if el.attribute("aria-disabled").as_deref() != Some(value) {
        el.set_attribute("aria-disabled", value);
    }
}

pub(crate) fn bind_visible<T: Model>(
    ctx: &Ctx<'_, T>,
    field: Option<&str>,
    el: &Element,
) -> Result<(), ViewError> {
    let Some(field) = field else {
        return Ok(());
    };
    set_visible(el, ctx.state().get(field).truthy());
    let el = el.clone();
    ctx.observe(field, move |value: &Value, _: &Value| {
        set_visible(&el, value.truthy());
    })
}

pub(crate) fn bind_enabled<T: Model>(
    ctx: &Ctx<'_, T>,
    field: Option<&str>,
    el: &Element,
) -> Result<(), ViewError> {
    let Some(field) = field else {
        return Ok(());
    };
    set_enabled(el, ctx.state().get(field).truthy());
    let el = el.clone();
    ctx.observe(field, move |value: &Value, _: &Value| {
        set_enabled(&el, value.truthy());
    })
}

/// Bind both toggles of `common` to one element.
pub(crate) fn bind_toggles<T: Model>(
    ctx: &Ctx<'_, T>,
    common: &Common,
    el: &Element,
) -> Result<(), ViewError> {
    bind_visible(ctx, common.visible.as_deref(), el)?;
    bind_enabled(ctx, common.enable.as_deref(), el)
}

/// Render `source` into a button-like element.
pub(crate) fn render_trigger(el: &Element, source: &str, content: ContentType) {
    match content {
        ContentType::Text => {
            if el.markup().is_some() || el.child_count() > 0 || el.text() != source {
                el.set_text(source);
            }
        }
        ContentType::Html => {
            if el.markup().as_deref() != Some(source) {
                el.set_markup(source);
            }
        }
        ContentType::Image => {
            el.clear_content();
            let img = Element::new("img");
            if !source.is_empty() {
                img.set_attribute("src", source);
            }
            img.set_attribute("alt", "");
            img.set_style("max-width", "100%");
            img.set_style("max-height", "100%");
            img.set_style("pointer-events", "none");
            el.append_child(&img);
        }
    }
}

/// Set the alt text of the image rendered by [`render_trigger`].
pub(crate) fn set_trigger_alt(el: &Element, alt: &str) {
    if let Some(img) = el.query_selector("img") {
        img.set_attribute("alt", alt);
    }
}

/// Push a user edit into the model.
///
/// Plain mode writes the field (notifying its handlers) and then calls
/// `update`. Muted mode writes silently and calls `update` with every field
/// muted.
pub(crate) fn write_back<T: Model>(
    model: &T,
    observer: &Observer,
    field: &str,
    value: Value,
    muted: bool,
    update: Option<&Method<T>>,
) {
    if muted {
        if let Err(err) = observer.write_silently(field, value) {
            tracing::warn!(target: "kview::binding", field, %err, "silent write rejected");
        }
        if let Some(update) = update {
            observer.mute_all(|| update(model));
        }
    } else {
        if let Err(err) = model.state().set(field, value) {
            tracing::warn!(target: "kview::binding", field, %err, "write rejected");
        }
        if let Some(update) = update {
            update(model);
        }
    }
}
