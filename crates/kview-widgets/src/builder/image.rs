#![forbid(unsafe_code)]

//! Image: an `<img>` whose `src` follows a string field.

use kview_core::Element;
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_toggles};
use crate::error::ViewError;
use crate::node::ImageNode;
use crate::runtime::Ctx;

fn set_src(img: &Element, url: &str) {
    let current = img.attribute("src").unwrap_or_default();
    if current == url {
        return;
    }
    if url.is_empty() {
        img.remove_attribute("src");
    } else {
        img.set_attribute("src", url);
    }
}

pub(super) fn build<T: Model>(node: &ImageNode, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let img = ctx.create("img");
    apply_identity(&img, &node.common);
    apply_size(&img, node.common.width.as_ref(), node.common.height.as_ref());
    if let Some(alt) = &node.alt {
        img.set_attribute("alt", alt);
    }
    set_src(&img, &ctx.state().get(&node.url).to_text());
    ctx.add(img.clone());

    bind_toggles(ctx, &node.common, &img)?;

    let target = img.clone();
    ctx.observe(&node.url, move |value: &Value, _: &Value| {
        set_src(&target, &value.to_text());
    })
}
