#![forbid(unsafe_code)]

//! Deterministic dumps of an element subtree.
//!
//! Text form, one node per line, two spaces of indent per level:
//!
//! ```text
//! div#app
//!   label style="display: block"
//!     "A "
//!     input type="number" style="width: 100%; height: 100%" value="1"
//!   span#sum "3"
//! ```
//!
//! An element line is the tag, `#id`, `.class` per class, the remaining
//! attributes and the inline style in insertion order, then live state
//! (`value=`, `:checked`, `:disabled`, `:selected`, `:open`, `:modal`) and
//! finally its own text or `html=` markup. Text nodes are quoted.

use kview_core::Element;
use serde_json::{Map, Value as Json, json};

/// Text outline of `root` and everything below it.
#[must_use]
pub fn outline(root: &Element) -> String {
    let mut out = String::new();
    write_node(root, 0, &mut out);
    out
}

fn write_node(el: &Element, depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
    if el.is_text_node() {
        out.push_str(&format!("{:?}", el.text()));
    } else {
        out.push_str(&describe(el));
    }
    out.push('\n');
    for child in el.children() {
        write_node(&child, depth + 1, out);
    }
}

fn describe(el: &Element) -> String {
    let mut line = el.tag().to_owned();
    if let Some(id) = el.id() {
        line.push('#');
        line.push_str(&id);
    }
    for class in el.classes() {
        line.push('.');
        line.push_str(&class);
    }
    for (name, value) in el.attributes() {
        if name != "id" {
            line.push_str(&format!(" {name}={value:?}"));
        }
    }
    let styles = el.styles();
    if !styles.is_empty() {
        let css: Vec<_> = styles.iter().map(|(k, v)| format!("{k}: {v}")).collect();
        line.push_str(&format!(" style={:?}", css.join("; ")));
    }
    if matches!(el.tag(), "input" | "textarea") && !el.value().is_empty() {
        line.push_str(&format!(" value={:?}", el.value()));
    }
    for (flag, on) in [
        (":checked", el.is_checked()),
        (":disabled", el.is_disabled()),
        (":selected", el.is_selected()),
        (":open", el.is_open()),
        (":modal", el.is_modal()),
    ] {
        if on {
            line.push(' ');
            line.push_str(flag);
        }
    }
    if let Some(markup) = el.markup() {
        line.push_str(&format!(" html={markup:?}"));
    } else if !el.text().is_empty() {
        line.push_str(&format!(" {:?}", el.text()));
    }
    line
}

/// JSON outline of `root`. Empty parts are omitted.
#[must_use]
pub fn outline_json(root: &Element) -> Json {
    if root.is_text_node() {
        return json!({ "text": root.text() });
    }
    let mut node = Map::new();
    node.insert("tag".into(), json!(root.tag()));
    if let Some(id) = root.id() {
        node.insert("id".into(), json!(id));
    }
    let classes = root.classes();
    if !classes.is_empty() {
        node.insert("classes".into(), json!(classes));
    }
    let attributes: Map<String, Json> = root
        .attributes()
        .into_iter()
        .filter(|(name, _)| name != "id")
        .map(|(name, value)| (name, Json::String(value)))
        .collect();
    if !attributes.is_empty() {
        node.insert("attributes".into(), Json::Object(attributes));
    }
    let style: Map<String, Json> = root
        .styles()
        .into_iter()
        .map(|(name, value)| (name, Json::String(value)))
        .collect();
    if !style.is_empty() {
        node.insert("style".into(), Json::Object(style));
    }
    if let Some(markup) = root.markup() {
        node.insert("html".into(), json!(markup));
    } else if !root.text().is_empty() {
        node.insert("text".into(), json!(root.text()));
    }
    let children: Vec<_> = root.children().iter().map(outline_json).collect();
    if !children.is_empty() {
        node.insert("children".into(), Json::Array(children));
    }
    Json::Object(node)
}

/// blake3 digest (hex) of the text outline. Equal digests mean equal trees
/// as far as [`outline`] can tell.
#[must_use]
pub fn outline_digest(root: &Element) -> String {
    blake3::hash(outline(root).as_bytes()).to_hex().to_string()
}
