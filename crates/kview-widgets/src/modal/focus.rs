#![forbid(unsafe_code)]

//! Keyboard focus cycling inside an open menu panel.

use kview_core::Element;

/// Selector for elements a click inside a menu panel treats as an item.
pub const MENU_ITEM_SELECTOR: &str = "[data-menu-close], [role=menuitem], button, a";

fn is_candidate(el: &Element) -> bool {
    match el.tag() {
        "button" | "input" | "select" | "textarea" => true,
        "a" if el.has_attribute("href") => true,
        _ => {
            el.attribute("role").as_deref() == Some("menuitem")
                || el.attribute("tabindex").is_some_and(|t| t.trim() != "-1")
        }
    }
}

/// Focusable descendants of `panel` in document order: items, links with an
/// `href`, form controls and explicit tab stops, minus anything disabled or
/// not rendered.
#[must_use]
pub fn focusables(panel: &Element) -> Vec<Element> {
    panel
        .descendants()
        .into_iter()
        .filter(|el| !el.is_text_node() && is_candidate(el))
        .filter(|el| !el.has_attribute("disabled") && !el.is_disabled())
        .filter(Element::is_rendered)
        .collect()
}

/// The element to focus after one arrow press, wrapping at both ends.
///
/// With nothing in `list` focused, moving forward lands on the first entry
/// and moving backward on the last.
#[must_use]
pub fn next_focus(list: &[Element], current: Option<&Element>, forward: bool) -> Option<Element> {
    if list.is_empty() {
        return None;
    }
    let len = list.len();
    let index = current.and_then(|cur| list.iter().position(|el| el == cur));
    let next = match (index, forward) {
        (Some(i), true) => (i + 1) % len,
        (Some(i), false) => (i + len - 1) % len,
        (None, true) => 0,
        (None, false) => len - 1,
    };
    list.get(next).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kview_core::Surface;

    fn panel_with(tags: &[&str]) -> (Surface, Element, Vec<Element>) {
        let surface = Surface::default();
        let panel = surface.create_element("div");
        surface.body().append_child(&panel);
        let children: Vec<_> = tags
            .iter()
            .map(|tag| {
                let el = surface.create_element(tag);
                panel.append_child(&el);
                el
            })
            .collect();
        (surface, panel, children)
    }

    #[test]
    fn collects_items_controls_and_tab_stops() {
        let (_s, panel, els) = panel_with(&["button", "a", "a", "span", "div", "div", "input"]);
        els[2].set_attribute("href", "#x");
        els[3].set_attribute("role", "menuitem");
        els[4].set_tab_index(0);
        els[5].set_tab_index(-1);
        let found = focusables(&panel);
        assert_eq!(found, [els[0].clone(), els[2].clone(), els[3].clone(), els[4].clone(), els[6].clone()]);
    }

    #[test]
    fn skips_disabled_and_hidden() {
        let (_s, panel, els) = panel_with(&["button", "button", "button"]);
        els[0].set_disabled(true);
        els[1].set_style("display", "none");
        assert_eq!(focusables(&panel), [els[2].clone()]);
    }

    #[test]
    fn cycling_wraps_both_ways() {
        let (_s, _panel, els) = panel_with(&["button", "button", "button"]);
        assert_eq!(next_focus(&els, Some(&els[2]), true), Some(els[0].clone()));
        assert_eq!(next_focus(&els, Some(&els[0]), false), Some(els[2].clone()));
        assert_eq!(next_focus(&els, Some(&els[0]), true), Some(els[1].clone()));
    }

    #[test]
    fn nothing_focused_starts_at_an_end() {
        let (_s, _panel, els) = panel_with(&["button", "button"]);
        assert_eq!(next_focus(&els, None, true), Some(els[0].clone()));
        assert_eq!(next_focus(&els, None, false), Some(els[1].clone()));
        assert_eq!(next_focus(&[], None, true), None);
    }

    #[test]
    fn item_selector_matches_closable_targets() {
        let item = Element::new("li");
        item.set_attribute("role", "menuitem");
        assert!(item.matches(MENU_ITEM_SELECTOR));
        let marker = Element::new("span");
        marker.set_attribute("data-menu-close", "");
        assert!(marker.matches(MENU_ITEM_SELECTOR));
        assert!(!Element::new("span").matches(MENU_ITEM_SELECTOR));
    }
}
