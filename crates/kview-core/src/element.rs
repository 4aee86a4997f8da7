#![forbid(unsafe_code)]

//! Retained element tree.
//!
//! An [`Element`] is a shared handle to one node of the presentation tree.
//! Cloning the handle never copies the node; equality is identity.
//!
//! # Invariants
//!
//! 1. A node has at most one parent; appending an attached node moves it.
//! 2. Listeners run in registration order; a listener removed while an event
//!    is being dispatched does not run for that event.
//! 3. Listener failures are contained per listener (see [`crate::contain`]).
//! 4. Disabled form controls ignore simulated user input.
//!
//! # Failure Modes
//!
//! - Focus and top-layer operations on a node that was never attached to a
//!   [`Surface`](crate::Surface) are silently ignored.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::contain::contain;
use crate::event::{Event, EventKind};
use crate::geometry::{Rect, Size};
use crate::number::{format_number, parse_number};
use crate::surface::{Surface, SurfaceInner};

/// Tag used for text nodes.
pub const TEXT_NODE: &str = "#text";

const FORM_CONTROLS: [&str; 6] = ["button", "input", "select", "textarea", "option", "fieldset"];

static LISTENER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a registered listener for later removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    pub(crate) fn next() -> Self {
        Self(LISTENER_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Raw id value.
    #[inline]
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// Shared listener callback.
pub type ListenerFn = Rc<dyn Fn(&Event)>;

pub(crate) struct Listener {
    pub(crate) id: ListenerId,
    pub(crate) kind: EventKind,
    pub(crate) callback: ListenerFn,
}

#[derive(Default)]
struct ElementData {
    attributes: Vec<(String, String)>,
    classes: Vec<String>,
    style: Vec<(String, String)>,
    text: String,
    markup: Option<String>,
    children: Vec<Element>,
    parent: Weak<ElementInner>,
    value: String,
    checked: bool,
    disabled: bool,
    multiple: bool,
    size: u32,
    selected: bool,
    open: bool,
    modal: bool,
    scroll_top: f64,
    bounds: Option<Rect>,
}

pub(crate) struct ElementInner {
    tag: String,
    data: RefCell<ElementData>,
    listeners: RefCell<Vec<Listener>>,
    owner: RefCell<Weak<SurfaceInner>>,
}

/// Shared handle to a node of the element tree.
#[derive(Clone)]
pub struct Element {
    inner: Rc<ElementInner>,
}

/// Non-owning element handle.
#[derive(Clone, Default)]
pub struct WeakElement {
    inner: Weak<ElementInner>,
}

impl WeakElement {
    #[must_use]
    pub fn upgrade(&self) -> Option<Element> {
        self.inner.upgrade().map(|inner| Element { inner })
    }
}

impl fmt::Debug for WeakElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upgrade() {
            Some(el) => write!(f, "WeakElement({el:?})"),
            None => f.write_str("WeakElement(<dropped>)"),
        }
    }
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for Element {}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Element");
        s.field("tag", &self.inner.tag);
        if let Some(id) = self.id() {
            s.field("id", &id);
        }
        s.finish()
    }
}

impl Element {
    /// Create a detached element. It joins a surface when appended under an
    /// attached node.
    #[must_use]
    pub fn new(tag: &str) -> Self {
        Self {
            inner: Rc::new(ElementInner {
                tag: tag.to_ascii_lowercase(),
                data: RefCell::new(ElementData::default()),
                listeners: RefCell::new(Vec::new()),
                owner: RefCell::new(Weak::new()),
            }),
        }
    }

    /// Create a detached text node.
    #[must_use]
    pub fn text_node(text: impl Into<String>) -> Self {
        let el = Self::new(TEXT_NODE);
        el.inner.data.borrow_mut().text = text.into();
        el
    }

    pub(crate) fn set_owner(&self, owner: &Weak<SurfaceInner>) {
        *self.inner.owner.borrow_mut() = owner.clone();
        for child in self.children() {
            child.set_owner(owner);
        }
    }

    /// The surface this element belongs to, if any.
    #[must_use]
    pub fn surface(&self) -> Option<Surface> {
        self.inner.owner.borrow().upgrade().map(Surface::from_inner)
    }

    #[must_use]
    pub fn downgrade(&self) -> WeakElement {
        WeakElement {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    #[must_use]
    pub fn is_text_node(&self) -> bool {
        self.inner.tag == TEXT_NODE
    }

    // --- Identity, attributes, classes ---------------------------------

    #[must_use]
    pub fn id(&self) -> Option<String> {
        self.attribute("id")
    }

    pub fn set_id(&self, id: &str) {
        self.set_attribute("id", id);
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<String> {
        self.inner
            .data
            .borrow()
            .attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.clone())
    }

    #[must_use]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    pub fn set_attribute(&self, name: &str, value: &str) {
        let mut data = self.inner.data.borrow_mut();
        if let Some(slot) = data.attributes.iter_mut().find(|(k, _)| k == name) {
            slot.1 = value.to_owned();
        } else {
            data.attributes.push((name.to_owned(), value.to_owned()));
        }
    }

    pub fn remove_attribute(&self, name: &str) {
        self.inner
            .data
            .borrow_mut()
            .attributes
            .retain(|(k, _)| k != name);
    }

    /// All attributes in insertion order.
    #[must_use]
    pub fn attributes(&self) -> Vec<(String, String)> {
        self.inner.data.borrow().attributes.clone()
    }

    #[must_use]
    pub fn classes(&self) -> Vec<String> {
        self.inner.data.borrow().classes.clone()
    }

    #[must_use]
    pub fn has_class(&self, class: &str) -> bool {
        self.inner.data.borrow().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        if class.is_empty() || self.has_class(class) {
            return;
        }
        self.inner.data.borrow_mut().classes.push(class.to_owned());
    }

    pub fn remove_class(&self, class: &str) {
        self.inner.data.borrow_mut().classes.retain(|c| c != class);
    }

    // --- Inline style ------------------------------------------------------

    #[must_use]
    pub fn style(&self, property: &str) -> Option<String> {
        self.inner
            .data
            .borrow()
            .style
            .iter()
            .find(|(k, _)| k == property)
            .map(|(_, v)| v.clone())
    }

    /// Set an inline style property; an empty value removes it.
    pub fn set_style(&self, property: &str, value: &str) {
        let mut data = self.inner.data.borrow_mut();
        if value.is_empty() {
            data.style.retain(|(k, _)| k != property);
            return;
        }
        if let Some(slot) = data.style.iter_mut().find(|(k, _)| k == property) {
            slot.1 = value.to_owned();
        } else {
            data.style.push((property.to_owned(), value.to_owned()));
        }
    }

    /// All inline style declarations in insertion order.
    #[must_use]
    pub fn styles(&self) -> Vec<(String, String)> {
        self.inner.data.borrow().style.clone()
    }

    // --- Content -------------------------------------------------------------

    /// Own text (for text nodes and leaf elements).
    #[must_use]
    pub fn text(&self) -> String {
        self.inner.data.borrow().text.clone()
    }

    /// Replace all content with plain text.
    pub fn set_text(&self, text: &str) {
        self.clear_children();
        let mut data = self.inner.data.borrow_mut();
        data.markup = None;
        data.text = text.to_owned();
    }

    /// Raw markup content, if the element holds any.
    #[must_use]
    pub fn markup(&self) -> Option<String> {
        self.inner.data.borrow().markup.clone()
    }

    /// Replace all content with raw (trusted) markup.
    pub fn set_markup(&self, markup: &str) {
        self.clear_children();
        let mut data = self.inner.data.borrow_mut();
        data.text.clear();
        data.markup = Some(markup.to_owned());
    }

    /// Remove text, markup, and children.
    pub fn clear_content(&self) {
        self.clear_children();
        let mut data = self.inner.data.borrow_mut();
        data.text.clear();
        data.markup = None;
    }

    /// Concatenated text of this node and its descendants; markup is
    /// reported verbatim.
    #[must_use]
    pub fn text_content(&self) -> String {
        let (own, markup, children) = {
            let data = self.inner.data.borrow();
            (data.text.clone(), data.markup.clone(), data.children.clone())
        };
        if let Some(markup) = markup {
            return markup;
        }
        let mut out = own;
        for child in children {
            out.push_str(&child.text_content());
        }
        out
    }

    // --- Tree ----------------------------------------------------------------

    #[must_use]
    pub fn parent(&self) -> Option<Element> {
        self.inner
            .data
            .borrow()
            .parent
            .upgrade()
            .map(|inner| Element { inner })
    }

    #[must_use]
    pub fn children(&self) -> Vec<Element> {
        self.inner.data.borrow().children.clone()
    }

    #[must_use]
    pub fn child_count(&self) -> usize {
        self.inner.data.borrow().children.len()
    }

    #[must_use]
    pub fn first_child(&self) -> Option<Element> {
        self.inner.data.borrow().children.first().cloned()
    }

    /// Append `child`, detaching it from any previous parent first.
    pub fn append_child(&self, child: &Element) {
        if child == self {
            return;
        }
        child.remove();
        child.inner.data.borrow_mut().parent = Rc::downgrade(&self.inner);
        let owner = self.inner.owner.borrow().clone();
        if owner.upgrade().is_some() {
            child.set_owner(&owner);
        }
        self.inner.data.borrow_mut().children.push(child.clone());
    }

    /// Append several children in order.
    pub fn append_all<'a>(&self, children: impl IntoIterator<Item = &'a Element>) {
        for child in children {
            self.append_child(child);
        }
    }

    pub fn remove_child(&self, child: &Element) {
        let removed = {
            let mut data = self.inner.data.borrow_mut();
            let before = data.children.len();
            data.children.retain(|c| c != child);
            before != data.children.len()
        };
        if removed {
            child.inner.data.borrow_mut().parent = Weak::new();
        }
    }

    /// Detach this element from its parent.
    pub fn remove(&self) {
        if let Some(parent) = self.parent() {
            parent.remove_child(self);
        }
    }

    /// Remove every child.
    pub fn clear_children(&self) {
        let children = std::mem::take(&mut self.inner.data.borrow_mut().children);
        for child in children {
            child.inner.data.borrow_mut().parent = Weak::new();
        }
    }

    /// Replace every child with `children`.
    pub fn replace_children(&self, children: &[Element]) {
        self.clear_children();
        self.append_all(children);
    }

    /// Nearest inclusive ancestor matching `pred`.
    pub fn closest(&self, pred: impl Fn(&Element) -> bool) -> Option<Element> {
        let mut cur = Some(self.clone());
        while let Some(el) = cur {
            if pred(&el) {
                return Some(el);
            }
            cur = el.parent();
        }
        None
    }

    /// Whether `self` is `other` or one of its ancestors.
    #[must_use]
    pub fn contains(&self, other: &Element) -> bool {
        other.closest(|el| el == self).is_some()
    }

    /// Descendants in document order (excluding `self`).
    #[must_use]
    pub fn descendants(&self) -> Vec<Element> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<Element>) {
        for child in self.children() {
            out.push(child.clone());
            child.collect_descendants(out);
        }
    }

    /// First descendant matching a selector.
    ///
    /// Supported: `#id`, `.class`, `tag`, `[attr]`, `[attr=value]`, compounds
    /// of those (`button.close`), descendant combinators (`#detail .name`)
    /// and comma-separated lists.
    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.descendants().into_iter().find(|el| el.matches(selector))
    }

    /// Every descendant matching a selector, in document order.
    #[must_use]
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        self.descendants()
            .into_iter()
            .filter(|el| el.matches(selector))
            .collect()
    }

    /// Match against a comma-separated selector list.
    #[must_use]
    pub fn matches(&self, selector: &str) -> bool {
        selector
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .any(|s| self.matches_complex(s))
    }

    /// The last compound matches `self`; each earlier one matches some
    /// ancestor above the previous match.
    fn matches_complex(&self, selector: &str) -> bool {
        let compounds = split_descendants(selector);
        let Some((last, rest)) = compounds.split_last() else {
            return false;
        };
        if !self.matches_compound(last) {
            return false;
        }
        let mut ancestor = self.parent();
        for compound in rest.iter().rev() {
            loop {
                let Some(el) = ancestor else {
                    return false;
                };
                ancestor = el.parent();
                if el.matches_compound(compound) {
                    break;
                }
            }
        }
        true
    }

    fn matches_compound(&self, compound: &str) -> bool {
        split_compound(compound)
            .into_iter()
            .all(|simple| self.matches_simple(simple))
    }

    fn matches_simple(&self, selector: &str) -> bool {
        if let Some(id) = selector.strip_prefix('#') {
            return self.id().as_deref() == Some(id);
        }
        if let Some(class) = selector.strip_prefix('.') {
            return self.has_class(class);
        }
        if let Some(body) = selector.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
            return match body.split_once('=') {
                Some((name, value)) => {
                    let value = value.trim_matches(|c| c == '"' || c == '\'');
                    self.attribute(name.trim()).as_deref() == Some(value)
                }
                None => self.has_attribute(body.trim()),
            };
        }
        self.tag().eq_ignore_ascii_case(selector)
    }

    /// Whether the element is attached under its surface's body.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        let Some(surface) = self.surface() else {
            return false;
        };
        let body = surface.body();
        self.closest(|el| *el == body).is_some()
    }

    /// Whether the element takes part in layout: connected, no inclusive
    /// ancestor hidden with `display: none`, and not inside a closed dialog.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        if !self.is_connected() {
            return false;
        }
        self.closest(|el| {
            el.style("display").as_deref() == Some("none") || (el.tag() == "dialog" && !el.is_open())
        })
        .is_none()
    }

    // --- Form-control state ------------------------------------------------

    #[must_use]
    pub fn is_form_control(&self) -> bool {
        FORM_CONTROLS.contains(&self.tag())
    }

    /// Current value. For `select` elements this is the value of the first
    /// selected option (empty when nothing is selected).
    #[must_use]
    pub fn value(&self) -> String {
        if self.tag() == "select" {
            return self
                .options()
                .into_iter()
                .find(Element::is_selected)
                .map(|o| o.value())
                .unwrap_or_default();
        }
        self.inner.data.borrow().value.clone()
    }

    /// Set the value. For `select` elements this selects the first option
    /// whose value matches (deselecting everything if none does).
    pub fn set_value(&self, value: &str) {
        if self.tag() == "select" {
            let mut found = false;
            for option in self.options() {
                let hit = !found && option.value() == value;
                found |= hit;
                option.set_selected(hit);
            }
            return;
        }
        self.inner.data.borrow_mut().value = value.to_owned();
    }

    /// Numeric view of the value; `NaN` when empty or unparsable.
    #[must_use]
    pub fn value_as_number(&self) -> f64 {
        let value = self.value();
        if value.trim().is_empty() {
            return f64::NAN;
        }
        parse_number(&value)
    }

    pub fn set_value_as_number(&self, n: f64) {
        let text = if n.is_nan() { String::new() } else { format_number(n) };
        self.set_value(&text);
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.inner.data.borrow().checked
    }

    pub fn set_checked(&self, checked: bool) {
        self.inner.data.borrow_mut().checked = checked;
    }

    #[must_use]
    pub fn is_disabled(&self) -> bool {
        self.inner.data.borrow().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.inner.data.borrow_mut().disabled = disabled;
    }

    #[must_use]
    pub fn is_multiple(&self) -> bool {
        self.inner.data.borrow().multiple
    }

    pub fn set_multiple(&self, multiple: bool) {
        self.inner.data.borrow_mut().multiple = multiple;
    }

    /// Visible row count of a list box.
    #[must_use]
    pub fn size(&self) -> u32 {
        self.inner.data.borrow().size
    }

    pub fn set_size(&self, size: u32) {
        self.inner.data.borrow_mut().size = size;
    }

    #[must_use]
    pub fn is_selected(&self) -> bool {
        self.inner.data.borrow().selected
    }

    pub fn set_selected(&self, selected: bool) {
        self.inner.data.borrow_mut().selected = selected;
    }

    /// `option` children of a `select`.
    #[must_use]
    pub fn options(&self) -> Vec<Element> {
        self.children()
            .into_iter()
            .filter(|c| c.tag() == "option")
            .collect()
    }

    /// Options currently selected, in order.
    #[must_use]
    pub fn selected_options(&self) -> Vec<Element> {
        self.options().into_iter().filter(Element::is_selected).collect()
    }

    /// Position of the first selected option.
    #[must_use]
    pub fn selected_index(&self) -> Option<usize> {
        self.options().iter().position(Element::is_selected)
    }

    /// Select exactly the option at `index` (or nothing).
    pub fn set_selected_index(&self, index: Option<usize>) {
        for (i, option) in self.options().into_iter().enumerate() {
            option.set_selected(Some(i) == index);
        }
    }

    // --- Dialog state --------------------------------------------------------

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.inner.data.borrow().open
    }

    #[must_use]
    pub fn is_modal(&self) -> bool {
        let data = self.inner.data.borrow();
        data.open && data.modal
    }

    /// Open as a non-modal dialog.
    pub fn show(&self) {
        let mut data = self.inner.data.borrow_mut();
        data.open = true;
        data.modal = false;
    }

    /// Open as a modal dialog in the surface's top layer.
    pub fn show_modal(&self) {
        if self.is_open() {
            return;
        }
        {
            let mut data = self.inner.data.borrow_mut();
            data.open = true;
            data.modal = true;
        }
        if let Some(surface) = self.surface() {
            surface.push_top_layer(self);
        }
    }

    /// Close the dialog and fire `close`. No-op when already closed.
    pub fn close(&self) {
        if !self.is_open() {
            return;
        }
        {
            let mut data = self.inner.data.borrow_mut();
            data.open = false;
            data.modal = false;
        }
        if let Some(surface) = self.surface() {
            surface.remove_top_layer(self);
        }
        self.dispatch(&Event::new(EventKind::Close, Some(self.clone())));
    }

    // --- Focus, scroll, layout -------------------------------------------

    #[must_use]
    pub fn tab_index(&self) -> Option<i32> {
        self.attribute("tabindex").and_then(|v| v.parse().ok())
    }

    pub fn set_tab_index(&self, index: i32) {
        self.set_attribute("tabindex", &index.to_string());
    }

    /// Move keyboard focus here.
    pub fn focus(&self) {
        if let Some(surface) = self.surface() {
            surface.set_focused(Some(self));
        }
    }

    #[must_use]
    pub fn is_focused(&self) -> bool {
        self.surface()
            .and_then(|s| s.active_element())
            .is_some_and(|el| el == *self)
    }

    #[must_use]
    pub fn scroll_top(&self) -> f64 {
        self.inner.data.borrow().scroll_top
    }

    pub fn set_scroll_top(&self, top: f64) {
        self.inner.data.borrow_mut().scroll_top = top.max(0.0);
    }

    /// Layout box assigned by the host.
    pub fn set_bounds(&self, bounds: Rect) {
        self.inner.data.borrow_mut().bounds = Some(bounds);
    }

    /// Viewport-relative box; zero when the host never laid it out.
    #[must_use]
    pub fn bounding_rect(&self) -> Rect {
        self.inner.data.borrow().bounds.unwrap_or_default()
    }

    /// Rendered size: the host-assigned box if any, otherwise pixel
    /// `width`/`height` from the inline style, otherwise zero.
    #[must_use]
    pub fn offset_size(&self) -> Size {
        if let Some(bounds) = self.inner.data.borrow().bounds {
            return bounds.size();
        }
        let px = |prop: &str| {
            self.style(prop)
                .and_then(|v| v.strip_suffix("px").and_then(|n| n.trim().parse::<f64>().ok()))
                .unwrap_or(0.0)
        };
        Size::new(px("width"), px("height"))
    }

    // --- Events --------------------------------------------------------------

    /// Register a listener for `kind`.
    pub fn add_listener(&self, kind: EventKind, callback: impl Fn(&Event) + 'static) -> ListenerId {
        let id = ListenerId::next();
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            kind,
            callback: Rc::new(callback),
        });
        id
    }

    /// Remove a listener; returns whether it was registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        before != listeners.len()
    }

    /// Number of listeners currently registered on this element.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn has_listener(&self, id: ListenerId) -> bool {
        self.inner.listeners.borrow().iter().any(|l| l.id == id)
    }

    fn listeners_for(&self, kind: EventKind) -> Vec<(ListenerId, ListenerFn)> {
        self.inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == kind)
            .map(|l| (l.id, Rc::clone(&l.callback)))
            .collect()
    }

    /// Deliver `event` to this element, then bubble to its ancestors when
    /// the kind bubbles.
    pub fn dispatch(&self, event: &Event) {
        let mut path = vec![self.clone()];
        if bubbles(event.kind()) {
            let mut cur = self.parent();
            while let Some(el) = cur {
                cur = el.parent();
                path.push(el);
            }
        }
        for node in path {
            if event.propagation_stopped() {
                break;
            }
            event.set_current_target(Some(node.clone()));
            for (id, callback) in node.listeners_for(event.kind()) {
                if !node.has_listener(id) {
                    continue;
                }
                contain("element.listener", || callback(event));
            }
        }
        event.set_current_target(None);
    }

    fn fire(&self, kind: EventKind) -> Event {
        let event = Event::new(kind, Some(self.clone()));
        self.dispatch(&event);
        event
    }

    // --- Simulated user input -------------------------------------------

    fn accepts_user_input(&self) -> bool {
        !(self.is_form_control() && self.is_disabled())
    }

    /// Simulate a pointer click. Checkboxes toggle and also fire `change`.
    pub fn click(&self) {
        if !self.accepts_user_input() {
            return;
        }
        let checkbox = self.tag() == "input" && self.attribute("type").as_deref() == Some("checkbox");
        if checkbox {
            let checked = self.is_checked();
            self.set_checked(!checked);
        }
        self.fire(EventKind::Click);
        if checkbox {
            self.fire(EventKind::Change);
        }
    }

    /// Simulate flipping a checkbox without a pointer: toggles and fires
    /// `change`.
    pub fn toggle_checked(&self) {
        if !self.accepts_user_input() {
            return;
        }
        let checked = self.is_checked();
        self.set_checked(!checked);
        self.fire(EventKind::Change);
    }

    /// Simulate typing: replace the value and fire `input`.
    pub fn input_text(&self, text: &str) {
        if !self.accepts_user_input() {
            return;
        }
        self.set_value(text);
        self.fire(EventKind::Input);
    }

    /// Simulate choosing options of a `select` by position and fire
    /// `change`. A single-selection list keeps only the first index.
    pub fn choose(&self, indices: &[usize]) {
        if !self.accepts_user_input() {
            return;
        }
        let chosen: Vec<usize> = if self.is_multiple() {
            indices.to_vec()
        } else {
            indices.first().copied().into_iter().collect()
        };
        for (i, option) in self.options().into_iter().enumerate() {
            option.set_selected(chosen.contains(&i));
        }
        self.fire(EventKind::Change);
    }
}

/// Split `a  b[x="1 2"]` into `["a", "b[x=\"1 2\"]"]`.
fn split_descendants(selector: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = None;
    let mut in_brackets = false;
    for (i, c) in selector.char_indices() {
        match c {
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            c if c.is_whitespace() && !in_brackets => {
                if let Some(from) = start.take() {
                    parts.push(&selector[from..i]);
                }
                continue;
            }
            _ => {}
        }
        start.get_or_insert(i);
    }
    if let Some(from) = start {
        parts.push(&selector[from..]);
    }
    parts
}

/// Split `button.close[type=button]` into its simple selectors.
fn split_compound(compound: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut in_brackets = false;
    for (i, c) in compound.char_indices() {
        match c {
            '[' | '#' | '.' if !in_brackets => {
                if i > start {
                    parts.push(&compound[start..i]);
                }
                start = i;
                in_brackets = c == '[';
            }
            ']' => in_brackets = false,
            _ => {}
        }
    }
    if start < compound.len() {
        parts.push(&compound[start..]);
    }
    parts
}

fn bubbles(kind: EventKind) -> bool {
    matches!(
        kind,
        EventKind::Click | EventKind::Input | EventKind::Change | EventKind::KeyDown
    )
}
