#![forbid(unsafe_code)]

//! Headless presentation surface.
//!
//! A [`Surface`] plays the role of the document: it owns the body element,
//! the viewport size, keyboard focus, the top layer of open modal dialogs,
//! document-level listeners, and two deferred queues (zero-delay timers and
//! next-paint callbacks). Nothing runs deferred work automatically; the host
//! (or a test) drains the queues with [`Surface::run_timers`],
//! [`Surface::run_frames`] or [`Surface::flush`].
//!
//! # Invariants
//!
//! 1. Document key listeners run before the focused element's listeners
//!    (capture phase) and may stop the event from reaching it.
//! 2. Escape, unless prevented, fires `cancel` on the topmost open modal
//!    dialog and closes it unless `cancel` is prevented.
//! 3. Deferred tasks run in scheduling order; tasks scheduled while a batch
//!    runs wait for the next batch.
//!
//! # Failure Modes
//!
//! - [`Surface::flush`] gives up after a bounded number of rounds when
//!   tasks keep rescheduling themselves, logging a warning.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::contain::contain;
use crate::element::{Element, Listener, ListenerId, WeakElement};
use crate::event::{Event, EventKind, Key, KeyEvent};
use crate::geometry::Size;

const FLUSH_ROUND_LIMIT: usize = 1_000;

static TASK_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Identifies a scheduled timer or frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

impl TaskId {
    fn next() -> Self {
        Self(TASK_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

type Task = (TaskId, Box<dyn FnOnce()>);

pub(crate) struct SurfaceInner {
    body: Element,
    viewport: Cell<Size>,
    focused: RefCell<Option<WeakElement>>,
    top_layer: RefCell<Vec<WeakElement>>,
    listeners: RefCell<Vec<Listener>>,
    timers: RefCell<VecDeque<Task>>,
    frames: RefCell<VecDeque<Task>>,
}

/// Shared handle to the presentation surface.
#[derive(Clone)]
pub struct Surface {
    inner: Rc<SurfaceInner>,
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("viewport", &self.inner.viewport.get())
            .field("pending_timers", &self.inner.timers.borrow().len())
            .field("pending_frames", &self.inner.frames.borrow().len())
            .finish()
    }
}

impl Default for Surface {
    fn default() -> Self {
        Self::new(Size::new(1024.0, 768.0))
    }
}

impl PartialEq for Surface {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Surface {
    /// Create an empty surface with the given viewport.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        let inner = Rc::new(SurfaceInner {
            body: Element::new("body"),
            viewport: Cell::new(viewport),
            focused: RefCell::new(None),
            top_layer: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            timers: RefCell::new(VecDeque::new()),
            frames: RefCell::new(VecDeque::new()),
        });
        inner.body.set_owner(&Rc::downgrade(&inner));
        Self { inner }
    }

    pub(crate) fn from_inner(inner: Rc<SurfaceInner>) -> Self {
        Self { inner }
    }

    fn weak(&self) -> Weak<SurfaceInner> {
        Rc::downgrade(&self.inner)
    }

    /// Root of the element tree.
    #[must_use]
    pub fn body(&self) -> Element {
        self.inner.body.clone()
    }

    /// Create an element owned by this surface but not yet attached.
    #[must_use]
    pub fn create_element(&self, tag: &str) -> Element {
        let el = Element::new(tag);
        el.set_owner(&self.weak());
        el
    }

    #[must_use]
    pub fn query_selector(&self, selector: &str) -> Option<Element> {
        self.inner.body.query_selector(selector)
    }

    #[must_use]
    pub fn query_selector_all(&self, selector: &str) -> Vec<Element> {
        self.inner.body.query_selector_all(selector)
    }

    #[must_use]
    pub fn element_by_id(&self, id: &str) -> Option<Element> {
        self.query_selector(&format!("#{id}"))
    }

    // --- Viewport ------------------------------------------------------------

    #[must_use]
    pub fn viewport(&self) -> Size {
        self.inner.viewport.get()
    }

    /// Resize the viewport and fire `resize` at document listeners.
    pub fn set_viewport(&self, size: Size) {
        self.inner.viewport.set(size);
        self.dispatch_document(&Event::new(EventKind::Resize, None));
    }

    /// Report that something scrolled; fires `scroll` at document listeners.
    pub fn scroll(&self) {
        self.dispatch_document(&Event::new(EventKind::Scroll, None));
    }

    // --- Document listeners ------------------------------------------------

    /// Register a document-level listener. Key listeners run in the capture
    /// phase, before the focused element sees the key.
    pub fn add_listener(&self, kind: EventKind, callback: impl Fn(&Event) + 'static) -> ListenerId {
        let id = ListenerId::next();
        self.inner.listeners.borrow_mut().push(Listener {
            id,
            kind,
            callback: Rc::new(callback),
        });
        id
    }

    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let mut listeners = self.inner.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        before != listeners.len()
    }

    /// Number of document-level listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.borrow().len()
    }

    fn dispatch_document(&self, event: &Event) {
        let snapshot: Vec<_> = self
            .inner
            .listeners
            .borrow()
            .iter()
            .filter(|l| l.kind == event.kind())
            .map(|l| (l.id, Rc::clone(&l.callback)))
            .collect();
        for (id, callback) in snapshot {
            if event.propagation_stopped() {
                break;
            }
            let live = self.inner.listeners.borrow().iter().any(|l| l.id == id);
            if live {
                contain("surface.listener", || callback(event));
            }
        }
    }

    // --- Keyboard and focus ------------------------------------------------

    /// Element holding keyboard focus, if it is still attached.
    #[must_use]
    pub fn active_element(&self) -> Option<Element> {
        let focused = self.inner.focused.borrow().as_ref().and_then(WeakElement::upgrade)?;
        focused.is_connected().then_some(focused)
    }

    pub(crate) fn set_focused(&self, el: Option<&Element>) {
        *self.inner.focused.borrow_mut() = el.map(Element::downgrade);
    }

    /// Drop keyboard focus.
    pub fn blur(&self) {
        self.set_focused(None);
    }

    /// Simulate a key press and return the dispatched event.
    pub fn press_key(&self, key: impl Into<KeyEvent>) -> Event {
        let key = key.into();
        let target = self.active_element().unwrap_or_else(|| self.body());
        let event = Event::key_down(key, Some(target.clone()));
        self.dispatch_document(&event);
        if !event.propagation_stopped() {
            target.dispatch(&event);
        }
        if key.key == Key::Escape && !event.default_prevented() {
            if let Some(dialog) = self.top_modal() {
                let cancel = Event::new(EventKind::Cancel, Some(dialog.clone()));
                dialog.dispatch(&cancel);
                if !cancel.default_prevented() {
                    dialog.close();
                }
            }
        }
        event
    }

    // --- Top layer -----------------------------------------------------------

    pub(crate) fn push_top_layer(&self, dialog: &Element) {
        self.remove_top_layer(dialog);
        self.inner.top_layer.borrow_mut().push(dialog.downgrade());
    }

    pub(crate) fn remove_top_layer(&self, dialog: &Element) {
        self.inner
            .top_layer
            .borrow_mut()
            .retain(|w| w.upgrade().is_some_and(|el| el != *dialog));
    }

    /// Topmost open modal dialog that is still attached.
    #[must_use]
    pub fn top_modal(&self) -> Option<Element> {
        self.inner
            .top_layer
            .borrow()
            .iter()
            .rev()
            .filter_map(WeakElement::upgrade)
            .find(|el| el.is_modal() && el.is_connected())
    }

    // --- Deferred work -------------------------------------------------------

    /// Schedule `f` on the zero-delay timer queue.
    pub fn set_timeout(&self, f: impl FnOnce() + 'static) -> TaskId {
        let id = TaskId::next();
        self.inner.timers.borrow_mut().push_back((id, Box::new(f)));
        id
    }

    /// Cancel a pending timer; returns whether it was still queued.
    pub fn clear_timeout(&self, id: TaskId) -> bool {
        remove_task(&self.inner.timers, id)
    }

    /// Schedule `f` for the next paint.
    pub fn request_animation_frame(&self, f: impl FnOnce() + 'static) -> TaskId {
        let id = TaskId::next();
        self.inner.frames.borrow_mut().push_back((id, Box::new(f)));
        id
    }

    pub fn cancel_animation_frame(&self, id: TaskId) -> bool {
        remove_task(&self.inner.frames, id)
    }

    /// Number of queued timers and frame callbacks.
    #[must_use]
    pub fn pending_tasks(&self) -> usize {
        self.inner.timers.borrow().len() + self.inner.frames.borrow().len()
    }

    /// Run the timers queued before this call. Returns how many ran.
    pub fn run_timers(&self) -> usize {
        run_batch(&self.inner.timers, "surface.timer")
    }

    /// Run the frame callbacks queued before this call. Returns how many ran.
    pub fn run_frames(&self) -> usize {
        run_batch(&self.inner.frames, "surface.frame")
    }

    /// Alternate frames and timers until both queues are empty.
    pub fn flush(&self) {
        for _ in 0..FLUSH_ROUND_LIMIT {
            if self.run_frames() + self.run_timers() == 0 {
                return;
            }
        }
        tracing::warn!(
            target: "kview::surface",
            pending = self.pending_tasks(),
            "deferred tasks keep rescheduling; giving up flush"
        );
    }
}

fn remove_task(queue: &RefCell<VecDeque<Task>>, id: TaskId) -> bool {
    let mut queue = queue.borrow_mut();
    let before = queue.len();
    queue.retain(|(task_id, _)| *task_id != id);
    before != queue.len()
}

fn run_batch(queue: &RefCell<VecDeque<Task>>, site: &str) -> usize {
    let budget = queue.borrow().len();
    let mut ran = 0;
    for _ in 0..budget {
        let Some((_, task)) = queue.borrow_mut().pop_front() else {
            break;
        };
        contain(site, task);
        ran += 1;
    }
    ran
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn appended_elements_join_the_surface() {
        let surface = Surface::default();
        let el = Element::new("div");
        assert!(el.surface().is_none());
        surface.body().append_child(&el);
        assert_eq!(el.surface(), Some(surface.clone()));
        assert!(el.is_connected());
        el.remove();
        assert!(!el.is_connected());
    }

    #[test]
    fn focus_follows_attachment() {
        let surface = Surface::default();
        let input = surface.create_element("input");
        surface.body().append_child(&input);
        input.focus();
        assert!(input.is_focused());
        input.remove();
        assert_eq!(surface.active_element(), None);
    }

    #[test]
    fn escape_cancels_then_closes_top_modal() {
        let surface = Surface::default();
        let dialog = surface.create_element("dialog");
        surface.body().append_child(&dialog);
        dialog.show_modal();
        assert_eq!(surface.top_modal(), Some(dialog.clone()));

        let closes = Rc::new(Cell::new(0));
        let c = Rc::clone(&closes);
        dialog.add_listener(EventKind::Close, move |_| c.set(c.get() + 1));

        let veto = dialog.add_listener(EventKind::Cancel, |e| e.prevent_default());
        surface.press_key(Key::Escape);
        assert!(dialog.is_open());

        dialog.remove_listener(veto);
        surface.press_key(Key::Escape);
        assert!(!dialog.is_open());
        assert_eq!(closes.get(), 1);
        assert_eq!(surface.top_modal(), None);
    }

    #[test]
    fn capture_listener_can_swallow_keys() {
        let surface = Surface::default();
        let input = surface.create_element("input");
        surface.body().append_child(&input);
        input.focus();
        let seen = Rc::new(Cell::new(0));
        let s = Rc::clone(&seen);
        input.add_listener(EventKind::KeyDown, move |_| s.set(s.get() + 1));
        surface.press_key(Key::Char('a'));
        assert_eq!(seen.get(), 1);
        surface.add_listener(EventKind::KeyDown, |e| e.stop_propagation());
        surface.press_key(Key::Char('a'));
        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn timers_scheduled_during_a_batch_wait_for_the_next() {
        let surface = Surface::default();
        let log = Rc::new(RefCell::new(Vec::new()));
        let (s, l) = (surface.clone(), Rc::clone(&log));
        surface.set_timeout(move || {
            l.borrow_mut().push(1);
            let l2 = Rc::clone(&l);
            s.set_timeout(move || l2.borrow_mut().push(2));
        });
        assert_eq!(surface.run_timers(), 1);
        assert_eq!(*log.borrow(), vec![1]);
        surface.flush();
        assert_eq!(*log.borrow(), vec![1, 2]);
    }

    #[test]
    fn cleared_timer_does_not_run() {
        let surface = Surface::default();
        let ran = Rc::new(Cell::new(false));
        let r = Rc::clone(&ran);
        let id = surface.set_timeout(move || r.set(true));
        assert!(surface.clear_timeout(id));
        surface.flush();
        assert!(!ran.get());
    }

    #[test]
    fn resize_reaches_document_listeners() {
        let surface = Surface::default();
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let id = surface.add_listener(EventKind::Resize, move |_| h.set(h.get() + 1));
        surface.set_viewport(Size::new(300.0, 200.0));
        assert_eq!(hits.get(), 1);
        assert!(surface.remove_listener(id));
        surface.set_viewport(Size::new(400.0, 200.0));
        assert_eq!(hits.get(), 1);
        assert_eq!(surface.viewport(), Size::new(400.0, 200.0));
    }

    #[test]
    fn closed_dialog_hides_its_content() {
        let surface = Surface::default();
        let dialog = surface.create_element("dialog");
        let inner = surface.create_element("span");
        dialog.append_child(&inner);
        surface.body().append_child(&dialog);
        assert!(!inner.is_rendered());
        dialog.show_modal();
        assert!(inner.is_rendered());
        dialog.set_style("display", "none");
        assert!(!inner.is_rendered());
    }
}
