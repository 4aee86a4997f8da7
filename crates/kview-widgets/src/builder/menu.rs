#![forbid(unsafe_code)]

//! Menu: a trigger button plus a floating panel, shown as a modal
//! `<dialog data-menu>` in the top layer and placed next to the trigger.
//!
//! # Invariants
//!
//! 1. While open, the menu owns the keyboard: every key stops at the
//!    document listener. Arrow keys cycle focus through the panel's
//!    focusable elements; Escape closes unless the node forbids it.
//! 2. A click on the dialog itself (outside the panel) closes at once. A
//!    click on an item inside the panel reaches the item first and closes
//!    on the next timer tick.
//! 3. Every listener added on open is removed on close, and the pending
//!    frame callback is cancelled.
//! 4. The panel is re-placed on open, on the next frame, on resize, on
//!    scroll, and when the field changes while open.
//!
//! # Failure Modes
//!
//! - A nested mount failure leaves the menu closed and logs a warning.

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use kview_core::{Element, Event, EventKind, Key, Surface, contain};
use kview_reactive::{Model, Value};

use crate::bind::{apply_identity, apply_size, bind_toggles, render_trigger, set_trigger_alt};
use crate::error::ViewError;
use crate::modal::{MENU_ITEM_SELECTOR, focusables, next_focus, place_menu};
use crate::node::ModalNode;
use crate::runtime::Ctx;

use super::slot::Slot;

type Cleanup = Box<dyn FnOnce()>;

struct Menu {
    surface: Surface,
    trigger: Element,
    pop: Element,
    panel: Element,
    slot: Slot,
    gap: f64,
    close_on_escape: bool,
    open: Cell<bool>,
    cleanup: RefCell<Vec<Cleanup>>,
}

impl Menu {
    fn place(&self) {
        self.pop.set_style("display", "block");
        self.pop.set_style("visibility", "hidden");
        if !self.pop.is_open() {
            self.pop.show_modal();
        }
        let at = place_menu(
            self.trigger.bounding_rect(),
            self.panel.offset_size(),
            self.surface.viewport(),
            self.gap,
        );
        self.pop.set_style("left", &format!("{}px", at.x));
        self.pop.set_style("top", &format!("{}px", at.y));
        self.pop.set_style("visibility", "visible");
    }

    fn close(&self) {
        if !self.open.replace(false) {
            return;
        }
        let cleanup = std::mem::take(&mut *self.cleanup.borrow_mut());
        for undo in cleanup {
            contain("menu.cleanup", undo);
        }
        self.pop.close();
        self.pop.set_style("display", "none");
        self.pop.set_style("visibility", "hidden");
        self.slot.clear();
        tracing::debug!(target: "kview::menu", "menu closed");
    }

    fn mount(&self, value: &Value) -> bool {
        match self.slot.show(value, None) {
            Ok(mounted) => mounted,
            Err(err) => {
                tracing::warn!(target: "kview::menu", %err, "menu content failed to mount");
                false
            }
        }
    }

    fn focus_first(&self) {
        let target = focusables(&self.panel)
            .into_iter()
            .next()
            .unwrap_or_else(|| self.panel.clone());
        target.focus();
    }

    fn on_key(&self, event: &Event) {
        match event.key() {
            Some(Key::Escape) => {
                event.prevent_default();
                event.stop_propagation();
                if self.close_on_escape {
                    self.close();
                }
            }
            Some(key @ (Key::ArrowDown | Key::ArrowUp)) => {
                event.prevent_default();
                event.stop_propagation();
                let list = focusables(&self.panel);
                let current = self.surface.active_element();
                if let Some(next) = next_focus(&list, current.as_ref(), key == Key::ArrowDown) {
                    next.focus();
                }
            }
            _ => event.stop_propagation(),
        }
    }

    fn defer_cleanup(&self, undo: impl FnOnce() + 'static) {
        self.cleanup.borrow_mut().push(Box::new(undo));
    }

    /// Open on the object in `value`; a null value closes instead.
    fn open_on(self: &Rc<Self>, value: &Value) {
        if value.is_null() {
            self.close();
            return;
        }
        if !self.mount(value) {
            return;
        }
        self.place();
        self.open.set(true);

        let weak = Rc::downgrade(self);
        let frame = self.surface.request_animation_frame({
            let weak = Weak::clone(&weak);
            move || {
                if let Some(menu) = weak.upgrade().filter(|m| m.open.get()) {
                    menu.place();
                    menu.focus_first();
                }
            }
        });

        let on_key = self.surface.add_listener(EventKind::KeyDown, {
            let weak = Weak::clone(&weak);
            move |event: &Event| {
                if let Some(menu) = weak.upgrade() {
                    menu.on_key(event);
                }
            }
        });
        let replace = |weak: Weak<Self>| {
            move |_: &Event| {
                if let Some(menu) = weak.upgrade() {
                    menu.place();
                }
            }
        };
        let on_resize = self
            .surface
            .add_listener(EventKind::Resize, replace(Weak::clone(&weak)));
        let on_scroll = self
            .surface
            .add_listener(EventKind::Scroll, replace(Weak::clone(&weak)));

        let surface = self.surface.clone();
        self.defer_cleanup(move || {
            surface.cancel_animation_frame(frame);
            surface.remove_listener(on_key);
            surface.remove_listener(on_resize);
            surface.remove_listener(on_scroll);
        });

        if !self.close_on_escape {
            let on_cancel = self
                .pop
                .add_listener(EventKind::Cancel, |event: &Event| event.prevent_default());
            let pop = self.pop.downgrade();
            self.defer_cleanup(move || {
                if let Some(pop) = pop.upgrade() {
                    pop.remove_listener(on_cancel);
                }
            });
        }
        tracing::debug!(target: "kview::menu", "menu opened");
    }

    /// Field changed while open: swap the content, keep the scroll offset.
    fn refresh(&self, value: &Value) {
        let scroll = self.panel.scroll_top();
        self.mount(value);
        self.place();
        self.panel.set_scroll_top(scroll);
    }
}

fn style_pop(pop: &Element) {
    pop.set_attribute("data-menu", "");
    for (property, value) in [
        ("position", "fixed"),
        ("inset", "auto"),
        ("margin", "0"),
        ("padding", "0"),
        ("border", "none"),
        ("background", "transparent"),
        ("overflow", "visible"),
        ("z-index", "2147483647"),
        ("display", "none"),
        ("visibility", "hidden"),
    ] {
        pop.set_style(property, value);
    }
    pop.set_tab_index(-1);
}

pub(super) fn build<T: Model>(node: &ModalNode<T>, ctx: &mut Ctx<'_, T>) -> Result<(), ViewError> {
    let btn = ctx.create("button");
    btn.set_attribute("type", "button");
    apply_size(&btn, node.button_width.as_ref(), node.button_height.as_ref());
    render_trigger(&btn, &node.label, node.content);
    set_trigger_alt(&btn, &node.label);
    ctx.add(btn.clone());

    let config = ctx.config();
    let pop = ctx.create("dialog");
    style_pop(&pop);

    let panel = ctx.create("div");
    apply_identity(&panel, &node.common);
    panel.add_class("app");
    apply_size(&panel, node.common.width.as_ref(), node.common.height.as_ref());
    panel.set_attribute("role", "menu");
    panel.set_tab_index(-1);
    panel.set_style("max-width", &config.menu_max_width);
    panel.set_style("max-height", &config.menu_max_height);
    panel.set_style("overflow", "auto");
    panel.set_style("box-sizing", "border-box");
    panel.set_style("background", &config.menu_background);
    panel.set_style("border", &config.menu_border);
    panel.set_style("border-radius", &config.menu_border_radius);
    panel.set_style("box-shadow", &config.menu_box_shadow);
    panel.set_style("padding", "0");

    let host = ctx.create("div");
    host.set_style("min-width", &config.menu_host_min_width);
    panel.append_child(&host);
    pop.append_child(&panel);
    ctx.runtime.surface().body().append_child(&pop);

    let menu = Rc::new(Menu {
        surface: ctx.runtime.surface().clone(),
        trigger: btn.clone(),
        pop: pop.clone(),
        panel: panel.clone(),
        slot: Slot::new(ctx.runtime.downgrade(), host),
        gap: config.menu_gap,
        close_on_escape: node.close_on_escape.unwrap_or(config.menu_close_on_escape),
        open: Cell::new(false),
        cleanup: RefCell::new(Vec::new()),
    });

    {
        let weak = Rc::downgrade(&menu);
        ctx.listen(&pop, EventKind::Click, move |event| {
            let Some(menu) = weak.upgrade() else {
                return;
            };
            if event.targets(&menu.pop) {
                event.prevent_default();
                event.stop_propagation();
                menu.close();
            }
        });
    }
    {
        let weak = Rc::downgrade(&menu);
        ctx.listen(&panel, EventKind::Click, move |event| {
            let Some(menu) = weak.upgrade() else {
                return;
            };
            let item = event
                .target()
                .and_then(|target| target.closest(|el| el.matches(MENU_ITEM_SELECTOR)))
                .filter(|item| menu.panel.contains(item));
            if item.is_some() {
                let weak = Rc::downgrade(&menu);
                menu.surface.set_timeout(move || {
                    if let Some(menu) = weak.upgrade() {
                        menu.close();
                    }
                });
            }
        });
    }

    {
        let weak = Rc::downgrade(&menu);
        ctx.observe(&node.name, move |value: &Value, _: &Value| {
            let Some(menu) = weak.upgrade() else {
                return;
            };
            if value.is_null() {
                menu.close();
            } else if menu.open.get() {
                menu.refresh(value);
            }
        })?;
    }

    bind_toggles(ctx, &node.common, &btn)?;

    {
        let weak = Rc::downgrade(&menu);
        let model = ctx.weak_model();
        let field = node.name.clone();
        let action = node.action.clone();
        ctx.listen(&btn, EventKind::Click, move |_| {
            let (Some(menu), Some(model)) = (weak.upgrade(), model.upgrade()) else {
                return;
            };
            if menu.open.get() {
                menu.close();
                return;
            }
            if let Some(action) = &action {
                contain("menu.action", || action(&*model));
            }
            menu.open_on(&model.state().get(&field));
        });
    }

    ctx.on_teardown(move || {
        menu.close();
        menu.pop.remove();
    });
    Ok(())
}
