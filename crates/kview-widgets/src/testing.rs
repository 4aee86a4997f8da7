#![forbid(unsafe_code)]

//! Fixtures for builder unit tests.

use std::rc::Rc;

use kview_core::{Element, Surface};
use kview_reactive::{Model, State};

use crate::runtime::{Runtime, RuntimeHandle};
use crate::view::View;

/// A model that is nothing but its state.
pub(crate) struct Bag {
    pub(crate) state: State,
}

impl Model for Bag {
    fn state(&self) -> &State {
        &self.state
    }
}

impl Bag {
    pub(crate) fn new(state: State) -> Rc<Self> {
        Rc::new(Self { state })
    }
}

/// A second model type for nested views.
pub(crate) struct Item {
    pub(crate) state: State,
}

impl Model for Item {
    fn state(&self) -> &State {
        &self.state
    }
}

impl Item {
    pub(crate) fn named(name: &str) -> Rc<Self> {
        Rc::new(Self {
            state: State::new().with("name", name),
        })
    }
}

/// Runtime over a surface whose body holds `<div id="app">`.
pub(crate) fn runtime() -> Runtime {
    let surface = Surface::default();
    let app = surface.create_element("div");
    app.set_id("app");
    surface.body().append_child(&app);
    Runtime::new(surface)
}

/// Define `build` as the view of [`Bag`] and mount `bag` into `#app`.
pub(crate) fn mount(
    rt: &Runtime,
    bag: &Rc<Bag>,
    build: impl FnOnce(&mut View<Bag>),
) -> (RuntimeHandle, Element) {
    rt.define_view::<Bag>(build);
    let handle = rt.mount(bag, "#app").expect("mount");
    let app = rt.surface().element_by_id("app").expect("app container");
    (handle, app)
}

/// Define a view for [`Item`] rendering its name in a `span.item`.
pub(crate) fn define_item_view(rt: &Runtime) {
    rt.define_view::<Item>(|v| {
        v.label(crate::node::LabelNode::new("name").class("item"));
    });
}
