#![forbid(unsafe_code)]

//! Demo models and their views.
//!
//! [`define_views`] registers one view per model type on a runtime:
//!
//! - [`Calculator`]: two numeric inputs and their sum.
//! - [`Contact`]: a name and an email, shown as a row.
//! - [`AddressBook`]: a choice list of contacts, the chosen contact's view,
//!   a menu and a dialog around it, and every contact as a list of views.
//! - [`Launcher`]: boots a fresh [`Calculator`] into the container.

use std::rc::Rc;

use kview_reactive::{Model, ModelRef, State, Value};
use kview_widgets::{
    BootNode, ButtonNode, FlowNode, InputNode, LabelNode, ListNode, ModalNode, Runtime, SelectMode,
    SelectNode, SingleNode,
};

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

pub struct Calculator {
    pub state: State,
}

impl Model for Calculator {
    fn state(&self) -> &State {
        &self.state
    }
}

impl Calculator {
    #[must_use]
    pub fn new(a: f64, b: f64) -> Rc<Self> {
        Rc::new(Self {
            state: State::new().with("a", a).with("b", b).with("sum", a + b),
        })
    }

    /// Store `a + b` in `sum`.
    pub fn recompute(&self) {
        let sum = self.state.number("a") + self.state.number("b");
        if let Err(err) = self.state.set("sum", sum) {
            tracing::warn!(target: "kview::harness", %err, "sum is read-only");
        }
    }
}

// ---------------------------------------------------------------------------
// Contacts
// ---------------------------------------------------------------------------

pub struct Contact {
    pub state: State,
}

impl Model for Contact {
    fn state(&self) -> &State {
        &self.state
    }
}

impl Contact {
    #[must_use]
    pub fn new(name: &str, email: &str) -> Rc<Self> {
        Rc::new(Self {
            state: State::new().with("name", name).with("email", email),
        })
    }

    pub fn rename(&self, name: &str) {
        if let Err(err) = self.state.set("name", name) {
            tracing::warn!(target: "kview::harness", %err, "name is read-only");
        }
    }
}

pub struct AddressBook {
    pub state: State,
}

impl Model for AddressBook {
    fn state(&self) -> &State {
        &self.state
    }
}

impl AddressBook {
    #[must_use]
    pub fn new(contacts: &[Rc<Contact>]) -> Rc<Self> {
        Rc::new(Self {
            state: State::new()
                .with("contacts", Value::list(contacts.iter().map(Value::object)))
                .with("selected", Value::indices(&[]))
                .with("current", Value::Null),
        })
    }

    /// Show the first selected contact, or nothing.
    pub fn open_selected(&self) {
        let contacts = self.state.list("contacts");
        let current = self
            .state
            .get("selected")
            .to_indices()
            .first()
            .and_then(|&i| contacts.get(i).cloned())
            .unwrap_or(Value::Null);
        self.set_current(current);
    }

    pub fn close(&self) {
        self.set_current(Value::Null);
    }

    /// Append a contact; the list field gets a new identity.
    pub fn add(&self, contact: &Rc<Contact>) {
        let mut contacts = self.state.list("contacts");
        contacts.push(Value::object(contact));
        if let Err(err) = self.state.set("contacts", Value::list(contacts)) {
            tracing::warn!(target: "kview::harness", %err, "contacts are read-only");
        }
    }

    fn set_current(&self, current: Value) {
        if let Err(err) = self.state.set("current", current) {
            tracing::warn!(target: "kview::harness", %err, "current is read-only");
        }
    }
}

fn contact_name(item: &Value) -> String {
    item.as_object()
        .map(|contact| contact.state().text("name"))
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Launcher
// ---------------------------------------------------------------------------

pub struct Launcher {
    pub state: State,
}

impl Model for Launcher {
    fn state(&self) -> &State {
        &self.state
    }
}

impl Launcher {
    #[must_use]
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            state: State::new().with("title", "Launcher"),
        })
    }
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

/// Register the views of every demo model on `runtime`.
pub fn define_views(runtime: &Runtime) {
    runtime.define_view::<Calculator>(|v| {
        v.flow(FlowNode::column().id("calc").gap(4), |v| {
            v.input(InputNode::new("a").label("A").update(Calculator::recompute));
            v.input(InputNode::new("b").label("B").update(Calculator::recompute));
            v.label(LabelNode::new("sum").id("sum"));
        });
    });

    runtime.define_view::<Contact>(|v| {
        v.flow(FlowNode::row().class("contact"), |v| {
            v.label(LabelNode::new("name").class("name"));
            v.label(LabelNode::new("email").class("email"));
        });
        v.button(ButtonNode::new("Rename", |c: &Contact| c.rename("Renamed")).class("rename"));
    });

    runtime.define_view::<AddressBook>(|v| {
        v.select(
            SelectNode::new("contacts", "selected")
                .id("picker")
                .mode(SelectMode::Dropdown)
                .display(|_: &AddressBook, item: &Value| contact_name(item))
                .update(AddressBook::open_selected),
        );
        v.single(SingleNode::new("current").id("detail"));
        v.menu(ModalNode::new("current", "Actions").id("actions").width(200).height(120));
        v.dialog(ModalNode::new("current", "Edit").id("editor").close_on_escape(true));
        v.button(ButtonNode::new("Close", AddressBook::close).id("close"));
        v.list(ListNode::new("contacts").id("all").wrap(false));
    });

    runtime.define_view::<Launcher>(|v| {
        v.label(LabelNode::new("title").id("title"));
        v.boot(
            BootNode::new("New calculator", |_: &Launcher| {
                Ok(Some(ModelRef::new(Calculator::new(0.0, 0.0))))
            })
            .id("boot"),
        );
    });
}
