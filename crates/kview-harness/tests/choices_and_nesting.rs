#![forbid(unsafe_code)]

//! Integration tests: choice lists, single views and lists of views.
//!
//! Run `BLESS=1 cargo test --package kview-harness` to create/update snapshots.

use std::rc::Rc;

use kview_harness::models::{AddressBook, Contact, define_views};
use kview_harness::{Fixture, assert_snapshot, outline_json};
use kview_reactive::Value;
use serde_json::json;

struct Book {
    fixture: Fixture,
    book: Rc<AddressBook>,
    ada: Rc<Contact>,
    grace: Rc<Contact>,
}

fn book() -> Book {
    let fixture = Fixture::new();
    define_views(fixture.runtime());
    let ada = Contact::new("Ada", "ada@example.org");
    let grace = Contact::new("Grace", "grace@example.org");
    let book = AddressBook::new(&[Rc::clone(&ada), Rc::clone(&grace)]);
    Book {
        fixture,
        book,
        ada,
        grace,
    }
}

// ============================================================================
// Choice list
// ============================================================================

#[test]
fn picker_shows_one_option_per_contact() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    let picker = b.fixture.find("#picker");
    assert_eq!(picker.size(), 1);
    assert!(!picker.is_multiple());
    let labels: Vec<_> = picker.options().iter().map(|o| o.text()).collect();
    assert_eq!(labels, ["Ada", "Grace"]);
    assert_eq!(picker.selected_index(), None);
}

#[test]
fn choosing_writes_indices_then_runs_update() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    b.fixture.find("#picker").choose(&[1]);

    assert_eq!(b.book.state.get("selected").to_indices(), [1]);
    assert_eq!(b.fixture.texts("#detail .name"), ["Grace"]);
    assert_eq!(b.fixture.texts("#detail .email"), ["grace@example.org"]);
}

#[test]
fn list_change_rebuilds_and_drops_stale_selection() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    let picker = b.fixture.find("#picker");
    picker.choose(&[1]);

    b.book.add(&Contact::new("Linus", "linus@example.org"));
    assert_eq!(picker.options().len(), 3);
    assert_eq!(picker.selected_index(), Some(1));
    assert_eq!(b.fixture.find("#all").child_count(), 3);

    b.book.state.set("selected", Value::indices(&[5])).unwrap();
    assert_eq!(picker.selected_index(), None);
}

// ============================================================================
// Single view
// ============================================================================

#[test]
fn detail_follows_the_current_field() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    let detail = b.fixture.find("#detail");
    assert_eq!(detail.child_count(), 0);

    b.book.state.set("current", Value::object(&b.ada)).unwrap();
    assert_eq!(b.fixture.texts("#detail .name"), ["Ada"]);

    b.book.state.set("current", Value::object(&b.grace)).unwrap();
    assert_eq!(b.fixture.texts("#detail .name"), ["Grace"]);

    b.fixture.find("#close").click();
    assert_eq!(detail.child_count(), 0);
}

#[test]
fn closing_the_detail_releases_only_its_bindings() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    let observer = b.fixture.runtime().observer_for(&b.grace.state);
    assert_eq!(observer.handler_count("name"), 1);

    b.book.state.set("current", Value::object(&b.grace)).unwrap();
    assert_eq!(observer.handler_count("name"), 2);

    b.book.close();
    assert_eq!(observer.handler_count("name"), 1);
}

#[test]
fn nested_action_updates_every_view_of_the_object() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    b.book.state.set("current", Value::object(&b.ada)).unwrap();

    b.fixture.find("#detail .rename").click();
    assert_eq!(b.ada.state.get("name"), Value::from("Renamed"));
    assert_eq!(b.fixture.texts(".name"), ["Renamed", "Renamed", "Grace"]);
}

#[test]
fn detail_outline_as_json() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    b.book.state.set("current", Value::object(&b.ada)).unwrap();
    let detail = outline_json(&b.fixture.find("#detail"));
    assert_eq!(
        detail["children"][0]["children"][0],
        json!({
            "tag": "div",
            "classes": ["contact"],
            "style": { "display": "flex", "flex-direction": "row" },
            "children": [
                { "tag": "span", "classes": ["name"], "text": "Ada" },
                { "tag": "span", "classes": ["email"], "text": "ada@example.org" },
            ],
        })
    );
}

// ============================================================================
// List of views
// ============================================================================

#[test]
fn snapshot_contact_list() {
    let b = book();
    let _h = b.fixture.mount(&b.book).unwrap();
    assert_snapshot!("contact_list", &b.fixture.find("#all"));
}

#[test]
fn list_stop_releases_every_row() {
    let b = book();
    let handle = b.fixture.mount(&b.book).unwrap();
    let ada = b.fixture.runtime().observer_for(&b.ada.state);
    assert!(ada.is_observed("name"));
    handle.stop();
    assert!(!ada.is_observed("name"));
    assert_eq!(b.fixture.find("#all").child_count(), 0);
}
