//! A small editor menu wired through connectors, the way an application
//! assembles its UI graph at start-up.

use std::cell::RefCell;
use std::rc::Rc;

use wirekit_core::{Connector, PushPort, port_fn};
use wirekit_widgets::{Component, MenuItem, Rgb, TextLabel};

struct EditorMenu {
    document_open: Connector<bool>,
    status: Connector<String>,
    save: Rc<MenuItem>,
    close: Rc<MenuItem>,
    status_label: Rc<TextLabel>,
    events: Rc<RefCell<Vec<String>>>,
}

fn build() -> EditorMenu {
    let events = Rc::new(RefCell::new(Vec::new()));
    let document_open = Connector::<bool>::named("document_open");
    let status = Connector::<String>::named("status");

    let save = Rc::new(MenuItem::new("Save").with_instance_name("save"));
    let close = Rc::new(MenuItem::new("Close").with_instance_name("close").with_visible(false));
    let status_label = Rc::new(TextLabel::new("").with_instance_name("status_label"));

    // Save greys out without a document; Close only appears with one.
    save.wire_enable_input(document_open.clone());
    document_open.fan_out(Rc::clone(&close));

    // Once the menu has settled, announce the new state.
    let status_in = status.clone();
    document_open
        .set_last(port_fn(move |open: bool| {
            let text = if open { "document open" } else { "no document" };
            status_in.push(text.to_string()).unwrap();
        }))
        .unwrap();
    status.fan_out(Rc::clone(&status_label));

    let e = Rc::clone(&events);
    save.wire_output(port_fn(move |()| e.borrow_mut().push("save".into())));
    let e = Rc::clone(&events);
    let closer = document_open.clone();
    close.wire_output(port_fn(move |()| {
        e.borrow_mut().push("close".into());
        closer.push(false).unwrap();
    }));

    EditorMenu {
        document_open,
        status,
        save,
        close,
        status_label,
        events,
    }
}

#[test]
fn opening_a_document_updates_the_menu() {
    let menu = build();
    menu.document_open.push(false).unwrap();
    assert!(!menu.save.is_enabled());
    assert_eq!(menu.save.foreground(), Rgb::DARK_GRAY);
    assert!(!menu.close.is_visible());
    assert_eq!(menu.status_label.text(), "no document");

    menu.document_open.push(true).unwrap();
    assert!(menu.save.is_enabled());
    assert!(menu.close.is_visible());
    assert_eq!(menu.status_label.text(), "document open");
    assert_eq!(menu.status.read(), "document open");
}

#[test]
fn clicking_close_feeds_back_into_the_graph() {
    let menu = build();
    menu.document_open.push(true).unwrap();

    assert!(menu.save.click().unwrap());
    assert!(menu.close.click().unwrap());

    assert_eq!(*menu.events.borrow(), vec!["save", "close"]);
    assert!(!menu.document_open.read());
    assert!(!menu.close.is_visible());
    assert!(!menu.save.is_enabled());
    assert_eq!(menu.status_label.text(), "no document");

    assert!(!menu.save.click().unwrap(), "disabled item ignores clicks");
}

#[test]
fn label_can_be_driven_directly() {
    let menu = build();
    menu.status_label.push("manual".to_string()).unwrap();
    assert_eq!(menu.status_label.text(), "manual");
    assert_eq!(menu.status_label.instance_name(), "status_label");
}
