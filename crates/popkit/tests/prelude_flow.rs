//! Drives a popover through the facade prelude only.

use popkit::prelude::*;

fn build() -> Result<(Document, NodeId, NodeId, Popover)> {
    let mut doc = Document::new();
    let tree = doc.tree_mut();
    let root = tree.root();
    let page = tree.create_element("main");
    tree.append_child(root, page)?;
    let trigger = tree.create_element("button");
    let body = tree.create_text("Details");

    let props = PopoverProps::new(trigger)
        .content(body)
        .config(PopoverConfig::default().header("Info"));
    let popover = Popover::mount(&mut doc, props)?;
    Ok((doc, trigger, page, popover))
}

#[test]
fn prelude_covers_a_full_cycle() {
    let (mut doc, trigger, page, mut popover) = build().unwrap();
    assert_eq!(popover.visibility(), Visibility::Closed);

    doc.click(trigger);
    assert_eq!(popover.visibility(), Visibility::Open);
    popover.sync(&mut doc).unwrap();

    doc.dispatch_pointer(PointerEvent::down_on(page));
    assert_eq!(popover.visibility(), Visibility::Closed);

    popover.unmount(&mut doc);
    assert_eq!(doc.pointer_listener_count(), 0);
}

#[test]
fn errors_convert_into_facade_error() {
    let mut doc = Document::with_capabilities(
        popkit::DocumentCapabilities::new().pointer_events(false),
    );
    let trigger = doc.tree_mut().create_element("button");
    let err: Error = Popover::mount(&mut doc, PopoverProps::new(trigger))
        .unwrap_err()
        .into();
    assert!(matches!(err, Error::Popover(popkit::PopoverError::Document(_))));
    assert!(err.to_string().contains("pointer"));
}
