//! Integration tests for the default aggregating listener.

use magpie_extract::{DefaultListener, Format, Listener};
use serde_json::json;

#[test]
fn test_default_listener_aggregates_events() {
    let mut listener = DefaultListener::new();
    listener.parsing_started();
    assert!(!listener.is_parsing_finished());

    listener.item_found(&json!("blah"));
    listener.itemtype_found("HotelReservation", Format::Microdata);
    listener.parsing_finished(2);

    // The final count comes from the finish notification, not from the
    // number of itemtype callbacks this listener happened to see.
    assert_eq!(listener.total_itemtypes(), 2);
    assert_eq!(listener.items(), &[json!("blah")]);
    assert!(listener.is_parsing_finished());
}

#[test]
fn test_default_listener_starts_empty() {
    let listener = DefaultListener::new();
    assert!(listener.items().is_empty());
    assert_eq!(listener.total_itemtypes(), 0);
    assert!(!listener.is_parsing_finished());
}
