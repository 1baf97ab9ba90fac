//! End-to-end tests: HTML documents through the html5ever driver.

use magpie_extract::{DefaultListener, Parser};
use serde_json::Value;

/// Microdata document describing a restaurant reservation.
const RESERVATION_MICRODATA: &str = concat!(
    r#"<div itemscope itemtype="http://schema.org/FoodEstablishmentReservation">"#,
    r#"<meta itemprop="reservationNumber" content="OT12345"/>"#,
    r#"<link itemprop="reservationStatus" href="http://schema.org/Confirmed"/>"#,
    r#"<div itemprop="underName" itemscope itemtype="http://schema.org/Person">"#,
    r#" <meta itemprop="name" content="John Smith"/>"#,
    r#"</div>"#,
    r#"<div itemprop="reservationFor" itemscope itemtype="http://schema.org/FoodEstablishment">"#,
    r#" <meta itemprop="name" content="Wagamama"/>"#,
    r#" <div itemprop="address" itemscope itemtype="http://schema.org/PostalAddress">"#,
    r#"  <meta itemprop="streetAddress" content="1 Tavistock Street"/>"#,
    r#"  <meta itemprop="addressLocality" content="London"/>"#,
    r#"  <meta itemprop="addressRegion" content="Greater London"/>"#,
    r#"  <meta itemprop="postalCode" content="WC2E 7PG"/>"#,
    r#"  <meta itemprop="addressCountry" content="United Kingdom"/>"#,
    r#"</div>"#,
    r#"</div>"#,
    r#"<meta itemprop="startTime" content="2017-04-10T08:00:00+00:00"/>"#,
    r#"<meta itemprop="partySize" content="2"/>"#,
    r#"</div>"#,
);

/// The same reservation as a JSON-LD payload.
const RESERVATION_JSONLD: &str = r#"{
  "@context": "http://schema.org",
  "@type": "FoodEstablishmentReservation",
  "reservationNumber": "OT12345",
  "reservationStatus": "http://schema.org/Confirmed",
  "underName": {
    "@type": "Person",
    "name": "John Smith"
  },
  "reservationFor": {
    "@type": "FoodEstablishment",
    "name": "Wagamama",
    "address": {
      "@type": "PostalAddress",
      "streetAddress": "1 Tavistock Street",
      "addressLocality": "London",
      "addressRegion": "Greater London",
      "postalCode": "WC2E 7PG",
      "addressCountry": "United Kingdom"
    }
  },
  "startTime": "2017-04-10T08:00:00+00:00",
  "partySize": "2"
}"#;

/// Same payload with the `{` before the nested `@type` missing, making the
/// whole block malformed.
const MALFORMED_JSONLD: &str = r#"{
  "@context": "http://schema.org",
  "@type": "FoodEstablishmentReservation",
  "reservationFor":
    "@type": "FoodEstablishment",
    "name": "Wagamama"
  }
}"#;

/// Helper to wrap a payload in a JSON-LD script tag.
fn jsonld_script(payload: &str) -> String {
    format!(r#"<script type="application/ld+json">{payload}</script>"#)
}

/// Helper to parse html with a fresh parser and listener.
fn parse(html: &str) -> DefaultListener {
    let mut listener = DefaultListener::new();
    let mut parser = Parser::new();
    parser.register_listener(&mut listener);
    parser.parse(html).expect("parse should succeed");
    listener
}

#[test]
fn test_microdata_reservation() {
    let listener = parse(RESERVATION_MICRODATA);
    assert_eq!(listener.total_itemtypes(), 4);
    assert_eq!(listener.items().len(), 1);

    // String comparison checks property order as well: document order.
    let rendered =
        serde_json::to_string(&listener.items()[0]).expect("serialization should succeed");
    assert_eq!(
        rendered,
        concat!(
            r#"{"type":["FoodEstablishmentReservation"],"reservationNumber":["OT12345"],"#,
            r#""reservationStatus":["http://schema.org/Confirmed"],"#,
            r#""underName":[{"type":["Person"],"name":["John Smith"]}],"#,
            r#""reservationFor":[{"type":["FoodEstablishment"],"name":["Wagamama"],"#,
            r#""address":[{"type":["PostalAddress"],"streetAddress":["1 Tavistock Street"],"#,
            r#""addressLocality":["London"],"addressRegion":["Greater London"],"#,
            r#""postalCode":["WC2E 7PG"],"addressCountry":["United Kingdom"]}]}],"#,
            r#""startTime":["2017-04-10T08:00:00+00:00"],"partySize":["2"]}"#,
        )
    );
}

#[test]
fn test_jsonld_reservation() {
    let listener = parse(&jsonld_script(RESERVATION_JSONLD));
    let expected: Value =
        serde_json::from_str(RESERVATION_JSONLD).expect("payload should be valid JSON");
    assert_eq!(listener.total_itemtypes(), 4);
    assert_eq!(listener.items(), &[expected]);
}

#[test]
fn test_second_block_malformed() {
    let html = jsonld_script(RESERVATION_JSONLD) + &jsonld_script(MALFORMED_JSONLD);
    let listener = parse(&html);
    let expected: Value =
        serde_json::from_str(RESERVATION_JSONLD).expect("payload should be valid JSON");
    assert_eq!(listener.items(), &[expected]);
    assert_eq!(listener.total_itemtypes(), 4);
}

#[test]
fn test_first_block_malformed() {
    let html = jsonld_script(MALFORMED_JSONLD) + &jsonld_script(RESERVATION_JSONLD);
    let listener = parse(&html);
    let expected: Value =
        serde_json::from_str(RESERVATION_JSONLD).expect("payload should be valid JSON");
    assert_eq!(listener.items(), &[expected]);
    assert_eq!(listener.total_itemtypes(), 4);
}

#[test]
fn test_empty_document() {
    let listener = parse("");
    assert!(listener.items().is_empty());
    assert_eq!(listener.total_itemtypes(), 0);
    assert!(magpie_extract::Listener::is_parsing_finished(&listener));
}

#[test]
fn test_document_without_annotations() {
    let listener = parse("<html><body><p>Nothing structured here.</p></body></html>");
    assert!(listener.items().is_empty());
    assert_eq!(listener.total_itemtypes(), 0);
}

#[test]
fn test_repeated_property_from_markup() {
    let html = concat!(
        r#"<div itemscope itemtype="http://schema.org/Movie">"#,
        r#"<meta itemprop="genre" content="Action"/>"#,
        r#"<meta itemprop="genre" content="Crime"/>"#,
        r#"<meta itemprop="genre" content="Thriller"/>"#,
        r#"</div>"#,
    );
    let listener = parse(html);
    assert_eq!(
        listener.items(),
        &[serde_json::json!({
            "type": ["Movie"],
            "genre": ["Action", "Crime", "Thriller"],
        })]
    );
}

#[test]
fn test_text_property_from_markup() {
    let html = concat!(
        r#"<div itemscope itemtype="http://schema.org/Person">"#,
        r#"<span itemprop="name"> John Smith </span>"#,
        r#"</div>"#,
    );
    let listener = parse(html);
    assert_eq!(
        listener.items(),
        &[serde_json::json!({"type": ["Person"], "name": ["John Smith"]})]
    );
}

#[test]
fn test_unclosed_scope_completes_at_end_of_input() {
    let html = concat!(
        r#"<div itemscope itemtype="http://schema.org/Person">"#,
        r#"<meta itemprop="name" content="John Smith"/>"#,
    );
    let listener = parse(html);
    assert_eq!(
        listener.items(),
        &[serde_json::json!({"type": ["Person"], "name": ["John Smith"]})]
    );
}

#[test]
fn test_stray_end_tags_are_ignored() {
    let html = concat!(
        r#"</section>"#,
        r#"<div itemscope itemtype="http://schema.org/Person"></span></div>"#,
    );
    let listener = parse(html);
    assert_eq!(listener.items(), &[serde_json::json!({"type": ["Person"]})]);
}

#[test]
fn test_mixed_formats_in_one_document() {
    let html = format!(
        r#"<html><body>{}<div itemscope itemtype="http://schema.org/Person"></div></body></html>"#,
        jsonld_script(r#"{"@type": "Organization"}"#)
    );
    let listener = parse(&html);
    assert_eq!(listener.items().len(), 2);
    assert_eq!(listener.total_itemtypes(), 2);
}

#[test]
fn test_parsing_is_idempotent() {
    let first = parse(RESERVATION_MICRODATA);
    let second = parse(RESERVATION_MICRODATA);
    assert_eq!(first.items(), second.items());
    assert_eq!(first.total_itemtypes(), second.total_itemtypes());
}

#[test]
fn test_listeners_notified_in_registration_order() {
    let mut first = DefaultListener::new();
    let mut second = DefaultListener::new();
    let mut parser = Parser::new();
    parser.register_listener(&mut first);
    parser.register_listener(&mut second);
    parser
        .parse(r#"<div itemscope itemtype="http://schema.org/Person"></div>"#)
        .expect("parse should succeed");
    assert_eq!(first.items(), second.items());
    assert_eq!(first.total_itemtypes(), second.total_itemtypes());
}

#[test]
fn test_parse_reader() {
    let mut listener = DefaultListener::new();
    let mut parser = Parser::new();
    parser.register_listener(&mut listener);
    parser
        .parse_reader(RESERVATION_MICRODATA.as_bytes())
        .expect("reading from a byte slice should succeed");
    assert_eq!(listener.total_itemtypes(), 4);
}
