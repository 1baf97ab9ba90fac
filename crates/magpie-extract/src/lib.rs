//! schema.org annotation extraction for Magpie.
//!
//! # Scope
//!
//! This crate implements:
//! - **Item Tree Builder** ([`ExtractHandler`]) — a push-based state machine
//!   consuming tag-open/tag-close/text events and reconstructing microdata
//!   item trees per [W3C Microdata](https://www.w3.org/TR/microdata/)
//! - **JSON-LD block extraction** — `<script type="application/ld+json">`
//!   content is buffered, parsed as JSON, and scanned for `@type`
//!   declarations; a malformed block is skipped without aborting the document
//! - **Listener dispatch** ([`Listener`], [`DefaultListener`]) — ordered,
//!   synchronous broadcast of parsing events to registered observers
//! - **Driver** ([`Parser`]) — feeds an HTML document through the
//!   [html5ever](https://docs.rs/html5ever) tokenizer into the handler
//!
//! # Not Implemented
//!
//! - RDFa attribute extraction ([`Format::Rdfa`] is declared for parity only)
//! - schema.org vocabulary validation
//! - Re-serialization of the original HTML

/// Driver wiring the HTML tokenizer to the extraction handler.
pub mod driver;
/// Annotation formats recognized by the extractor.
pub mod format;
/// The core event-driven item-building state machine.
pub mod handler;
/// Observer contract and the default aggregating listener.
pub mod listener;

pub use driver::{Error, Parser};
pub use format::Format;
pub use handler::{AttributeMap, ExtractHandler};
pub use listener::{DefaultListener, Listener};
