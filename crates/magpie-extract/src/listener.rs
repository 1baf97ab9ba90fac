use serde_json::Value;

use crate::format::Format;

/// Events reported while scanning a document for schema.org data.
///
/// All callbacks are synchronous and arrive in document order: exactly one
/// [`parsing_started`](Listener::parsing_started), zero or more
/// [`itemtype_found`](Listener::itemtype_found) and
/// [`item_found`](Listener::item_found) calls, then exactly one
/// [`parsing_finished`](Listener::parsing_finished). An item's types are
/// always reported before the item itself completes. A document without
/// annotations produces only the start and finish calls.
pub trait Listener {
    /// Parsing has begun; no tag has been processed yet.
    fn parsing_started(&mut self);

    /// A declared item type was discovered, in either format.
    fn itemtype_found(&mut self, itemtype: &str, format: Format);

    /// A complete top-level item was extracted, in the order top-level
    /// items close.
    fn item_found(&mut self, item: &Value);

    /// Parsing has finished; `total_itemtypes` counts every
    /// [`itemtype_found`](Listener::itemtype_found) call of this parse,
    /// across both formats.
    fn parsing_finished(&mut self, total_itemtypes: usize);

    /// Advisory flag a listener may maintain to tell its owner that it has
    /// seen [`parsing_finished`](Listener::parsing_finished). Not consulted
    /// by the extractor.
    fn is_parsing_finished(&self) -> bool {
        false
    }
}

/// A generic [`Listener`] that aggregates every extracted item and keeps the
/// final item-type count.
///
/// For a document with one complete microdata tree and one JSON-LD block,
/// [`items`](DefaultListener::items) holds two entries after the parse, each
/// a full item hierarchy.
#[derive(Debug, Default)]
pub struct DefaultListener {
    items: Vec<Value>,
    total_itemtypes: usize,
    finished: bool,
}

impl DefaultListener {
    /// Create a listener with no items collected yet.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every extracted top-level item, in completion order.
    ///
    /// Call after the parse has finished; earlier calls see only the items
    /// completed so far.
    #[must_use]
    pub fn items(&self) -> &[Value] {
        &self.items
    }

    /// The item-type count reported by `parsing_finished`. Zero until the
    /// parse finishes.
    #[must_use]
    pub fn total_itemtypes(&self) -> usize {
        self.total_itemtypes
    }
}

impl Listener for DefaultListener {
    fn parsing_started(&mut self) {
        log::info!("parsing started");
    }

    fn itemtype_found(&mut self, itemtype: &str, format: Format) {
        log::info!("itemtype: {itemtype} ({format})");
    }

    fn item_found(&mut self, item: &Value) {
        self.items.push(item.clone());
    }

    fn parsing_finished(&mut self, total_itemtypes: usize) {
        self.total_itemtypes = total_itemtypes;
        self.finished = true;
        log::info!("parsing finished, {total_itemtypes} itemtypes found");
    }

    fn is_parsing_finished(&self) -> bool {
        self.finished
    }
}
