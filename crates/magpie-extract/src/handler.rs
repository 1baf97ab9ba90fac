use std::collections::HashMap;

use serde_json::Value;

use magpie_item::{ItemArena, ItemId, PropertyValue};

use crate::format::Format;
use crate::listener::Listener;

/// Map of lowercased attribute names to values for one start tag.
pub type AttributeMap = HashMap<String, String>;

/// The container tag for embedded JSON-LD blocks.
const SCRIPT_TAG: &str = "script";

/// Script `type` attribute value marking a JSON-LD block.
const JSONLD_SCRIPT_TYPE: &str = "application/ld+json";

/// [§ Items](https://www.w3.org/TR/microdata/#items) "itemscope" attribute.
const ITEMSCOPE_ATTRIBUTE: &str = "itemscope";

/// [§ Items](https://www.w3.org/TR/microdata/#items) "itemtype" attribute.
const ITEMTYPE_ATTRIBUTE: &str = "itemtype";

/// [§ Names: the itemprop attribute](https://www.w3.org/TR/microdata/#names-the-itemprop-attribute).
const ITEMPROP_ATTRIBUTE: &str = "itemprop";

/// Generic `type` attribute, inspected on `script` tags.
const TYPE_ATTRIBUTE: &str = "type";

/// Fallback value attribute for tags without a dedicated one.
const CONTENT_ATTRIBUTE: &str = "content";

/// The reserved type-declaration key inside JSON-LD objects.
const JSONLD_TYPE_KEY: &str = "@type";

/// Classification of one currently open tag.
///
/// One entry is pushed per tag open and popped per tag close, so the stack
/// depth always equals the event source's nesting depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagClass {
    /// A `<script type="application/ld+json">` block whose text is being
    /// captured for JSON parsing.
    JsonLdBlock,
    /// A tag that opened a new microdata item scope.
    ItemScope,
    /// Any other tag.
    Plain,
}

/// [§ Values](https://www.w3.org/TR/microdata/#values)
///
/// The attribute a tag's property value is read from, when the microdata
/// spec assigns the tag a dedicated value attribute. Tags not listed here
/// fall back to the `content` attribute, then to their enclosed text.
fn inline_value_attribute(tag: &str) -> Option<&'static str> {
    match tag {
        // "If the element is an a, area, ... link element: the value is the
        // resulting URL string of the element's href attribute"
        "a" | "area" | "link" => Some("href"),
        // "If the element is an img element: ... src attribute"
        "img" => Some("src"),
        // "If the element is a time element: the value is the element's
        // datetime value"
        "time" => Some("datetime"),
        // "If the element is an iframe, embed or object element: ... data"
        "iframe" | "embed" | "object" => Some("data"),
        _ => None,
    }
}

/// Derive the short type name from an `itemtype` attribute value.
///
/// `http://schema.org/Person` yields `Person`; a value without `/` is
/// returned unchanged.
fn short_type_name(itemtype: &str) -> &str {
    itemtype
        .rsplit('/')
        .find(|segment| !segment.is_empty())
        .unwrap_or(itemtype)
}

/// The event-driven item-building state machine.
///
/// Consumes tag-open, tag-close, and text events in document order and
/// reconstructs schema.org item trees, dispatching notifications to the
/// registered listeners as it goes. Both supported formats are handled:
/// microdata items are assembled property by property on an open-item stack,
/// and JSON-LD blocks are buffered verbatim and parsed on the closing
/// `</script>`.
///
/// The handler expects a *balanced* event stream: every open is matched by
/// exactly one close, in LIFO order. The [`Parser`](crate::Parser) driver
/// guarantees this even for malformed HTML; callers driving the handler from
/// their own event source must do the same.
pub struct ExtractHandler<'d, 'l> {
    /// Arena owning every item of this parse.
    arena: ItemArena,
    /// Items currently under construction, innermost last.
    open_items: Vec<ItemId>,
    /// Classification of every open tag, parallel to the tag nesting.
    tag_classes: Vec<TagClass>,
    /// True while inside a JSON-LD script block.
    capturing_jsonld: bool,
    /// Property awaiting its value from enclosed text. Never set while
    /// `capturing_jsonld` holds; the two capture modes share `text_buffer`.
    pending_property: Option<String>,
    /// Shared buffer for text between a qualifying open and its close.
    text_buffer: String,
    /// Count of every itemtype discovery since document start.
    total_itemtypes: usize,
    /// Registered observers, notified in order.
    listeners: &'d mut [&'l mut dyn Listener],
}

impl<'d, 'l> ExtractHandler<'d, 'l> {
    /// Create a handler dispatching to the given listeners.
    pub fn new(listeners: &'d mut [&'l mut dyn Listener]) -> Self {
        Self {
            arena: ItemArena::new(),
            open_items: Vec::new(),
            tag_classes: Vec::new(),
            capturing_jsonld: false,
            pending_property: None,
            text_buffer: String::new(),
            total_itemtypes: 0,
            listeners,
        }
    }

    /// Notify listeners that parsing has begun.
    pub fn document_start(&mut self) {
        for listener in self.listeners.iter_mut() {
            listener.parsing_started();
        }
    }

    /// Notify listeners that parsing has finished, with the final count of
    /// itemtype discoveries.
    pub fn document_end(&mut self) {
        let total = self.total_itemtypes;
        for listener in self.listeners.iter_mut() {
            listener.parsing_finished(total);
        }
    }

    /// Handle a start tag.
    ///
    /// Recognizes, in order: JSON-LD script blocks, new item scopes
    /// (`itemscope` + `itemtype`), and leaf properties (`itemprop` inside an
    /// open item). Tag and attribute names match case-insensitively;
    /// `attrs` keys must already be lowercase.
    pub fn tag_open(&mut self, name: &str, attrs: &AttributeMap) {
        let tag = name.to_ascii_lowercase();

        if tag == SCRIPT_TAG {
            let is_jsonld = attrs
                .get(TYPE_ATTRIBUTE)
                .is_some_and(|value| value.eq_ignore_ascii_case(JSONLD_SCRIPT_TYPE));
            if is_jsonld {
                // The two capture modes share one text buffer; a property
                // left pending by a misnested tag must not leak into it.
                self.pending_property = None;
                self.text_buffer.clear();
                self.capturing_jsonld = true;
                self.tag_classes.push(TagClass::JsonLdBlock);
                return;
            }
            self.tag_classes.push(TagClass::Plain);
            return;
        }

        let itemprop = attrs.get(ITEMPROP_ATTRIBUTE);
        let current = self.open_items.last().copied();

        if attrs.contains_key(ITEMSCOPE_ATTRIBUTE)
            && let Some(itemtype) = attrs.get(ITEMTYPE_ATTRIBUTE)
        {
            // A new item. Attachment to the parent is decided here, once.
            let short = short_type_name(itemtype);
            let item = self.arena.alloc(short);
            self.notify_itemtype(short, Format::Microdata);
            if let Some(property) = itemprop
                && let Some(parent) = current
            {
                self.arena
                    .append_property(parent, property, PropertyValue::Item(item));
            }
            self.open_items.push(item);
            self.tag_classes.push(TagClass::ItemScope);
            return;
        }

        if let Some(property) = itemprop
            && let Some(parent) = current
        {
            // A leaf property of the enclosing item.
            match inline_value_attribute(&tag) {
                Some(attribute) => {
                    if let Some(value) = attrs.get(attribute) {
                        self.arena.append_property(
                            parent,
                            property,
                            PropertyValue::Text(value.clone()),
                        );
                    }
                }
                None => {
                    if let Some(content) = attrs.get(CONTENT_ATTRIBUTE) {
                        self.arena.append_property(
                            parent,
                            property,
                            PropertyValue::Text(content.clone()),
                        );
                    } else {
                        // No inline value for this tag; capture the text
                        // up to the matching close instead.
                        self.pending_property = Some(property.clone());
                    }
                }
            }
        }

        self.tag_classes.push(TagClass::Plain);
    }

    /// Handle an end tag.
    ///
    /// Closes JSON-LD capture, consumes pending property text, and emits a
    /// completed item when the outermost scope of a microdata tree closes.
    pub fn tag_close(&mut self, name: &str) {
        if name.eq_ignore_ascii_case(SCRIPT_TAG) && self.capturing_jsonld {
            let raw = std::mem::take(&mut self.text_buffer);
            self.capturing_jsonld = false;
            let _ = self.tag_classes.pop();
            match serde_json::from_str::<Value>(&raw) {
                Ok(value) => {
                    self.walk_types(&value);
                    for listener in self.listeners.iter_mut() {
                        listener.item_found(&value);
                    }
                }
                Err(error) => {
                    // A malformed block is isolated: skip it and keep
                    // extracting from the rest of the document.
                    log::debug!("skipping malformed ld+json block: {error}");
                }
            }
            return;
        }

        if let Some(parent) = self.open_items.last().copied()
            && self.pending_property.is_some()
        {
            // Consume the text captured since the property's open tag.
            if let Some(property) = self.pending_property.take() {
                let text = std::mem::take(&mut self.text_buffer);
                self.arena.append_property(
                    parent,
                    &property,
                    PropertyValue::Text(text.trim().to_owned()),
                );
            }
        }

        if self.tag_classes.pop() == Some(TagClass::ItemScope)
            && let Some(finished) = self.open_items.pop()
            && self.open_items.is_empty()
        {
            // The outermost scope closed; the whole tree is complete.
            let item = self.arena.to_value(finished);
            for listener in self.listeners.iter_mut() {
                listener.item_found(&item);
            }
        }
    }

    /// Handle character data between tags.
    ///
    /// Buffered only while a JSON-LD block or a pending property is being
    /// captured; all other inter-tag text carries no annotation data.
    pub fn text(&mut self, chars: &str) {
        if self.capturing_jsonld || self.pending_property.is_some() {
            self.text_buffer.push_str(chars);
        }
    }

    /// Recursively scan a parsed JSON-LD value for `@type` declarations.
    ///
    /// Object entries are visited in original order: a key equal to `@type`
    /// (case-insensitive) with a string value yields an itemtype
    /// notification and is not recursed into; every other entry's value is
    /// recursed into. Arrays are walked element-wise. The walk is
    /// depth-first, so discovery order equals document order.
    fn walk_types(&mut self, value: &Value) {
        match value {
            Value::Object(object) => {
                for (key, entry) in object {
                    if key.eq_ignore_ascii_case(JSONLD_TYPE_KEY) {
                        if let Some(itemtype) = entry.as_str() {
                            self.notify_itemtype(itemtype, Format::JsonLd);
                        }
                    } else {
                        self.walk_types(entry);
                    }
                }
            }
            Value::Array(elements) => {
                for element in elements {
                    self.walk_types(element);
                }
            }
            Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => {}
        }
    }

    /// Count an itemtype discovery and notify listeners.
    fn notify_itemtype(&mut self, itemtype: &str, format: Format) {
        self.total_itemtypes += 1;
        for listener in self.listeners.iter_mut() {
            listener.itemtype_found(itemtype, format);
        }
    }
}
