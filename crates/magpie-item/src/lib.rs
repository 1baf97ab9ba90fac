//! Item tree model for the Magpie schema.org extractor.
//!
//! This crate provides an arena-based representation of microdata items,
//! following the JSON conversion described by
//! [§ JSON](https://www.w3.org/TR/microdata/#json) of the W3C Microdata
//! specification: an item is converted to an object whose every property
//! maps to an *array* of values, where each value is either a string or a
//! nested item.
//!
//! # Design
//!
//! Items under construction form a tree. The tree uses arena allocation with
//! [`ItemId`] indices for all parent/child relationships, so a child can be
//! attached to its parent's property list at creation time while the child
//! itself stays addressable for further mutation. Attachment happens exactly
//! once, at creation; afterwards only the child's own properties change.

use serde_json::{Map, Value};

/// The reserved property holding an item's declared type.
///
/// [§ Items](https://www.w3.org/TR/microdata/#items)
/// "The itemtype attribute, if specified, must have a value that is an
/// unordered set of unique space-separated tokens".
///
/// Magpie stores the short type name (the trailing path segment of the
/// `itemtype` URL) as a single-element list under this property.
pub const TYPE_PROPERTY: &str = "type";

/// A type-safe index into the item arena.
///
/// `ItemId` provides O(1) access to any item without borrowing issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemId(pub usize);

/// A single property value of an item.
///
/// [§ Values](https://www.w3.org/TR/microdata/#values)
/// "The property value of a name-value pair added to an item with the
/// itemprop attribute" is either string data (from an attribute or the
/// element's text) or another item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// String data, taken from an attribute value or trimmed element text.
    Text(String),
    /// A nested item, stored in the same arena.
    Item(ItemId),
}

/// One item: an ordered mapping from property name to a list of values.
///
/// Repeated property names accumulate into one ordered list; a property is
/// never overwritten. Ordering is insertion order, which equals document
/// order for properties produced by the extractor.
#[derive(Debug, Clone, Default)]
pub struct Item {
    /// Property lists in insertion order. Linear lookup is fine: real items
    /// have a handful of properties.
    properties: Vec<(String, Vec<PropertyValue>)>,
}

impl Item {
    /// All properties in insertion order.
    #[must_use]
    pub fn properties(&self) -> &[(String, Vec<PropertyValue>)] {
        &self.properties
    }

    /// The value list of a property, if present.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&[PropertyValue]> {
        self.properties
            .iter()
            .find(|(property, _)| property == name)
            .map(|(_, values)| values.as_slice())
    }

    /// Append a value to a property's list, creating the list on first use.
    fn append(&mut self, name: &str, value: PropertyValue) {
        if let Some((_, values)) = self
            .properties
            .iter_mut()
            .find(|(property, _)| property == name)
        {
            values.push(value);
        } else {
            self.properties.push((name.to_owned(), vec![value]));
        }
    }
}

/// Arena holding every item of one document parse.
///
/// All items live in a contiguous vector, addressed by [`ItemId`]. This
/// mirrors the open-item bookkeeping of the extractor: an item is allocated
/// when its scope opens, attached to its parent immediately, and mutated in
/// place until its scope closes.
#[derive(Debug, Clone, Default)]
pub struct ItemArena {
    items: Vec<Item>,
}

impl ItemArena {
    /// Create an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of items allocated so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no item has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Allocate a new item whose `type` property holds the given type name.
    pub fn alloc(&mut self, itemtype: &str) -> ItemId {
        let id = ItemId(self.items.len());
        let mut item = Item::default();
        item.append(TYPE_PROPERTY, PropertyValue::Text(itemtype.to_owned()));
        self.items.push(item);
        id
    }

    /// Get an item by its id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.get(id.0)
    }

    /// Append a value to the named property of the given item.
    ///
    /// Appends to the existing list if the property was seen before,
    /// otherwise creates a singleton list.
    pub fn append_property(&mut self, id: ItemId, name: &str, value: PropertyValue) {
        if let Some(item) = self.items.get_mut(id.0) {
            item.append(name, value);
        }
    }

    /// Render an item (recursively) as a JSON value.
    ///
    /// Per [§ JSON](https://www.w3.org/TR/microdata/#json), every property
    /// becomes an array, and nested items become nested objects. Property
    /// order is insertion order.
    #[must_use]
    pub fn to_value(&self, id: ItemId) -> Value {
        let mut object = Map::new();
        if let Some(item) = self.get(id) {
            for (name, values) in item.properties() {
                let rendered = values
                    .iter()
                    .map(|value| match value {
                        PropertyValue::Text(text) => Value::String(text.clone()),
                        PropertyValue::Item(child) => self.to_value(*child),
                    })
                    .collect();
                let _ = object.insert(name.clone(), Value::Array(rendered));
            }
        }
        Value::Object(object)
    }
}
