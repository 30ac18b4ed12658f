//! Property containers: multi-valued lists, functional (single-valued)
//! properties and natural-language maps.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::errors::DecodeError;
use crate::registry::{Alternative, TypeRegistry};
use crate::slot::PropertySlot;

/// An ordered, non-functional property.
///
/// Insertion order is semantically meaningful and survives the
/// decode/encode round trip, with one deliberate exception: a
/// one-element list re-encodes as a bare scalar. The wire format treats
/// both shapes as equivalent, so a property decoded from a one-element
/// array comes back collapsed. This normalization is intentional and must
/// not be "fixed".
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PropertyList {
    slots: Vec<PropertySlot>,
}

impl PropertyList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes either a bare value (wire shorthand for a one-element list)
    /// or an array. Any element failing to decode aborts the whole list;
    /// there are no partial lists.
    pub(crate) fn decode(raw: &Value, candidates: &[Alternative], registry: &TypeRegistry) -> Result<Self, DecodeError> {
        let slots = match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| PropertySlot::decode(item, candidates, registry))
                .collect::<Result<Vec<_>, _>>()?,
            other => vec![PropertySlot::decode(other, candidates, registry)?],
        };
        Ok(Self { slots })
    }

    /// `None` when the list is empty, a bare scalar for a single element,
    /// an array otherwise.
    pub(crate) fn encode(&self) -> Option<Value> {
        match self.slots.as_slice() {
            [] => None,
            [single] => Some(single.encode()),
            many => Some(Value::Array(many.iter().map(PropertySlot::encode).collect())),
        }
    }

    pub fn append(&mut self, slot: PropertySlot) {
        self.slots.push(slot);
    }

    pub fn prepend(&mut self, slot: PropertySlot) {
        self.slots.insert(0, slot);
    }

    /// Removes and returns the slot at `index`, or `None` when out of
    /// bounds.
    pub fn remove(&mut self, index: usize) -> Option<PropertySlot> {
        (index < self.slots.len()).then(|| self.slots.remove(index))
    }

    pub fn get(&self, index: usize) -> Option<&PropertySlot> {
        self.slots.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertySlot> {
        self.slots.iter()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl FromIterator<PropertySlot> for PropertyList {
    fn from_iter<I: IntoIterator<Item = PropertySlot>>(iter: I) -> Self {
        Self {
            slots: iter.into_iter().collect(),
        }
    }
}

/// A property the vocabulary declares to carry at most one value.
///
/// On the wire a functional property is encoded exactly like a single
/// property slot; the only difference from a one-element list is that no
/// append or prepend operation exists; setting replaces.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FunctionalProperty {
    slot: Option<PropertySlot>,
}

impl FunctionalProperty {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn decode(raw: &Value, candidates: &[Alternative], registry: &TypeRegistry) -> Result<Self, DecodeError> {
        Ok(Self {
            slot: Some(PropertySlot::decode(raw, candidates, registry)?),
        })
    }

    pub(crate) fn encode(&self) -> Option<Value> {
        self.slot.as_ref().map(PropertySlot::encode)
    }

    /// Replaces the current value.
    pub fn set(&mut self, slot: PropertySlot) {
        self.slot = Some(slot);
    }

    pub fn take(&mut self) -> Option<PropertySlot> {
        self.slot.take()
    }

    pub fn get(&self) -> Option<&PropertySlot> {
        self.slot.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.slot.is_some()
    }
}

/// A natural-language map: BCP 47 language tag to localized string.
///
/// Presence is independent of the sibling list property, and an
/// explicitly-set-but-empty map is distinct from an absent one: the
/// entity stores `Option<LanguageMap>`, and `Some(empty)` still encodes
/// as `{}`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LanguageMap {
    entries: HashMap<String, String>,
}

impl LanguageMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads every string-valued member of a wire object. Members of any
    /// other shape are skipped rather than failing the document; one odd
    /// entry does not invalidate the rest of the map.
    pub(crate) fn decode(raw: &Map<String, Value>) -> Self {
        let entries = raw
            .iter()
            .filter_map(|(tag, value)| value.as_str().map(|text| (tag.clone(), text.to_string())))
            .collect();
        Self { entries }
    }

    pub(crate) fn encode(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(tag, text)| (tag.clone(), Value::String(text.clone())))
            .collect();
        Value::Object(map)
    }

    pub fn set(&mut self, tag: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(tag.into(), value.into());
    }

    pub fn get(&self, tag: &str) -> Option<&str> {
        self.entries.get(tag).map(String::as_str)
    }

    pub fn remove(&mut self, tag: &str) -> Option<String> {
        self.entries.remove(tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(tag, text)| (tag.as_str(), text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
