//! Capability categories, per-type descriptors and the type resolver.
//!
//! A descriptor is the data-driven replacement for per-type generated code:
//! it names a vocabulary type, lists the capability categories it
//! satisfies, and carries one [`PropertySpec`] per property with the
//! ordered candidate alternatives the vocabulary permits there.

use std::collections::HashMap;

use serde_json::Value;

use crate::primitives::PrimitiveKind;

/// A role an entity kind can play where a property expects one,
/// independent of its concrete type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Object,
    Link,
    Image,
    Collection,
    OrderedCollection,
}

/// One alternative in a property's candidate order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alternative {
    /// A nested entity satisfying the given capability category.
    Entity(Category),
    /// A primitive value of the given kind.
    Primitive(PrimitiveKind),
}

/// The vocabulary definition of a single property.
#[derive(Debug)]
pub struct PropertySpec {
    /// Wire name, e.g. `attributedTo`.
    pub name: &'static str,
    /// Functional properties carry at most one value and are never
    /// encoded as arrays.
    pub functional: bool,
    /// Ordered alternatives tried during decode. Order is significant and
    /// must match the vocabulary definition, not any perceived likelihood.
    pub candidates: Vec<Alternative>,
    /// Wire name of the sibling natural-language map, e.g. `contentMap`.
    pub map_name: Option<&'static str>,
}

impl PropertySpec {
    pub fn list(name: &'static str, candidates: Vec<Alternative>) -> Self {
        Self {
            name,
            functional: false,
            candidates,
            map_name: None,
        }
    }

    pub fn functional(name: &'static str, candidates: Vec<Alternative>) -> Self {
        Self {
            name,
            functional: true,
            candidates,
            map_name: None,
        }
    }

    pub fn with_map(mut self, map_name: &'static str) -> Self {
        self.map_name = Some(map_name);
        self
    }
}

/// The vocabulary definition of a concrete entity type.
#[derive(Debug)]
pub struct EntityDescriptor {
    /// Canonical type name, appended to the discriminator list on
    /// serialization when absent.
    pub name: &'static str,
    /// Capability categories this type satisfies.
    pub categories: &'static [Category],
    /// Property table, in serialization order.
    pub properties: Vec<PropertySpec>,
}

impl EntityDescriptor {
    pub fn new(name: &'static str, categories: &'static [Category], properties: Vec<PropertySpec>) -> Self {
        Self {
            name,
            categories,
            properties,
        }
    }

    pub fn satisfies(&self, category: Category) -> bool {
        self.categories.contains(&category)
    }

    /// Looks a property up by its wire name.
    pub fn property(&self, name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|spec| spec.name == name)
    }

    /// Looks a property up by the wire name of its natural-language map.
    pub fn property_for_map(&self, map_name: &str) -> Option<&PropertySpec> {
        self.properties.iter().find(|spec| spec.map_name == Some(map_name))
    }
}

/// Maps `"type"` discriminator strings to entity descriptors.
///
/// Populated from the vocabulary definition; see
/// [`vocab::default_registry`](crate::vocab::default_registry) for the
/// built-in core subset.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<&'static str, &'static EntityDescriptor>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a descriptor under its canonical name. A later
    /// registration under the same name replaces the earlier one.
    pub fn register(&mut self, descriptor: &'static EntityDescriptor) {
        self.entries.insert(descriptor.name, descriptor);
    }

    pub fn get(&self, name: &str) -> Option<&'static EntityDescriptor> {
        self.entries.get(name).copied()
    }

    /// Resolves the (possibly multi-valued) `"type"` field of a wire
    /// object against a requested capability category.
    ///
    /// Discriminators are tried in the order they appear on the wire, and
    /// the first name whose registered descriptor satisfies the category
    /// wins. Wire order, not any vocabulary hierarchy, defines resolution,
    /// so any two decoders agree on the same bytes. An unknown
    /// discriminator is not an error; `None` tells the caller to fall
    /// through to the opaque-unknown representation.
    pub fn resolve(&self, discriminators: &[String], category: Category) -> Option<&'static EntityDescriptor> {
        discriminators
            .iter()
            .find_map(|name| self.get(name).filter(|descriptor| descriptor.satisfies(category)))
    }
}

/// Extracts candidate discriminators from a wire `"type"` value.
///
/// A bare string yields one candidate; an array yields its string members
/// in wire order. Non-string members carry no resolvable name and are
/// skipped.
pub(crate) fn collect_discriminators(raw: &Value) -> Vec<String> {
    match raw {
        Value::String(name) => vec![name.clone()],
        Value::Array(items) => items.iter().filter_map(|item| item.as_str().map(str::to_string)).collect(),
        _ => Vec::new(),
    }
}
