//! The property slot, core of the polymorphic codec.
//!
//! A slot holds one occurrence of a property value: a nested entity, a
//! primitive, or an opaque unknown payload. Exactly one alternative is
//! populated, and which one is decided by walking the owning property's
//! candidate order against the raw JSON value.

use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::envelope::Entity;
use crate::errors::DecodeError;
use crate::primitives::{LangString, MediaType, Primitive, UriRef, XsdDuration};
use crate::registry::{collect_discriminators, Alternative, Category, TypeRegistry};

/// One occurrence of a property value.
///
/// All kind tests are side-effect-free and safe to call speculatively; a
/// slot never mutates on inspection.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertySlot {
    /// A nested entity, together with the capability category under which
    /// its type resolved.
    Entity { category: Category, entity: Box<Entity> },
    /// A primitive value.
    Primitive(Primitive),
    /// A value no alternative matched, preserved verbatim so it survives
    /// the decode/encode round trip untouched.
    Unknown(Value),
}

impl PropertySlot {
    /// Decodes a raw value against a property's candidate order.
    ///
    /// A JSON object carrying a `"type"` field is offered to the resolver
    /// once per entity category in the candidate order; the first resolve
    /// wins and the object decodes recursively into that type. An object
    /// without `"type"` cannot be resolved and is preserved as unknown
    /// rather than interpreted. Any other value is offered to the
    /// primitive kinds in candidate order; a malformed value (as opposed
    /// to a mismatched shape) aborts the decode.
    pub fn decode(raw: &Value, candidates: &[Alternative], registry: &TypeRegistry) -> Result<Self, DecodeError> {
        if let Value::Object(map) = raw {
            if let Some(type_value) = map.get("type") {
                let discriminators = collect_discriminators(type_value);
                for alternative in candidates {
                    if let Alternative::Entity(category) = alternative {
                        if let Some(descriptor) = registry.resolve(&discriminators, *category) {
                            let entity = Entity::decode_with(descriptor, map, registry)?;
                            return Ok(PropertySlot::Entity {
                                category: *category,
                                entity: Box::new(entity),
                            });
                        }
                    }
                }
                debug!(types = ?discriminators, "no descriptor resolved, keeping nested object as unknown");
            }
            return Ok(PropertySlot::Unknown(raw.clone()));
        }

        for alternative in candidates {
            if let Alternative::Primitive(kind) = alternative {
                if let Some(primitive) = Primitive::decode(*kind, raw)? {
                    return Ok(PropertySlot::Primitive(primitive));
                }
            }
        }
        Ok(PropertySlot::Unknown(raw.clone()))
    }

    /// Serializes the populated alternative back to its wire form. An
    /// unknown payload is emitted verbatim.
    pub fn encode(&self) -> Value {
        match self {
            PropertySlot::Entity { entity, .. } => entity.encode(),
            PropertySlot::Primitive(primitive) => primitive.encode(),
            PropertySlot::Unknown(raw) => raw.clone(),
        }
    }

    // === Constructors ===

    pub fn entity(category: Category, entity: Entity) -> Self {
        PropertySlot::Entity {
            category,
            entity: Box::new(entity),
        }
    }

    pub fn iri(value: Url) -> Self {
        PropertySlot::Primitive(Primitive::Iri(value))
    }

    pub fn uri(value: UriRef) -> Self {
        PropertySlot::Primitive(Primitive::AnyUri(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        PropertySlot::Primitive(Primitive::String(value.into()))
    }

    pub fn lang_string(value: LangString) -> Self {
        PropertySlot::Primitive(Primitive::LangString(value))
    }

    pub fn float(value: f64) -> Self {
        PropertySlot::Primitive(Primitive::Float(value))
    }

    pub fn date_time(value: chrono::DateTime<chrono::FixedOffset>) -> Self {
        PropertySlot::Primitive(Primitive::DateTime(value))
    }

    pub fn duration(value: XsdDuration) -> Self {
        PropertySlot::Primitive(Primitive::Duration(value))
    }

    pub fn media_type(value: MediaType) -> Self {
        PropertySlot::Primitive(Primitive::MediaType(value))
    }

    pub fn unknown(value: Value) -> Self {
        PropertySlot::Unknown(value)
    }

    // === Kind accessors ===

    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            PropertySlot::Entity { entity, .. } => Some(entity),
            _ => None,
        }
    }

    /// The capability category the nested entity resolved under.
    pub fn category(&self) -> Option<Category> {
        match self {
            PropertySlot::Entity { category, .. } => Some(*category),
            _ => None,
        }
    }

    pub fn as_primitive(&self) -> Option<&Primitive> {
        match self {
            PropertySlot::Primitive(primitive) => Some(primitive),
            _ => None,
        }
    }

    pub fn as_iri(&self) -> Option<&Url> {
        match self.as_primitive() {
            Some(Primitive::Iri(url)) => Some(url),
            _ => None,
        }
    }

    pub fn as_uri(&self) -> Option<&UriRef> {
        match self.as_primitive() {
            Some(Primitive::AnyUri(uri)) => Some(uri),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self.as_primitive() {
            Some(Primitive::String(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_lang_string(&self) -> Option<&LangString> {
        match self.as_primitive() {
            Some(Primitive::LangString(text)) => Some(text),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.as_primitive() {
            Some(Primitive::Float(number)) => Some(*number),
            _ => None,
        }
    }

    pub fn as_date_time(&self) -> Option<&chrono::DateTime<chrono::FixedOffset>> {
        match self.as_primitive() {
            Some(Primitive::DateTime(instant)) => Some(instant),
            _ => None,
        }
    }

    pub fn as_duration(&self) -> Option<&XsdDuration> {
        match self.as_primitive() {
            Some(Primitive::Duration(duration)) => Some(duration),
            _ => None,
        }
    }

    pub fn as_media_type(&self) -> Option<&MediaType> {
        match self.as_primitive() {
            Some(Primitive::MediaType(media_type)) => Some(media_type),
            _ => None,
        }
    }

    pub fn as_unknown(&self) -> Option<&Value> {
        match self {
            PropertySlot::Unknown(raw) => Some(raw),
            _ => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, PropertySlot::Entity { .. })
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, PropertySlot::Unknown(_))
    }
}
