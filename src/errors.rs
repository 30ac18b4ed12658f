use thiserror::Error;

/// Errors raised while decoding a wire document.
///
/// Only genuinely malformed values surface here. An alternative that merely
/// fails to match a property slot, an unregistered `"type"` discriminator on
/// a nested object, or an unrecognized key at the entity level are all
/// handled by falling through to the opaque-unknown representation and never
/// reach this type.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("malformed xsd:dateTime value: {0}")]
    InvalidDateTime(String),
    #[error("malformed xsd:duration value: {0}")]
    InvalidDuration(String),
    #[error("malformed MIME type value: {0}")]
    InvalidMediaType(String),
    #[error("malformed IRI reference: {0}")]
    InvalidIri(String),
    #[error("malformed URI reference: {0}")]
    InvalidUri(String),
    #[error("top-level document is not a JSON object")]
    NotAnObject,
    #[error("no registered type matches the top-level document")]
    UnknownType,
    #[error("property '{name}': {source}")]
    Property {
        name: String,
        #[source]
        source: Box<DecodeError>,
    },
}

impl DecodeError {
    /// Wraps an error with the wire name of the property whose decode failed.
    pub(crate) fn in_property(self, name: &str) -> Self {
        DecodeError::Property {
            name: name.to_string(),
            source: Box::new(self),
        }
    }
}

/// Errors raised by the name-checked mutation API of an entity.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum PropertyError {
    #[error("unknown property name: {0}")]
    UnknownProperty(String),
    #[error("property '{0}' is functional and holds at most one value")]
    Functional(String),
    #[error("property '{0}' is not functional")]
    NotFunctional(String),
    #[error("property '{0}' carries no natural-language map")]
    NoLanguageMap(String),
}
