//! Built-in core vocabulary subset.
//!
//! One descriptor per type, property tables included. Data, not code:
//! The tables drive the generic codec; nothing here implements any
//! per-type decode logic. Types and candidate orders follow the
//! ActivityStreams 2.0 vocabulary.
//!
//! See <https://www.w3.org/TR/activitystreams-vocabulary/>

use lazy_static::lazy_static;

use crate::primitives::PrimitiveKind;
use crate::registry::{Alternative, Category, EntityDescriptor, PropertySpec, TypeRegistry};

fn object_or_link() -> Vec<Alternative> {
    vec![
        Alternative::Entity(Category::Object),
        Alternative::Entity(Category::Link),
        Alternative::Primitive(PrimitiveKind::Iri),
    ]
}

fn image_or_link() -> Vec<Alternative> {
    vec![
        Alternative::Entity(Category::Image),
        Alternative::Entity(Category::Link),
        Alternative::Primitive(PrimitiveKind::Iri),
    ]
}

fn collection_ref() -> Vec<Alternative> {
    vec![
        Alternative::Entity(Category::Collection),
        Alternative::Entity(Category::Link),
        Alternative::Primitive(PrimitiveKind::Iri),
    ]
}

// name, summary: xsd:string or rdf:langString.
fn text() -> Vec<Alternative> {
    vec![
        Alternative::Primitive(PrimitiveKind::String),
        Alternative::Primitive(PrimitiveKind::LangString),
    ]
}

// content additionally admits a bare IRI reference.
fn text_or_iri() -> Vec<Alternative> {
    vec![
        Alternative::Primitive(PrimitiveKind::String),
        Alternative::Primitive(PrimitiveKind::LangString),
        Alternative::Primitive(PrimitiveKind::Iri),
    ]
}

fn date_time() -> Vec<Alternative> {
    vec![Alternative::Primitive(PrimitiveKind::DateTime)]
}

fn float() -> Vec<Alternative> {
    vec![Alternative::Primitive(PrimitiveKind::Float)]
}

fn object_properties() -> Vec<PropertySpec> {
    vec![
        PropertySpec::list("attachment", object_or_link()),
        PropertySpec::list("attributedTo", object_or_link()),
        PropertySpec::list("audience", object_or_link()),
        PropertySpec::list("content", text_or_iri()).with_map("contentMap"),
        PropertySpec::list("context", object_or_link()),
        PropertySpec::list("name", text()).with_map("nameMap"),
        PropertySpec::functional("endTime", date_time()),
        PropertySpec::list("generator", object_or_link()),
        PropertySpec::list("icon", image_or_link()),
        PropertySpec::list("image", image_or_link()),
        PropertySpec::list("inReplyTo", object_or_link()),
        PropertySpec::list("location", object_or_link()),
        PropertySpec::list("preview", object_or_link()),
        PropertySpec::functional("published", date_time()),
        PropertySpec::functional(
            "replies",
            vec![
                Alternative::Entity(Category::Collection),
                Alternative::Primitive(PrimitiveKind::Iri),
            ],
        ),
        PropertySpec::functional("startTime", date_time()),
        PropertySpec::list("summary", text()).with_map("summaryMap"),
        PropertySpec::list("tag", object_or_link()),
        PropertySpec::functional("updated", date_time()),
        PropertySpec::list(
            "url",
            vec![
                Alternative::Primitive(PrimitiveKind::AnyUri),
                Alternative::Entity(Category::Link),
            ],
        ),
        PropertySpec::list("to", object_or_link()),
        PropertySpec::list("bto", object_or_link()),
        PropertySpec::list("cc", object_or_link()),
        PropertySpec::list("bcc", object_or_link()),
        PropertySpec::functional("mediaType", vec![Alternative::Primitive(PrimitiveKind::MediaType)]),
        PropertySpec::functional("duration", vec![Alternative::Primitive(PrimitiveKind::Duration)]),
    ]
}

fn activity_properties() -> Vec<PropertySpec> {
    let mut properties = object_properties();
    properties.extend([
        PropertySpec::list("actor", object_or_link()),
        PropertySpec::list("object", object_or_link()),
        PropertySpec::list("target", object_or_link()),
        PropertySpec::list("result", object_or_link()),
        PropertySpec::list("origin", object_or_link()),
        PropertySpec::list("instrument", object_or_link()),
    ]);
    properties
}

fn link_properties() -> Vec<PropertySpec> {
    vec![
        PropertySpec::functional("href", vec![Alternative::Primitive(PrimitiveKind::Iri)]),
        PropertySpec::list("rel", vec![Alternative::Primitive(PrimitiveKind::String)]),
        PropertySpec::functional("mediaType", vec![Alternative::Primitive(PrimitiveKind::MediaType)]),
        PropertySpec::list("name", text()).with_map("nameMap"),
        PropertySpec::functional("hreflang", vec![Alternative::Primitive(PrimitiveKind::String)]),
        PropertySpec::functional("height", float()),
        PropertySpec::functional("width", float()),
        PropertySpec::list("preview", object_or_link()),
    ]
}

fn collection_properties() -> Vec<PropertySpec> {
    let mut properties = object_properties();
    properties.extend([
        PropertySpec::functional("totalItems", float()),
        PropertySpec::functional("current", collection_ref()),
        PropertySpec::functional("first", collection_ref()),
        PropertySpec::functional("last", collection_ref()),
        PropertySpec::list("items", object_or_link()),
    ]);
    properties
}

fn ordered_collection_properties() -> Vec<PropertySpec> {
    let mut properties = object_properties();
    properties.extend([
        PropertySpec::functional("totalItems", float()),
        PropertySpec::functional("current", collection_ref()),
        PropertySpec::functional("first", collection_ref()),
        PropertySpec::functional("last", collection_ref()),
        PropertySpec::list("orderedItems", object_or_link()),
    ]);
    properties
}

fn collection_page_properties() -> Vec<PropertySpec> {
    let mut properties = collection_properties();
    properties.extend([
        PropertySpec::functional("partOf", collection_ref()),
        PropertySpec::functional("next", collection_ref()),
        PropertySpec::functional("prev", collection_ref()),
    ]);
    properties
}

fn place_properties() -> Vec<PropertySpec> {
    let mut properties = object_properties();
    properties.extend([
        PropertySpec::functional(
            "altitude",
            vec![
                Alternative::Primitive(PrimitiveKind::Float),
                Alternative::Primitive(PrimitiveKind::Iri),
            ],
        ),
        PropertySpec::functional("latitude", float()),
        PropertySpec::functional("longitude", float()),
        PropertySpec::functional(
            "units",
            vec![
                Alternative::Primitive(PrimitiveKind::String),
                Alternative::Primitive(PrimitiveKind::AnyUri),
            ],
        ),
    ]);
    properties
}

lazy_static! {
    pub static ref OBJECT: EntityDescriptor = EntityDescriptor::new("Object", &[Category::Object], object_properties());
    pub static ref LINK: EntityDescriptor = EntityDescriptor::new("Link", &[Category::Link], link_properties());
    pub static ref MENTION: EntityDescriptor = EntityDescriptor::new("Mention", &[Category::Link], link_properties());
    pub static ref NOTE: EntityDescriptor = EntityDescriptor::new("Note", &[Category::Object], object_properties());
    pub static ref ARTICLE: EntityDescriptor = EntityDescriptor::new("Article", &[Category::Object], object_properties());
    pub static ref IMAGE: EntityDescriptor =
        EntityDescriptor::new("Image", &[Category::Object, Category::Image], object_properties());
    pub static ref PERSON: EntityDescriptor = EntityDescriptor::new("Person", &[Category::Object], object_properties());
    pub static ref PLACE: EntityDescriptor = EntityDescriptor::new("Place", &[Category::Object], place_properties());
    pub static ref CREATE: EntityDescriptor = EntityDescriptor::new("Create", &[Category::Object], activity_properties());
    pub static ref COLLECTION: EntityDescriptor = EntityDescriptor::new(
        "Collection",
        &[Category::Object, Category::Collection],
        collection_properties()
    );
    pub static ref ORDERED_COLLECTION: EntityDescriptor = EntityDescriptor::new(
        "OrderedCollection",
        &[Category::Object, Category::Collection, Category::OrderedCollection],
        ordered_collection_properties()
    );
    pub static ref COLLECTION_PAGE: EntityDescriptor = EntityDescriptor::new(
        "CollectionPage",
        &[Category::Object, Category::Collection],
        collection_page_properties()
    );
}

/// A registry pre-populated with the built-in core types.
pub fn default_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry.register(&OBJECT);
    registry.register(&LINK);
    registry.register(&MENTION);
    registry.register(&NOTE);
    registry.register(&ARTICLE);
    registry.register(&IMAGE);
    registry.register(&PERSON);
    registry.register(&PLACE);
    registry.register(&CREATE);
    registry.register(&COLLECTION);
    registry.register(&ORDERED_COLLECTION);
    registry.register(&COLLECTION_PAGE);
    registry
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_membership() {
        let registry = default_registry();

        let note = ["Note".to_string()];
        assert!(registry.resolve(&note, Category::Object).is_some());
        assert!(registry.resolve(&note, Category::Link).is_none());

        let mention = ["Mention".to_string()];
        assert!(registry.resolve(&mention, Category::Link).is_some());
        assert!(registry.resolve(&mention, Category::Object).is_none());

        let image = ["Image".to_string()];
        assert!(registry.resolve(&image, Category::Image).is_some());
        assert!(registry.resolve(&image, Category::Object).is_some());

        let ordered = ["OrderedCollection".to_string()];
        assert!(registry.resolve(&ordered, Category::Collection).is_some());
        assert!(registry.resolve(&ordered, Category::OrderedCollection).is_some());
        assert!(registry.resolve(&["Collection".to_string()], Category::OrderedCollection).is_none());
    }

    #[test]
    fn test_property_tables() {
        let content = NOTE.property("content").unwrap();
        assert!(!content.functional);
        assert_eq!(content.map_name, Some("contentMap"));
        assert_eq!(
            content.candidates,
            vec![
                Alternative::Primitive(PrimitiveKind::String),
                Alternative::Primitive(PrimitiveKind::LangString),
                Alternative::Primitive(PrimitiveKind::Iri),
            ]
        );

        let published = NOTE.property("published").unwrap();
        assert!(published.functional);

        // Candidate order is vocabulary data: float strictly before IRI.
        let altitude = PLACE.property("altitude").unwrap();
        assert_eq!(
            altitude.candidates,
            vec![
                Alternative::Primitive(PrimitiveKind::Float),
                Alternative::Primitive(PrimitiveKind::Iri),
            ]
        );

        assert_eq!(NOTE.property_for_map("contentMap").map(|spec| spec.name), Some("content"));
        assert!(NOTE.property("actor").is_none());
        assert!(CREATE.property("actor").is_some());
    }
}
