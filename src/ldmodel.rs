use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The normative JSON-LD context IRI for ActivityStreams 2.0 documents.
pub const ACTIVITY_STREAMS: &str = "https://www.w3.org/ns/activitystreams";

#[derive(Serialize, Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
// The @context property maps the keys of the JSON structure to terms of
// external vocabularies. This codec never interprets it: an incoming
// @context is dropped on decode (context processing belongs to a JSON-LD
// processor), and outgoing documents receive one through
// [`Entity::to_json_ld`](crate::envelope::Entity::to_json_ld).
pub enum Context {
    SingleString(String),
    SetOfString(Vec<String>),
    JsonObject(Value),
}

impl Context {
    /// The context every plain ActivityStreams document carries.
    pub fn activity_streams() -> Self {
        Context::SingleString(ACTIVITY_STREAMS.to_string())
    }
}

impl From<&Context> for Value {
    fn from(context: &Context) -> Self {
        match context {
            Context::SingleString(iri) => Value::String(iri.clone()),
            Context::SetOfString(iris) => Value::Array(iris.iter().cloned().map(Value::String).collect()),
            Context::JsonObject(value) => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_shapes() {
        let single = Context::activity_streams();
        assert_eq!(Value::from(&single), Value::String(ACTIVITY_STREAMS.to_string()));

        let set = Context::SetOfString(vec![ACTIVITY_STREAMS.to_string(), "https://w3id.org/security/v1".to_string()]);
        let value = Value::from(&set);
        assert_eq!(value.as_array().map(|a| a.len()), Some(2));

        let parsed: Context = serde_json::from_value(value).unwrap();
        assert_eq!(parsed, set);
    }
}
