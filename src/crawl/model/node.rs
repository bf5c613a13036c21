use serde_json::Value;

use super::vocab;

/// One entry of a document's `@graph` body.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Node<'a>(&'a Value);

impl<'a> Node<'a> {
    pub(crate) fn id(&self) -> Option<&'a str> {
        self.get_str(vocab::ID)
    }
    pub(crate) fn node_type(&self) -> NodeType {
        match self.0.get(vocab::TYPE) {
            Some(Value::String(ty)) => NodeType::from_term(ty),
            Some(Value::Array(types)) => types
                .iter()
                .find_map(Value::as_str)
                .map_or(NodeType::Unknown, NodeType::from_term),
            _ => NodeType::Unknown,
        }
    }
    pub(crate) fn get_str(&self, prop: &str) -> Option<&'a str> {
        self.0.get(prop).and_then(Value::as_str)
    }
    /// Resolve a property to an IRI. The value may be a plain string, a node
    /// reference object, or an array; the first IRI wins.
    pub(crate) fn get_node_iri(&self, prop: &str) -> Option<&'a str> {
        match self.0.get(prop)? {
            Value::String(iri) => Some(iri),
            Value::Object(map) => map.get(vocab::ID).and_then(Value::as_str),
            Value::Array(values) => values.iter().find_map(Value::as_str),
            _ => None,
        }
    }
    /// Where a property index registration keeps its instances:
    /// `ex:instancesIn`, with `rdfs:seeAlso` as the legacy fallback.
    pub(crate) fn instance_target(&self) -> Option<&'a str> {
        self.get_node_iri(vocab::INSTANCES_IN)
            .or_else(|| self.get_node_iri(vocab::SEE_ALSO))
    }
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        Node(value)
    }
}

/// Closed dispatch over the `@type` discriminators the walker interprets.
/// The protocol is open ended, so anything else is `Unknown` and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NodeType {
    Index,
    PropertyIndex,
    PropertyIndexRegistration,
    TypeIndexRegistration,
    Unknown,
}

impl NodeType {
    pub(crate) fn from_term(term: &str) -> NodeType {
        match term {
            vocab::INDEX => NodeType::Index,
            vocab::PROPERTY_INDEX => NodeType::PropertyIndex,
            vocab::PROPERTY_INDEX_REGISTRATION => NodeType::PropertyIndexRegistration,
            vocab::TYPE_INDEX_REGISTRATION => NodeType::TypeIndexRegistration,
            _ => NodeType::Unknown,
        }
    }
}
