//! Storage friendly presentation of the index document model.

use std::borrow::Cow;
use std::fmt::Display;

use anyhow::bail;
use serde::{Serialize, Serializer};
use serde_json::Value;

use super::node::{Node, NodeType};
use super::vocab;

/// A linked-data document as published by a pod: an optional `@context`,
/// an optional `@id` and `@type`, and either a `@graph` body (containers)
/// or scalar reference collections (leaves).
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Document<'a>(Cow<'a, Value>);

impl Document<'_> {
    pub(crate) fn id(&self) -> Option<&str> {
        self.get_str(vocab::ID)
    }
    pub(crate) fn type_is(&self, ty: &str) -> bool {
        self.doc_type() == Some(ty)
    }
    pub(crate) fn doc_type(&self) -> Option<&str> {
        match self.0.get(vocab::TYPE) {
            Some(Value::String(ty)) => Some(ty),
            Some(Value::Array(types)) => types.iter().find_map(Value::as_str),
            _ => None,
        }
    }
    pub(crate) fn has_graph(&self) -> bool {
        matches!(self.0.get(vocab::GRAPH), Some(Value::Array(_)))
    }
    /// The `@graph` body. Absent or mistyped bodies read as empty.
    pub(crate) fn graph(&self) -> impl Iterator<Item = Node<'_>> {
        self.0
            .get(vocab::GRAPH)
            .and_then(Value::as_array)
            .map(|entries| entries.as_slice())
            .unwrap_or_default()
            .iter()
            .map(Node::from)
    }
    /// The terminal `ex:instances` reference collection of a leaf document.
    pub(crate) fn instances(&self) -> Option<Vec<&str>> {
        self.get_str_array(vocab::INSTANCES)
    }
    /// Scan the graph body for a `solid:publicTypeIndex` pointer.
    pub(crate) fn public_type_index(&self) -> Option<&str> {
        self.graph()
            .find_map(|node| node.get_node_iri(vocab::PUBLIC_TYPE_INDEX))
    }
    /// Instance containers registered for `for_class`, in document order.
    /// Duplicates are kept; the walker's registry deduplicates visits.
    pub(crate) fn instance_containers(&self, for_class: &str) -> Vec<String> {
        self.graph()
            .filter(|node| {
                node.node_type() == NodeType::TypeIndexRegistration
                    && node.get_str(vocab::FOR_CLASS) == Some(for_class)
            })
            .filter_map(|node| node.get_node_iri(vocab::INSTANCE_CONTAINER))
            .map(str::to_owned)
            .collect()
    }
    pub(crate) fn get_str(&self, prop: &str) -> Option<&str> {
        self.0.get(prop).and_then(Value::as_str)
    }
    pub(crate) fn get_str_array(&self, prop: &str) -> Option<Vec<&str>> {
        if let Some(s) = self.get_str(prop) {
            return Some(vec![s]);
        }
        if let Some(Value::Array(array)) = self.0.get(prop) {
            if array.iter().all(|v| v.is_string()) {
                return Some(array.iter().filter_map(Value::as_str).collect());
            }
        }
        None
    }
    pub(crate) fn replace(self, property: &str, value: Value) -> Document<'static> {
        let mut doc = self.0.into_owned();
        if let Some(map) = doc.as_object_mut() {
            map.insert(property.to_string(), value);
        }
        Document(Cow::Owned(doc))
    }
}

impl TryFrom<Value> for Document<'static> {
    type Error = anyhow::Error;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if !value.is_object() {
            bail!("a document must be a JSON object");
        }
        Ok(Document(Cow::Owned(value)))
    }
}

impl Serialize for Document<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl Display for Document<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
