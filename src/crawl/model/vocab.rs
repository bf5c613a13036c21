//! Terms of the index discovery protocol.

// JSON-LD keywords; @context is carried through opaquely and never read
pub(crate) const ID: &str = "@id";
pub(crate) const TYPE: &str = "@type";
pub(crate) const GRAPH: &str = "@graph";

// Discovery chain (root document and type index)
pub(crate) const PUBLIC_TYPE_INDEX: &str = "solid:publicTypeIndex";
pub(crate) const TYPE_INDEX_REGISTRATION: &str = "solid:TypeIndexRegistration";
pub(crate) const FOR_CLASS: &str = "solid:forClass";
pub(crate) const INSTANCE_CONTAINER: &str = "solid:instanceContainer";

// Index graph
pub(crate) const INDEX: &str = "ex:Index";
pub(crate) const PROPERTY_INDEX: &str = "ex:PropertyIndex";
pub(crate) const PROPERTY_INDEX_REGISTRATION: &str = "ex:PropertyIndexRegistration";
pub(crate) const INSTANCES_IN: &str = "ex:instancesIn";
pub(crate) const INSTANCES: &str = "ex:instances";
pub(crate) const SEE_ALSO: &str = "rdfs:seeAlso";
