//! Reconciliation of a freshly fetched leaf against its mirrored version.

use serde_json::Value;
use tracing::debug;

use super::model::{Document, vocab};

/// Combine the previously mirrored version of a leaf document with a freshly
/// fetched one. Both documents must describe the same resource.
///
/// The result keeps the fresh document's shape; only the `ex:instances`
/// collection is widened to the union of both sides, so a reference that was
/// observed once is never dropped when a pod republishes a shorter listing.
/// When either side has no such collection the fresh document wins outright.
pub(crate) fn reconcile<'a>(old: Option<Document<'_>>, new: Document<'a>) -> Document<'a> {
    let Some(old) = old else {
        return new;
    };
    let (Some(old_refs), Some(new_refs)) = (old.instances(), new.instances()) else {
        return new;
    };

    let retained: Vec<&str> = old_refs
        .iter()
        .filter(|iri| !new_refs.contains(iri))
        .copied()
        .collect();
    if retained.is_empty() && new_refs.iter().all(|iri| old_refs.contains(iri)) {
        return new;
    }
    let fresh: Vec<&str> = new_refs
        .iter()
        .filter(|iri| !old_refs.contains(iri))
        .copied()
        .collect();
    if !fresh.is_empty() {
        debug!(target: "crawl", ?fresh, "new instance references");
    }

    let mut union: Vec<String> = Vec::with_capacity(new_refs.len() + retained.len());
    for iri in new_refs.into_iter().chain(retained) {
        if !union.iter().any(|seen| seen == iri) {
            union.push(iri.to_owned());
        }
    }
    let union = Value::Array(union.into_iter().map(Value::String).collect());
    new.replace(vocab::INSTANCES, union)
}
