//! Recursive expansion of a pod's index graph.

use std::collections::BTreeMap;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;
use tracing::{debug, info};

use super::mailman::Fetch;
use super::mirror::Mirror;
use super::model::{Document, NodeType, vocab};
use super::reconcile::reconcile;

/// How a fetched document is persisted to the mirror.
///
/// Interior containers are rewritten verbatim every sweep so their child
/// listings never accumulate stale entries; terminal leaves are reconciled
/// against the mirrored version so previously observed references survive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SaveMode {
    Overwrite,
    ReconcileUnion,
}

/// Accumulator of every index document visited during one sweep. A URL is
/// registered at most once; the membership check doubles as the cycle guard
/// for the recursive expansion. Rebuilt from scratch every sweep.
#[derive(Debug, Default)]
pub(crate) struct Registry {
    indexes: BTreeMap<String, Document<'static>>,
}

impl Registry {
    pub(crate) fn contains(&self, url: &str) -> bool {
        self.indexes.contains_key(url)
    }
    pub(crate) fn insert(&mut self, url: &str, document: Document<'static>) {
        self.indexes.entry(url.to_owned()).or_insert(document);
    }
    pub(crate) fn len(&self) -> usize {
        self.indexes.len()
    }
    pub(crate) fn into_indexes(self) -> BTreeMap<String, Document<'static>> {
        self.indexes
    }
}

pub(crate) struct Walker<'a, F> {
    mailman: &'a F,
    mirror: &'a Mirror,
    index_class: &'a str,
}

impl<'a, F: Fetch> Walker<'a, F> {
    pub(crate) fn new(mailman: &'a F, mirror: &'a Mirror, index_class: &'a str) -> Walker<'a, F> {
        Walker {
            mailman,
            mirror,
            index_class,
        }
    }

    /// Walk one pod: resolve the discovery chain from its root document and
    /// expand every registered instance container into `registry`.
    ///
    /// A pod that advertises no type index or no matching registration
    /// simply contributes nothing. Transport failures propagate; whatever
    /// was registered before the failure stays in `registry`.
    pub(crate) async fn crawl_server(&self, root_url: &str, registry: &mut Registry) -> Result<()> {
        let root = self.mailman.fetch(root_url).await?;
        self.mirror.write(root_url, &root, false)?;

        let Some(type_index_url) = root.public_type_index().map(str::to_owned) else {
            info!(target: "crawl", server = root_url, "no public type index advertised");
            return Ok(());
        };
        let type_index = self.mailman.fetch(&type_index_url).await?;

        let containers = type_index.instance_containers(self.index_class);
        if containers.is_empty() {
            info!(
                target: "crawl",
                server = root_url,
                class = self.index_class,
                "no matching type index registration"
            );
            return Ok(());
        }
        info!(
            target: "crawl",
            server = root_url,
            containers = containers.len(),
            "expanding instance containers"
        );
        for container in &containers {
            self.expand(container, SaveMode::Overwrite, registry).await?;
        }
        Ok(())
    }

    /// Fetch `url`, persist it per `mode`, register it, and recurse into the
    /// index nodes of its graph body. The registry check comes before the
    /// fetch: a URL seen earlier in the sweep, on any path through the
    /// graph, is not processed again.
    fn expand<'b>(
        &'b self,
        url: &'b str,
        mode: SaveMode,
        registry: &'b mut Registry,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + 'b>> {
        Box::pin(async move {
            if registry.contains(url) {
                return Ok(());
            }
            debug!(target: "crawl", url, ?mode, "expanding index");
            let document = self.mailman.fetch(url).await?;
            match mode {
                SaveMode::Overwrite => self.mirror.write(url, &document, false)?,
                SaveMode::ReconcileUnion => {
                    let merged = reconcile(self.mirror.read(url)?, document.clone());
                    self.mirror.write(url, &merged, true)?;
                }
            }
            registry.insert(url, document.clone());

            // A property index can sit directly behind a container URL.
            // Give it the leaf treatment as well, keyed by its own
            // identifier, so its reference history is kept.
            if mode == SaveMode::Overwrite
                && !document.has_graph()
                && document.type_is(vocab::PROPERTY_INDEX)
            {
                let key = document.id().unwrap_or(url);
                let merged = reconcile(self.mirror.read(key)?, document.clone());
                self.mirror.write(key, &merged, true)?;
            }

            for node in document.graph() {
                if node.id() == Some(url) {
                    continue;
                }
                match node.node_type() {
                    NodeType::PropertyIndexRegistration => {
                        if let Some(target) = node.instance_target() {
                            self.expand(target, SaveMode::ReconcileUnion, registry)
                                .await?;
                        }
                    }
                    NodeType::Index => {
                        if let Some(child) = node.id() {
                            self.expand(child, SaveMode::Overwrite, registry).await?;
                        }
                    }
                    _ => {}
                }
            }
            Ok(())
        })
    }
}
