//! Discovery and local mirroring of pod index graphs.
//!
//! Every sweep walks each configured pod from its root document, follows
//! the `solid:publicTypeIndex` chain to the registered instance containers,
//! and recursively expands the index graph behind them. Interior indexes
//! are mirrored verbatim; terminal property indexes are reconciled against
//! what earlier sweeps observed.

mod mailman;
mod mirror;
mod model;
mod reconcile;
mod walker;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::config::CrawlConfig;

use self::model::Document;
use self::walker::{Registry, Walker};

pub(crate) use mailman::{Fetch, Mailman};
pub(crate) use mirror::Mirror;

/// The aggregate artifact of one sweep: every index document visited across
/// all pods, keyed by URL, plus the reserved `users` section.
#[derive(Debug, Serialize)]
pub(crate) struct Snapshot {
    indexes: BTreeMap<String, Document<'static>>,
    users: Vec<Value>,
}

impl Snapshot {
    pub(crate) fn len(&self) -> usize {
        self.indexes.len()
    }
}

impl From<Registry> for Snapshot {
    fn from(registry: Registry) -> Snapshot {
        Snapshot {
            indexes: registry.into_indexes(),
            users: Vec::new(),
        }
    }
}

/// Crawl every configured pod in turn, strictly sequentially. A failing pod
/// is logged and skipped; whatever it registered before failing stays in
/// the snapshot, so the artifact is always best effort rather than all or
/// nothing.
pub(crate) async fn sweep<F: Fetch>(
    config: &CrawlConfig,
    mailman: &F,
    mirror: &Mirror,
) -> Snapshot {
    let walker = Walker::new(mailman, mirror, &config.index_class);
    let mut registry = Registry::default();
    for server in &config.servers {
        info!(target: "crawl", %server, "crawling pod");
        if let Err(error) = walker.crawl_server(server, &mut registry).await {
            warn!(target: "crawl", %server, %error, "skipping pod");
        }
    }
    info!(target: "crawl", indexes = registry.len(), "sweep complete");
    Snapshot::from(registry)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use anyhow::{Context, Result};
    use serde_json::{Value, json};
    use tempfile::tempdir;

    use crate::config::CrawlConfig;

    use super::model::Document;
    use super::{Fetch, Mirror, sweep};

    /// A network where only the listed URLs resolve.
    #[derive(Default)]
    struct PatchyNet {
        docs: BTreeMap<String, Value>,
    }

    impl PatchyNet {
        fn with(mut self, url: &str, body: Value) -> PatchyNet {
            self.docs.insert(url.to_owned(), body);
            self
        }
    }

    impl Fetch for PatchyNet {
        async fn fetch(&self, iri: &str) -> Result<Document<'static>> {
            let body = self
                .docs
                .get(iri)
                .cloned()
                .with_context(|| format!("connection refused: {iri}"))?;
            Document::try_from(body)
        }
    }

    fn crawl_config(servers: &[&str]) -> CrawlConfig {
        CrawlConfig {
            servers: servers.iter().map(|s| s.to_string()).collect(),
            ..CrawlConfig::default()
        }
    }

    fn pod(base: &str) -> PatchyNet {
        let container = format!("{base}indexes/");
        PatchyNet::default()
            .with(
                base,
                json!({"@graph": [{"@id": base, "solid:publicTypeIndex": format!("{base}typeIndex")}]}),
            )
            .with(
                &format!("{base}typeIndex"),
                json!({"@graph": [{
                    "@type": "solid:TypeIndexRegistration",
                    "solid:forClass": "ex:Index",
                    "solid:instanceContainer": container.clone(),
                }]}),
            )
            .with(
                &container,
                json!({"@id": container, "@graph": [{"@id": container, "@type": "ex:Index"}]}),
            )
    }

    #[tokio::test]
    async fn one_bad_pod_does_not_blank_the_sweep() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        let net = pod("http://one.example/");
        let config = crawl_config(&["http://down.example/", "http://one.example/"]);

        let snapshot = sweep(&config, &net, &mirror).await;

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.indexes.contains_key("http://one.example/indexes/"));
        Ok(())
    }

    #[tokio::test]
    async fn deep_failure_keeps_what_was_gathered() -> Result<()> {
        // The container resolves but its child index does not: the pod's
        // traversal aborts, yet the container stays in the artifact.
        let base = "http://one.example/";
        let container = format!("{base}indexes/");
        let missing = format!("{base}indexes/gone");
        let net = pod(base).with(
            &container,
            json!({"@id": container, "@graph": [
                {"@id": container, "@type": "ex:Index"},
                {"@id": missing, "@type": "ex:Index"},
            ]}),
        );
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        let config = crawl_config(&[base]);

        let snapshot = sweep(&config, &net, &mirror).await;

        assert_eq!(snapshot.len(), 1);
        assert!(snapshot.indexes.contains_key(container.as_str()));
        Ok(())
    }

    #[tokio::test]
    async fn snapshot_serializes_with_reserved_users() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        let net = pod("http://one.example/");
        let config = crawl_config(&["http://one.example/"]);

        let snapshot = sweep(&config, &net, &mirror).await;
        let value = serde_json::to_value(&snapshot)?;

        assert!(value["indexes"]["http://one.example/indexes/"].is_object());
        assert_eq!(value["users"], json!([]));
        Ok(())
    }
}
