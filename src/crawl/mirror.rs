//! On-disk mirror of fetched documents, keyed by URL path.

use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::Url;
use serde_json::Value;
use tracing::{debug, warn};

use super::model::Document;

/// The durable half of the crawl: documents are laid out under `root`
/// following the URL path they were fetched from, one pretty-printed
/// `.jsonld` blob each. The in-memory registry is rebuilt every sweep;
/// this mirror is what survives between sweeps and what reconciliation
/// reads back.
pub(crate) struct Mirror {
    root: PathBuf,
}

impl Mirror {
    pub(crate) fn new(root: impl Into<PathBuf>) -> Mirror {
        Mirror { root: root.into() }
    }

    /// Read the previously mirrored leaf for `url`. A blob that is missing,
    /// unreadable, or no longer parses reads as absent so that a damaged
    /// mirror entry degrades to a fresh overwrite instead of failing the
    /// sweep.
    pub(crate) fn read(&self, url: &str) -> Result<Option<Document<'static>>> {
        let path = self.blob_path(url, true)?;
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(None),
            Err(error) => {
                warn!(target: "crawl", path = %path.display(), %error, "unreadable mirrored document");
                return Ok(None);
            }
        };
        match serde_json::from_str::<Value>(&text)
            .map_err(anyhow::Error::from)
            .and_then(Document::try_from)
        {
            Ok(document) => Ok(Some(document)),
            Err(error) => {
                warn!(target: "crawl", path = %path.display(), %error, "discarding malformed mirrored document");
                Ok(None)
            }
        }
    }

    /// Persist `document` under the path component of `url`, creating any
    /// missing directories. With `as_file` the key addresses a single
    /// terminal blob; otherwise it is a directory-style prefix whose own
    /// document lands at `index.jsonld`, leaving the prefix usable for
    /// child blobs.
    pub(crate) fn write(&self, url: &str, document: &Document<'_>, as_file: bool) -> Result<()> {
        let path = self.blob_path(url, as_file)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("unable to create {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(document)?;
        fs::write(&path, json).with_context(|| format!("unable to write {}", path.display()))?;
        debug!(target: "crawl", url, path = %path.display(), "mirrored document");
        Ok(())
    }

    fn blob_path(&self, url: &str, as_file: bool) -> Result<PathBuf> {
        let parsed = Url::parse(url).with_context(|| format!("{url} is not a resource URL"))?;
        // Url normalizes dot segments, so the key cannot escape the root.
        let key = parsed.path().trim_matches('/');
        let path = match (key.is_empty(), as_file) {
            (true, _) => self.root.join("index.jsonld"),
            (false, true) => self.root.join(format!("{key}.jsonld")),
            (false, false) => self.root.join(key).join("index.jsonld"),
        };
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use serde_json::json;
    use tempfile::tempdir;

    use super::{Document, Mirror};

    fn document(id: &str) -> Result<Document<'static>> {
        Ok(Document::try_from(json!({
            "@id": id,
            "@type": "ex:PropertyIndex",
            "ex:instances": ["http://pod.example/things/1"],
        }))?)
    }

    #[test]
    fn leaf_blobs_follow_the_url_path() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        let url = "http://pod.example/alice/indexes/name";
        mirror.write(url, &document(url)?, true)?;
        assert!(mirror.root.join("alice/indexes/name.jsonld").is_file());
        assert_eq!(mirror.read(url)?, Some(document(url)?));
        Ok(())
    }

    #[test]
    fn container_blobs_keep_their_prefix_free() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        let container = "http://pod.example/alice/indexes/";
        let leaf = "http://pod.example/alice/indexes/name";
        mirror.write(container, &document(container)?, false)?;
        mirror.write(leaf, &document(leaf)?, true)?;
        assert!(mirror.root.join("alice/indexes/index.jsonld").is_file());
        assert!(mirror.root.join("alice/indexes/name.jsonld").is_file());
        Ok(())
    }

    #[test]
    fn server_root_lands_at_the_mirror_root() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        mirror.write("http://pod.example/", &document("http://pod.example/")?, false)?;
        assert!(mirror.root.join("index.jsonld").is_file());
        Ok(())
    }

    #[test]
    fn missing_blob_reads_as_absent() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        assert_eq!(mirror.read("http://pod.example/alice/indexes/name")?, None);
        Ok(())
    }

    #[test]
    fn malformed_blob_reads_as_absent() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        std::fs::create_dir_all(dir.path().join("alice"))?;
        std::fs::write(dir.path().join("alice/broken.jsonld"), "{ not json")?;
        assert_eq!(mirror.read("http://pod.example/alice/broken")?, None);
        std::fs::write(dir.path().join("alice/broken.jsonld"), "\"not an object\"")?;
        assert_eq!(mirror.read("http://pod.example/alice/broken")?, None);
        Ok(())
    }

    #[test]
    fn writes_overwrite_in_place() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        let url = "http://pod.example/alice/indexes/name";
        mirror.write(url, &document(url)?, true)?;
        let replacement = Document::try_from(json!({
            "@id": url,
            "@type": "ex:PropertyIndex",
            "ex:instances": ["http://pod.example/things/2"],
        }))?;
        mirror.write(url, &replacement, true)?;
        assert_eq!(mirror.read(url)?, Some(replacement));
        Ok(())
    }

    #[test]
    fn rejects_keys_that_are_not_urls() -> Result<()> {
        let dir = tempdir()?;
        let mirror = Mirror::new(dir.path());
        assert!(mirror.write("not a url", &document("x")?, true).is_err());
        Ok(())
    }
}
