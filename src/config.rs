use std::path::PathBuf;

use serde::Deserialize;

#[derive(Clone, Default, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct Config {
    pub(crate) crawl: CrawlConfig,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub(crate) struct CrawlConfig {
    /// Base URLs of the pods to sweep, in order.
    pub(crate) servers: Vec<String>,
    /// The `solid:forClass` value whose registrations are expanded.
    pub(crate) index_class: String,
    /// Directory the fetched documents are mirrored into.
    pub(crate) mirror_dir: PathBuf,
    /// Where the aggregated snapshot of each sweep is written.
    pub(crate) snapshot_path: PathBuf,
    /// Seconds between sweeps when running scheduled.
    pub(crate) interval_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            servers: Vec::new(),
            index_class: "ex:Index".to_string(),
            mirror_dir: PathBuf::from("mirror"),
            snapshot_path: PathBuf::from("aggregated.json"),
            interval_secs: 6 * 60 * 60,
        }
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;

    use super::Config;

    #[test]
    fn empty_config_uses_defaults() -> Result<()> {
        let config: Config = toml::from_str("")?;
        assert!(config.crawl.servers.is_empty());
        assert_eq!(config.crawl.index_class, "ex:Index");
        assert_eq!(config.crawl.interval_secs, 21600);
        Ok(())
    }

    #[test]
    fn partial_sections_fill_in() -> Result<()> {
        let config: Config = toml::from_str(
            r#"
            [crawl]
            servers = ["http://localhost:8000/", "http://localhost:8001/"]
            interval_secs = 600
            "#,
        )?;
        assert_eq!(config.crawl.servers.len(), 2);
        assert_eq!(config.crawl.interval_secs, 600);
        assert_eq!(config.crawl.snapshot_path.to_str(), Some("aggregated.json"));
        Ok(())
    }
}
