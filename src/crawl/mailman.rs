use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::HeaderValue;
use reqwest::{Client, header};
use serde_json::Value;

use super::model::Document;

static APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
const APPLICATION_LD_JSON: HeaderValue = HeaderValue::from_static("application/ld+json");

/// The walker's view of document retrieval. Test suites drive the walker
/// through an in-memory implementation.
pub(crate) trait Fetch {
    async fn fetch(&self, iri: &str) -> Result<Document<'static>>;
}

#[derive(Clone)]
pub(crate) struct Mailman {
    client: Client,
}

impl Mailman {
    pub(crate) fn new() -> Mailman {
        Mailman {
            client: Client::builder()
                .http1_only()
                .user_agent(APP_USER_AGENT)
                .gzip(true)
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap(),
        }
    }
}

impl Fetch for Mailman {
    async fn fetch(&self, iri: &str) -> Result<Document<'static>> {
        let response = self
            .client
            .get(iri)
            .header(header::ACCEPT, APPLICATION_LD_JSON)
            .send()
            .await
            .with_context(|| format!("unable to fetch {iri}"))?
            .error_for_status()
            .with_context(|| format!("unable to fetch {iri}"))?;
        let value: Value = response
            .json()
            .await
            .with_context(|| format!("{iri} did not return a JSON body"))?;
        Document::try_from(value).with_context(|| format!("{iri} did not return a document"))
    }
}
