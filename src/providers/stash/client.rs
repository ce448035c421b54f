use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    FindPerformersData, FindScenesData, FindStudiosData, FindTagsData, GraphqlRequest,
    GraphqlResponse, PERFORMERS_QUERY, SCENES_QUERY, STUDIOS_QUERY, TAGS_QUERY,
};
use crate::catalog::model::{SourcePerformer, SourceScene, SourceStudio, SourceTag};
use crate::catalog::SourceCatalog;
use crate::providers::truncate_for_log;

#[derive(Debug, Clone)]
pub struct StashClient {
    base_url: String,
    api_key: String,
    http: Client,
}

impl StashClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self> {
        let http = Client::builder()
            .user_agent(concat!("catalog-migrate/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("failed to build stash http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            http,
        })
    }

    async fn query<T: DeserializeOwned>(&self, what: &str, query: &str) -> Result<T> {
        let url = format!("{}/graphql", self.base_url);
        debug!(what, url = %url, "stash graphql query");

        let resp = self
            .http
            .post(&url)
            .header("ApiKey", &self.api_key)
            .header("Accept", "application/json")
            .json(&GraphqlRequest { query })
            .send()
            .await
            .with_context(|| format!("{what}: graphql request failed"))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("{what}: failed to read response"))?;
        if !status.is_success() {
            bail!(
                "{what}: graphql request failed with status {status}: {}",
                truncate_for_log(body, 2000)
            );
        }

        decode_envelope(what, &body)
    }
}

/// Unwrap a GraphQL `{data, errors}` envelope. Any reported error fails the
/// whole query.
fn decode_envelope<T: DeserializeOwned>(what: &str, body: &str) -> Result<T> {
    let envelope: GraphqlResponse<T> = serde_json::from_str(body)
        .with_context(|| format!("{what}: failed to decode response"))?;
    if let Some(first) = envelope.errors.as_ref().and_then(|e| e.first()) {
        bail!("{what}: graphql errors: {}", first.message);
    }
    envelope
        .data
        .ok_or_else(|| anyhow!("{what}: response carried no data"))
}

#[async_trait]
impl SourceCatalog for StashClient {
    async fn fetch_tags(&self) -> Result<Vec<SourceTag>> {
        let data: FindTagsData = self.query("findTags", TAGS_QUERY).await?;
        Ok(data.find_tags.tags)
    }

    async fn fetch_studios(&self) -> Result<Vec<SourceStudio>> {
        let data: FindStudiosData = self.query("findStudios", STUDIOS_QUERY).await?;
        Ok(data.find_studios.studios)
    }

    async fn fetch_performers(&self) -> Result<Vec<SourcePerformer>> {
        let data: FindPerformersData = self.query("findPerformers", PERFORMERS_QUERY).await?;
        Ok(data.find_performers.performers)
    }

    async fn fetch_scenes(&self) -> Result<Vec<SourceScene>> {
        let data: FindScenesData = self.query("findScenes", SCENES_QUERY).await?;
        Ok(data.find_scenes.scenes)
    }
}
