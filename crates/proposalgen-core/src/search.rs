//! Web-search tool used by the internet research stage.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::llm::{REQUEST_TIMEOUT, http_client};
use crate::{SecretValue, Secrets};

/// Number of results requested from the provider for every query.
pub const RESULTS_PER_QUERY: usize = 3;

const SERPER_ENDPOINT: &str = "https://google.serper.dev/search";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub organic: Vec<SearchHit>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub position: Option<u32>,
}

impl SearchResults {
    pub fn links(&self) -> impl Iterator<Item = &str> {
        self.organic.iter().map(|hit| hit.link.as_str())
    }
}

/// Count distinct links across several result sets.
pub fn unique_link_count<'a, I>(results: I) -> usize
where
    I: IntoIterator<Item = &'a SearchResults>,
{
    results
        .into_iter()
        .flat_map(|result| result.links())
        .collect::<HashSet<_>>()
        .len()
}

/// A web-search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, num_results: usize) -> Result<SearchResults>;
}

/// Serper.dev Google search client.
pub struct SerperClient {
    http: Client,
    api_key: SecretValue,
    endpoint: String,
}

#[derive(Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: usize,
}

impl SerperClient {
    pub fn new(api_key: SecretValue) -> Result<Self> {
        Self::with_endpoint(api_key, SERPER_ENDPOINT)
    }

    pub fn with_endpoint(api_key: SecretValue, endpoint: impl Into<String>) -> Result<Self> {
        Ok(Self {
            http: http_client(REQUEST_TIMEOUT)?,
            api_key,
            endpoint: endpoint.into(),
        })
    }

    pub fn from_secrets(secrets: &Secrets) -> Result<Self> {
        Self::new(secrets.search_api_key.clone())
    }
}

#[async_trait]
impl SearchProvider for SerperClient {
    #[instrument(name = "search.serper", skip(self))]
    async fn search(&self, query: &str, num_results: usize) -> Result<SearchResults> {
        let resp = self
            .http
            .post(&self.endpoint)
            .header("X-API-KEY", self.api_key.expose())
            .json(&SerperRequest {
                q: query,
                num: num_results,
            })
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("search provider error: {status} {}", body.trim()));
        }

        let results: SearchResults = resp.json().await?;
        debug!(hits = results.organic.len(), "search results received");
        Ok(results)
    }
}

/// Search capability handed to tool-using agents.
///
/// Composes a [`SearchProvider`] and pins the result count to
/// [`RESULTS_PER_QUERY`]. Provider errors are returned untouched.
#[derive(Clone)]
pub struct InternetSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl InternetSearchTool {
    pub fn new(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }

    pub async fn search(&self, query: &str) -> Result<SearchResults> {
        self.provider.search(query, RESULTS_PER_QUERY).await
    }
}
