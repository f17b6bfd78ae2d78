//! Serper search client: the concrete [`ResourceSearch`] implementation.
//!
//! Serper exposes one endpoint per result category — `/videos` for video
//! results and `/search` for general web results — with the same request
//! body (`{"q": ..., "num": ...}`) and the API key in an `X-API-KEY`
//! header. Both responses reduce to `{title, link}` lists here; everything
//! else the service returns is ignored.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::StudyGuideError;
use crate::pipeline::resources::ResourceSearch;
use crate::state::{ResourceEntry, ResourceKind};

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    q: &'a str,
    num: usize,
}

#[derive(Debug, Deserialize)]
struct VideosResponse {
    #[serde(default)]
    videos: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct WebResponse {
    #[serde(default)]
    organic: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    title: Option<String>,
    link: Option<String>,
}

impl SearchHit {
    fn into_entry(self, kind: ResourceKind) -> Option<ResourceEntry> {
        match (self.title, self.link) {
            (Some(title), Some(url)) => Some(ResourceEntry { kind, title, url }),
            _ => None,
        }
    }
}

/// Serper REST client.
pub struct SerperClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl SerperClient {
    /// Build a client when a search credential is configured.
    ///
    /// Returns `Ok(None)` when `serper_api_key` is absent — the recognised
    /// degraded mode in which the augmenter skips lookups entirely.
    pub fn from_config(config: &PipelineConfig) -> Result<Option<Self>, StudyGuideError> {
        let Some(api_key) = config.serper_api_key.clone() else {
            return Ok(None);
        };
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| StudyGuideError::InvalidConfig(format!("http client: {e}")))?;
        Ok(Some(Self {
            http,
            api_key,
            base_url: config.serper_base_url.trim_end_matches('/').to_string(),
        }))
    }

    async fn post(&self, endpoint: &str, query: &str, num: usize) -> Result<reqwest::Response, StudyGuideError> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!(%url, %query, num, "serper lookup");
        let response = self
            .http
            .post(&url)
            .header("X-API-KEY", &self.api_key)
            .json(&SearchRequest { q: query, num })
            .send()
            .await
            .map_err(|e| StudyGuideError::SearchFailed {
                reason: format!("request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(StudyGuideError::SearchFailed {
                reason: format!("HTTP {status}"),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl ResourceSearch for SerperClient {
    async fn search(
        &self,
        query: &str,
        kind: ResourceKind,
        limit: usize,
    ) -> Result<Vec<ResourceEntry>, StudyGuideError> {
        let decode_err = |e: reqwest::Error| StudyGuideError::SearchFailed {
            reason: format!("invalid response body: {e}"),
        };

        let hits = match kind {
            ResourceKind::Video => {
                let response = self.post("videos", query, limit).await?;
                response.json::<VideosResponse>().await.map_err(decode_err)?.videos
            }
            ResourceKind::Article => {
                let response = self.post("search", query, limit).await?;
                response.json::<WebResponse>().await.map_err(decode_err)?.organic
            }
        };

        Ok(hits
            .into_iter()
            .filter_map(|hit| hit.into_entry(kind))
            .take(limit)
            .collect())
    }
}
