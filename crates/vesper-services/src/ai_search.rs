//! Semantic verse search backed by an external HTTP service.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use vesper_core::config::AiSearchConfig;
use vesper_core::models::AiVerseResult;

#[async_trait]
pub trait AiSearchProvider: Send + Sync {
    /// Verses most relevant to `query`, best first.
    async fn search_verses(&self, query: &str, limit: i64) -> anyhow::Result<Vec<AiVerseResult>>;
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    query: &'a str,
    limit: i64,
}

#[derive(Deserialize)]
struct SearchResponse {
    results: Vec<AiVerseResult>,
}

pub struct HttpAiSearchProvider {
    client: reqwest::Client,
    url: String,
    api_key: Option<String>,
}

impl HttpAiSearchProvider {
    /// `None` when `AI_SEARCH_URL` is not set.
    pub fn from_config(config: &AiSearchConfig) -> anyhow::Result<Option<Self>> {
        let Some(url) = config.url.clone() else {
            tracing::debug!("AI search not configured (AI_SEARCH_URL unset)");
            return Ok(None);
        };
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build AI search HTTP client")?;
        tracing::info!(url = %url, "AI search provider initialized");
        Ok(Some(Self {
            client,
            url,
            api_key: config.api_key.clone(),
        }))
    }
}

#[async_trait]
impl AiSearchProvider for HttpAiSearchProvider {
    #[tracing::instrument(skip(self), fields(ai.url = %self.url))]
    async fn search_verses(&self, query: &str, limit: i64) -> anyhow::Result<Vec<AiVerseResult>> {
        let mut request = self
            .client
            .post(&self.url)
            .json(&SearchRequest { query, limit });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .context("AI search request failed")?
            .error_for_status()
            .context("AI search returned an error status")?;
        let body: SearchResponse = response
            .json()
            .await
            .context("AI search returned an invalid body")?;

        Ok(rank(body.results, limit))
    }
}

/// Sort by relevance, best first, and keep at most `limit` results.
pub fn rank(mut results: Vec<AiVerseResult>, limit: i64) -> Vec<AiVerseResult> {
    results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    results.truncate(limit.max(0) as usize);
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verse(reference: &str, relevance: f64) -> AiVerseResult {
        AiVerseResult {
            reference: reference.to_string(),
            text: String::new(),
            relevance,
        }
    }

    #[test]
    fn rank_orders_by_relevance_and_truncates() {
        let ranked = rank(
            vec![verse("John 3:16", 0.4), verse("Psalm 23:1", 0.9), verse("Romans 8:28", 0.7)],
            2,
        );
        let refs: Vec<&str> = ranked.iter().map(|v| v.reference.as_str()).collect();
        assert_eq!(refs, vec!["Psalm 23:1", "Romans 8:28"]);
    }

    #[test]
    fn unconfigured_provider_is_none() {
        let config = AiSearchConfig {
            url: None,
            api_key: None,
            timeout_secs: 10,
        };
        assert!(HttpAiSearchProvider::from_config(&config).unwrap().is_none());
    }
}
