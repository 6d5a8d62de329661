//! Long-term memory store client.
//!
//! Talks to a remote document/vector store over HTTP. The store owns
//! embedding, indexing, and retention; this client only ships documents
//! and queries. The engine's only contract: pinned memories are retained
//! beyond the normal retention window, which the store honors via the
//! `pinned` flag on each document.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde_json::json;
use tracing::{debug, warn};

use kizuna_core::collab::{CollabError, LongTermStore};
use kizuna_core::config::StoreConfig;
use kizuna_core::memory::{Memory, ScoredMemory};

use crate::error::AiError;

/// HTTP client for the long-term memory store service.
pub struct RemoteStoreClient {
    http: Client,
    base_url: String,
    namespace: String,
    timeout_ms: u64,
}

impl RemoteStoreClient {
    /// Build a client from the engine's store config section.
    #[must_use]
    pub fn from_config(config: &StoreConfig) -> Self {
        Self {
            http: Client::new(),
            base_url: config.base_url.clone(),
            namespace: config.namespace.clone(),
            timeout_ms: config.request_timeout_ms,
        }
    }

    fn url(&self, endpoint: &str) -> String {
        format!(
            "{}/collections/{}/{endpoint}",
            self.base_url, self.namespace
        )
    }

    async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<reqwest::Response, AiError> {
        let resp = self
            .http
            .post(url)
            .json(body)
            .timeout(Duration::from_millis(self.timeout_ms))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status();
            warn!(%status, url, "store returned error");
            return Err(AiError::RequestFailed(format!("HTTP {status}")));
        }
        Ok(resp)
    }
}

#[async_trait]
impl LongTermStore for RemoteStoreClient {
    async fn persist(&self, memory: &Memory) -> Result<(), CollabError> {
        let body = json!({ "document": memory });
        self.post_json(&self.url("documents"), &body)
            .await
            .map_err(CollabError::from)?;
        debug!(memory_id = %memory.id, pinned = memory.pinned, "memory persisted");
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredMemory>, CollabError> {
        let body = json!({ "query": query, "limit": limit });
        let resp = self
            .post_json(&self.url("query"), &body)
            .await
            .map_err(CollabError::from)?;
        let results: Vec<ScoredMemory> = resp
            .json()
            .await
            .map_err(|e| CollabError::InvalidResponse(e.to_string()))?;
        debug!(count = results.len(), "memories retrieved");
        Ok(results)
    }

    async fn purge_older_than(
        &self,
        cutoff: DateTime<Utc>,
        importance_below: u8,
    ) -> Result<(), CollabError> {
        let body = json!({
            "older_than": cutoff.to_rfc3339(),
            "importance_below": importance_below,
        });
        self.post_json(&self.url("purge"), &body)
            .await
            .map_err(CollabError::from)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kizuna_core::memory::MemoryKind;
    use kizuna_core::types::CompanionId;

    #[test]
    fn urls_are_namespaced() {
        let client = RemoteStoreClient::from_config(&StoreConfig::default());
        assert_eq!(
            client.url("documents"),
            "http://localhost:6333/collections/kizuna/documents"
        );
        assert_eq!(
            client.url("query"),
            "http://localhost:6333/collections/kizuna/query"
        );
    }

    #[tokio::test]
    async fn unreachable_store_maps_to_unavailable() {
        let config = StoreConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            request_timeout_ms: 200,
            ..Default::default()
        };
        let client = RemoteStoreClient::from_config(&config);

        let memory = Memory::new(
            CompanionId::new(),
            "a moment",
            MemoryKind::Event,
            Default::default(),
            1,
            Utc::now(),
        );
        let err = client.persist(&memory).await.unwrap_err();
        assert!(matches!(err, CollabError::Unavailable(_)));

        let err = client.search("anything", 5).await.unwrap_err();
        assert!(matches!(err, CollabError::Unavailable(_)));
    }
}
