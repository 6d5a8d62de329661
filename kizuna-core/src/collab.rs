//! External-collaborator seams.
//!
//! The engine never talks to a network itself. Text generation, speech
//! synthesis, and the long-term memory store are injected behind these
//! async traits; `kizuna-ai` provides the HTTP-backed implementations.
//! Collaborators are assumed eventually-consistent and briefly
//! unavailable at times — a failure here never corrupts engine state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::memory::{Memory, ScoredMemory};
use crate::mood::Mood;
use crate::types::EvolutionStage;

/// Failure from an external collaborator.
#[derive(Debug, thiserror::Error)]
pub enum CollabError {
    /// The collaborator could not be reached or refused the call.
    #[error("collaborator unavailable: {0}")]
    Unavailable(String),
    /// The collaborator answered with something the client could not use.
    #[error("invalid collaborator response: {0}")]
    InvalidResponse(String),
}

/// Everything the text generator needs to produce a companion reply.
/// Assembled by the engine; consumed opaquely by the collaborator.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    /// Companion display name.
    pub companion_name: String,
    /// Current evolution stage.
    pub stage: EvolutionStage,
    /// Names of unlocked traits.
    pub trait_names: Vec<String>,
    /// Current mood label.
    pub mood: Mood,
    /// Tone the reply should take.
    pub tone: String,
    /// Cultural references to season the reply with (1–3 names).
    pub cultural_references: Vec<String>,
    /// Relevant stored memories, most similar first.
    pub recent_memories: Vec<String>,
    /// What the user said.
    pub user_input: String,
}

/// Text-generation collaborator: `generate(context) -> text`.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a companion reply for the given context.
    async fn generate(&self, context: &GenerationContext) -> Result<String, CollabError>;
}

/// Speech-synthesis collaborator: `synthesize(text) -> audio bytes`.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize spoken audio for the given text.
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, CollabError>;
}

/// Long-term memory store collaborator.
///
/// The engine owns no persistence format; what the store does with a
/// document (embedding, indexing, retention) is its own concern. The
/// only contract the engine relies on: pinned memories are retained
/// beyond the store's normal retention window.
#[async_trait]
pub trait LongTermStore: Send + Sync {
    /// Persist a memory document.
    async fn persist(&self, memory: &Memory) -> Result<(), CollabError>;

    /// Similarity-search stored memories, best match first.
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredMemory>, CollabError>;

    /// Purge entries older than `cutoff` whose importance is below
    /// `importance_below`.
    async fn purge_older_than(
        &self,
        cutoff: DateTime<Utc>,
        importance_below: u8,
    ) -> Result<(), CollabError>;
}

// ---------------------------------------------------------------------------
// In-memory reference store
// ---------------------------------------------------------------------------

/// A non-persistent store for tests and offline operation.
///
/// Ranks by naive keyword overlap — no embeddings, no network. Good
/// enough to exercise every engine path that touches the store seam.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    entries: RwLock<Vec<Memory>>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the store is empty.
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Fraction of `query` words present in `content` (0.0–1.0).
    fn overlap(query: &str, content: &str) -> f32 {
        let content_lower = content.to_ascii_lowercase();
        let content_words: Vec<&str> = content_lower.split_whitespace().collect();
        let query_lower = query.to_ascii_lowercase();
        let query_words: Vec<&str> = query_lower.split_whitespace().collect();
        if query_words.is_empty() {
            return 0.0;
        }
        let hits = query_words
            .iter()
            .filter(|w| content_words.contains(*w))
            .count();
        hits as f32 / query_words.len() as f32
    }
}

#[async_trait]
impl LongTermStore for InMemoryStore {
    async fn persist(&self, memory: &Memory) -> Result<(), CollabError> {
        tracing::debug!(memory_id = %memory.id, kind = %memory.kind, "persisting to in-memory store");
        self.entries.write().await.push(memory.clone());
        Ok(())
    }

    async fn search(&self, query: &str, limit: usize) -> Result<Vec<ScoredMemory>, CollabError> {
        let entries = self.entries.read().await;
        let mut scored: Vec<ScoredMemory> = entries
            .iter()
            .map(|m| ScoredMemory {
                memory: m.clone(),
                similarity: Self::overlap(query, &m.content),
            })
            .filter(|s| s.similarity > 0.0)
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(limit);
        Ok(scored)
    }

    async fn purge_older_than(
        &self,
        cutoff: DateTime<Utc>,
        importance_below: u8,
    ) -> Result<(), CollabError> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|m| m.pinned || m.timestamp >= cutoff || m.importance >= importance_below);
        tracing::debug!(purged = before - entries.len(), "purged in-memory store");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryKind;
    use crate::types::CompanionId;

    fn mem(content: &str, importance: u8, age_days: i64) -> Memory {
        let mut m = Memory::new(
            CompanionId::new(),
            content,
            MemoryKind::Interaction,
            Default::default(),
            importance,
            Utc::now() - chrono::Duration::days(age_days),
        );
        m.pinned = importance >= 8;
        m
    }

    #[tokio::test]
    async fn search_ranks_by_keyword_overlap() {
        let store = InMemoryStore::new();
        store.persist(&mem("played catch in the garden", 1, 0)).await.unwrap();
        store.persist(&mem("a quiet meditation session", 1, 0)).await.unwrap();

        let results = store.search("meditation session", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].memory.content.contains("meditation"));
        assert!(results[0].similarity > 0.9);
    }

    #[tokio::test]
    async fn search_respects_limit() {
        let store = InMemoryStore::new();
        for i in 0..8 {
            store.persist(&mem(&format!("walk number {i}"), 1, 0)).await.unwrap();
        }
        let results = store.search("walk", 3).await.unwrap();
        assert_eq!(results.len(), 3);
    }

    #[tokio::test]
    async fn purge_keeps_recent_important_and_pinned() {
        let store = InMemoryStore::new();
        store.persist(&mem("old trivial", 2, 60)).await.unwrap();
        store.persist(&mem("old important", 7, 60)).await.unwrap();
        store.persist(&mem("old pinned", 9, 60)).await.unwrap();
        store.persist(&mem("fresh trivial", 1, 1)).await.unwrap();

        let cutoff = Utc::now() - chrono::Duration::days(30);
        store.purge_older_than(cutoff, 7).await.unwrap();

        let remaining = store.search("old fresh trivial important pinned", 10).await.unwrap();
        let contents: Vec<&str> = remaining.iter().map(|s| s.memory.content.as_str()).collect();
        assert!(!contents.contains(&"old trivial"));
        assert!(contents.contains(&"old important"));
        assert!(contents.contains(&"old pinned"));
        assert!(contents.contains(&"fresh trivial"));
    }
}
