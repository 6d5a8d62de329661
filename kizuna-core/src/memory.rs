//! Memory subsystem — bounded short-term buffer + delegated long-term
//! store.
//!
//! Short-term memory is a fixed-capacity FIFO: the newest entry sits at
//! the front, and when capacity is exceeded the *oldest* entry is evicted
//! regardless of importance. Importance only decides whether the
//! long-term store additionally pins the memory beyond its normal
//! retention window. Retrieval is best-effort: a store outage degrades
//! queries to empty results instead of failing the caller.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::collab::LongTermStore;
use crate::config::MemoryConfig;
use crate::error::{EngineError, Result};
use crate::mood::Mood;
use crate::types::{CompanionId, MemoryId};

/// Category tag for a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    /// A direct exchange or performed activity.
    Interaction,
    /// A milestone: evolution, trait unlock.
    Achievement,
    /// A significant emotional swing.
    Emotion,
    /// Anything else noteworthy.
    Event,
}

impl fmt::Display for MemoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interaction => write!(f, "interaction"),
            Self::Achievement => write!(f, "achievement"),
            Self::Emotion => write!(f, "emotion"),
            Self::Event => write!(f, "event"),
        }
    }
}

/// A single remembered event. Append-only within a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// Unique identifier.
    pub id: MemoryId,
    /// Which companion this memory belongs to.
    pub companion: CompanionId,
    /// Free-text content.
    pub content: String,
    /// Category tag.
    pub kind: MemoryKind,
    /// When the memory was recorded.
    pub timestamp: DateTime<Utc>,
    /// Importance score, conventionally 1–10.
    pub importance: u8,
    /// Whether the long-term store should retain this indefinitely.
    pub pinned: bool,
    /// Free-form context attached by the recording component.
    #[serde(default)]
    pub context: HashMap<String, serde_json::Value>,
}

impl Memory {
    /// Create a memory stamped at `now`. `pinned` starts false; the
    /// memory system sets it from its importance policy on record.
    #[must_use]
    pub fn new(
        companion: CompanionId,
        content: impl Into<String>,
        kind: MemoryKind,
        context: HashMap<String, serde_json::Value>,
        importance: u8,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: MemoryId::new(),
            companion,
            content: content.into(),
            kind,
            timestamp: now,
            importance,
            pinned: false,
            context,
        }
    }
}

/// A memory with its similarity score from the store's ranking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMemory {
    /// The retrieved memory.
    pub memory: Memory,
    /// Similarity to the query (store-defined scale, higher is closer).
    pub similarity: f32,
}

// ---------------------------------------------------------------------------
// Short-term buffer
// ---------------------------------------------------------------------------

/// Fixed-capacity FIFO of the most recent memories, newest first.
#[derive(Debug, Clone)]
pub struct ShortTermMemory {
    entries: VecDeque<Memory>,
    capacity: usize,
}

impl ShortTermMemory {
    /// Create an empty buffer with the given capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Push a memory to the front, evicting the oldest entry if the
    /// buffer is full. Eviction is strictly oldest-first — importance
    /// plays no part.
    pub fn push(&mut self, memory: Memory) {
        self.entries.push_front(memory);
        while self.entries.len() > self.capacity {
            self.entries.pop_back();
        }
    }

    /// Entries from newest to oldest.
    pub fn iter(&self) -> impl Iterator<Item = &Memory> {
        self.entries.iter()
    }

    /// Number of buffered entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Configured capacity.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

// ---------------------------------------------------------------------------
// Memory system
// ---------------------------------------------------------------------------

/// The companion's memory: short-term buffer, delegated long-term store,
/// and the emotional-state scalar.
pub struct MemorySystem {
    companion: CompanionId,
    short_term: ShortTermMemory,
    mood: Mood,
    store: Arc<dyn LongTermStore>,
    config: MemoryConfig,
}

impl MemorySystem {
    /// Create a memory system for a companion with an injected store.
    #[must_use]
    pub fn new(companion: CompanionId, store: Arc<dyn LongTermStore>, config: MemoryConfig) -> Self {
        let capacity = config.short_term_capacity;
        Self {
            companion,
            short_term: ShortTermMemory::new(capacity),
            mood: Mood::Neutral,
            store,
            config,
        }
    }

    /// Record a memory: append to short-term (evicting the oldest if
    /// full), then forward to the long-term store.
    ///
    /// Memories at or above the pin-importance threshold are flagged for
    /// indefinite retention before the store call.
    ///
    /// # Errors
    /// `StorageUnavailable` if the store call fails. The short-term
    /// append has already succeeded — local state is never lost to a
    /// remote failure.
    pub async fn record(
        &mut self,
        content: impl Into<String>,
        kind: MemoryKind,
        context: HashMap<String, serde_json::Value>,
        importance: u8,
    ) -> Result<Memory> {
        let mut memory = Memory::new(
            self.companion,
            content,
            kind,
            context,
            importance,
            Utc::now(),
        );
        memory.pinned = importance >= self.config.pin_importance;

        self.short_term.push(memory.clone());

        if let Err(source) = self.store.persist(&memory).await {
            tracing::warn!(memory_id = %memory.id, %source, "long-term persist failed");
            return Err(EngineError::StorageUnavailable {
                operation: "persist".to_string(),
                source,
            });
        }

        tracing::debug!(memory_id = %memory.id, kind = %memory.kind, importance, "memory recorded");
        Ok(memory)
    }

    /// Query the long-term store for memories relevant to `text`.
    ///
    /// Best-effort: a store failure is logged and degrades to an empty
    /// result rather than failing the caller.
    pub async fn query(&self, text: &str, limit: usize) -> Vec<ScoredMemory> {
        match self.store.search(text, limit).await {
            Ok(results) => results,
            Err(source) => {
                tracing::warn!(%source, "memory query degraded to empty result");
                Vec::new()
            }
        }
    }

    /// Ask the store to purge old, unimportant entries per the configured
    /// retention policy.
    ///
    /// # Errors
    /// `StorageUnavailable` if the store call fails.
    pub async fn prune(&self) -> Result<()> {
        let cutoff = Utc::now() - chrono::Duration::days(self.config.prune_after_days);
        self.store
            .purge_older_than(cutoff, self.config.prune_importance_below)
            .await
            .map_err(|source| EngineError::StorageUnavailable {
                operation: "purge".to_string(),
                source,
            })
    }

    /// The most recently inferred mood label.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.mood
    }

    /// Set the mood scalar (independent of the memory log).
    pub fn set_mood(&mut self, mood: Mood) {
        self.mood = mood;
    }

    /// The short-term buffer, newest first.
    #[must_use]
    pub fn short_term(&self) -> &ShortTermMemory {
        &self.short_term
    }

    /// Up to `n` most recent memory contents, newest first.
    #[must_use]
    pub fn recent_contents(&self, n: usize) -> Vec<String> {
        self.short_term
            .iter()
            .take(n)
            .map(|m| m.content.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collab::{CollabError, InMemoryStore, LongTermStore};
    use async_trait::async_trait;

    /// A store that always fails — for degraded-path tests.
    struct DownStore;

    #[async_trait]
    impl LongTermStore for DownStore {
        async fn persist(&self, _memory: &Memory) -> std::result::Result<(), CollabError> {
            Err(CollabError::Unavailable("store offline".to_string()))
        }

        async fn search(
            &self,
            _query: &str,
            _limit: usize,
        ) -> std::result::Result<Vec<ScoredMemory>, CollabError> {
            Err(CollabError::Unavailable("store offline".to_string()))
        }

        async fn purge_older_than(
            &self,
            _cutoff: DateTime<Utc>,
            _importance_below: u8,
        ) -> std::result::Result<(), CollabError> {
            Err(CollabError::Unavailable("store offline".to_string()))
        }
    }

    fn system_with(store: Arc<dyn LongTermStore>) -> MemorySystem {
        MemorySystem::new(CompanionId::new(), store, MemoryConfig::default())
    }

    #[tokio::test]
    async fn short_term_never_exceeds_capacity() {
        let mut system = system_with(Arc::new(InMemoryStore::new()));
        for i in 0..25 {
            system
                .record(format!("event {i}"), MemoryKind::Event, HashMap::new(), 1)
                .await
                .expect("record");
            assert!(system.short_term().len() <= 10);
        }
        assert_eq!(system.short_term().len(), 10);
    }

    #[tokio::test]
    async fn eviction_is_oldest_first_regardless_of_importance() {
        let mut system = system_with(Arc::new(InMemoryStore::new()));
        // The first entry is maximally important but still evicted first.
        system
            .record("first", MemoryKind::Event, HashMap::new(), 10)
            .await
            .expect("record");
        for i in 1..=10 {
            system
                .record(format!("event {i}"), MemoryKind::Event, HashMap::new(), 1)
                .await
                .expect("record");
        }
        let contents: Vec<String> = system.short_term().iter().map(|m| m.content.clone()).collect();
        assert!(!contents.contains(&"first".to_string()));
        assert_eq!(contents.first().map(String::as_str), Some("event 10"));
        assert_eq!(contents.last().map(String::as_str), Some("event 1"));
    }

    #[tokio::test]
    async fn high_importance_memories_are_pinned() {
        let mut system = system_with(Arc::new(InMemoryStore::new()));
        let pinned = system
            .record("a milestone", MemoryKind::Achievement, HashMap::new(), 8)
            .await
            .expect("record");
        let ordinary = system
            .record("small talk", MemoryKind::Interaction, HashMap::new(), 7)
            .await
            .expect("record");
        assert!(pinned.pinned);
        assert!(!ordinary.pinned);
    }

    #[tokio::test]
    async fn store_failure_surfaces_but_keeps_short_term() {
        let mut system = system_with(Arc::new(DownStore));
        let err = system
            .record("still remembered locally", MemoryKind::Event, HashMap::new(), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::StorageUnavailable { .. }));
        assert_eq!(system.short_term().len(), 1);
    }

    #[tokio::test]
    async fn query_degrades_to_empty_on_store_failure() {
        let system = system_with(Arc::new(DownStore));
        let results = system.query("anything", 5).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn mood_scalar_is_independent_of_the_log() {
        let mut system = system_with(Arc::new(InMemoryStore::new()));
        assert_eq!(system.mood(), Mood::Neutral);
        system.set_mood(Mood::Tired);
        assert_eq!(system.mood(), Mood::Tired);
        assert!(system.short_term().is_empty());
    }
}
