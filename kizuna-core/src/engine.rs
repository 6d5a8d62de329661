//! The companion engine — single-writer orchestrator over all
//! subsystems.
//!
//! One `CompanionEngine` owns the profile, memory, activity gate,
//! exercise sessions, and progression engines, with the text, speech,
//! and store collaborators injected at construction. Every public
//! operation takes `&mut self`, so an admission check and its resulting
//! state mutation are one atomic unit; the recommended wiring is
//! `Arc<tokio::sync::Mutex<CompanionEngine>>`, which also serializes the
//! exercise timeout watchdog against user-driven transitions.
//!
//! Collaborator failures are isolated: a failed persist never rolls back
//! an applied stat change, and a failed generation or synthesis call
//! never blocks an activity or exercise that has already resolved.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

use crate::activity::{Activity, ActivityGate, ActivityKind, flavor_emotion};
use crate::catalog;
use crate::collab::{GenerationContext, LongTermStore, SpeechSynthesizer, TextGenerator};
use crate::config::CompanionConfig;
use crate::error::{EngineError, Result};
use crate::evolution::{EvolutionEngine, EvolutionProgress};
use crate::exercise::{Exercise, ExerciseReport, ScoredSession, SessionManager, StepOutcome};
use crate::memory::{Memory, MemoryKind, MemorySystem, ScoredMemory};
use crate::mood::{Mood, Tone};
use crate::personality::TraitEngine;
use crate::types::{PersonalityTrait, Profile, StatDelta};

/// Result of a successfully performed activity.
#[derive(Debug, Clone)]
pub struct ActivityOutcome {
    /// Which activity was performed.
    pub activity_id: String,
    /// Stat changes that were applied (energy cost already subtracted).
    pub delta: StatDelta,
    /// Relationship points gained.
    pub relationship_gained: u32,
    /// Flavor emotion word for the performance.
    pub flavor: String,
    /// The mood scalar after the activity resolved.
    pub mood: Mood,
    /// Whether the activity tipped the companion into a new stage.
    pub evolved: bool,
}

/// A generated chat reply with its presentation context.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// The companion's reply text.
    pub text: String,
    /// Tone the reply was generated with.
    pub tone: Tone,
    /// Cultural references that seasoned the reply.
    pub cultural_references: Vec<String>,
}

/// The companion state engine.
pub struct CompanionEngine {
    profile: Profile,
    memory: MemorySystem,
    gate: ActivityGate,
    sessions: SessionManager,
    evolution: EvolutionEngine,
    personality: TraitEngine,
    generator: Arc<dyn TextGenerator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    config: CompanionConfig,
}

impl CompanionEngine {
    /// Build an engine for `profile` with injected collaborators and the
    /// built-in trait catalog.
    #[must_use]
    pub fn new(
        profile: Profile,
        config: CompanionConfig,
        store: Arc<dyn LongTermStore>,
        generator: Arc<dyn TextGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
    ) -> Self {
        Self::with_catalog(
            profile,
            config,
            store,
            generator,
            synthesizer,
            catalog::default_traits(),
        )
    }

    /// Build an engine with a custom trait catalog.
    #[must_use]
    pub fn with_catalog(
        profile: Profile,
        config: CompanionConfig,
        store: Arc<dyn LongTermStore>,
        generator: Arc<dyn TextGenerator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        traits: Vec<PersonalityTrait>,
    ) -> Self {
        let memory = MemorySystem::new(profile.id, store, config.memory.clone());
        Self {
            memory,
            gate: ActivityGate::new(config.activity.clone()),
            sessions: SessionManager::new(config.exercise.clone()),
            evolution: EvolutionEngine::new(config.evolution.clone()),
            personality: TraitEngine::new(traits),
            generator,
            synthesizer,
            config,
            profile,
        }
    }

    /// The companion's profile.
    #[must_use]
    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    /// The current mood scalar.
    #[must_use]
    pub fn mood(&self) -> Mood {
        self.memory.mood()
    }

    /// Set the mood scalar directly (e.g. from an external mood
    /// inference).
    pub fn set_mood(&mut self, mood: Mood) {
        self.memory.set_mood(mood);
    }

    /// Progress toward the next evolution stage.
    #[must_use]
    pub fn evolution_progress(&self) -> EvolutionProgress {
        self.evolution.progress(&self.profile)
    }

    /// Catalog traits the companion could unlock right now.
    #[must_use]
    pub fn eligible_traits(&self) -> Vec<&PersonalityTrait> {
        self.personality.eligible(&self.profile)
    }

    /// Whether an exercise session is in progress.
    #[must_use]
    pub fn exercise_active(&self) -> bool {
        self.sessions.is_active()
    }

    /// Up to `n` most recent short-term memories, newest first.
    #[must_use]
    pub fn recent_memories(&self, n: usize) -> Vec<String> {
        self.memory.recent_contents(n)
    }

    // -----------------------------------------------------------------------
    // Activities
    // -----------------------------------------------------------------------

    /// Attempt a simple activity.
    ///
    /// On admission the stat delta and relationship points are applied,
    /// an interaction memory is recorded, and — when any single stat
    /// swing reaches the significance threshold — an emotion memory is
    /// recorded and the mood scalar updated to the classified label.
    ///
    /// # Errors
    /// `OnCooldown` or `InsufficientEnergy`; rejections mutate nothing.
    pub async fn perform_activity(&mut self, activity: &Activity) -> Result<ActivityOutcome> {
        let now = Utc::now();
        let delta = self.gate.attempt(activity, &self.profile.stats, now)?;

        self.profile.stats.apply(&delta);
        self.profile.relationship_level += activity.rewards.relationship_points;

        let flavor = flavor_emotion(activity.kind, &mut rand::thread_rng()).to_string();
        let importance = match activity.kind {
            // Learning leaves a deeper mark.
            ActivityKind::Learn => 2,
            _ => 1,
        };
        self.record_best_effort(
            format!("Completed activity: {} — felt {}", activity.name, flavor),
            MemoryKind::Interaction,
            json_context(&[
                ("activity_kind", serde_json::json!(activity.kind)),
                ("stat_changes", serde_json::json!(delta)),
            ]),
            importance,
        )
        .await;

        if delta.any_magnitude_at_least(self.config.activity.significance_threshold) {
            let mood = Mood::classify(&delta);
            self.memory.set_mood(mood);
            self.record_best_effort(
                format!("Had a meaningful experience during {}", activity.name),
                MemoryKind::Emotion,
                json_context(&[
                    ("emotion", serde_json::json!(mood.to_string())),
                    ("stat_changes", serde_json::json!(delta)),
                ]),
                2,
            )
            .await;
        }

        let evolved = self.run_evolution_check().await;

        Ok(ActivityOutcome {
            activity_id: activity.id.clone(),
            delta,
            relationship_gained: activity.rewards.relationship_points,
            flavor,
            mood: self.memory.mood(),
            evolved,
        })
    }

    // -----------------------------------------------------------------------
    // Exercises
    // -----------------------------------------------------------------------

    /// Start a structured exercise session.
    ///
    /// # Errors
    /// `SessionAlreadyActive` (the original session is untouched) or
    /// `Ineligible`.
    pub async fn start_exercise(&mut self, exercise: Exercise) -> Result<()> {
        let now = Utc::now();
        let note = format!("Started {} exercise", exercise.kind);
        let context = json_context(&[
            ("exercise_id", serde_json::json!(exercise.id)),
            ("difficulty", serde_json::json!(exercise.difficulty)),
        ]);
        self.sessions.start(exercise, &self.profile.stats, now)?;
        self.record_best_effort(note, MemoryKind::Interaction, context, 1).await;
        Ok(())
    }

    /// Submit the response to the current exercise step. Returns the
    /// final report when that was the last step.
    ///
    /// # Errors
    /// `NoActiveSession` if nothing is in progress.
    pub async fn submit_exercise_step(&mut self, response: &str) -> Result<Option<ExerciseReport>> {
        match self.sessions.submit_step(response, Utc::now())? {
            StepOutcome::InProgress { .. } => Ok(None),
            StepOutcome::Finished(scored) => Ok(Some(self.resolve_scored(scored).await)),
        }
    }

    /// Cancel the active exercise session without scoring or stat
    /// changes.
    ///
    /// # Errors
    /// `NoActiveSession` if nothing is in progress.
    pub fn cancel_exercise(&mut self) -> Result<()> {
        self.sessions.cancel()
    }

    /// Timeout poll for the active session. Returns the final report
    /// when the time limit has been reached; `None` otherwise (including
    /// when a submission already won the race — the session no longer
    /// exists and the poll is a no-op).
    pub async fn tick(&mut self) -> Option<ExerciseReport> {
        let scored = self.sessions.tick(Utc::now())?;
        Some(self.resolve_scored(scored).await)
    }

    /// Apply a scored session's effects and build the report.
    async fn resolve_scored(&mut self, scored: ScoredSession) -> ExerciseReport {
        let mood_before = self.memory.mood();
        self.profile.stats.apply(&scored.delta);

        self.record_best_effort(
            format!("Completed {} exercise", scored.kind),
            MemoryKind::Interaction,
            json_context(&[
                ("exercise_id", serde_json::json!(scored.exercise_id)),
                ("quality", serde_json::json!(scored.quality)),
                ("timed_out", serde_json::json!(scored.timed_out)),
                ("duration_secs", serde_json::json!(scored.elapsed.num_seconds())),
                ("stat_changes", serde_json::json!(scored.delta)),
            ]),
            1,
        )
        .await;

        self.run_evolution_check().await;

        ExerciseReport {
            completed: !scored.timed_out,
            responses: scored.responses,
            mood_before,
            mood_after: scored.mood_after,
            delta: scored.delta,
            quality: scored.quality,
            insights: scored.insights,
        }
    }

    // -----------------------------------------------------------------------
    // Progression
    // -----------------------------------------------------------------------

    /// Re-evaluate the evolution thresholds, advancing at most one
    /// stage. Returns whether the companion evolved.
    pub async fn check_evolution(&mut self) -> bool {
        self.run_evolution_check().await
    }

    async fn run_evolution_check(&mut self) -> bool {
        if !self.evolution.check(&mut self.profile) {
            return false;
        }
        let stage = self.profile.stage;
        self.record_best_effort(
            format!("Evolved to stage {stage}"),
            MemoryKind::Achievement,
            json_context(&[("stage", serde_json::json!(stage.rank()))]),
            9,
        )
        .await;
        true
    }

    /// Unlock a catalog trait for the companion.
    ///
    /// # Errors
    /// `UnknownTrait` or `NotEligible`; the profile is unchanged on
    /// failure.
    pub async fn unlock_trait(&mut self, trait_id: &str) -> Result<PersonalityTrait> {
        let unlocked = self.personality.unlock(trait_id, &mut self.profile)?;
        self.record_best_effort(
            format!("Unlocked trait: {}", unlocked.name),
            MemoryKind::Achievement,
            json_context(&[("trait_id", serde_json::json!(unlocked.id))]),
            7,
        )
        .await;
        Ok(unlocked)
    }

    // -----------------------------------------------------------------------
    // Chat, speech, mood
    // -----------------------------------------------------------------------

    /// Generate a companion reply to `input` and remember the exchange.
    ///
    /// # Errors
    /// `GenerationUnavailable` if the text collaborator fails; the
    /// exchange is not recorded in that case and no state is corrupted.
    pub async fn chat(&mut self, input: &str) -> Result<ChatReply> {
        let memories = self
            .memory
            .query(input, self.config.llm.context_memories)
            .await;
        let mood = self.memory.mood();
        let tone = mood.tone();
        let references = self
            .personality
            .cultural_references(&self.profile, &mut rand::thread_rng());

        let context = GenerationContext {
            companion_name: self.profile.name.clone(),
            stage: self.profile.stage,
            trait_names: self.profile.traits.iter().map(|t| t.name.clone()).collect(),
            mood,
            tone: tone.to_string(),
            cultural_references: references.clone(),
            recent_memories: memories.iter().map(|m| m.memory.content.clone()).collect(),
            user_input: input.to_string(),
        };

        let text = self
            .generator
            .generate(&context)
            .await
            .map_err(|source| EngineError::GenerationUnavailable { source })?;

        let importance = chat_importance(input, mood);
        self.record_best_effort(
            input.to_string(),
            MemoryKind::Interaction,
            json_context(&[
                ("response", serde_json::json!(text)),
                ("mood", serde_json::json!(mood.to_string())),
                ("cultural_references", serde_json::json!(references)),
            ]),
            importance,
        )
        .await;

        Ok(ChatReply {
            text,
            tone,
            cultural_references: references,
        })
    }

    /// Synthesize speech for `text`.
    ///
    /// # Errors
    /// `SynthesisUnavailable` if the speech collaborator fails.
    pub async fn speak(&self, text: &str) -> Result<Vec<u8>> {
        self.synthesizer
            .synthesize(text)
            .await
            .map_err(|source| EngineError::SynthesisUnavailable { source })
    }

    /// Log a user-reported mood entry as an emotion memory. A label that
    /// parses to a known mood also updates the mood scalar.
    ///
    /// # Errors
    /// `StorageUnavailable` if the long-term store rejects the entry
    /// (the short-term append still succeeds).
    pub async fn log_mood(
        &mut self,
        label: &str,
        intensity: u8,
        triggers: &[String],
    ) -> Result<Memory> {
        if let Ok(mood) = label.parse::<Mood>() {
            self.memory.set_mood(mood);
        }
        let importance = intensity.clamp(1, 10);
        self.memory
            .record(
                format!("Mood check-in: {label}"),
                MemoryKind::Emotion,
                json_context(&[
                    ("label", serde_json::json!(label)),
                    ("intensity", serde_json::json!(intensity)),
                    ("triggers", serde_json::json!(triggers)),
                ]),
                importance,
            )
            .await
    }

    // -----------------------------------------------------------------------
    // Memory passthroughs
    // -----------------------------------------------------------------------

    /// Record an arbitrary event memory.
    ///
    /// # Errors
    /// `StorageUnavailable` if the store call fails (the short-term
    /// append still succeeds).
    pub async fn record_memory(
        &mut self,
        content: &str,
        kind: MemoryKind,
        context: HashMap<String, serde_json::Value>,
        importance: u8,
    ) -> Result<Memory> {
        self.memory.record(content, kind, context, importance).await
    }

    /// Query the long-term store (best-effort; empty on store failure).
    pub async fn query_memories(&self, text: &str, limit: usize) -> Vec<ScoredMemory> {
        self.memory.query(text, limit).await
    }

    /// Purge old, unimportant long-term entries per the retention
    /// policy.
    ///
    /// # Errors
    /// `StorageUnavailable` if the store call fails.
    pub async fn prune_memories(&self) -> Result<()> {
        self.memory.prune().await
    }

    /// Record a memory without failing the surrounding operation: store
    /// outages degrade to a warning, the short-term append still lands.
    async fn record_best_effort(
        &mut self,
        content: String,
        kind: MemoryKind,
        context: HashMap<String, serde_json::Value>,
        importance: u8,
    ) {
        if let Err(err) = self.memory.record(content, kind, context, importance).await {
            tracing::warn!(%err, "memory recording degraded");
        }
    }
}

/// Build a memory context map from literal pairs.
fn json_context(pairs: &[(&str, serde_json::Value)]) -> HashMap<String, serde_json::Value> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), v.clone()))
        .collect()
}

/// Chat-exchange importance: base 5, bumped for strong emotional states
/// and long, detailed input, capped at 10.
fn chat_importance(input: &str, mood: Mood) -> u8 {
    let mut importance = 5u8;
    if matches!(mood, Mood::VeryHappy | Mood::Exhausted) {
        importance += 2;
    }
    if input.len() > 100 {
        importance += 1;
    }
    importance.min(10)
}

/// Spawn the exercise timeout watchdog: polls `engine.tick()` at `poll`
/// intervals and forwards any timeout report to `reports`. The poll
/// takes the same lock as user-driven transitions, so timeout and
/// submission serialize — whichever lands first wins and the other is a
/// no-op. Abort the returned handle to stop the watchdog.
pub fn spawn_timeout_watch(
    engine: Arc<Mutex<CompanionEngine>>,
    poll: std::time::Duration,
    reports: mpsc::Sender<ExerciseReport>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(poll);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            let report = engine.lock().await.tick().await;
            if let Some(report) = report {
                tracing::info!(quality = report.quality, "exercise timed out");
                if reports.send(report).await.is_err() {
                    // Receiver gone — nobody is listening anymore.
                    return;
                }
            }
        }
    })
}
