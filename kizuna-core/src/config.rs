//! Configuration for the Kizuna companion engine.
//!
//! Maps directly to `kizuna.toml`. Every fixed policy number the engine
//! enforces (cooldown windows, memory capacity, scoring weights,
//! evolution tiers, collaborator endpoints) lives here so deployments can
//! tune them without code changes.

use serde::{Deserialize, Serialize};

use crate::activity::ActivityKind;

/// Top-level engine configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanionConfig {
    /// Short- and long-term memory policy.
    #[serde(default)]
    pub memory: MemoryConfig,
    /// Activity gate cooldowns and significance threshold.
    #[serde(default)]
    pub activity: ActivityConfig,
    /// Exercise session scoring and pacing.
    #[serde(default)]
    pub exercise: ExerciseConfig,
    /// Evolution stage thresholds.
    #[serde(default)]
    pub evolution: EvolutionConfig,
    /// Text-generation collaborator settings.
    #[serde(default)]
    pub llm: LlmConfig,
    /// Speech-synthesis collaborator settings.
    #[serde(default)]
    pub speech: SpeechConfig,
    /// Long-term store collaborator settings.
    #[serde(default)]
    pub store: StoreConfig,
}

impl CompanionConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `EngineError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::EngineError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

// ---------------------------------------------------------------------------
// Sub-configs
// ---------------------------------------------------------------------------

/// Memory subsystem policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Fixed capacity of the short-term FIFO buffer.
    #[serde(default = "default_10_usize")]
    pub short_term_capacity: usize,
    /// Memories at or above this importance are pinned — flagged for the
    /// long-term store to retain beyond its normal window.
    #[serde(default = "default_8")]
    pub pin_importance: u8,
    /// Default result count for similarity queries.
    #[serde(default = "default_5_usize")]
    pub query_limit: usize,
    /// Prune cutoff: entries older than this many days are purge
    /// candidates.
    #[serde(default = "default_30_i64")]
    pub prune_after_days: i64,
    /// Prune keeps entries at or above this importance regardless of age.
    #[serde(default = "default_7")]
    pub prune_importance_below: u8,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            short_term_capacity: 10,
            pin_importance: 8,
            query_limit: 5,
            prune_after_days: 30,
            prune_importance_below: 7,
        }
    }
}

/// Activity gate policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityConfig {
    /// Cooldown between play activities, in minutes.
    #[serde(default = "default_5_u64")]
    pub play_cooldown_mins: u64,
    /// Cooldown between learn activities, in minutes.
    #[serde(default = "default_15")]
    pub learn_cooldown_mins: u64,
    /// Cooldown between feed activities, in minutes.
    #[serde(default = "default_30_u64")]
    pub feed_cooldown_mins: u64,
    /// Cooldown between rest activities, in minutes.
    #[serde(default = "default_60")]
    pub rest_cooldown_mins: u64,
    /// Any single delta field at or above this magnitude also records an
    /// emotion memory and updates the mood scalar.
    #[serde(default = "default_5_f32")]
    pub significance_threshold: f32,
}

impl ActivityConfig {
    /// Cooldown window for an activity kind.
    #[must_use]
    pub fn cooldown_for(&self, kind: ActivityKind) -> chrono::Duration {
        let mins = match kind {
            ActivityKind::Play => self.play_cooldown_mins,
            ActivityKind::Learn => self.learn_cooldown_mins,
            ActivityKind::Feed => self.feed_cooldown_mins,
            ActivityKind::Rest => self.rest_cooldown_mins,
        };
        chrono::Duration::minutes(mins as i64)
    }
}

impl Default for ActivityConfig {
    fn default() -> Self {
        Self {
            play_cooldown_mins: 5,
            learn_cooldown_mins: 15,
            feed_cooldown_mins: 30,
            rest_cooldown_mins: 60,
            significance_threshold: 5.0,
        }
    }
}

/// Exercise session scoring and pacing policy.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExerciseConfig {
    /// How often the timeout watchdog polls, in seconds.
    #[serde(default = "default_1_u64")]
    pub poll_interval_secs: u64,
    /// Response length (chars) at which a step scores full quality.
    #[serde(default = "default_50_usize")]
    pub response_target_chars: usize,
    /// Weight of response quality in the completion score.
    #[serde(default = "default_0_7")]
    pub response_weight: f32,
    /// Weight of time usage in the completion score.
    #[serde(default = "default_0_3")]
    pub time_weight: f32,
    /// Average step time below this many seconds draws a "slow down"
    /// pacing remark.
    #[serde(default = "default_30_f32")]
    pub brisk_step_secs: f32,
    /// Average step time above this many seconds draws a "deep
    /// reflection" pacing remark.
    #[serde(default = "default_120")]
    pub slow_step_secs: f32,
}

impl Default for ExerciseConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: 1,
            response_target_chars: 50,
            response_weight: 0.7,
            time_weight: 0.3,
            brisk_step_secs: 30.0,
            slow_step_secs: 120.0,
        }
    }
}

/// One evolution threshold tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionTier {
    /// Minimum relationship level.
    pub min_relationship: u32,
    /// Minimum wisdom.
    pub min_wisdom: f32,
    /// Minimum empathy.
    pub min_empathy: f32,
    /// Trait names that must all be unlocked.
    pub required_traits: Vec<String>,
}

/// Evolution thresholds, keyed by the current stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvolutionConfig {
    /// Requirements to advance from stage one to stage two.
    #[serde(default = "default_tier_1_to_2")]
    pub stage1_to_2: EvolutionTier,
    /// Requirements to advance from stage two to stage three.
    #[serde(default = "default_tier_2_to_3")]
    pub stage2_to_3: EvolutionTier,
}

impl Default for EvolutionConfig {
    fn default() -> Self {
        Self {
            stage1_to_2: default_tier_1_to_2(),
            stage2_to_3: default_tier_2_to_3(),
        }
    }
}

/// Text-generation collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider: "openai", "ollama", "none".
    #[serde(default = "default_openai")]
    pub provider: String,
    /// Base URL for the API.
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    /// API key (empty for local providers).
    #[serde(default)]
    pub api_key: String,
    /// Model name.
    #[serde(default = "default_gpt4")]
    pub model: String,
    /// Sampling temperature.
    #[serde(default = "default_0_7")]
    pub temperature: f32,
    /// Maximum tokens to generate per reply.
    #[serde(default = "default_400")]
    pub max_tokens: u32,
    /// Hard timeout for any generation call in milliseconds.
    #[serde(default = "default_10000")]
    pub request_timeout_ms: u64,
    /// Max retries before surfacing `GenerationUnavailable`.
    #[serde(default = "default_2")]
    pub max_retries: u32,
    /// How many stored memories are retrieved into the chat context.
    #[serde(default = "default_3_usize")]
    pub context_memories: usize,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4".to_string(),
            temperature: 0.7,
            max_tokens: 400,
            request_timeout_ms: 10_000,
            max_retries: 2,
            context_memories: 3,
        }
    }
}

/// Speech-synthesis collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Base URL for the TTS API.
    #[serde(default = "default_openai_url")]
    pub base_url: String,
    /// API key.
    #[serde(default)]
    pub api_key: String,
    /// TTS model name.
    #[serde(default = "default_tts1")]
    pub model: String,
    /// Voice preset.
    #[serde(default = "default_nova")]
    pub voice: String,
    /// Hard timeout for any synthesis call in milliseconds.
    #[serde(default = "default_10000")]
    pub request_timeout_ms: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "tts-1".to_string(),
            voice: "nova".to_string(),
            request_timeout_ms: 10_000,
        }
    }
}

/// Long-term store collaborator configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Base URL of the document/vector store service.
    #[serde(default = "default_store_url")]
    pub base_url: String,
    /// Namespace isolating this companion's documents.
    #[serde(default = "default_namespace")]
    pub namespace: String,
    /// Hard timeout for any store call in milliseconds.
    #[serde(default = "default_5000")]
    pub request_timeout_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:6333".to_string(),
            namespace: "kizuna".to_string(),
            request_timeout_ms: 5000,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_tier_1_to_2() -> EvolutionTier {
    EvolutionTier {
        min_relationship: 5,
        min_wisdom: 60.0,
        min_empathy: 50.0,
        required_traits: vec!["Basic Empathy".to_string(), "Curiosity".to_string()],
    }
}

fn default_tier_2_to_3() -> EvolutionTier {
    EvolutionTier {
        min_relationship: 8,
        min_wisdom: 80.0,
        min_empathy: 75.0,
        required_traits: vec![
            "Enhanced Empathy".to_string(),
            "Spiritual Connection".to_string(),
        ],
    }
}

fn default_openai() -> String { "openai".to_string() }
fn default_openai_url() -> String { "https://api.openai.com".to_string() }
fn default_gpt4() -> String { "gpt-4".to_string() }
fn default_tts1() -> String { "tts-1".to_string() }
fn default_nova() -> String { "nova".to_string() }
fn default_store_url() -> String { "http://localhost:6333".to_string() }
fn default_namespace() -> String { "kizuna".to_string() }
fn default_0_3() -> f32 { 0.3 }
fn default_0_7() -> f32 { 0.7 }
fn default_5_f32() -> f32 { 5.0 }
fn default_30_f32() -> f32 { 30.0 }
fn default_120() -> f32 { 120.0 }
fn default_2() -> u32 { 2 }
fn default_400() -> u32 { 400 }
fn default_7() -> u8 { 7 }
fn default_8() -> u8 { 8 }
fn default_1_u64() -> u64 { 1 }
fn default_5_u64() -> u64 { 5 }
fn default_15() -> u64 { 15 }
fn default_30_u64() -> u64 { 30 }
fn default_60() -> u64 { 60 }
fn default_5000() -> u64 { 5000 }
fn default_10000() -> u64 { 10_000 }
fn default_3_usize() -> usize { 3 }
fn default_5_usize() -> usize { 5 }
fn default_10_usize() -> usize { 10 }
fn default_50_usize() -> usize { 50 }
fn default_30_i64() -> i64 { 30 }

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_fixed_policy() {
        let config = CompanionConfig::default();
        assert_eq!(config.memory.short_term_capacity, 10);
        assert_eq!(config.memory.pin_importance, 8);
        assert_eq!(
            config.activity.cooldown_for(ActivityKind::Play),
            chrono::Duration::minutes(5)
        );
        assert_eq!(
            config.activity.cooldown_for(ActivityKind::Rest),
            chrono::Duration::minutes(60)
        );
        assert_eq!(config.exercise.response_target_chars, 50);
        assert_eq!(config.evolution.stage1_to_2.min_wisdom, 60.0);
        assert_eq!(config.evolution.stage2_to_3.min_relationship, 8);
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = CompanionConfig::from_toml(
            r#"
            [activity]
            play_cooldown_mins = 2

            [llm]
            provider = "ollama"
            base_url = "http://localhost:11434"
            "#,
        )
        .expect("valid toml");

        assert_eq!(config.activity.play_cooldown_mins, 2);
        assert_eq!(config.activity.learn_cooldown_mins, 15);
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.memory.short_term_capacity, 10);
    }

    #[test]
    fn invalid_toml_is_a_config_error() {
        let err = CompanionConfig::from_toml("not = [valid").unwrap_err();
        assert!(matches!(err, crate::EngineError::Config(_)));
    }
}
