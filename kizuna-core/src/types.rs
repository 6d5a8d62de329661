//! Core type definitions for the Kizuna companion engine.
//!
//! All model types are serializable; mutation goes through the engine's
//! update operations, never through ad hoc field writes by callers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Identity Types
// ---------------------------------------------------------------------------

/// Unique identifier for a companion (one per user session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompanionId(pub Uuid);

impl CompanionId {
    /// Create a new random companion ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CompanionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CompanionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a memory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryId(pub Uuid);

impl MemoryId {
    /// Create a new random memory ID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MemoryId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MemoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// The four companion attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stat {
    /// Insight and learning.
    Wisdom,
    /// Emotional attunement.
    Empathy,
    /// Capacity to act; spent by activities, restored by rest.
    Energy,
    /// Overall contentment.
    Happiness,
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Wisdom => write!(f, "wisdom"),
            Self::Empathy => write!(f, "empathy"),
            Self::Energy => write!(f, "energy"),
            Self::Happiness => write!(f, "happiness"),
        }
    }
}

/// Current stat values. No hard upper bound; energy is conventionally
/// non-negative but negative transients are not forbidden here — the
/// caller decides how to interpret them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Stats {
    /// Insight and learning.
    pub wisdom: f32,
    /// Emotional attunement.
    pub empathy: f32,
    /// Capacity to act.
    pub energy: f32,
    /// Overall contentment.
    pub happiness: f32,
}

impl Stats {
    /// Read a single stat by key.
    #[must_use]
    pub fn get(&self, stat: Stat) -> f32 {
        match stat {
            Stat::Wisdom => self.wisdom,
            Stat::Empathy => self.empathy,
            Stat::Energy => self.energy,
            Stat::Happiness => self.happiness,
        }
    }

    /// Apply a delta additively.
    pub fn apply(&mut self, delta: &StatDelta) {
        self.wisdom += delta.wisdom;
        self.empathy += delta.empathy;
        self.energy += delta.energy;
        self.happiness += delta.happiness;
    }

    /// Which required minimums are not met, in stat order.
    #[must_use]
    pub fn unmet(&self, required: &StatRequirements) -> Vec<Stat> {
        let mut missing = Vec::new();
        if required.wisdom.is_some_and(|min| self.wisdom < min) {
            missing.push(Stat::Wisdom);
        }
        if required.empathy.is_some_and(|min| self.empathy < min) {
            missing.push(Stat::Empathy);
        }
        if required.energy.is_some_and(|min| self.energy < min) {
            missing.push(Stat::Energy);
        }
        if required.happiness.is_some_and(|min| self.happiness < min) {
            missing.push(Stat::Happiness);
        }
        missing
    }

    /// Whether every required minimum is met.
    #[must_use]
    pub fn meets(&self, required: &StatRequirements) -> bool {
        self.unmet(required).is_empty()
    }
}

/// A change to apply to [`Stats`]. Fields not touched by an operation
/// stay zero and contribute nothing to [`StatDelta::total`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatDelta {
    /// Wisdom change.
    pub wisdom: f32,
    /// Empathy change.
    pub empathy: f32,
    /// Energy change (rewards minus cost for activities).
    pub energy: f32,
    /// Happiness change.
    pub happiness: f32,
}

impl StatDelta {
    /// Sum of all fields — the input to mood classification.
    #[must_use]
    pub fn total(&self) -> f32 {
        self.wisdom + self.empathy + self.energy + self.happiness
    }

    /// Whether any single field's magnitude reaches `threshold`.
    #[must_use]
    pub fn any_magnitude_at_least(&self, threshold: f32) -> bool {
        self.wisdom.abs() >= threshold
            || self.empathy.abs() >= threshold
            || self.energy.abs() >= threshold
            || self.happiness.abs() >= threshold
    }

    /// Add an impact to a single stat field.
    pub fn add(&mut self, stat: Stat, amount: f32) {
        match stat {
            Stat::Wisdom => self.wisdom += amount,
            Stat::Empathy => self.empathy += amount,
            Stat::Energy => self.energy += amount,
            Stat::Happiness => self.happiness += amount,
        }
    }
}

/// Partial stat minimums — gates for exercises and trait unlocks.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct StatRequirements {
    /// Minimum wisdom, if gated.
    #[serde(default)]
    pub wisdom: Option<f32>,
    /// Minimum empathy, if gated.
    #[serde(default)]
    pub empathy: Option<f32>,
    /// Minimum energy, if gated.
    #[serde(default)]
    pub energy: Option<f32>,
    /// Minimum happiness, if gated.
    #[serde(default)]
    pub happiness: Option<f32>,
}

// ---------------------------------------------------------------------------
// Evolution Stage
// ---------------------------------------------------------------------------

/// Three-level progression gate. Monotonically non-decreasing within a
/// session; advanced only by the evolution engine, one stage at a time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum EvolutionStage {
    /// Starting form.
    One,
    /// Intermediate form.
    Two,
    /// Final form (terminal).
    Three,
}

impl EvolutionStage {
    /// Numeric rank (1–3), matching the catalog data.
    #[must_use]
    pub fn rank(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
        }
    }

    /// The next stage, or `None` at the terminal stage.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::One => Some(Self::Two),
            Self::Two => Some(Self::Three),
            Self::Three => None,
        }
    }

    /// Build from a numeric rank.
    #[must_use]
    pub fn from_rank(rank: u8) -> Option<Self> {
        match rank {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            _ => None,
        }
    }
}

impl Default for EvolutionStage {
    fn default() -> Self {
        Self::One
    }
}

impl fmt::Display for EvolutionStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.rank())
    }
}

// ---------------------------------------------------------------------------
// Personality Traits
// ---------------------------------------------------------------------------

/// Kind of cultural element attached to a trait.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CulturalElementKind {
    /// A symbolic object or image.
    Symbol,
    /// A tale or parable.
    Story,
    /// A guiding value.
    Value,
}

/// A cultural reference a trait can season responses with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CulturalElement {
    /// Symbol, story, or value.
    pub kind: CulturalElementKind,
    /// Reference name (what gets passed to the text generator).
    pub name: String,
    /// Short description.
    pub description: String,
}

/// A catalog-defined personality modifier. Catalog entries are immutable;
/// the profile holds copies of *unlocked* traits only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalityTrait {
    /// Stable catalog id (slug).
    pub id: String,
    /// Display name — evolution tiers reference traits by this name.
    pub name: String,
    /// What the trait expresses.
    pub description: String,
    /// Stage at which the trait becomes available to unlock.
    pub stage: EvolutionStage,
    /// Stat minimums that must be met to unlock.
    #[serde(default)]
    pub required_stats: StatRequirements,
    /// Cultural references this trait contributes.
    #[serde(default)]
    pub cultural_elements: Vec<CulturalElement>,
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// The companion's persistent attributes. Owned exclusively by the
/// engine; created once at session start, never destroyed mid-session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Companion identity.
    pub id: CompanionId,
    /// Display name.
    pub name: String,
    /// Current evolution stage.
    pub stage: EvolutionStage,
    /// Relationship points accumulated with the user.
    pub relationship_level: u32,
    /// Unlocked traits (unique by id, never removed).
    pub traits: Vec<PersonalityTrait>,
    /// Current stat values.
    pub stats: Stats,
    /// When the companion was created.
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Create a stage-one profile with the given starting stats.
    #[must_use]
    pub fn new(name: impl Into<String>, stats: Stats) -> Self {
        Self {
            id: CompanionId::new(),
            name: name.into(),
            stage: EvolutionStage::One,
            relationship_level: 0,
            traits: Vec::new(),
            stats,
            created_at: Utc::now(),
        }
    }

    /// Whether a trait with this catalog id is already unlocked.
    #[must_use]
    pub fn has_trait(&self, trait_id: &str) -> bool {
        self.traits.iter().any(|t| t.id == trait_id)
    }

    /// Whether a trait with this display name is already unlocked.
    #[must_use]
    pub fn has_trait_named(&self, name: &str) -> bool {
        self.traits.iter().any(|t| t.name == name)
    }

    /// One-line summary for generation context.
    #[must_use]
    pub fn summary(&self) -> String {
        let trait_names: Vec<&str> = self.traits.iter().map(|t| t.name.as_str()).collect();
        format!(
            "{} (stage {}, relationship {}): traits [{}]",
            self.name,
            self.stage,
            self.relationship_level,
            trait_names.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stats_apply_is_additive() {
        let mut stats = Stats {
            wisdom: 10.0,
            empathy: 10.0,
            energy: 100.0,
            happiness: 50.0,
        };
        stats.apply(&StatDelta {
            wisdom: 3.0,
            empathy: 0.0,
            energy: -2.0,
            happiness: 1.0,
        });
        assert_eq!(stats.wisdom, 13.0);
        assert_eq!(stats.energy, 98.0);
        assert_eq!(stats.happiness, 51.0);
    }

    #[test]
    fn unmet_requirements_lists_missing_stats() {
        let stats = Stats {
            wisdom: 5.0,
            empathy: 20.0,
            ..Default::default()
        };
        let required = StatRequirements {
            wisdom: Some(10.0),
            empathy: Some(15.0),
            ..Default::default()
        };
        assert_eq!(stats.unmet(&required), vec![Stat::Wisdom]);
        assert!(!stats.meets(&required));
    }

    #[test]
    fn delta_total_and_magnitude() {
        let delta = StatDelta {
            wisdom: 3.0,
            empathy: 2.0,
            energy: -5.0,
            happiness: 0.0,
        };
        assert_eq!(delta.total(), 0.0);
        assert!(delta.any_magnitude_at_least(5.0));
        assert!(!delta.any_magnitude_at_least(6.0));
    }

    #[test]
    fn stage_progression_is_bounded() {
        assert_eq!(EvolutionStage::One.next(), Some(EvolutionStage::Two));
        assert_eq!(EvolutionStage::Two.next(), Some(EvolutionStage::Three));
        assert_eq!(EvolutionStage::Three.next(), None);
        assert!(EvolutionStage::One < EvolutionStage::Three);
    }

    #[test]
    fn profile_starts_at_stage_one_with_no_traits() {
        let profile = Profile::new("Yuki", Stats::default());
        assert_eq!(profile.stage, EvolutionStage::One);
        assert!(profile.traits.is_empty());
        assert_eq!(profile.relationship_level, 0);
        assert!(!profile.has_trait("basic-empathy"));
    }

    #[test]
    fn summary_names_stage_and_traits() {
        let mut profile = Profile::new("Yuki", Stats::default());
        profile.traits.push(PersonalityTrait {
            id: "curiosity".to_string(),
            name: "Curiosity".to_string(),
            description: String::new(),
            stage: EvolutionStage::One,
            required_stats: StatRequirements::default(),
            cultural_elements: Vec::new(),
        });
        let summary = profile.summary();
        assert!(summary.contains("Yuki"));
        assert!(summary.contains("stage 1"));
        assert!(summary.contains("Curiosity"));
    }
}
