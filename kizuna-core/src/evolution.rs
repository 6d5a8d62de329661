//! Evolution engine — multi-criterion stage transitions.
//!
//! Two threshold tiers (stage 1→2 and 2→3) each gate on relationship
//! level, wisdom, empathy, and a set of required trait names, combined
//! with logical AND. Advancement through [`EvolutionEngine::check`] is
//! the only way the stage changes, it moves exactly one stage per call,
//! and stage three is terminal.

use serde::{Deserialize, Serialize};

use crate::config::{EvolutionConfig, EvolutionTier};
use crate::types::{EvolutionStage, Profile};

/// Per-factor progress toward the next stage, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EvolutionProgress {
    /// Unweighted mean of the four factors.
    pub overall: f32,
    /// Relationship-level factor.
    pub relationship: f32,
    /// Wisdom factor.
    pub wisdom: f32,
    /// Empathy factor.
    pub empathy: f32,
    /// Required-traits factor (unlocked / required).
    pub traits: f32,
}

impl EvolutionProgress {
    /// Terminal-stage progress: everything maxed.
    const COMPLETE: Self = Self {
        overall: 1.0,
        relationship: 1.0,
        wisdom: 1.0,
        empathy: 1.0,
        traits: 1.0,
    };
}

/// Evaluates stage transitions against the configured tiers.
#[derive(Debug, Clone)]
pub struct EvolutionEngine {
    config: EvolutionConfig,
}

impl EvolutionEngine {
    /// Create an engine with the given thresholds.
    #[must_use]
    pub fn new(config: EvolutionConfig) -> Self {
        Self { config }
    }

    /// The tier gating advancement out of `stage`, or `None` at the
    /// terminal stage.
    #[must_use]
    pub fn tier_for(&self, stage: EvolutionStage) -> Option<&EvolutionTier> {
        match stage {
            EvolutionStage::One => Some(&self.config.stage1_to_2),
            EvolutionStage::Two => Some(&self.config.stage2_to_3),
            EvolutionStage::Three => None,
        }
    }

    /// Check the current tier's criteria and advance by exactly one
    /// stage when all of them hold. Returns whether the profile evolved.
    /// On `false` the profile is untouched.
    pub fn check(&self, profile: &mut Profile) -> bool {
        let Some(tier) = self.tier_for(profile.stage) else {
            return false;
        };
        if !Self::meets(tier, profile) {
            return false;
        }
        let next = profile
            .stage
            .next()
            .expect("non-terminal stage has a successor");
        tracing::info!(
            companion = %profile.id,
            from = %profile.stage,
            to = %next,
            "companion evolved"
        );
        profile.stage = next;
        true
    }

    /// Progress toward the next stage. At the terminal stage every
    /// factor reports 1.
    #[must_use]
    pub fn progress(&self, profile: &Profile) -> EvolutionProgress {
        let Some(tier) = self.tier_for(profile.stage) else {
            return EvolutionProgress::COMPLETE;
        };

        let relationship =
            (profile.relationship_level as f32 / tier.min_relationship.max(1) as f32).min(1.0);
        let wisdom = (profile.stats.wisdom / tier.min_wisdom.max(1.0)).clamp(0.0, 1.0);
        let empathy = (profile.stats.empathy / tier.min_empathy.max(1.0)).clamp(0.0, 1.0);
        let traits = Self::traits_progress(tier, profile);
        let overall = (relationship + wisdom + empathy + traits) / 4.0;

        EvolutionProgress {
            overall,
            relationship,
            wisdom,
            empathy,
            traits,
        }
    }

    fn meets(tier: &EvolutionTier, profile: &Profile) -> bool {
        profile.relationship_level >= tier.min_relationship
            && profile.stats.wisdom >= tier.min_wisdom
            && profile.stats.empathy >= tier.min_empathy
            && tier
                .required_traits
                .iter()
                .all(|name| profile.has_trait_named(name))
    }

    fn traits_progress(tier: &EvolutionTier, profile: &Profile) -> f32 {
        if tier.required_traits.is_empty() {
            return 1.0;
        }
        let unlocked = tier
            .required_traits
            .iter()
            .filter(|name| profile.has_trait_named(name))
            .count();
        unlocked as f32 / tier.required_traits.len() as f32
    }
}
