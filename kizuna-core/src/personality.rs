//! Trait/personality engine — unlock gating and response seasoning.
//!
//! Traits come from an immutable catalog. A trait can be unlocked once
//! the profile reaches its stage and meets its stat minimums; unlocked
//! traits are never removed. Cultural references are drawn from the
//! catalog traits available at or below the current stage and passed to
//! the text generator as contextual seasoning, never kept as state.

use rand::Rng;

use crate::error::{EngineError, Result};
use crate::types::{PersonalityTrait, Profile};

/// Bounds on how many cultural references season one response.
const MIN_REFERENCES: usize = 1;
const MAX_REFERENCES: usize = 3;

/// Trait eligibility and unlocking against a catalog.
#[derive(Debug, Clone)]
pub struct TraitEngine {
    catalog: Vec<PersonalityTrait>,
}

impl TraitEngine {
    /// Create an engine over a trait catalog.
    #[must_use]
    pub fn new(catalog: Vec<PersonalityTrait>) -> Self {
        Self { catalog }
    }

    /// The full catalog.
    #[must_use]
    pub fn catalog(&self) -> &[PersonalityTrait] {
        &self.catalog
    }

    /// Look up a catalog trait by id.
    #[must_use]
    pub fn find(&self, trait_id: &str) -> Option<&PersonalityTrait> {
        self.catalog.iter().find(|t| t.id == trait_id)
    }

    /// Whether `entry` can be unlocked by `profile` right now: its stage
    /// must not exceed the profile's, it must not already be unlocked,
    /// and every stat minimum must be met.
    #[must_use]
    pub fn is_eligible(&self, entry: &PersonalityTrait, profile: &Profile) -> bool {
        if entry.stage > profile.stage {
            return false;
        }
        if profile.has_trait(&entry.id) {
            return false;
        }
        profile.stats.meets(&entry.required_stats)
    }

    /// Catalog traits the profile could unlock right now.
    #[must_use]
    pub fn eligible(&self, profile: &Profile) -> Vec<&PersonalityTrait> {
        self.catalog
            .iter()
            .filter(|t| self.is_eligible(t, profile))
            .collect()
    }

    /// Unlock a trait by catalog id, adding it to the profile.
    ///
    /// # Errors
    /// `UnknownTrait` if the id is not in the catalog; `NotEligible` if
    /// the trait cannot be unlocked yet (the profile is unchanged). The
    /// duplicate-id guard is part of eligibility, so unlocking twice
    /// fails rather than double-adding.
    pub fn unlock(&self, trait_id: &str, profile: &mut Profile) -> Result<PersonalityTrait> {
        let entry = self
            .find(trait_id)
            .ok_or_else(|| EngineError::UnknownTrait(trait_id.to_string()))?;
        if !self.is_eligible(entry, profile) {
            return Err(EngineError::NotEligible {
                trait_id: trait_id.to_string(),
            });
        }
        profile.traits.push(entry.clone());
        tracing::info!(companion = %profile.id, trait_id, "trait unlocked");
        Ok(entry.clone())
    }

    /// Pick 1–3 cultural-element names (with replacement) from the
    /// pooled elements of catalog traits available at or below the
    /// profile's stage. Returns an empty list when the pool is empty.
    #[must_use]
    pub fn cultural_references<R: Rng + ?Sized>(
        &self,
        profile: &Profile,
        rng: &mut R,
    ) -> Vec<String> {
        let pool: Vec<&str> = self
            .catalog
            .iter()
            .filter(|t| t.stage <= profile.stage)
            .flat_map(|t| t.cultural_elements.iter().map(|e| e.name.as_str()))
            .collect();

        if pool.is_empty() {
            return Vec::new();
        }

        let count = rng.gen_range(MIN_REFERENCES..=MAX_REFERENCES);
        (0..count)
            .map(|_| pool[rng.gen_range(0..pool.len())].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::types::{EvolutionStage, Stats};

    fn engine() -> TraitEngine {
        TraitEngine::new(catalog::default_traits())
    }

    fn profile_with(wisdom: f32, empathy: f32) -> Profile {
        Profile::new(
            "Yuki",
            Stats {
                wisdom,
                empathy,
                energy: 50.0,
                happiness: 50.0,
            },
        )
    }

    #[test]
    fn unlock_adds_the_trait_once() {
        let engine = engine();
        let mut profile = profile_with(10.0, 10.0);

        let unlocked = engine.unlock("basic-empathy", &mut profile).expect("unlock");
        assert_eq!(unlocked.name, "Basic Empathy");
        assert!(profile.has_trait("basic-empathy"));

        // Second unlock is rejected by the idempotency guard.
        let err = engine.unlock("basic-empathy", &mut profile).unwrap_err();
        assert!(matches!(err, EngineError::NotEligible { .. }));
        assert_eq!(
            profile.traits.iter().filter(|t| t.id == "basic-empathy").count(),
            1
        );
    }

    #[test]
    fn stat_minimums_gate_unlocking() {
        let engine = engine();
        let mut profile = profile_with(0.0, 0.0);

        let err = engine.unlock("basic-empathy", &mut profile).unwrap_err();
        assert!(matches!(err, EngineError::NotEligible { .. }));
        assert!(profile.traits.is_empty());
    }

    #[test]
    fn stage_gates_unlocking() {
        let engine = engine();
        // Plenty of stats, but still stage one.
        let mut profile = profile_with(100.0, 100.0);
        let err = engine.unlock("enhanced-empathy", &mut profile).unwrap_err();
        assert!(matches!(err, EngineError::NotEligible { .. }));

        profile.stage = EvolutionStage::Two;
        assert!(engine.unlock("enhanced-empathy", &mut profile).is_ok());
    }

    #[test]
    fn unknown_trait_id_is_its_own_error() {
        let engine = engine();
        let mut profile = profile_with(10.0, 10.0);
        let err = engine.unlock("nine-tails", &mut profile).unwrap_err();
        assert!(matches!(err, EngineError::UnknownTrait(_)));
    }

    #[test]
    fn eligible_lists_only_unlockable_traits() {
        let engine = engine();
        let mut profile = profile_with(10.0, 10.0);
        let before = engine.eligible(&profile);
        assert!(before.iter().any(|t| t.id == "basic-empathy"));
        assert!(before.iter().all(|t| t.stage <= profile.stage));

        engine.unlock("basic-empathy", &mut profile).expect("unlock");
        let after = engine.eligible(&profile);
        assert!(!after.iter().any(|t| t.id == "basic-empathy"));
    }

    #[test]
    fn cultural_reference_count_stays_in_bounds() {
        let engine = engine();
        let profile = profile_with(10.0, 10.0);
        let mut rng = rand::thread_rng();

        for _ in 0..50 {
            let refs = engine.cultural_references(&profile, &mut rng);
            assert!((1..=3).contains(&refs.len()));
        }
    }

    #[test]
    fn cultural_references_come_from_stage_available_pool() {
        let engine = engine();
        let profile = profile_with(10.0, 10.0);
        let pool: Vec<String> = engine
            .catalog()
            .iter()
            .filter(|t| t.stage <= profile.stage)
            .flat_map(|t| t.cultural_elements.iter().map(|e| e.name.clone()))
            .collect();

        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            for reference in engine.cultural_references(&profile, &mut rng) {
                assert!(pool.contains(&reference));
            }
        }
    }

    #[test]
    fn empty_pool_yields_no_references() {
        let engine = TraitEngine::new(Vec::new());
        let profile = profile_with(10.0, 10.0);
        let mut rng = rand::thread_rng();
        assert!(engine.cultural_references(&profile, &mut rng).is_empty());
    }
}
