//! Activity gate — cooldown- and energy-based admission control.
//!
//! Each activity *type* has its own cooldown clock, independent of the
//! others. Admission is a pure function of (last-performed time, now,
//! cooldown-for-type): identical inputs always yield the same decision.
//! A successful attempt computes the stat delta and stamps the clock;
//! applying the delta and recording memories is the engine's job so the
//! check-and-mutate pair stays one atomic unit under the engine's lock.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ActivityConfig;
use crate::error::{EngineError, Result};
use crate::types::{StatDelta, Stats};

/// The four simple activity types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
    /// Games and bonding.
    Play,
    /// Study and reflection.
    Learn,
    /// Nourishment.
    Feed,
    /// Recovery.
    Rest,
}

impl ActivityKind {
    /// Emotion words an activity of this kind can leave the companion
    /// feeling. One is picked at random per performance — flavor only,
    /// never engine state.
    #[must_use]
    pub fn flavor_pool(self) -> &'static [&'static str] {
        match self {
            Self::Play => &["joyful", "excited", "energetic"],
            Self::Learn => &["curious", "focused", "enlightened"],
            Self::Feed => &["satisfied", "content", "nourished"],
            Self::Rest => &["peaceful", "relaxed", "refreshed"],
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Play => write!(f, "play"),
            Self::Learn => write!(f, "learn"),
            Self::Feed => write!(f, "feed"),
            Self::Rest => write!(f, "rest"),
        }
    }
}

/// Stat rewards granted by an activity. Missing fields are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rewards {
    /// Wisdom gained.
    #[serde(default)]
    pub wisdom: f32,
    /// Empathy gained.
    #[serde(default)]
    pub empathy: f32,
    /// Energy restored (before the cost is subtracted).
    #[serde(default)]
    pub energy: f32,
    /// Happiness gained.
    #[serde(default)]
    pub happiness: f32,
    /// Relationship points gained.
    #[serde(default)]
    pub relationship_points: u32,
}

/// A simple, repeatable activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    /// Stable catalog id (slug).
    pub id: String,
    /// Cooldown group this activity belongs to.
    pub kind: ActivityKind,
    /// Display name.
    pub name: String,
    /// What the activity is.
    pub description: String,
    /// Nominal duration in minutes (informational).
    pub duration_mins: u32,
    /// Energy required to attempt.
    pub energy_cost: f32,
    /// What the activity grants on success.
    pub rewards: Rewards,
}

impl Activity {
    /// The stat delta a successful performance applies: rewards with the
    /// energy cost subtracted from the energy field.
    #[must_use]
    pub fn stat_delta(&self) -> StatDelta {
        StatDelta {
            wisdom: self.rewards.wisdom,
            empathy: self.rewards.empathy,
            energy: self.rewards.energy - self.energy_cost,
            happiness: self.rewards.happiness,
        }
    }
}

/// Pick a flavor emotion for a performed activity.
#[must_use]
pub fn flavor_emotion<R: Rng + ?Sized>(kind: ActivityKind, rng: &mut R) -> &'static str {
    let pool = kind.flavor_pool();
    pool[rng.gen_range(0..pool.len())]
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Admission control for simple activities.
///
/// Holds one last-performed clock per [`ActivityKind`]. A kind with no
/// recorded performance admits immediately.
#[derive(Debug, Clone)]
pub struct ActivityGate {
    last_performed: HashMap<ActivityKind, DateTime<Utc>>,
    config: ActivityConfig,
}

impl ActivityGate {
    /// Create a gate with all cooldown clocks unset.
    #[must_use]
    pub fn new(config: ActivityConfig) -> Self {
        Self {
            last_performed: HashMap::new(),
            config,
        }
    }

    /// Time remaining on a kind's cooldown at `now`, if any.
    #[must_use]
    pub fn remaining_cooldown(&self, kind: ActivityKind, now: DateTime<Utc>) -> Option<Duration> {
        let last = self.last_performed.get(&kind)?;
        let window = self.config.cooldown_for(kind);
        let elapsed = now - *last;
        if elapsed < window {
            Some(window - elapsed)
        } else {
            None
        }
    }

    /// Pure admission check: no state is touched.
    ///
    /// # Errors
    /// `OnCooldown` with the remaining wait, or `InsufficientEnergy`.
    pub fn would_admit(&self, activity: &Activity, stats: &Stats, now: DateTime<Utc>) -> Result<()> {
        if let Some(remaining) = self.remaining_cooldown(activity.kind, now) {
            return Err(EngineError::OnCooldown {
                kind: activity.kind,
                remaining,
            });
        }
        if stats.energy < activity.energy_cost {
            return Err(EngineError::InsufficientEnergy {
                required: activity.energy_cost,
                available: stats.energy,
            });
        }
        Ok(())
    }

    /// Attempt an activity: on admission, stamp the kind's clock and
    /// return the stat delta for the engine to apply.
    ///
    /// # Errors
    /// Rejections from [`Self::would_admit`]; nothing is mutated on
    /// rejection.
    pub fn attempt(
        &mut self,
        activity: &Activity,
        stats: &Stats,
        now: DateTime<Utc>,
    ) -> Result<StatDelta> {
        self.would_admit(activity, stats, now)?;
        self.last_performed.insert(activity.kind, now);
        tracing::debug!(activity = %activity.id, kind = %activity.kind, "activity admitted");
        Ok(activity.stat_delta())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> ActivityGate {
        ActivityGate::new(ActivityConfig::default())
    }

    fn stats(energy: f32) -> Stats {
        Stats {
            wisdom: 10.0,
            empathy: 10.0,
            energy,
            happiness: 50.0,
        }
    }

    fn rest() -> Activity {
        Activity {
            id: "peaceful-rest".to_string(),
            kind: ActivityKind::Rest,
            name: "Peaceful Rest".to_string(),
            description: "A period of peaceful rest to recover energy.".to_string(),
            duration_mins: 30,
            energy_cost: 0.0,
            rewards: Rewards {
                energy: 10.0,
                happiness: 1.0,
                ..Default::default()
            },
        }
    }

    fn play(cost: f32) -> Activity {
        Activity {
            id: "play-catch".to_string(),
            kind: ActivityKind::Play,
            name: "Play Catch".to_string(),
            description: "A fun game of catch.".to_string(),
            duration_mins: 10,
            energy_cost: cost,
            rewards: Rewards {
                happiness: 3.0,
                empathy: 1.0,
                relationship_points: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn first_attempt_is_admitted() {
        let mut gate = gate();
        let now = Utc::now();
        let delta = gate.attempt(&rest(), &stats(100.0), now).expect("admitted");
        assert_eq!(delta.energy, 10.0);
        assert_eq!(delta.happiness, 1.0);
    }

    #[test]
    fn second_attempt_within_cooldown_is_rejected_with_remaining() {
        let mut gate = gate();
        let now = Utc::now();
        gate.attempt(&rest(), &stats(100.0), now).expect("admitted");

        let retry_at = now + Duration::minutes(10);
        let err = gate.attempt(&rest(), &stats(100.0), retry_at).unwrap_err();
        match err {
            EngineError::OnCooldown { kind, remaining } => {
                assert_eq!(kind, ActivityKind::Rest);
                assert_eq!(remaining, Duration::minutes(50));
            }
            other => panic!("expected OnCooldown, got {other:?}"),
        }
    }

    #[test]
    fn attempt_after_window_is_admitted() {
        let mut gate = gate();
        let now = Utc::now();
        gate.attempt(&rest(), &stats(100.0), now).expect("admitted");
        let later = now + Duration::minutes(60);
        assert!(gate.attempt(&rest(), &stats(100.0), later).is_ok());
    }

    #[test]
    fn cooldown_clocks_are_per_kind() {
        let mut gate = gate();
        let now = Utc::now();
        gate.attempt(&rest(), &stats(100.0), now).expect("admitted");
        // Rest is cooling down, but play has its own clock.
        assert!(gate.attempt(&play(2.0), &stats(100.0), now).is_ok());
    }

    #[test]
    fn insufficient_energy_is_rejected_without_stamping() {
        let mut gate = gate();
        let now = Utc::now();
        let err = gate.attempt(&play(5.0), &stats(3.0), now).unwrap_err();
        assert!(matches!(
            err,
            EngineError::InsufficientEnergy { required, available }
                if required == 5.0 && available == 3.0
        ));
        // Rejection did not consume the cooldown clock.
        assert!(gate.attempt(&play(5.0), &stats(100.0), now).is_ok());
    }

    #[test]
    fn admission_is_a_pure_function_of_its_inputs() {
        let mut gate = gate();
        let now = Utc::now();
        gate.attempt(&rest(), &stats(100.0), now).expect("admitted");

        let probe = now + Duration::minutes(30);
        for _ in 0..5 {
            let first = gate.would_admit(&rest(), &stats(100.0), probe);
            let second = gate.would_admit(&rest(), &stats(100.0), probe);
            assert_eq!(first.is_err(), second.is_err());
        }
    }

    #[test]
    fn delta_subtracts_energy_cost() {
        let delta = play(2.0).stat_delta();
        assert_eq!(delta.energy, -2.0);
        assert_eq!(delta.happiness, 3.0);
        assert_eq!(delta.empathy, 1.0);
        assert_eq!(delta.wisdom, 0.0);
    }

    #[test]
    fn flavor_comes_from_the_kind_pool() {
        let mut rng = rand::thread_rng();
        for _ in 0..20 {
            let word = flavor_emotion(ActivityKind::Learn, &mut rng);
            assert!(ActivityKind::Learn.flavor_pool().contains(&word));
        }
    }
}
