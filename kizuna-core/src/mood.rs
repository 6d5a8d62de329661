//! Mood classification and response tone.
//!
//! One deterministic rule maps a stat delta to a mood label. The activity
//! gate and the exercise session manager both derive their emotional
//! labels from this rule; keeping a single implementation is a
//! correctness requirement, not a style preference.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::StatDelta;

/// The companion's inferred emotional state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mood {
    /// Strongly positive (total impact ≥ 10).
    VeryHappy,
    /// Positive (total impact ≥ 5).
    Happy,
    /// Neutral-positive (total impact ≥ 0).
    Content,
    /// Mildly depleted (total impact ≥ -5).
    Tired,
    /// Strongly depleted (total impact < -5).
    Exhausted,
    /// Initial state before any classification has run.
    Neutral,
}

impl Mood {
    /// Classify a stat delta into a mood label.
    ///
    /// The thresholds are fixed: the sum of all delta fields is compared
    /// against 10 / 5 / 0 / -5 in order.
    #[must_use]
    pub fn classify(delta: &StatDelta) -> Self {
        let total = delta.total();
        if total >= 10.0 {
            Self::VeryHappy
        } else if total >= 5.0 {
            Self::Happy
        } else if total >= 0.0 {
            Self::Content
        } else if total >= -5.0 {
            Self::Tired
        } else {
            Self::Exhausted
        }
    }

    /// The tone the companion should respond with in this mood.
    #[must_use]
    pub fn tone(self) -> Tone {
        match self {
            Self::VeryHappy => Tone::Enthusiastic,
            Self::Happy => Tone::Cheerful,
            Self::Content | Self::Neutral => Tone::Balanced,
            Self::Tired => Tone::Gentle,
            Self::Exhausted => Tone::Soothing,
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Self::Neutral
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::VeryHappy => write!(f, "very happy"),
            Self::Happy => write!(f, "happy"),
            Self::Content => write!(f, "content"),
            Self::Tired => write!(f, "tired"),
            Self::Exhausted => write!(f, "exhausted"),
            Self::Neutral => write!(f, "neutral"),
        }
    }
}

impl FromStr for Mood {
    type Err = UnknownMood;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "very happy" | "very_happy" => Ok(Self::VeryHappy),
            "happy" => Ok(Self::Happy),
            "content" => Ok(Self::Content),
            "tired" => Ok(Self::Tired),
            "exhausted" => Ok(Self::Exhausted),
            "neutral" => Ok(Self::Neutral),
            _ => Err(UnknownMood(s.to_string())),
        }
    }
}

/// Error returned when parsing an unrecognized mood label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownMood(pub String);

impl fmt::Display for UnknownMood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown mood label: {}", self.0)
    }
}

impl std::error::Error for UnknownMood {}

/// Response tone, looked up from the current mood.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    /// High-energy, celebratory.
    Enthusiastic,
    /// Upbeat and light.
    Cheerful,
    /// Even, steady (the fallback tone).
    Balanced,
    /// Soft and unhurried.
    Gentle,
    /// Calming, restorative.
    Soothing,
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enthusiastic => write!(f, "enthusiastic"),
            Self::Cheerful => write!(f, "cheerful"),
            Self::Balanced => write!(f, "balanced"),
            Self::Gentle => write!(f, "gentle"),
            Self::Soothing => write!(f, "soothing"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn delta(total: f32) -> StatDelta {
        StatDelta {
            happiness: total,
            ..Default::default()
        }
    }

    #[test]
    fn classification_thresholds() {
        assert_eq!(Mood::classify(&delta(12.0)), Mood::VeryHappy);
        assert_eq!(Mood::classify(&delta(10.0)), Mood::VeryHappy);
        assert_eq!(Mood::classify(&delta(9.9)), Mood::Happy);
        assert_eq!(Mood::classify(&delta(5.0)), Mood::Happy);
        assert_eq!(Mood::classify(&delta(0.0)), Mood::Content);
        assert_eq!(Mood::classify(&delta(-0.1)), Mood::Tired);
        assert_eq!(Mood::classify(&delta(-5.0)), Mood::Tired);
        assert_eq!(Mood::classify(&delta(-5.1)), Mood::Exhausted);
    }

    #[test]
    fn classification_sums_all_fields() {
        // wisdom 3 + empathy 2 + energy 8 + happiness -3 = 10
        let mixed = StatDelta {
            wisdom: 3.0,
            empathy: 2.0,
            energy: 8.0,
            happiness: -3.0,
        };
        assert_eq!(Mood::classify(&mixed), Mood::VeryHappy);
    }

    #[test]
    fn tone_lookup_is_total() {
        assert_eq!(Mood::VeryHappy.tone(), Tone::Enthusiastic);
        assert_eq!(Mood::Happy.tone(), Tone::Cheerful);
        assert_eq!(Mood::Content.tone(), Tone::Balanced);
        assert_eq!(Mood::Tired.tone(), Tone::Gentle);
        assert_eq!(Mood::Exhausted.tone(), Tone::Soothing);
        // Unclassified state falls back to balanced.
        assert_eq!(Mood::Neutral.tone(), Tone::Balanced);
    }

    #[test]
    fn mood_round_trips_through_labels() {
        for mood in [
            Mood::VeryHappy,
            Mood::Happy,
            Mood::Content,
            Mood::Tired,
            Mood::Exhausted,
            Mood::Neutral,
        ] {
            let label = mood.to_string();
            assert_eq!(label.parse::<Mood>().expect("parse"), mood);
        }
        assert!("melancholy".parse::<Mood>().is_err());
    }
}
