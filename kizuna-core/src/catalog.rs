//! Built-in catalog data: activities, exercises, and personality traits.
//!
//! Catalog entries are immutable definitions the engine resolves by id.
//! Deployments can ship their own catalogs; these defaults cover the
//! kitsune companion content.

use crate::activity::{Activity, ActivityKind, Rewards};
use crate::exercise::{Exercise, ExerciseKind, Outcome};
use crate::types::{
    CulturalElement, CulturalElementKind, EvolutionStage, PersonalityTrait, Stat,
    StatRequirements,
};

/// The built-in simple activities.
#[must_use]
pub fn default_activities() -> Vec<Activity> {
    vec![
        Activity {
            id: "play-catch".to_string(),
            kind: ActivityKind::Play,
            name: "Play Catch".to_string(),
            description: "A fun game of catch that builds coordination and trust.".to_string(),
            duration_mins: 10,
            energy_cost: 2.0,
            rewards: Rewards {
                happiness: 3.0,
                empathy: 1.0,
                relationship_points: 2,
                ..Default::default()
            },
        },
        Activity {
            id: "meditation".to_string(),
            kind: ActivityKind::Learn,
            name: "Meditation Session".to_string(),
            description: "A peaceful meditation session to develop mindfulness.".to_string(),
            duration_mins: 15,
            energy_cost: 1.0,
            rewards: Rewards {
                wisdom: 3.0,
                empathy: 2.0,
                happiness: 1.0,
                relationship_points: 1,
                ..Default::default()
            },
        },
        Activity {
            id: "spirit-food".to_string(),
            kind: ActivityKind::Feed,
            name: "Spirit Food".to_string(),
            description: "Nourishing spiritual food that restores energy.".to_string(),
            duration_mins: 5,
            energy_cost: 0.0,
            rewards: Rewards {
                energy: 5.0,
                happiness: 2.0,
                relationship_points: 1,
                ..Default::default()
            },
        },
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
        },
    ]
}

/// The built-in structured exercises.
#[must_use]
pub fn default_exercises() -> Vec<Exercise> {
    vec![
        Exercise {
            id: "thought-journal".to_string(),
            kind: ExerciseKind::ThoughtRestructuring,
            difficulty: 1,
            duration_mins: 10,
            objective: "Identify and challenge negative thought patterns".to_string(),
            instructions: vec![
                "Write down a troubling thought or situation".to_string(),
                "Identify the emotions you feel".to_string(),
                "List evidence for and against this thought".to_string(),
                "Create a balanced perspective".to_string(),
            ],
            required_stats: StatRequirements {
                wisdom: Some(10.0),
                empathy: Some(5.0),
                ..Default::default()
            },
            outcomes: vec![
                Outcome {
                    stat: Stat::Wisdom,
                    impact: 3.0,
                },
                Outcome {
                    stat: Stat::Empathy,
                    impact: 2.0,
                },
            ],
        },
        Exercise {
            id: "mindful-breathing".to_string(),
            kind: ExerciseKind::MindfulnessExercise,
            difficulty: 1,
            duration_mins: 5,
            objective: "Develop present-moment awareness through breath focus".to_string(),
            instructions: vec![
                "Find a comfortable position".to_string(),
                "Focus on your natural breath".to_string(),
                "Notice when your mind wanders".to_string(),
                "Gently return focus to breathing".to_string(),
            ],
            required_stats: StatRequirements {
                energy: Some(20.0),
                ..Default::default()
            },
            outcomes: vec![
                Outcome {
                    stat: Stat::Wisdom,
                    impact: 2.0,
                },
                Outcome {
                    stat: Stat::Energy,
                    impact: 5.0,
                },
                Outcome {
                    stat: Stat::Happiness,
                    impact: 3.0,
                },
            ],
        },
        Exercise {
            id: "emotion-regulation".to_string(),
            kind: ExerciseKind::EmotionalRegulation,
            difficulty: 2,
            duration_mins: 15,
            objective: "Learn to manage and understand emotional responses".to_string(),
            instructions: vec![
                "Identify current emotional state".to_string(),
                "Rate intensity of emotions".to_string(),
                "Apply coping strategies".to_string(),
                "Reflect on effectiveness".to_string(),
            ],
            required_stats: StatRequirements {
                wisdom: Some(20.0),
                empathy: Some(15.0),
                ..Default::default()
            },
            outcomes: vec![
                Outcome {
                    stat: Stat::Empathy,
                    impact: 4.0,
                },
                Outcome {
                    stat: Stat::Happiness,
                    impact: 3.0,
                },
            ],
        },
    ]
}

/// The built-in kitsune trait catalog.
///
/// Every trait name referenced by the default evolution tiers exists
/// here, at a stage below the tier that requires it.
#[must_use]
pub fn default_traits() -> Vec<PersonalityTrait> {
    vec![
        PersonalityTrait {
            id: "wisdom-seeker".to_string(),
            name: "Wisdom Seeker".to_string(),
            description: "Always eager to learn and understand deeper truths".to_string(),
            stage: EvolutionStage::One,
            required_stats: StatRequirements {
                wisdom: Some(2.0),
                ..Default::default()
            },
            cultural_elements: vec![
                CulturalElement {
                    kind: CulturalElementKind::Symbol,
                    name: "Scroll".to_string(),
                    description: "Ancient knowledge and wisdom".to_string(),
                },
                CulturalElement {
                    kind: CulturalElementKind::Value,
                    name: "Pursuit of Knowledge".to_string(),
                    description: "The endless journey of learning".to_string(),
                },
            ],
        },
        PersonalityTrait {
            id: "basic-empathy".to_string(),
            name: "Basic Empathy".to_string(),
            description: "Understanding and sharing feelings of others".to_string(),
            stage: EvolutionStage::One,
            required_stats: StatRequirements {
                empathy: Some(2.0),
                ..Default::default()
            },
            cultural_elements: vec![CulturalElement {
                kind: CulturalElementKind::Story,
                name: "The Kind Fox".to_string(),
                description: "Tale of a fox helping lost travelers".to_string(),
            }],
        },
        PersonalityTrait {
            id: "curiosity".to_string(),
            name: "Curiosity".to_string(),
            description: "Delight in exploring the unfamiliar".to_string(),
            stage: EvolutionStage::One,
            required_stats: StatRequirements {
                wisdom: Some(5.0),
                ..Default::default()
            },
            cultural_elements: vec![CulturalElement {
                kind: CulturalElementKind::Symbol,
                name: "Fox Fire".to_string(),
                description: "Wandering lights that lead to hidden places".to_string(),
            }],
        },
        PersonalityTrait {
            id: "enhanced-empathy".to_string(),
            name: "Enhanced Empathy".to_string(),
            description: "Deep emotional connection and understanding".to_string(),
            stage: EvolutionStage::Two,
            required_stats: StatRequirements {
                empathy: Some(5.0),
                wisdom: Some(2.0),
                ..Default::default()
            },
            cultural_elements: vec![CulturalElement {
                kind: CulturalElementKind::Value,
                name: "Emotional Harmony".to_string(),
                description: "Balance between heart and mind".to_string(),
            }],
        },
        PersonalityTrait {
            id: "spiritual-connection".to_string(),
            name: "Spiritual Connection".to_string(),
            description: "Attunement to the unseen threads between beings".to_string(),
            stage: EvolutionStage::Two,
            required_stats: StatRequirements {
                wisdom: Some(20.0),
                empathy: Some(20.0),
                ..Default::default()
            },
            cultural_elements: vec![
                CulturalElement {
                    kind: CulturalElementKind::Symbol,
                    name: "Torii Gate".to_string(),
                    description: "The threshold between worlds".to_string(),
                },
                CulturalElement {
                    kind: CulturalElementKind::Value,
                    name: "Quiet Reverence".to_string(),
                    description: "Honoring what cannot be seen".to_string(),
                },
            ],
        },
    ]
}

/// Find a built-in activity by id.
#[must_use]
pub fn find_activity(id: &str) -> Option<Activity> {
    default_activities().into_iter().find(|a| a.id == id)
}

/// Find a built-in exercise by id.
#[must_use]
pub fn find_exercise(id: &str) -> Option<Exercise> {
    default_exercises().into_iter().find(|e| e.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvolutionConfig;

    #[test]
    fn catalog_ids_are_unique() {
        let activities = default_activities();
        let mut ids: Vec<&str> = activities.iter().map(|a| a.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), activities.len());

        let traits = default_traits();
        let mut ids: Vec<&str> = traits.iter().map(|t| t.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), traits.len());
    }

    #[test]
    fn evolution_requirements_are_satisfiable_from_the_catalog() {
        let traits = default_traits();
        let tiers = EvolutionConfig::default();

        for name in &tiers.stage1_to_2.required_traits {
            let entry = traits
                .iter()
                .find(|t| &t.name == name)
                .unwrap_or_else(|| panic!("tier requires unknown trait {name}"));
            // Must be unlockable before leaving stage one.
            assert_eq!(entry.stage, EvolutionStage::One);
        }

        for name in &tiers.stage2_to_3.required_traits {
            let entry = traits
                .iter()
                .find(|t| &t.name == name)
                .unwrap_or_else(|| panic!("tier requires unknown trait {name}"));
            // Must be unlockable before leaving stage two.
            assert!(entry.stage <= EvolutionStage::Two);
        }
    }

    #[test]
    fn every_exercise_has_steps_and_outcomes() {
        for exercise in default_exercises() {
            assert!(!exercise.instructions.is_empty());
            assert!(!exercise.outcomes.is_empty());
            assert!((1..=3).contains(&exercise.difficulty));
            assert!(exercise.duration_mins > 0);
        }
    }

    #[test]
    fn lookups_resolve_known_ids() {
        assert!(find_activity("peaceful-rest").is_some());
        assert!(find_activity("midnight-howl").is_none());
        assert!(find_exercise("thought-journal").is_some());
    }
}
