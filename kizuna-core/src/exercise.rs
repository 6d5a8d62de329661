//! Exercise session manager — a timed, multi-step state machine for
//! structured CBT-style exercises.
//!
//! State machine: `Idle -> InProgress -> {Completed, TimedOut,
//! Cancelled}`. Exactly one session may be in progress per companion;
//! starting another fails instead of silently replacing it. The timeout
//! transition comes from a poll (`tick`) that the engine serializes
//! against user-driven submissions: whichever transition is applied
//! first wins, the other finds no active session and is a no-op.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::ExerciseConfig;
use crate::error::{EngineError, Result};
use crate::mood::Mood;
use crate::types::{Stat, StatDelta, StatRequirements, Stats};

/// Categories of structured exercises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseKind {
    /// Identify and challenge negative thought patterns.
    ThoughtRestructuring,
    /// Present-moment awareness practice.
    MindfulnessExercise,
    /// Scheduling mood-lifting activity.
    BehavioralActivation,
    /// Guided relaxation.
    RelaxationTechnique,
    /// Understanding and managing emotional responses.
    EmotionalRegulation,
    /// Structured problem-solving.
    ProblemSolving,
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ThoughtRestructuring => write!(f, "thought restructuring"),
            Self::MindfulnessExercise => write!(f, "mindfulness"),
            Self::BehavioralActivation => write!(f, "behavioral activation"),
            Self::RelaxationTechnique => write!(f, "relaxation"),
            Self::EmotionalRegulation => write!(f, "emotional regulation"),
            Self::ProblemSolving => write!(f, "problem solving"),
        }
    }
}

/// One (stat, impact) pair awarded on completion, scaled by quality.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Outcome {
    /// Which stat the exercise develops.
    pub stat: Stat,
    /// Full-quality impact on that stat.
    pub impact: f32,
}

/// A structured, multi-step exercise definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    /// Stable catalog id (slug).
    pub id: String,
    /// Exercise category.
    pub kind: ExerciseKind,
    /// Difficulty, 1 (gentle) to 3 (deep).
    pub difficulty: u8,
    /// Time limit in minutes.
    pub duration_mins: u32,
    /// What the exercise aims to build.
    pub objective: String,
    /// Ordered instruction steps the user responds to.
    pub instructions: Vec<String>,
    /// Stat minimums required to attempt.
    #[serde(default)]
    pub required_stats: StatRequirements,
    /// Stat impacts awarded on completion.
    pub outcomes: Vec<Outcome>,
}

impl Exercise {
    /// The session time limit as a duration.
    #[must_use]
    pub fn time_limit(&self) -> Duration {
        Duration::minutes(i64::from(self.duration_mins))
    }
}

/// One recorded step: the user's response and how long the step took.
#[derive(Debug, Clone)]
pub struct StepResponse {
    /// What the user wrote.
    pub text: String,
    /// Time elapsed since the previous step (or session start).
    pub elapsed: Duration,
}

// ---------------------------------------------------------------------------
// Active session
// ---------------------------------------------------------------------------

/// A session in progress. Exists only between `start` and a terminal
/// transition; destroyed on completion, timeout, or cancellation.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    exercise: Exercise,
    started_at: DateTime<Utc>,
    responses: Vec<StepResponse>,
}

impl ActiveSession {
    /// The zero-based index of the step awaiting a response.
    #[must_use]
    pub fn current_step(&self) -> usize {
        self.responses.len()
    }

    /// Total time elapsed since the session started.
    #[must_use]
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.started_at
    }

    /// Completion progress as a percentage of steps answered.
    #[must_use]
    pub fn progress_percent(&self) -> u8 {
        if self.exercise.instructions.is_empty() {
            return 100;
        }
        let pct = self.responses.len() * 100 / self.exercise.instructions.len();
        pct.min(100) as u8
    }

    /// The exercise being run.
    #[must_use]
    pub fn exercise(&self) -> &Exercise {
        &self.exercise
    }
}

/// Result of submitting a step response.
#[derive(Debug)]
pub enum StepOutcome {
    /// More steps remain; the session stays in progress.
    InProgress {
        /// Index of the next step awaiting a response.
        next_step: usize,
    },
    /// That was the last step; the session completed and was scored.
    Finished(ScoredSession),
}

/// A terminal session with its computed score and effects.
#[derive(Debug, Clone)]
pub struct ScoredSession {
    /// Which exercise was run.
    pub exercise_id: String,
    /// Exercise category.
    pub kind: ExerciseKind,
    /// All step responses in order.
    pub responses: Vec<String>,
    /// Completion quality, 0–100.
    pub quality: f32,
    /// Stat changes to apply, scaled by quality.
    pub delta: StatDelta,
    /// Total session time.
    pub elapsed: Duration,
    /// Whether the session ended by timeout rather than completion.
    pub timed_out: bool,
    /// Qualitative observations about the session.
    pub insights: Vec<String>,
    /// Mood implied by the stat changes.
    pub mood_after: Mood,
}

/// Final report returned to the caller, combining the scored session
/// with the mood context the engine captured around it.
#[derive(Debug, Clone)]
pub struct ExerciseReport {
    /// False when the session timed out.
    pub completed: bool,
    /// All step responses in order.
    pub responses: Vec<String>,
    /// Mood before the stat changes were applied.
    pub mood_before: Mood,
    /// Mood after the stat changes were applied.
    pub mood_after: Mood,
    /// Stat changes that were applied.
    pub delta: StatDelta,
    /// Completion quality, 0–100.
    pub quality: f32,
    /// Qualitative observations about the session.
    pub insights: Vec<String>,
}

// ---------------------------------------------------------------------------
// Session manager
// ---------------------------------------------------------------------------

/// Drives the exercise state machine. At most one active session.
#[derive(Debug)]
pub struct SessionManager {
    active: Option<ActiveSession>,
    config: ExerciseConfig,
}

impl SessionManager {
    /// Create an idle manager.
    #[must_use]
    pub fn new(config: ExerciseConfig) -> Self {
        Self {
            active: None,
            config,
        }
    }

    /// Whether a session is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The session in progress, if any.
    #[must_use]
    pub fn active(&self) -> Option<&ActiveSession> {
        self.active.as_ref()
    }

    /// Open a session for `exercise`.
    ///
    /// # Errors
    /// `SessionAlreadyActive` if a session is in progress (the original
    /// session is untouched), or `Ineligible` if `stats` miss the
    /// exercise's minimums.
    pub fn start(&mut self, exercise: Exercise, stats: &Stats, now: DateTime<Utc>) -> Result<()> {
        if self.active.is_some() {
            return Err(EngineError::SessionAlreadyActive);
        }
        let missing = stats.unmet(&exercise.required_stats);
        if !missing.is_empty() {
            return Err(EngineError::Ineligible {
                exercise: exercise.id,
                missing,
            });
        }
        tracing::debug!(exercise = %exercise.id, kind = %exercise.kind, "exercise session started");
        self.active = Some(ActiveSession {
            exercise,
            started_at: now,
            responses: Vec::new(),
        });
        Ok(())
    }

    /// Record a step response. Completes and scores the session when the
    /// last step is answered.
    ///
    /// # Errors
    /// `NoActiveSession` if nothing is in progress.
    pub fn submit_step(&mut self, response: &str, now: DateTime<Utc>) -> Result<StepOutcome> {
        let session = self.active.as_mut().ok_or(EngineError::NoActiveSession)?;

        let answered = session
            .responses
            .iter()
            .fold(Duration::zero(), |acc, r| acc + r.elapsed);
        let step_elapsed = (now - session.started_at) - answered;
        session.responses.push(StepResponse {
            text: response.to_string(),
            elapsed: step_elapsed,
        });

        if session.responses.len() >= session.exercise.instructions.len() {
            let session = self.active.take().expect("session checked above");
            let scored = score(session, now, false, &self.config);
            return Ok(StepOutcome::Finished(scored));
        }

        let next_step = session.current_step();
        Ok(StepOutcome::InProgress { next_step })
    }

    /// Timeout poll. Returns a scored session when the time limit has
    /// been reached; a no-op otherwise (including when no session is
    /// active — the other transition won).
    pub fn tick(&mut self, now: DateTime<Utc>) -> Option<ScoredSession> {
        let session = self.active.as_ref()?;
        if session.elapsed(now) < session.exercise.time_limit() {
            return None;
        }
        let session = self.active.take().expect("session checked above");
        tracing::debug!(exercise = %session.exercise.id, "exercise session timed out");
        Some(score(session, now, true, &self.config))
    }

    /// Discard the active session without scoring or stat changes.
    ///
    /// # Errors
    /// `NoActiveSession` if nothing is in progress.
    pub fn cancel(&mut self) -> Result<()> {
        let session = self.active.take().ok_or(EngineError::NoActiveSession)?;
        tracing::debug!(exercise = %session.exercise.id, "exercise session cancelled");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score a terminal session.
///
/// `response_quality` is a length-based engagement proxy averaged over
/// the exercise's step count; `time_quality` rewards using the allotted
/// time; both are blended by the configured weights into a 0–100 score
/// that scales each outcome impact.
fn score(
    session: ActiveSession,
    now: DateTime<Utc>,
    timed_out: bool,
    config: &ExerciseConfig,
) -> ScoredSession {
    let exercise = &session.exercise;
    let step_count = exercise.instructions.len().max(1);
    let target = config.response_target_chars.max(1) as f32;

    let response_quality: f32 = session
        .responses
        .iter()
        .map(|r| (r.text.len() as f32 / target).min(1.0))
        .sum::<f32>()
        / step_count as f32;

    let elapsed = session.elapsed(now);
    let limit_secs = exercise.time_limit().num_seconds().max(1) as f32;
    let time_quality = (elapsed.num_seconds() as f32 / limit_secs).min(1.0);

    let quality = ((response_quality * config.response_weight
        + time_quality * config.time_weight)
        * 100.0)
        .clamp(0.0, 100.0);

    let mut delta = StatDelta::default();
    for outcome in &exercise.outcomes {
        delta.add(outcome.stat, (outcome.impact * quality / 100.0).round());
    }

    let mood_after = Mood::classify(&delta);
    let insights = build_insights(&session, quality, timed_out, config);

    tracing::debug!(
        exercise = %exercise.id,
        quality,
        timed_out,
        "exercise session scored"
    );

    ScoredSession {
        exercise_id: exercise.id.clone(),
        kind: exercise.kind,
        responses: session.responses.iter().map(|r| r.text.clone()).collect(),
        quality,
        delta,
        elapsed,
        timed_out,
        insights,
        mood_after,
    }
}

/// Qualitative observations derived from the score and pacing.
fn build_insights(
    session: &ActiveSession,
    quality: f32,
    timed_out: bool,
    config: &ExerciseConfig,
) -> Vec<String> {
    let mut insights = Vec::new();

    if timed_out {
        insights.push("Exercise was not completed within the time limit".to_string());
    }

    if quality >= 90.0 {
        insights.push("Showed exceptional engagement and thoughtfulness".to_string());
    } else if quality >= 70.0 {
        insights.push("Demonstrated good understanding and effort".to_string());
    } else if quality >= 50.0 {
        insights.push("Completed the exercise with moderate engagement".to_string());
    } else {
        insights.push("Could benefit from more detailed responses".to_string());
    }

    if !session.responses.is_empty() {
        let total_secs: i64 = session
            .responses
            .iter()
            .map(|r| r.elapsed.num_seconds())
            .sum();
        let avg_secs = total_secs as f32 / session.responses.len() as f32;
        if avg_secs < config.brisk_step_secs {
            insights.push("Consider taking more time to reflect on each step".to_string());
        } else if avg_secs > config.slow_step_secs {
            insights.push("Shows deep reflection and consideration".to_string());
        }
    }

    insights
}
