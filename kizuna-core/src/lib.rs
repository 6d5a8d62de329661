//! # Kizuna Core
//!
//! The companion state engine behind the Kizuna virtual-companion app.
//! A user interacts with a persistent companion through chat, mood
//! tracking, and structured CBT-style exercises; the companion's stats,
//! personality traits, and evolution stage change over time under
//! rule-governed policies:
//!
//! - **Memory** — bounded FIFO short-term buffer + delegated long-term
//!   store with importance-weighted pinning
//! - **Activities** — cooldown- and energy-gated, with per-type clocks
//! - **Exercises** — timed multi-step sessions scored on engagement and
//!   pacing, one active at a time
//! - **Evolution** — multi-criterion stage thresholds, monotonic
//! - **Traits** — stage- and stat-gated unlocks with cultural seasoning
//!
//! The engine is single-session, single-writer: wrap a
//! [`CompanionEngine`] in `Arc<tokio::sync::Mutex<_>>` and every
//! admission check plus its state mutation is atomic, including the
//! exercise timeout watchdog. Text generation, speech synthesis, and
//! the long-term store are injected collaborators behind async traits —
//! the engine never blocks its own transitions on their completion, and
//! their failures never corrupt engine state.

#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_precision_loss)]

pub mod activity;
pub mod catalog;
pub mod collab;
pub mod config;
pub mod engine;
pub mod error;
pub mod evolution;
pub mod exercise;
pub mod memory;
pub mod mood;
pub mod personality;
pub mod types;

pub use config::CompanionConfig;
pub use engine::{ActivityOutcome, ChatReply, CompanionEngine, spawn_timeout_watch};
pub use error::EngineError;
pub use memory::{Memory, MemoryKind, ScoredMemory};
pub use mood::{Mood, Tone};
pub use types::*;
