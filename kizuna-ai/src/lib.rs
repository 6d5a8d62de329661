//! # kizuna-ai — External Collaborators for Kizuna
//!
//! HTTP-backed implementations of the engine's collaborator seams:
//!
//! - **Text generation** — OpenAI-compatible or Ollama chat endpoints,
//!   with bounded retries and per-request timeouts
//! - **Speech synthesis** — OpenAI-compatible `/v1/audio/speech`
//! - **Long-term memory store** — a remote document/vector store
//!   (persist / similarity query / retention purge)
//!
//! The engine treats every one of these as an opaque async capability:
//! failures surface as `CollabError` and degrade the single call that
//! triggered them, never engine state. All prompt shaping lives here —
//! the core engine hands over a `GenerationContext` and gets text back.

#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod prompt;
pub mod speech;
pub mod store;

pub use client::{TextClient, TextProvider};
pub use error::AiError;
pub use speech::SpeechClient;
pub use store::RemoteStoreClient;
