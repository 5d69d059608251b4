//! AI module for sifter.
//!
//! This module contains the narration boundary used to turn dataset
//! profiles into prose, and the OpenAI-backed implementation of it.

pub mod client;

pub use client::{AIAssistant, Narrator, OfflineNarrator, build_narrator};
