//! # Sifter - Tabular Dataset Analytics Engine
//!
//! Sifter holds one tabular dataset per session and answers analytical
//! requests against it: profiling, cleaning, filtering, predictive insights,
//! 3D projections and report exports.
//!
//! ## Quick Start
//!
//! ```no_run
//! use sifter::analyser::lifecycle::{Mutation, SessionStore};
//! use sifter::analyser::logic::CleanRequest;
//!
//! # async fn example() -> sifter::error::Result<()> {
//! let store = SessionStore::default();
//! let version = store.load(std::fs::read("data.csv")?).await?;
//! println!("quality score: {:.1}", version.stats.quality_score);
//!
//! let request = CleanRequest { handle_missing: true, ..CleanRequest::default() };
//! let outcome = store.mutate(Mutation::Clean(request)).await?;
//! println!("{}", outcome.log.join("\n"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`analyser`]: Data analysis and dataset versioning
//!   - [`analyser::logic`]: Pure algorithms (inference, profiling, cleaning,
//!     filtering, clustering, projections)
//!   - [`analyser::lifecycle`]: The session store and its version records
//! - [`commands`]: Request handlers shared by the CLI and the `serve` loop
//! - [`export`]: CSV, Excel and PDF renderers
//! - [`ai`]: Narration of profiles through a pluggable [`ai::Narrator`]
//! - [`config`]: JSON configuration with environment overrides
//! - [`logging`]: `tracing` subscriber setup
//! - [`error`]: Error types and handling utilities
//!
//! ## Immutable Versions
//!
//! Every upload, cleaning request and transformation produces a new
//! [`analyser::lifecycle::DatasetVersion`]. Versions are never modified, so a
//! reader holding one keeps a consistent view while writers commit newer ones.

#![warn(clippy::all, rust_2018_idioms)]

pub mod ai;
pub mod analyser;
pub mod commands;
pub mod config;
pub mod error;
pub mod export;
pub mod logging;
pub mod utils;
