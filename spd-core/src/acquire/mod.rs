//! The acquisition fallback engine.
//!
//! Attempts run strictly one after another: every attempt writes into the same
//! output directory and success is judged by rescanning it.

pub mod classify;
pub mod direct;
pub mod engine;
pub mod extract;
pub mod fetch;
pub mod planner;

pub use classify::{classify, Classification};
pub use direct::DirectFetcher;
pub use engine::AcquisitionEngine;
pub use extract::extract_reference;
pub use fetch::FetchToolAdapter;
pub use planner::{normalize_target, AttemptPlanner};

/// Extension of the canonical intermediate format every acquisition path produces.
pub const ACQUISITION_EXTENSIONS: &[&str] = &["mp3"];
