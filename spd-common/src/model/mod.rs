// spd-common/src/model/mod.rs
pub mod attempt;
pub mod format;

// Re-export
pub use attempt::{AttemptResult, AttemptSpec, CredentialRequirement};
pub use format::OutputFormat;
