// spd-common/src/lib.rs
pub mod config;
pub mod credentials;
pub mod error;
pub mod model;

// Re-export key types
pub use config::Settings;
pub use credentials::CredentialContext;
pub use error::{Result, SpdError};
pub use model::{AttemptResult, AttemptSpec, CredentialRequirement, OutputFormat};
