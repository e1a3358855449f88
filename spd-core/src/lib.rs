// spd-core/src/lib.rs

pub mod acquire;
pub mod bootstrap;
pub mod job;
pub mod tools;
pub mod transcode;

pub use acquire::{AcquisitionEngine, AttemptPlanner, Classification};
pub use job::{parse_target_list, Deliverable, JobContext, JobRequest};
pub use tools::ToolInvocation;
