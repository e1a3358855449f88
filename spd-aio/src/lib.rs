// spd-aio/src/lib.rs
//! Blocking IO for spd (processes, filesystem scans, archives, workspace housekeeping)

pub mod fs;
pub mod pack;
pub mod process;
pub mod sweep;
pub mod workspace;

pub use fs::collect_audio_files;
pub use pack::zip_folder;
pub use process::{run_command_sync, CommandRunner, ProcessOutput, SystemRunner};
pub use sweep::{start_sweeper, sweep_stale};
pub use workspace::JobWorkspace;
