use std::path::{Path, PathBuf};

use spd_aio::{collect_audio_files, CommandRunner};
use spd_common::model::{AttemptResult, AttemptSpec};
use tracing::info;

use super::ACQUISITION_EXTENSIONS;

/// Runs planned attempts and scans the shared output directory afterwards.
pub struct FetchToolAdapter<'a> {
    runner: &'a dyn CommandRunner,
    output_dir: PathBuf,
}

impl<'a> FetchToolAdapter<'a> {
    pub fn new(runner: &'a dyn CommandRunner, output_dir: &Path) -> Self {
        Self {
            runner,
            output_dir: output_dir.to_path_buf(),
        }
    }

    /// Never fails: a non-zero exit is the normal signal to move on to the next attempt.
    pub fn run(&self, spec: &AttemptSpec) -> AttemptResult {
        info!("[{}] running fetch tool", spec.label);
        let output = self.runner.run(&spec.label, &spec.command);
        let produced_files = collect_audio_files(&self.output_dir, ACQUISITION_EXTENSIONS);
        info!(
            "[{}] exit code {}, {} file(s) in output dir",
            spec.label,
            output.exit_code,
            produced_files.len()
        );
        AttemptResult {
            exit_code: output.exit_code,
            combined_output: output.combined_output,
            produced_files,
        }
    }
}
