// spd-core/src/acquire/engine.rs
use std::path::{Path, PathBuf};

use spd_aio::CommandRunner;
use spd_common::credentials::CredentialContext;
use spd_common::error::{Result, SpdError};
use spd_common::model::{AttemptResult, AttemptSpec};
use spd_common::Settings;
use tracing::{debug, info, instrument, warn};

use super::classify::{classify, Classification};
use super::direct::DirectFetcher;
use super::extract::extract_reference;
use super::fetch::FetchToolAdapter;
use super::planner::{normalize_target, AttemptPlanner};
use crate::tools::ToolInvocation;

/// Drives the fallback chain for one request.
///
/// The first attempt, in plan order, that leaves any audio behind wins. Results are
/// never compared for quality.
pub struct AcquisitionEngine<'a> {
    runner: &'a dyn CommandRunner,
    credentials: &'a CredentialContext,
    fetch_tool: ToolInvocation,
    direct_tool: ToolInvocation,
    bitrate: String,
    threads: u32,
}

impl<'a> AcquisitionEngine<'a> {
    pub fn new(
        settings: &Settings,
        credentials: &'a CredentialContext,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            runner,
            credentials,
            fetch_tool: ToolInvocation::spotdl(settings),
            direct_tool: ToolInvocation::yt_dlp(settings),
            bitrate: settings.bitrate.clone(),
            threads: settings.threads,
        }
    }

    /// Acquires audio for `targets` into `output_dir`.
    ///
    /// Individual attempt failures are only collected; the caller sees a single
    /// `Acquisition` error carrying every attempt's diagnostics.
    #[instrument(skip_all, fields(targets = targets.len()))]
    pub fn acquire(&self, targets: &[String], output_dir: &Path) -> Result<Vec<PathBuf>> {
        if targets.iter().all(|t| normalize_target(t).is_empty()) {
            return Err(SpdError::InvalidInput("No URLs provided.".to_string()));
        }

        let planner = AttemptPlanner::new(
            self.fetch_tool.clone(),
            output_dir,
            &self.bitrate,
            self.threads,
        );
        let plan = planner.plan(self.credentials, targets);
        let fetch = FetchToolAdapter::new(self.runner, output_dir);
        let direct = DirectFetcher::new(self.runner, self.direct_tool.clone(), self.credentials);

        let mut collected_references: Vec<String> = Vec::new();
        let mut errors: Vec<String> = Vec::new();

        for (index, spec) in plan.iter().enumerate() {
            debug!("Attempt {}/{}: {}", index + 1, plan.len(), spec.label);
            let result = fetch.run(spec);
            let classification = classify(&result);
            match &classification {
                Classification::Success(files) => {
                    info!("[{}] succeeded with {} file(s)", spec.label, files.len());
                    return Ok(files.clone());
                }
                Classification::SilentSuccess => {
                    if let Some(reference) = extract_reference(&result.combined_output) {
                        info!(
                            "[{}] exited 0 without files; trying direct fetch of {}",
                            spec.label, reference
                        );
                        collected_references.push(reference.clone());
                        match direct.direct_fetch(&reference, output_dir) {
                            Ok(files) if !files.is_empty() => return Ok(files),
                            Ok(_) => {}
                            Err(e) => warn!("[{}] direct fetch failed: {}", spec.label, e),
                        }
                    } else {
                        warn!("[{}] exited 0 without files and no recoverable URL", spec.label);
                    }
                }
                Classification::Failure => {
                    warn!("[{}] failed with exit code {}", spec.label, result.exit_code);
                }
            }
            errors.push(describe(spec, &result, &classification));
        }

        if let Some(reference) = collected_references.first() {
            info!("Final direct fetch attempt for {}", reference);
            match direct.direct_fetch(reference, output_dir) {
                Ok(files) if !files.is_empty() => return Ok(files),
                Ok(_) => {}
                Err(e) => errors.push(format!("[final yt-dlp fallback] failed\n{e}")),
            }
        }

        Err(SpdError::Acquisition(format!(
            "All attempts failed.\n\n{}",
            errors.join("\n\n")
        )))
    }
}

fn describe(spec: &AttemptSpec, result: &AttemptResult, classification: &Classification) -> String {
    match classification {
        Classification::SilentSuccess => format!(
            "[{}] success exit code but no files.\n{}",
            spec.label, result.combined_output
        ),
        _ => format!(
            "[{}] failed (exit code {})\n{}",
            spec.label, result.exit_code, result.combined_output
        ),
    }
}
