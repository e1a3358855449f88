// spd-core/src/job.rs
//! One download request end to end: acquire, transcode, package.

use std::path::PathBuf;
use std::sync::Arc;

use spd_aio::{zip_folder, CommandRunner, JobWorkspace};
use spd_common::credentials::CredentialContext;
use spd_common::error::{Result, SpdError};
use spd_common::model::OutputFormat;
use spd_common::Settings;
use tracing::{debug, info, instrument};

use crate::acquire::{normalize_target, AcquisitionEngine};
use crate::bootstrap::ensure_ffmpeg;
use crate::tools::ToolInvocation;
use crate::transcode::{convert_to_format, converted_dir};

/// Splits a newline-separated URL list (`\r` counts as a newline), dropping blank lines.
pub fn parse_target_list(raw: &str) -> Vec<String> {
    raw.split(['\r', '\n'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobRequest {
    pub targets: Vec<String>,
    pub format: OutputFormat,
}

impl JobRequest {
    /// Builds a request from raw form fields. A list with no usable URL (blank, or only
    /// tracking parameters) is `InvalidInput`.
    pub fn from_form(raw_urls: &str, format: Option<&str>) -> Result<Self> {
        let targets = parse_target_list(raw_urls);
        if !has_usable_target(&targets) {
            return Err(SpdError::InvalidInput("No URL(s) provided".to_string()));
        }
        Ok(Self {
            targets,
            format: OutputFormat::parse_or_default(format),
        })
    }
}

fn has_usable_target(targets: &[String]) -> bool {
    targets.iter().any(|t| !normalize_target(t).is_empty())
}

/// The single file handed back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deliverable {
    pub path: PathBuf,
    pub file_name: String,
    pub mime_type: &'static str,
}

impl Deliverable {
    fn from_path(path: PathBuf) -> Self {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "download".to_string());
        let mime_type = OutputFormat::mime_for_path(&path);
        Self {
            path,
            file_name,
            mime_type,
        }
    }
}

/// Everything a job needs that outlives the request.
#[derive(Clone)]
pub struct JobContext {
    pub settings: Arc<Settings>,
    pub credentials: Arc<CredentialContext>,
    pub runner: Arc<dyn CommandRunner>,
}

impl JobContext {
    pub fn new(
        settings: Arc<Settings>,
        credentials: Arc<CredentialContext>,
        runner: Arc<dyn CommandRunner>,
    ) -> Self {
        Self {
            settings,
            credentials,
            runner,
        }
    }

    /// Runs the job inside `workspace`. Blocking; call from a blocking thread.
    ///
    /// The returned path lives inside the workspace, so the workspace must outlive
    /// delivery of the file.
    #[instrument(skip_all, fields(workspace = %workspace.root_dir().display(), format = %request.format))]
    pub fn run(&self, request: &JobRequest, workspace: &JobWorkspace) -> Result<Deliverable> {
        if !has_usable_target(&request.targets) {
            return Err(SpdError::InvalidInput("No URL(s) provided".to_string()));
        }
        let runner = self.runner.as_ref();
        let output_dir = workspace.output_dir();

        let ffmpeg = ensure_ffmpeg(runner, &ToolInvocation::spotdl(&self.settings))?;

        let engine = AcquisitionEngine::new(&self.settings, &self.credentials, runner);
        let acquired = engine.acquire(&request.targets, output_dir)?;
        info!("Acquired {} file(s)", acquired.len());

        let final_files = convert_to_format(runner, &ffmpeg, &acquired, request.format, output_dir)?;

        match final_files.as_slice() {
            [] => Err(SpdError::Generic("acquisition returned no files".to_string())),
            [single] => Ok(Deliverable::from_path(single.clone())),
            _ => {
                let src_dir = if request.format == OutputFormat::Mp3 {
                    output_dir.to_path_buf()
                } else {
                    converted_dir(output_dir, request.format)
                };
                let zip_path = workspace
                    .root_dir()
                    .join(format!("playlist_{}.zip", request.format));
                zip_folder(&src_dir, &zip_path)?;
                debug!("Packed {} file(s) into {}", final_files.len(), zip_path.display());
                Ok(Deliverable::from_path(zip_path))
            }
        }
    }
}
