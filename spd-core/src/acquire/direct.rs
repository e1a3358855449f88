use std::fs;
use std::path::{Path, PathBuf};

use spd_aio::{collect_audio_files, CommandRunner};
use spd_common::credentials::CredentialContext;
use spd_common::error::{Result, SpdError};
use tracing::{debug, info};

use super::ACQUISITION_EXTENSIONS;
use crate::tools::ToolInvocation;

const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                                  (KHTML, like Gecko) Chrome/125 Safari/537.36";

/// Last-resort path: hands one extracted watch URL straight to yt-dlp.
pub struct DirectFetcher<'a> {
    runner: &'a dyn CommandRunner,
    tool: ToolInvocation,
    credentials: &'a CredentialContext,
}

impl<'a> DirectFetcher<'a> {
    pub fn new(
        runner: &'a dyn CommandRunner,
        tool: ToolInvocation,
        credentials: &'a CredentialContext,
    ) -> Self {
        Self {
            runner,
            tool,
            credentials,
        }
    }

    /// Tries browser cookies, then the cookie file, then no credentials; the first
    /// sub-attempt that leaves audio in `output_dir` wins.
    pub fn direct_fetch(&self, reference: &str, output_dir: &Path) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(output_dir)?;

        let mut last_output = String::new();
        for (label, credential_args) in self.credential_ladder() {
            let command = self
                .tool
                .command(credential_args.into_iter().chain(base_args(reference, output_dir)));
            info!("[{}] direct fetch of {}", label, reference);
            let output = self.runner.run(label, &command);
            if output.success() {
                let files = collect_audio_files(output_dir, ACQUISITION_EXTENSIONS);
                if !files.is_empty() {
                    info!("[{}] produced {} file(s)", label, files.len());
                    return Ok(files);
                }
                debug!("[{}] exited 0 but wrote nothing", label);
            }
            last_output = output.combined_output;
        }

        Err(SpdError::Acquisition(format!(
            "yt-dlp direct fallback failed.\n{last_output}"
        )))
    }

    fn credential_ladder(&self) -> Vec<(&'static str, Vec<String>)> {
        let mut ladder = Vec::with_capacity(3);
        if let Some(session) = &self.credentials.browser_session {
            ladder.push((
                "yt-dlp (browser cookies)",
                vec!["--cookies-from-browser".to_string(), session.cookie_spec()],
            ));
        }
        if let Some(cookie_file) = self.credentials.cookie_file_path() {
            ladder.push((
                "yt-dlp (cookie file)",
                vec!["--cookies".to_string(), cookie_file.display().to_string()],
            ));
        }
        ladder.push(("yt-dlp (no cookies)", Vec::new()));
        ladder
    }
}

fn base_args(reference: &str, output_dir: &Path) -> Vec<String> {
    [
        "-f",
        "bestaudio/best",
        "-x",
        "--audio-format",
        "mp3",
        "--audio-quality",
        "0",
        "--no-playlist",
        "--add-metadata",
        "--embed-thumbnail",
        "--force-ipv4",
        "--concurrent-fragments",
        "4",
        "--http-chunk-size",
        "16M",
        "--extractor-args",
        "youtube:player_client=android,web_safari",
        "--user-agent",
        DESKTOP_USER_AGENT,
        "-o",
    ]
    .into_iter()
    .map(str::to_string)
    .chain([
        output_dir.join("%(title)s.%(ext)s").display().to_string(),
        reference.to_string(),
    ])
    .collect()
}
