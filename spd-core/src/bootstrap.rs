use std::path::PathBuf;

use spd_aio::CommandRunner;
use spd_common::error::{Result, SpdError};
use tracing::{debug, info};

use crate::tools::ToolInvocation;

/// Where `spotdl --download-ffmpeg` drops its binary.
fn spotdl_managed_ffmpeg() -> Option<PathBuf> {
    let name = if cfg!(windows) { "ffmpeg.exe" } else { "ffmpeg" };
    let path = dirs::home_dir()?.join(".spotdl").join(name);
    path.is_file().then_some(path)
}

/// Finds an ffmpeg binary on PATH or in spotdl's private install location.
pub fn locate_ffmpeg() -> Option<PathBuf> {
    which::which("ffmpeg").ok().or_else(spotdl_managed_ffmpeg)
}

/// Makes sure ffmpeg is usable, installing it through spotdl when it is not.
///
/// Returns the program to invoke for transcoding.
pub fn ensure_ffmpeg(runner: &dyn CommandRunner, spotdl: &ToolInvocation) -> Result<String> {
    if let Some(path) = locate_ffmpeg() {
        let program = path.display().to_string();
        let probe = runner.run("ffmpeg probe", &[program.clone(), "-version".to_string()]);
        if probe.success() {
            debug!("Using ffmpeg at {}", program);
            return Ok(program);
        }
        debug!("ffmpeg at {} is not usable (exit {})", program, probe.exit_code);
    }

    info!("ffmpeg not available, bootstrapping through spotdl");
    let boot = runner.run("ffmpeg bootstrap", &spotdl.command(["--download-ffmpeg"]));
    if !boot.success() {
        return Err(SpdError::ToolBootstrap(format!(
            "FFmpeg bootstrap failed:\n{}",
            boot.combined_output
        )));
    }
    Ok(locate_ffmpeg()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "ffmpeg".to_string()))
}
