// spd-core/src/transcode.rs
use std::fs;
use std::path::{Path, PathBuf};

use spd_aio::CommandRunner;
use spd_common::error::{Result, SpdError};
use spd_common::model::OutputFormat;
use tracing::{debug, info};

/// Fixed codec table per output container.
fn codec_args(format: OutputFormat) -> &'static [&'static str] {
    match format {
        OutputFormat::M4a => &["-c:a", "aac", "-b:a", "256k", "-movflags", "+faststart"],
        OutputFormat::Opus => &["-c:a", "libopus", "-b:a", "160k"],
        OutputFormat::Flac => &["-c:a", "flac"],
        OutputFormat::Wav => &["-c:a", "pcm_s16le"],
        OutputFormat::Ogg => &["-c:a", "libvorbis", "-q:a", "5"],
        OutputFormat::Mp3 => &["-c:a", "libmp3lame", "-b:a", "256k"],
    }
}

/// Directory converted files are written to.
pub fn converted_dir(output_dir: &Path, format: OutputFormat) -> PathBuf {
    output_dir.join(format!("converted_{format}"))
}

/// Converts `files` to `format`, preserving order. mp3 input is returned untouched.
pub fn convert_to_format(
    runner: &dyn CommandRunner,
    ffmpeg: &str,
    files: &[PathBuf],
    format: OutputFormat,
    output_dir: &Path,
) -> Result<Vec<PathBuf>> {
    if format == OutputFormat::Mp3 {
        return Ok(files.to_vec());
    }

    let out_dir = converted_dir(output_dir, format);
    fs::create_dir_all(&out_dir)?;
    info!("Transcoding {} file(s) to {}", files.len(), format);

    let mut converted = Vec::with_capacity(files.len());
    for src in files {
        let stem = src
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "track".to_string());
        let dst = out_dir.join(format!("{stem}.{}", format.extension()));

        let mut command: Vec<String> = vec![
            ffmpeg.to_string(),
            "-y".into(),
            "-i".into(),
            src.display().to_string(),
            "-vn".into(),
            "-map_metadata".into(),
            "0".into(),
            "-loglevel".into(),
            "error".into(),
        ];
        command.extend(codec_args(format).iter().map(|a| a.to_string()));
        command.push(dst.display().to_string());

        let output = runner.run("ffmpeg", &command);
        let written = fs::metadata(&dst).map(|m| m.len() > 0).unwrap_or(false);
        if !output.success() || !written {
            return Err(SpdError::Transcode(format!(
                "FFmpeg transcode failed for {} -> {}\n{}",
                file_name(src),
                file_name(&dst),
                output.combined_output
            )));
        }
        debug!("Transcoded {} -> {}", src.display(), dst.display());
        converted.push(dst);
    }
    Ok(converted)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
