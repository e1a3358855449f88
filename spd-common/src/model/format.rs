use std::fmt;
use std::path::Path;

/// Container/codec the caller asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Mp3,
    M4a,
    Opus,
    Flac,
    Wav,
    Ogg,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        OutputFormat::Mp3,
        OutputFormat::M4a,
        OutputFormat::Opus,
        OutputFormat::Flac,
        OutputFormat::Wav,
        OutputFormat::Ogg,
    ];

    /// Lenient parse used for form input: unknown or empty values fall back to mp3.
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        let wanted = raw.unwrap_or("").trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == wanted)
            .unwrap_or_default()
    }

    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "mp3",
            OutputFormat::M4a => "m4a",
            OutputFormat::Opus => "opus",
            OutputFormat::Flac => "flac",
            OutputFormat::Wav => "wav",
            OutputFormat::Ogg => "ogg",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Mp3 => "audio/mpeg",
            OutputFormat::M4a => "audio/mp4",
            OutputFormat::Opus | OutputFormat::Ogg => "audio/ogg",
            OutputFormat::Flac => "audio/flac",
            OutputFormat::Wav => "audio/wav",
        }
    }

    /// MIME type for a file on disk, keyed on its extension.
    pub fn mime_for_path(path: &Path) -> &'static str {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        if ext == "zip" {
            return "application/zip";
        }
        Self::ALL
            .into_iter()
            .find(|f| f.extension() == ext)
            .map_or("application/octet-stream", OutputFormat::mime_type)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
