// spd-core/src/acquire/planner.rs
use std::path::{Path, PathBuf};

use spd_common::credentials::CredentialContext;
use spd_common::model::{AttemptSpec, CredentialRequirement};
use tracing::debug;

use crate::tools::ToolInvocation;

/// Where the fetch tool looks for audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Provider {
    /// Music-specific endpoint; less aggressively rate limited.
    YoutubeMusic,
    /// Plain video endpoint, searched with a relaxed query.
    Youtube,
}

impl Provider {
    fn audio_arg(self) -> &'static str {
        match self {
            Provider::YoutubeMusic => "youtube-music",
            Provider::Youtube => "youtube",
        }
    }

    fn short_name(self) -> &'static str {
        match self {
            Provider::YoutubeMusic => "ytmusic",
            Provider::Youtube => "youtube",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NetworkProfile {
    Fast,
    /// Smaller chunks, no parallel fragments. For rate-limited sessions.
    Slow,
}

#[derive(Debug, Clone, Copy)]
struct AttemptProfile {
    provider: Provider,
    credential: CredentialRequirement,
    network: NetworkProfile,
}

/// Attempt order, most preferred first. Entries whose credential is unavailable are skipped;
/// the last entry needs none and is always planned.
const LADDER: [AttemptProfile; 6] = [
    AttemptProfile {
        provider: Provider::YoutubeMusic,
        credential: CredentialRequirement::BrowserCookie,
        network: NetworkProfile::Fast,
    },
    AttemptProfile {
        provider: Provider::Youtube,
        credential: CredentialRequirement::BrowserCookie,
        network: NetworkProfile::Fast,
    },
    AttemptProfile {
        provider: Provider::YoutubeMusic,
        credential: CredentialRequirement::CookieFile,
        network: NetworkProfile::Fast,
    },
    AttemptProfile {
        provider: Provider::YoutubeMusic,
        credential: CredentialRequirement::CookieFile,
        network: NetworkProfile::Slow,
    },
    AttemptProfile {
        provider: Provider::Youtube,
        credential: CredentialRequirement::CookieFile,
        network: NetworkProfile::Fast,
    },
    AttemptProfile {
        provider: Provider::Youtube,
        credential: CredentialRequirement::None,
        network: NetworkProfile::Fast,
    },
];

const SEARCH_QUERY: &str = "{artists} {title} audio";

/// Strips tracking parameters (everything from the first `?`) and surrounding whitespace.
pub fn normalize_target(raw: &str) -> String {
    raw.split('?').next().unwrap_or_default().trim().to_string()
}

/// Builds the ordered list of fetch-tool attempts for one request.
pub struct AttemptPlanner {
    tool: ToolInvocation,
    output_dir: PathBuf,
    bitrate: String,
    threads: u32,
}

impl AttemptPlanner {
    pub fn new(tool: ToolInvocation, output_dir: &Path, bitrate: &str, threads: u32) -> Self {
        Self {
            tool,
            output_dir: output_dir.to_path_buf(),
            bitrate: bitrate.to_string(),
            threads,
        }
    }

    /// Ordered attempts for `targets`. Targets are normalized and empty ones dropped.
    ///
    /// Never empty: the credential-free attempt always closes the plan.
    pub fn plan(&self, credentials: &CredentialContext, targets: &[String]) -> Vec<AttemptSpec> {
        let targets: Vec<String> = targets
            .iter()
            .map(|t| normalize_target(t))
            .filter(|t| !t.is_empty())
            .collect();

        let plan: Vec<AttemptSpec> = LADDER
            .iter()
            .filter(|profile| credential_satisfied(profile.credential, credentials))
            .map(|profile| AttemptSpec {
                label: self.label(profile),
                command: self.build_command(profile, credentials, &targets),
                requires_credential: profile.credential,
            })
            .collect();
        debug!(
            "[Planner] {} attempt(s) planned for {} target(s)",
            plan.len(),
            targets.len()
        );
        plan
    }

    fn label(&self, profile: &AttemptProfile) -> String {
        let credential = match profile.credential {
            CredentialRequirement::BrowserCookie => " + browser-live",
            CredentialRequirement::CookieFile => " + cookie-file",
            CredentialRequirement::None => " no cookies",
        };
        let detail = match (profile.provider, profile.credential, profile.network) {
            (Provider::Youtube, _, _) => ", android",
            (Provider::YoutubeMusic, CredentialRequirement::CookieFile, NetworkProfile::Fast) => " fast",
            (Provider::YoutubeMusic, CredentialRequirement::CookieFile, NetworkProfile::Slow) => " slow",
            _ => "",
        };
        format!(
            "{}{} (mp3 {}{})",
            profile.provider.short_name(),
            credential,
            self.bitrate,
            detail
        )
    }

    fn build_command(
        &self,
        profile: &AttemptProfile,
        credentials: &CredentialContext,
        targets: &[String],
    ) -> Vec<String> {
        let mut args: Vec<String> = vec![
            "--audio".into(),
            profile.provider.audio_arg().into(),
            "--format".into(),
            "mp3".into(),
            "--bitrate".into(),
            self.bitrate.clone(),
        ];
        if profile.provider == Provider::Youtube {
            args.extend([
                "--dont-filter-results".to_string(),
                "--search-query".to_string(),
                SEARCH_QUERY.to_string(),
            ]);
        }
        // spotdl wants the yt-dlp arguments as one token after '='
        args.push(format!(
            "--yt-dlp-args={}",
            yt_dlp_args(profile, credentials)
        ));
        if profile.credential == CredentialRequirement::CookieFile {
            if let Some(cookie_file) = credentials.cookie_file_path() {
                args.push("--cookie-file".into());
                args.push(cookie_file.display().to_string());
            }
        }
        args.extend([
            "--output".to_string(),
            self.output_dir.display().to_string(),
            "--threads".to_string(),
            self.threads.to_string(),
            "download".to_string(),
        ]);
        args.extend(targets.iter().cloned());
        self.tool.command(args)
    }
}

fn credential_satisfied(required: CredentialRequirement, credentials: &CredentialContext) -> bool {
    match required {
        CredentialRequirement::None => true,
        CredentialRequirement::BrowserCookie => credentials.browser_cookie_available(),
        CredentialRequirement::CookieFile => credentials.cookie_file_path().is_some(),
    }
}

fn yt_dlp_args(profile: &AttemptProfile, credentials: &CredentialContext) -> String {
    if profile.credential == CredentialRequirement::BrowserCookie {
        if let Some(session) = &credentials.browser_session {
            return format!(
                "--cookies-from-browser \"{}\" --force-ipv4 --concurrent-fragments 4 \
                 --http-chunk-size 16M --extractor-args \"youtube:player_client=android,web_safari\"",
                session.cookie_spec()
            );
        }
    }
    match profile.network {
        NetworkProfile::Fast => "--force-ipv4 --concurrent-fragments 4 --http-chunk-size 16M \
                                 --extractor-args \"youtube:player_client=android\""
            .to_string(),
        NetworkProfile::Slow => {
            "--force-ipv4 --http-chunk-size 4M --extractor-args \"youtube:player_client=android\""
                .to_string()
        }
    }
}
