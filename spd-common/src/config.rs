// spd-common/src/config.rs
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::debug;

use super::error::{Result, SpdError};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8080;
const DEFAULT_CLEANUP_TTL_MIN: u64 = 60;
const DEFAULT_BITRATE: &str = "256k";
const DEFAULT_THREADS: u32 = 2;
const DEFAULT_MAX_JOBS: usize = 8;
const DEFAULT_COOKIE_FILE: &str = "cookies/music_youtube_cookies1.txt";
const DEFAULT_BROWSER: &str = "opera";
const DEFAULT_BROWSER_PROFILE: &str = "Opera Software/Opera GX Stable";

/// Process-wide settings, resolved once at startup and shared read-only afterwards.
#[derive(Debug, Clone)]
pub struct Settings {
    pub base_dir: PathBuf,
    pub tmp_root: PathBuf,
    pub logs_dir: PathBuf,
    pub cookie_file: Option<PathBuf>,
    pub browser: String,
    pub browser_profile: Option<PathBuf>,
    pub host: String,
    pub port: u16,
    pub cleanup_ttl: Duration,
    pub cleanup_interval: Duration,
    pub python: String,
    pub bitrate: String,
    pub threads: u32,
    pub max_concurrent_jobs: usize,
}

impl Settings {
    /// Loads settings from the process environment and creates the runtime directories.
    pub fn load() -> Result<Self> {
        debug!("Loading spd settings");
        let base_dir = match env::var("SPD_BASE_DIR").ok().filter(|s| !s.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => env::current_dir()?,
        };
        let settings = Self::from_lookup(&base_dir, |key| env::var(key).ok())?;
        settings.ensure_dirs()?;
        debug!("Settings loaded successfully.");
        Ok(settings)
    }

    /// Resolves settings from an arbitrary key lookup. Paths that must exist
    /// (cookie file, browser profile) are checked here, once.
    pub fn from_lookup<F>(base_dir: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let tmp_root = get("TMP_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("tmp"));
        let logs_dir = get("LOGS_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| base_dir.join("logs"));

        let cookie_file = resolve_cookie_file(
            get("COOKIES_FILE").or_else(|| get("YTMUSIC_COOKIES")),
            base_dir,
        );
        let browser_profile = resolve_browser_profile(get("SPD_BROWSER_PROFILE"));
        debug!("Cookie file: {:?}, browser profile: {:?}", cookie_file, browser_profile);

        let cleanup_ttl_min: u64 = parse_or("CLEANUP_TTL_MIN", get("CLEANUP_TTL_MIN"), DEFAULT_CLEANUP_TTL_MIN)?;
        let max_concurrent_jobs: usize = parse_or("SPD_MAX_JOBS", get("SPD_MAX_JOBS"), DEFAULT_MAX_JOBS)?;

        Ok(Self {
            base_dir: base_dir.to_path_buf(),
            tmp_root,
            logs_dir,
            cookie_file,
            browser: get("SPD_BROWSER").unwrap_or_else(|| DEFAULT_BROWSER.to_string()),
            browser_profile,
            host: get("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port: parse_or("PORT", get("PORT"), DEFAULT_PORT)?,
            cleanup_ttl: Duration::from_secs(cleanup_ttl_min * 60),
            cleanup_interval: Duration::from_secs(60),
            python: get("SPD_PYTHON").unwrap_or_else(|| "python3".to_string()),
            bitrate: get("SPOTDL_BITRATE").unwrap_or_else(|| DEFAULT_BITRATE.to_string()),
            threads: parse_or("SPOTDL_THREADS", get("SPOTDL_THREADS"), DEFAULT_THREADS)?,
            max_concurrent_jobs: max_concurrent_jobs.max(1),
        })
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.tmp_root, &self.logs_dir] {
            fs::create_dir_all(dir).map_err(|e| {
                SpdError::Config(format!("Could not create {}: {e}", dir.display()))
            })?;
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T) -> Result<T> {
    match raw {
        Some(v) => v
            .parse::<T>()
            .map_err(|_| SpdError::Config(format!("{key} has an invalid value: '{v}'"))),
        None => Ok(default),
    }
}

fn resolve_cookie_file(configured: Option<String>, base_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = configured.map(PathBuf::from) {
        if path.is_file() {
            return Some(path);
        }
        debug!("Configured cookie file {} does not exist, ignoring", path.display());
    }
    let fallback = base_dir.join(DEFAULT_COOKIE_FILE);
    fallback.is_file().then_some(fallback)
}

fn resolve_browser_profile(configured: Option<String>) -> Option<PathBuf> {
    let candidate = match configured {
        Some(p) => PathBuf::from(p),
        None => dirs::config_dir()?.join(DEFAULT_BROWSER_PROFILE),
    };
    candidate.is_dir().then_some(candidate)
}
