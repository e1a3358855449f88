use std::path::{Path, PathBuf};

use crate::config::Settings;

/// Live browser session usable through `--cookies-from-browser`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserSession {
    pub browser: String,
    pub profile: PathBuf,
}

impl BrowserSession {
    /// The `<browser>:<profile>` spec understood by yt-dlp.
    pub fn cookie_spec(&self) -> String {
        format!("{}:{}", self.browser, self.profile.display())
    }
}

/// Authentication material available to a request. Computed once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialContext {
    pub browser_session: Option<BrowserSession>,
    pub cookie_file: Option<PathBuf>,
}

impl CredentialContext {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            browser_session: settings.browser_profile.as_ref().map(|profile| BrowserSession {
                browser: settings.browser.clone(),
                profile: profile.clone(),
            }),
            cookie_file: settings.cookie_file.clone(),
        }
    }

    pub fn browser_cookie_available(&self) -> bool {
        self.browser_session.is_some()
    }

    pub fn cookie_file_path(&self) -> Option<&Path> {
        self.cookie_file.as_deref()
    }
}
