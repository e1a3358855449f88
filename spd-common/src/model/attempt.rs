use std::path::PathBuf;

/// Which kind of authentication material an attempt needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialRequirement {
    None,
    BrowserCookie,
    CookieFile,
}

/// One fully-built invocation of the fetch tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptSpec {
    /// Human-readable identifier used in logs and the aggregate error.
    pub label: String,
    /// Program followed by its arguments.
    pub command: Vec<String>,
    pub requires_credential: CredentialRequirement,
}

/// What a single tool invocation left behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptResult {
    /// Process exit code; -1 when the process could not be spawned or was killed by a signal.
    pub exit_code: i32,
    pub combined_output: String,
    pub produced_files: Vec<PathBuf>,
}
