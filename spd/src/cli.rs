// spd/src/cli.rs
//! Defines the command-line argument structure using clap.
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use spd_common::Settings;

/// Flags override the environment; anything not given on the command line keeps
/// the value resolved by `Settings::load`.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None, name = "spd", bin_name = "spd")]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Address to bind (default: $HOST or 0.0.0.0)
    #[arg(long)]
    pub host: Option<String>,

    /// Port to listen on (default: $PORT or 8080)
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Root for per-request workspaces (default: $TMP_ROOT or ./tmp)
    #[arg(long, value_name = "DIR")]
    pub tmp_root: Option<PathBuf>,

    /// Maximum number of jobs running at once
    #[arg(long, value_name = "N")]
    pub max_jobs: Option<usize>,

    /// Minutes before an abandoned workspace is swept
    #[arg(long, value_name = "MINUTES")]
    pub cleanup_ttl: Option<u64>,
}

impl CliArgs {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(host) = &self.host {
            settings.host = host.clone();
        }
        if let Some(port) = self.port {
            settings.port = port;
        }
        if let Some(tmp_root) = &self.tmp_root {
            settings.tmp_root = tmp_root.clone();
        }
        if let Some(max_jobs) = self.max_jobs {
            settings.max_concurrent_jobs = max_jobs.max(1);
        }
        if let Some(minutes) = self.cleanup_ttl {
            settings.cleanup_ttl = std::time::Duration::from_secs(minutes * 60);
        }
    }
}
