// spd-aio/src/sweep.rs
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime};

use tracing::{debug, warn};

/// Removes sub-directories of `root` last modified more than `ttl` before `now`.
///
/// Races with request threads (directories vanishing mid-scan) and any other
/// per-entry failure are ignored. A missing root is recreated. Returns the number
/// of directories removed.
pub fn sweep_stale(root: &Path, ttl: Duration, now: SystemTime) -> usize {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let _ = fs::create_dir_all(root);
            return 0;
        }
        Err(e) => {
            warn!("Cleanup could not read {}: {}", root.display(), e);
            return 0;
        }
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(meta) = entry.metadata() else { continue };
        if !meta.is_dir() {
            continue;
        }
        let Ok(modified) = meta.modified() else { continue };
        let age = now.duration_since(modified).unwrap_or_default();
        if age > ttl && fs::remove_dir_all(&path).is_ok() {
            debug!("Swept stale workspace {} (age {:?})", path.display(), age);
            removed += 1;
        }
    }
    removed
}

/// Starts the background `tmp-cleanup` thread. It runs for the life of the process.
pub fn start_sweeper(root: PathBuf, ttl: Duration, interval: Duration) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("tmp-cleanup".to_string())
        .spawn(move || loop {
            let removed = sweep_stale(&root, ttl, SystemTime::now());
            if removed > 0 {
                debug!("Cleanup pass removed {} workspace(s)", removed);
            }
            thread::sleep(interval);
        })
}
