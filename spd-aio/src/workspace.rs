use std::fs;
use std::path::{Path, PathBuf};

use spd_common::error::Result;
use tempfile::TempDir;
use tracing::debug;

/// Per-request scratch tree: `<tmp_root>/job_XXXX/` with an `out/` directory the
/// acquisition tools write into.
///
/// The tree is removed exactly once, when the value is dropped.
#[derive(Debug)]
pub struct JobWorkspace {
    root: TempDir,
    output_dir: PathBuf,
}

impl JobWorkspace {
    pub fn create(tmp_root: &Path) -> Result<Self> {
        fs::create_dir_all(tmp_root)?;
        let root = tempfile::Builder::new().prefix("job_").tempdir_in(tmp_root)?;
        let output_dir = root.path().join("out");
        fs::create_dir_all(&output_dir)?;
        debug!("Created job workspace {}", root.path().display());
        Ok(Self { root, output_dir })
    }

    pub fn root_dir(&self) -> &Path {
        self.root.path()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl Drop for JobWorkspace {
    fn drop(&mut self) {
        debug!("Removing job workspace {}", self.root.path().display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workspace_is_unique_and_removed_on_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let a = JobWorkspace::create(tmp.path()).unwrap();
        let b = JobWorkspace::create(tmp.path()).unwrap();
        assert_ne!(a.root_dir(), b.root_dir());
        assert!(a.output_dir().is_dir());
        assert!(a
            .root_dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("job_"));

        let root = a.root_dir().to_path_buf();
        drop(a);
        assert!(!root.exists());
        assert!(b.root_dir().exists());
    }
}
