use std::fs::{self, File};
use std::io;
use std::path::Path;

use spd_common::error::Result;
use tracing::debug;
use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Archives every regular file under `src_dir` into `zip_path` (deflated), with
/// entry names relative to `src_dir`.
pub fn zip_folder(src_dir: &Path, zip_path: &Path) -> Result<()> {
    if let Some(parent) = zip_path.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!("Packing {} into {}", src_dir.display(), zip_path.display());

    let mut writer = ZipWriter::new(File::create(zip_path)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for entry in WalkDir::new(src_dir).sort_by_file_name() {
        let entry = entry.map_err(io::Error::from)?;
        if !entry.file_type().is_file() {
            continue;
        }
        let rel = entry
            .path()
            .strip_prefix(src_dir)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;
        let name = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        writer.start_file(name, options)?;
        io::copy(&mut File::open(entry.path())?, &mut writer)?;
    }
    writer.finish()?;
    Ok(())
}
