//! Zip archive creation

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

use crate::error::{Error, Result};
use crate::utils::relative_path;

/// Zip the contents of `source_dir` into a new archive at `dest`.
pub(crate) fn compress_dir(source_dir: &Path, dest: &Path) -> Result<usize> {
    tracing::info!("Compressing {} into {}", source_dir.display(), dest.display());

    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = File::create(dest)?;
    let mut zip = ZipWriter::new(BufWriter::new(file));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut count = 0;
    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry?;
        let name = relative_path(entry.path(), source_dir).ok_or_else(|| {
            Error::InvalidPath(format!(
                "{} is outside {}",
                entry.path().display(),
                source_dir.display()
            ))
        })?;

        if entry.file_type().is_dir() {
            zip.add_directory(name, options)?;
        } else if entry.file_type().is_file() {
            zip.start_file(name, options)?;
            let mut input = File::open(entry.path())?;
            io::copy(&mut input, &mut zip)?;
            count += 1;
        } else {
            tracing::debug!("Skipping non-regular file {}", entry.path().display());
        }
    }

    let mut writer = zip.finish()?;
    writer.flush()?;

    tracing::info!("Wrote {count} files");
    Ok(count)
}
