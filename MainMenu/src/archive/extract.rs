//! Archive extraction backends

use std::fs::{self, File};
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};
use std::process::{Command, Stdio};

use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Extract a zip archive entry by entry.
///
/// `\` in entry names is read as a separator, as archivers on Windows write
/// them. Entries whose names escape the destination are skipped. Every entry
/// is read to the end, so a CRC mismatch surfaces as an error.
pub(crate) fn extract_zip(archive: &Path, dest: &Path) -> Result<usize> {
    let file = BufReader::new(File::open(archive)?);
    let mut zip = zip::ZipArchive::new(file)?;

    let mut count = 0;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i)?;
        let Some(relative) = entry.enclosed_name().and_then(|_| entry_path(entry.name())) else {
            tracing::warn!("Skipping unsafe archive entry: {}", entry.name());
            continue;
        };
        let output_path = dest.join(relative);

        if entry.is_dir() || entry.name().ends_with('\\') {
            fs::create_dir_all(&output_path)?;
            continue;
        }

        if let Some(parent) = output_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut outfile = File::create(&output_path)?;
        io::copy(&mut entry, &mut outfile)?;
        count += 1;
    }

    Ok(count)
}

/// Relative output path of a zip entry, or `None` if it would leave the
/// destination.
fn entry_path(name: &str) -> Option<PathBuf> {
    let name = name.replace('\\', "/");
    let mut path = PathBuf::new();
    for component in Path::new(&name).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    (!path.as_os_str().is_empty()).then_some(path)
}

/// Extract a 7z archive with the compiled-in decoder.
pub(crate) fn extract_7z(archive: &Path, dest: &Path) -> Result<usize> {
    sevenz_rust::decompress_file(archive, dest)?;
    count_files(dest)
}

/// What 7-Zip prints for input it has no handler for.
const NOT_AN_ARCHIVE: &str = "Can not open the file as archive";

/// Extract anything else by running `7z x -y -o<dest> <archive>`.
pub(crate) fn extract_external(seven_zip: &Path, archive: &Path, dest: &Path) -> Result<usize> {
    tracing::debug!("Running {} on {}", seven_zip.display(), archive.display());

    let mut out_flag = std::ffi::OsString::from("-o");
    out_flag.push(dest.as_os_str());

    let output = Command::new(seven_zip)
        .arg("x")
        .arg("-y")
        .arg(out_flag)
        .arg(archive)
        .stdin(Stdio::null())
        .output()?;

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stdout.contains(NOT_AN_ARCHIVE) || stderr.contains(NOT_AN_ARCHIVE) {
            return Err(Error::UnsupportedArchiveFormat {
                path: archive.to_path_buf(),
            });
        }
        return Err(Error::SevenZipFailed {
            status: output.status,
            stderr: stderr.trim().to_string(),
        });
    }

    count_files(dest)
}

fn count_files(dir: &Path) -> Result<usize> {
    let mut count = 0;
    for entry in WalkDir::new(dir) {
        if entry?.file_type().is_file() {
            count += 1;
        }
    }
    Ok(count)
}
