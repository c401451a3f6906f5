//! Scratch directory for one conversion

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use super::ConvertError;

/// Temporary folder named `<identifier>-XXXXXX`, removed when dropped.
#[derive(Debug)]
pub(crate) struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub(crate) fn create(identifier: &str, root: Option<&Path>) -> Result<Self, ConvertError> {
        let root = root.map_or_else(env::temp_dir, Path::to_path_buf);
        fs::create_dir_all(&root).map_err(|e| ConvertError::filesystem(&root, e))?;

        let dir = tempfile::Builder::new()
            .prefix(&format!("{identifier}-"))
            .tempdir_in(&root)
            .map_err(|e| ConvertError::filesystem(&root, e))?;
        tracing::debug!("Created workspace {}", dir.path().display());

        Ok(Self { dir })
    }

    pub(crate) fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the workspace now, logging instead of failing if that does not work.
    pub(crate) fn close(self) {
        let path: PathBuf = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => tracing::debug!("Removed workspace {}", path.display()),
            Err(e) => tracing::warn!("Could not remove temporary folder {}: {e}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_and_cleanup_on_drop() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let workspace = Workspace::create("MyMod", Some(root.path())).unwrap();
            let name = workspace.path().file_name().unwrap().to_string_lossy().to_string();
            assert!(name.starts_with("MyMod-"), "{name}");
            fs::write(workspace.path().join("file.txt"), b"x").unwrap();
            workspace.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_close_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let workspace = Workspace::create("Close", Some(root.path())).unwrap();
        let path = workspace.path().to_path_buf();
        workspace.close();
        assert!(!path.exists());
    }

    #[test]
    fn test_missing_root_is_created() {
        let root = tempfile::tempdir().unwrap();
        let nested = root.path().join("a/b");
        let workspace = Workspace::create("Nested", Some(&nested)).unwrap();
        assert!(workspace.path().starts_with(&nested));
    }
}
