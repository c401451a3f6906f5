//! Main menu background conversion
//!
//! Takes a mod archive that replaces the game's main menu logo mesh and turns
//! it into a self-contained mod named after an identifier:
//!
//! 1. extract the archive into a scratch workspace
//! 2. find `logo.nif` (or `logo01ae.nif`)
//! 3. point slot 0 of every shape at `Interface/MainMenu/<id>.dds` and save
//!    the mesh as `Data/Meshes/Interface/MainMenu/<id>.nif`
//! 4. copy the mesh's original texture to `Data/Textures/Interface/MainMenu/<id>.dds`
//! 5. zip `Data` into `<output dir>/<id>.zip`
//!
//! Folders the mod already ships are reused whatever their case, so a mod
//! with `data/meshes` keeps its other files in the output.
//!
//! # Example
//!
//! ```no_run
//! use mainmenu::archive::ArchiveTools;
//! use mainmenu::convert::{ConvertOptions, convert_mod};
//!
//! let options = ConvertOptions::new("Skyrim Dawn", "out/")
//!     .with_tools(ArchiveTools::locate(None)?);
//! let report = convert_mod("SkyrimDawn.7z", &options, |step| println!("{step}"))?;
//! println!("Wrote {}", report.output.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod error;
mod identifier;
mod workspace;

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use crate::archive::ArchiveTools;
use crate::error::Error;
use crate::formats::nif::{NifFile, ShapeRef};
use crate::utils::{find_file, resolve_dir};
use crate::utils::path::file_name_any_separator;

pub use error::{ConvertError, ErrorKind};
pub use identifier::{DEFAULT_IDENTIFIER, validate_identifier};
use workspace::Workspace;

/// Mesh file names searched for, in order.
pub const MESH_NAMES: [&str; 2] = ["logo.nif", "logo01ae.nif"];
/// Folder that becomes the root of the output archive.
pub const DATA_DIR: &str = "Data";
/// Where the patched mesh goes, below the data folder.
pub const MESH_DIR: &[&str] = &["Meshes", "Interface", "MainMenu"];
/// Where the relocated texture goes, below the data folder.
pub const TEXTURE_DIR: &[&str] = &["Textures", "Interface", "MainMenu"];
/// Texture folder as referenced from inside the mesh.
pub const IN_MESH_TEXTURE_DIR: &str = "Interface/MainMenu";
pub const MESH_EXTENSION: &str = "nif";
pub const TEXTURE_EXTENSION: &str = "dds";
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Texture path written into every shape for `identifier`.
#[must_use]
pub fn texture_reference(identifier: &str) -> String {
    format!("{IN_MESH_TEXTURE_DIR}/{identifier}.{TEXTURE_EXTENSION}")
}

/// Settings for one conversion.
#[derive(Debug, Clone)]
pub struct ConvertOptions {
    /// Name of the new mod; used for every output file name
    pub identifier: String,
    /// Folder the output archive is written to
    pub output_dir: PathBuf,
    /// Parent folder of the scratch workspace (system temp folder if `None`)
    pub temp_root: Option<PathBuf>,
    pub tools: ArchiveTools,
}

impl ConvertOptions {
    pub fn new<S: Into<String>, P: Into<PathBuf>>(identifier: S, output_dir: P) -> Self {
        Self {
            identifier: identifier.into(),
            output_dir: output_dir.into(),
            temp_root: None,
            tools: ArchiveTools::builtin(),
        }
    }

    #[must_use]
    pub fn with_temp_root<P: Into<PathBuf>>(mut self, temp_root: P) -> Self {
        self.temp_root = Some(temp_root.into());
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: ArchiveTools) -> Self {
        self.tools = tools;
        self
    }

    /// Path of the archive this conversion writes.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir
            .join(format!("{}.{ARCHIVE_EXTENSION}", self.identifier))
    }
}

/// Pipeline stages reported while a conversion runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConvertStep {
    Extracting,
    LocatingMesh,
    PatchingMesh,
    RelocatingTexture,
    Repackaging,
    CleaningUp,
}

impl ConvertStep {
    /// Total number of steps in a run, counting archive tool lookup as step 1.
    pub const TOTAL: usize = 7;

    /// One-based position of this step in a run.
    #[must_use]
    pub fn number(self) -> usize {
        match self {
            Self::Extracting => 2,
            Self::LocatingMesh => 3,
            Self::PatchingMesh => 4,
            Self::RelocatingTexture => 5,
            Self::Repackaging => 6,
            Self::CleaningUp => 7,
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Extracting => "Extracting mod archive...",
            Self::LocatingMesh => "Searching for main menu mesh...",
            Self::PatchingMesh => "Patching mesh textures...",
            Self::RelocatingTexture => "Copying texture...",
            Self::Repackaging => "Packaging mod...",
            Self::CleaningUp => "Cleaning up...",
        }
    }
}

impl fmt::Display for ConvertStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// Result of [`patch_textures`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePatch {
    /// Slot 0 of the first shape before patching
    pub old_texture: Option<String>,
    /// Shapes whose slot 0 was overwritten
    pub shapes_patched: usize,
}

/// Point slot 0 of every shape at `new_path`.
///
/// Only the first shape's original slot 0 is captured; the others are
/// overwritten without being read. Shapes without a texture binding are
/// left alone.
pub fn patch_textures(nif: &mut NifFile, new_path: &str) -> TexturePatch {
    let shapes: Vec<ShapeRef> = nif.shapes().collect();
    let old_texture = shapes.first().and_then(|&first| nif.texture_slot(first, 0));

    let mut shapes_patched = 0;
    for shape in shapes {
        if nif.set_texture_slot(shape, 0, new_path) {
            shapes_patched += 1;
        } else {
            tracing::debug!("Shape block {} has no slot 0 to patch", shape.block_index());
        }
    }

    TexturePatch {
        old_texture,
        shapes_patched,
    }
}

/// What a successful conversion did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionReport {
    pub identifier: String,
    /// The archive that was written
    pub output: PathBuf,
    /// Files extracted from the input archive
    pub files_extracted: usize,
    /// Mesh that was patched, relative to the extracted archive
    pub mesh: PathBuf,
    /// Slot 0 of the first shape before patching
    pub old_texture: String,
    /// Texture file that was copied, relative to the extracted archive
    pub texture: PathBuf,
    pub shapes_patched: usize,
    /// Files written to the output archive
    pub files_packed: usize,
}

/// Convert the mod in `archive` according to `options`.
///
/// `on_step` is called as each stage starts. The scratch workspace is
/// removed whether the conversion succeeds or not.
///
/// # Errors
///
/// Returns the first failure as a [`ConvertError`].
pub fn convert_mod<P, F>(archive: P, options: &ConvertOptions, mut on_step: F) -> Result<ConversionReport, ConvertError>
where
    P: AsRef<Path>,
    F: FnMut(ConvertStep),
{
    let archive = archive.as_ref();
    let identifier = options.identifier.as_str();
    validate_identifier(identifier)?;

    let workspace = Workspace::create(identifier, options.temp_root.as_deref())?;
    let root = workspace.path();

    on_step(ConvertStep::Extracting);
    let files_extracted = options
        .tools
        .extract(archive, root)
        .map_err(|source| match source {
            Error::SevenZipNotFound { .. } => ConvertError::MissingDependency { source },
            source => ConvertError::ExtractionFailed {
                archive: archive.to_path_buf(),
                source,
            },
        })?;

    on_step(ConvertStep::LocatingMesh);
    let mesh_path = locate_mesh(root, archive)?;

    on_step(ConvertStep::PatchingMesh);
    let mut nif = NifFile::load(&mesh_path).map_err(|source| ConvertError::MeshLoadFailed {
        path: mesh_path.clone(),
        source,
    })?;
    let patch = patch_textures(&mut nif, &texture_reference(identifier));
    tracing::info!(
        "Patched {} of {} shapes, original texture {:?}",
        patch.shapes_patched,
        nif.shape_count(),
        patch.old_texture
    );

    let data_dir = resolve_dir(root, &[DATA_DIR]).map_err(|e| ConvertError::filesystem(root, e))?;
    let mesh_dir = resolve_dir(&data_dir, MESH_DIR).map_err(|e| ConvertError::filesystem(&data_dir, e))?;
    fs::create_dir_all(&mesh_dir).map_err(|e| ConvertError::filesystem(&mesh_dir, e))?;
    let new_mesh = mesh_dir.join(format!("{identifier}.{MESH_EXTENSION}"));
    nif.save(&new_mesh).map_err(|source| ConvertError::MeshSaveFailed {
        path: new_mesh.clone(),
        source,
    })?;

    on_step(ConvertStep::RelocatingTexture);
    let old_texture = patch
        .old_texture
        .ok_or(ConvertError::TextureNotFound { texture: None })?;
    let texture_path = relocate_texture(root, &data_dir, identifier, &old_texture)?;

    on_step(ConvertStep::Repackaging);
    let output = options.output_path();
    let files_packed = repackage(&options.tools, &data_dir, &output)?;

    on_step(ConvertStep::CleaningUp);
    let report = ConversionReport {
        identifier: identifier.to_string(),
        output,
        files_extracted,
        mesh: relative_to(&mesh_path, root),
        old_texture,
        texture: relative_to(&texture_path, root),
        shapes_patched: patch.shapes_patched,
        files_packed,
    };
    workspace.close();

    Ok(report)
}

fn locate_mesh(root: &Path, archive: &Path) -> Result<PathBuf, ConvertError> {
    for name in MESH_NAMES {
        if let Some(path) = find_file(root, name).map_err(|e| ConvertError::filesystem(root, e))? {
            tracing::info!("Found main menu mesh: {}", path.display());
            return Ok(path);
        }
    }
    Err(ConvertError::AssetNotFound {
        archive: archive.to_path_buf(),
    })
}

/// Copy the texture named by `old_texture` into the output layout.
fn relocate_texture(
    root: &Path,
    data_dir: &Path,
    identifier: &str,
    old_texture: &str,
) -> Result<PathBuf, ConvertError> {
    let not_found = || ConvertError::TextureNotFound {
        texture: Some(old_texture.to_string()),
    };

    let file_name = file_name_any_separator(old_texture);
    if file_name.is_empty() {
        return Err(not_found());
    }
    let source = find_file(root, file_name)
        .map_err(|e| ConvertError::filesystem(root, e))?
        .ok_or_else(not_found)?;

    let texture_dir =
        resolve_dir(data_dir, TEXTURE_DIR).map_err(|e| ConvertError::filesystem(data_dir, e))?;
    fs::create_dir_all(&texture_dir).map_err(|e| ConvertError::filesystem(&texture_dir, e))?;
    let dest = texture_dir.join(format!("{identifier}.{TEXTURE_EXTENSION}"));

    if source == dest {
        tracing::debug!("Texture is already in place: {}", dest.display());
    } else {
        tracing::info!("Copying {} to {}", source.display(), dest.display());
        fs::copy(&source, &dest).map_err(|e| ConvertError::filesystem(&dest, e))?;
    }
    Ok(source)
}

fn repackage(tools: &ArchiveTools, data_dir: &Path, output: &Path) -> Result<usize, ConvertError> {
    tools.compress_dir(data_dir, output).map_err(|source| {
        if output.exists() {
            if let Err(e) = fs::remove_file(output) {
                tracing::warn!("Could not remove incomplete archive {}: {e}", output.display());
            }
        }
        ConvertError::RepackageFailed {
            output: output.to_path_buf(),
            source,
        }
    })
}

fn relative_to(path: &Path, root: &Path) -> PathBuf {
    path.strip_prefix(root).unwrap_or(path).to_path_buf()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::nif::fixtures::{self, NifBuilder};
    use crate::formats::nif::BS_VERSION_SKYRIM_SE;
    use pretty_assertions::assert_eq;

    fn three_shape_nif() -> NifFile {
        let bytes = NifBuilder::new(BS_VERSION_SKYRIM_SE)
            .block("BSFadeNode", vec![0; 8])
            .block("BSTriShape", fixtures::bs_tri_shape(None, 3, 100))
            .block("BSTriShape", fixtures::bs_tri_shape(None, 5, 100))
            .block("BSLightingShaderProperty", fixtures::lighting_shader(4))
            .block("BSShaderTextureSet", fixtures::texture_set(&["first.dds", "first_n.dds"]))
            .block("BSEffectShaderProperty", fixtures::effect_shader("second.dds"))
            .block("BSTriShape", fixtures::bs_tri_shape(None, -1, 100))
            .build();
        NifFile::from_bytes(&bytes).unwrap()
    }

    #[test]
    fn test_texture_reference() {
        assert_eq!(texture_reference("MyMod"), "Interface/MainMenu/MyMod.dds");
    }

    #[test]
    fn test_patch_textures_first_shape_only_captured() {
        let mut nif = three_shape_nif();
        let patch = patch_textures(&mut nif, "Interface/MainMenu/X.dds");

        assert_eq!(patch.old_texture.as_deref(), Some("first.dds"));
        assert_eq!(patch.shapes_patched, 2);

        let slots: Vec<Option<String>> = nif.shapes().map(|s| nif.texture_slot(s, 0)).collect();
        assert_eq!(
            slots,
            vec![
                Some("Interface/MainMenu/X.dds".to_string()),
                Some("Interface/MainMenu/X.dds".to_string()),
                None,
            ]
        );
        let first = nif.shapes().next().unwrap();
        assert_eq!(nif.texture_slot(first, 1).as_deref(), Some("first_n.dds"));
    }

    #[test]
    fn test_patch_textures_without_shapes() {
        let bytes = NifBuilder::new(BS_VERSION_SKYRIM_SE)
            .block("NiNode", vec![0; 8])
            .build();
        let mut nif = NifFile::from_bytes(&bytes).unwrap();
        let patch = patch_textures(&mut nif, "Interface/MainMenu/X.dds");
        assert_eq!(patch.old_texture, None);
        assert_eq!(patch.shapes_patched, 0);
    }

    #[test]
    fn test_step_numbers_are_sequential() {
        let steps = [
            ConvertStep::Extracting,
            ConvertStep::LocatingMesh,
            ConvertStep::PatchingMesh,
            ConvertStep::RelocatingTexture,
            ConvertStep::Repackaging,
            ConvertStep::CleaningUp,
        ];
        let numbers: Vec<usize> = steps.iter().map(|s| s.number()).collect();
        assert_eq!(numbers, vec![2, 3, 4, 5, 6, 7]);
        assert_eq!(steps[5].number(), ConvertStep::TOTAL);
    }

    #[test]
    fn test_output_path() {
        let options = ConvertOptions::new("MyMod", "/out");
        assert_eq!(options.output_path(), PathBuf::from("/out").join("MyMod.zip"));
    }

    #[test]
    fn test_invalid_identifier_stops_before_extraction() {
        let dir = tempfile::tempdir().unwrap();
        let options = ConvertOptions::new("bad/name", dir.path()).with_temp_root(dir.path());
        let mut steps = Vec::new();
        let err = convert_mod(dir.path().join("missing.zip"), &options, |s| steps.push(s)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidIdentifier);
        assert!(steps.is_empty());
    }

    #[test]
    fn test_missing_archive_is_extraction_failure() {
        let dir = tempfile::tempdir().unwrap();
        let temp_root = dir.path().join("scratch");
        let options = ConvertOptions::new("MyMod", dir.path()).with_temp_root(&temp_root);
        let err = convert_mod(dir.path().join("missing.zip"), &options, |_| {}).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ExtractionFailed);
        assert_eq!(fs::read_dir(&temp_root).unwrap().count(), 0);
    }
}
