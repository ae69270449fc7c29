//! Where assets are retrieved from.

use std::path::{Path, PathBuf};

use miette::{IntoDiagnostic, Result, WrapErr};

use super::{AssetDescriptor, AssetKind, Resource};
use crate::{
    font::{Font, FontMetadata},
    sprite::Sprite,
};

/// Root directory asset paths are resolved against.
#[derive(Debug, Clone)]
pub struct AssetSource {
    /// Path to the directory of all assets.
    root: PathBuf,
}

impl AssetSource {
    /// Create a source reading from the given directory.
    #[inline]
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Fetch and decode a single declared asset.
    ///
    /// Runs on the loader's worker threads; both the file read and the
    /// decode happen here so the main thread only stores the result.
    ///
    /// # Errors
    ///
    /// - When the file (or a font's metadata sibling) can't be read.
    /// - When the bytes can't be decoded into the declared kind.
    pub fn fetch(&self, descriptor: &AssetDescriptor) -> Result<Resource> {
        let path = self.root.join(&descriptor.path);

        match descriptor.kind {
            AssetKind::Texture => {
                let bytes = read_bytes(&path)?;

                Sprite::from_png_bytes(&bytes).map(Resource::Sprite)
            }
            AssetKind::Font => {
                let bytes = read_bytes(&path)?;
                let sheet = Sprite::from_png_bytes(&bytes)?;

                // The glyph grid definition lives next to the sheet
                let metadata_path = metadata_path(&path);
                let metadata: FontMetadata = toml::from_str(&read_string(&metadata_path)?)
                    .into_diagnostic()
                    .wrap_err_with(|| {
                        format!("Error parsing font metadata '{}'", metadata_path.display())
                    })?;

                Font::from_parts(sheet, metadata).map(Resource::Font)
            }
            AssetKind::Particles => toml::from_str(&read_string(&path)?)
                .into_diagnostic()
                .wrap_err_with(|| format!("Error parsing particle settings '{}'", path.display()))
                .map(Resource::Particles),
        }
    }
}

/// Read a whole file as raw bytes.
fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Error reading asset file '{}'", path.display()))
}

/// Read a whole file as UTF-8.
fn read_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Error reading asset file '{}'", path.display()))
}

/// Sibling TOML path of a sheet image.
fn metadata_path(path: &Path) -> PathBuf {
    path.with_extension("toml")
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use smol_str::SmolStr;

    use super::{metadata_path, AssetSource};
    use crate::assets::{AssetDescriptor, AssetKind, Priority};

    #[test]
    fn metadata_lives_next_to_the_sheet() {
        assert_eq!(
            metadata_path(Path::new("assets/fonts/mono.png")),
            Path::new("assets/fonts/mono.toml")
        );
    }

    #[test]
    fn missing_file_reports_the_path() {
        let source = AssetSource::new("does-not-exist");
        let descriptor = AssetDescriptor {
            id: SmolStr::new("card"),
            path: "gfx/card.png".to_string(),
            priority: Priority::Highest,
            kind: AssetKind::Texture,
        };

        let error = source.fetch(&descriptor).unwrap_err();
        assert!(format!("{error}").contains("gfx"));
    }
}
