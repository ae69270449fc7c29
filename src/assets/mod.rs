//! Asset declarations, the tiered loader and the loaded-resource store.

pub mod loader;
pub mod source;

use std::path::Path;

use hashbrown::HashMap;
use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use smol_str::SmolStr;

pub use loader::{LoaderEvent, TieredLoader};
pub use source::AssetSource;

use crate::{font::Font, sprite::Sprite};

/// Identifier assets are declared and looked up with.
pub type AssetId = SmolStr;

/// Load priority of an asset.
///
/// All assets of a tier must resolve, successfully or not, before the view
/// elements gated on that tier are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Gates the primary button bar.
    Highest,
    High,
    Normal,
    Low,
    /// Nice-to-have extras such as tuned particle settings.
    Lowest,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Highest => "highest",
            Self::High => "high",
            Self::Normal => "normal",
            Self::Low => "low",
            Self::Lowest => "lowest",
        };

        write!(f, "{name}")
    }
}

/// What kind of resource an asset decodes into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// A PNG image decoded into a [`Sprite`].
    Texture,
    /// A PNG glyph sheet plus a TOML metadata file decoded into a [`Font`].
    Font,
    /// A TOML file decoded into [`ParticleSettings`].
    Particles,
}

/// A single asset declaration from the manifest.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetDescriptor {
    /// Identifier the loaded resource is stored under.
    pub id: AssetId,
    /// File path relative to the asset root.
    pub path: String,
    /// Tier the asset is loaded in.
    pub priority: Priority,
    /// How the file is decoded.
    pub kind: AssetKind,
}

/// Declarative list of all assets, read from TOML at startup.
///
/// ```toml
/// [[asset]]
/// id = "card"
/// path = "gfx/card.png"
/// priority = "highest"
/// kind = "texture"
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// The declared assets, in declaration order.
    #[serde(rename = "asset", default)]
    pub assets: Vec<AssetDescriptor>,
}

impl Manifest {
    /// Read and parse a manifest from disk.
    ///
    /// # Errors
    ///
    /// - When the file can't be read or is not valid manifest TOML.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let raw = std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("Error reading asset manifest '{}'", path.display()))?;

        Self::from_str(&raw)
    }

    /// Parse a manifest from a TOML string.
    ///
    /// # Errors
    ///
    /// - When the string is not valid manifest TOML.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(raw: &str) -> Result<Self> {
        toml::from_str(raw)
            .into_diagnostic()
            .wrap_err("Error parsing asset manifest")
    }
}

/// Emitter parameters for the fire mode, loadable as a `particles` asset.
///
/// Interpolating pairs are `[start, end]` over a particle's lifetime, random
/// ranges are `[min, max]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParticleSettings {
    /// Seconds between two spawned particles.
    pub spawn_interval: f32,
    /// Random lifetime range in seconds.
    pub lifetime: [f32; 2],
    /// Random launch angle range in degrees, `0` pointing right and negative
    /// values pointing up.
    pub angle: [f32; 2],
    /// Speed over lifetime in pixels per second.
    pub speed: [f32; 2],
    /// Opacity over lifetime.
    pub alpha: [f32; 2],
    /// Sprite scale over lifetime.
    pub scale: [f32; 2],
    /// Color multiplier at spawn.
    pub color_start: [f32; 3],
    /// Color multiplier at death.
    pub color_end: [f32; 3],
    /// Radius of the circle spawn positions are jittered in.
    pub spawn_radius: f32,
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            spawn_interval: 0.01,
            lifetime: [0.5, 3.0],
            angle: [-150.0, -30.0],
            speed: [66.0, 33.0],
            alpha: [0.8, 0.1],
            scale: [1.0, 0.3],
            color_start: [1.0, 1.0, 1.0],
            color_end: [0.0, 0.0, 0.0],
            spawn_radius: 4.0,
        }
    }
}

/// A decoded asset on its way into [`Resources`].
#[derive(Debug)]
pub enum Resource {
    /// Decoded image.
    Sprite(Sprite),
    /// Decoded glyph sheet plus metadata.
    Font(Font),
    /// Decoded emitter parameters.
    Particles(ParticleSettings),
}

/// Store of everything that loaded successfully, keyed by asset id.
///
/// Assets that failed to load are simply absent; consumers null-check through
/// the `Option` accessors before use.
#[derive(Default)]
pub struct Resources {
    /// Loaded sprites.
    sprites: HashMap<AssetId, Sprite>,
    /// Loaded fonts.
    fonts: HashMap<AssetId, Font>,
    /// Loaded particle settings.
    particles: HashMap<AssetId, ParticleSettings>,
}

impl Resources {
    /// Store a decoded resource under its asset id.
    pub fn insert(&mut self, id: AssetId, resource: Resource) {
        match resource {
            Resource::Sprite(sprite) => {
                self.sprites.insert(id, sprite);
            }
            Resource::Font(font) => {
                self.fonts.insert(id, font);
            }
            Resource::Particles(settings) => {
                self.particles.insert(id, settings);
            }
        }
    }

    /// Get a loaded sprite, `None` when it failed to load or isn't loaded yet.
    #[inline]
    #[must_use]
    pub fn sprite(&self, id: &str) -> Option<&Sprite> {
        self.sprites.get(id)
    }

    /// Get a loaded font, `None` when it failed to load or isn't loaded yet.
    #[inline]
    #[must_use]
    pub fn font(&self, id: &str) -> Option<&Font> {
        self.fonts.get(id)
    }

    /// Get loaded particle settings, `None` when they failed to load or
    /// aren't loaded yet.
    #[inline]
    #[must_use]
    pub fn particle_settings(&self, id: &str) -> Option<&ParticleSettings> {
        self.particles.get(id)
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetKind, Manifest, ParticleSettings, Priority};

    #[test]
    fn manifest_parses_tiers_and_kinds() {
        let manifest = Manifest::from_str(
            r#"
            [[asset]]
            id = "card"
            path = "gfx/card.png"
            priority = "highest"
            kind = "texture"

            [[asset]]
            id = "flame"
            path = "flame.toml"
            priority = "lowest"
            kind = "particles"
            "#,
        )
        .unwrap();

        assert_eq!(manifest.assets.len(), 2);
        assert_eq!(manifest.assets[0].id, "card");
        assert_eq!(manifest.assets[0].priority, Priority::Highest);
        assert_eq!(manifest.assets[0].kind, AssetKind::Texture);
        assert_eq!(manifest.assets[1].priority, Priority::Lowest);
        assert_eq!(manifest.assets[1].kind, AssetKind::Particles);
    }

    #[test]
    fn manifest_rejects_unknown_tier() {
        assert!(Manifest::from_str(
            r#"
            [[asset]]
            id = "card"
            path = "gfx/card.png"
            priority = "urgent"
            kind = "texture"
            "#,
        )
        .is_err());
    }

    #[test]
    fn empty_manifest_is_valid() {
        let manifest = Manifest::from_str("").unwrap();

        assert!(manifest.assets.is_empty());
    }

    #[test]
    fn priority_tiers_are_ordered() {
        assert!(Priority::Highest < Priority::High);
        assert!(Priority::Low < Priority::Lowest);
    }

    #[test]
    fn particle_settings_partial_toml_fills_defaults() {
        let settings: ParticleSettings = toml::from_str(
            r#"
            spawn_interval = 0.5
            lifetime = [1.0, 2.0]
            "#,
        )
        .unwrap();

        assert_eq!(settings.spawn_interval, 0.5);
        assert_eq!(settings.lifetime, [1.0, 2.0]);
        // Unset fields fall back to the built-in defaults
        assert_eq!(settings.angle, ParticleSettings::default().angle);
    }
}
