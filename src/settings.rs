//! Preload settings
//!
//! Read from the path given on the command line, or from
//! `~/.config/quarry/preload.toml`

use std::fs;
use std::path::{Path, PathBuf};

use quarry_assets::LoaderConfig;
use quarry_core::{AssetDescriptor, AssetType};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Everything the preloader needs to run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreloadSettings {
    /// Directory asset paths are resolved against
    pub asset_root: PathBuf,
    pub loader: LoaderConfig,
    pub preload: Vec<PreloadEntry>,
}

impl Default for PreloadSettings {
    fn default() -> Self {
        Self {
            asset_root: PathBuf::from("assets"),
            loader: LoaderConfig::default(),
            preload: Vec::new(),
        }
    }
}

impl PreloadSettings {
    /// Get the default settings file path
    fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quarry").join("preload.toml"))
    }

    /// Load settings from `path`, or from the config directory when no path
    /// is given. Falls back to defaults if the file is missing or invalid.
    pub fn load(path: Option<&Path>) -> Self {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => match Self::settings_path() {
                Some(path) => path,
                None => {
                    warn!("Could not determine config directory");
                    return Self::default();
                }
            },
        };

        if !path.exists() {
            info!("No preload file found at {:?}, using defaults", path);
            return Self::default();
        }

        match fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(settings) => {
                    info!("Loaded preload settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Failed to parse preload settings: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                warn!("Failed to read preload file: {}, using defaults", e);
                Self::default()
            }
        }
    }
}

/// One asset to preload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreloadEntry {
    /// Guessed from the file extension when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<AssetType>,
    pub path: String,
    #[serde(default)]
    pub index: u32,
    /// Skeleton mesh file for animations (mesh index 0)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skeleton: Option<String>,
}

impl PreloadEntry {
    /// The declared asset type, or the one implied by the extension
    pub fn asset_type(&self) -> Option<AssetType> {
        self.asset_type.or_else(|| {
            Path::new(&self.path)
                .extension()
                .and_then(|e| e.to_str())
                .and_then(AssetType::from_extension)
        })
    }

    pub fn descriptor(&self) -> anyhow::Result<AssetDescriptor> {
        let Some(asset_type) = self.asset_type() else {
            anyhow::bail!("Cannot tell the asset type of '{}'", self.path);
        };
        if asset_type != AssetType::SkeletonAnimation {
            return Ok(AssetDescriptor::new(asset_type, &self.path, self.index));
        }
        let Some(skeleton) = &self.skeleton else {
            anyhow::bail!("Animation '{}' has no skeleton", self.path);
        };
        let skeleton = AssetDescriptor::new(AssetType::SkeletonMesh, skeleton, 0);
        Ok(AssetDescriptor::animation(&self.path, self.index, skeleton))
    }
}
