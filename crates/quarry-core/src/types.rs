//! Asset type tags and raw file kinds

use std::fmt;

use serde::{Deserialize, Serialize};

/// Every kind of asset the loader knows how to produce
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssetType {
    /// Static mesh without skinning data
    BlockMesh,
    /// Skinned mesh with a joint hierarchy
    SkeletonMesh,
    /// Two-dimensional RGBA texture
    #[serde(rename = "texture_2d")]
    Texture2D,
    /// Composite of static meshes and their textures
    BlockModel,
    /// Composite of skinned meshes and their textures
    SkeletonModel,
    /// Keyframed animation posed against a skeleton mesh
    SkeletonAnimation,
}

impl AssetType {
    pub const ALL: [AssetType; 6] = [
        AssetType::BlockMesh,
        AssetType::SkeletonMesh,
        AssetType::Texture2D,
        AssetType::BlockModel,
        AssetType::SkeletonModel,
        AssetType::SkeletonAnimation,
    ];

    /// Whether assets of this type can reference other assets.
    ///
    /// Complex assets are parsed by a separate worker pool because they block
    /// on their sub-assets; basic assets never do.
    pub fn is_complex(&self) -> bool {
        matches!(
            self,
            AssetType::BlockModel | AssetType::SkeletonModel | AssetType::SkeletonAnimation
        )
    }

    /// Guess an asset type from a file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "bmp" | "tga" => Some(AssetType::Texture2D),
            "gltf" | "glb" => Some(AssetType::BlockMesh),
            _ => None,
        }
    }

    /// Get the display name of this type
    pub fn name(&self) -> &'static str {
        match self {
            AssetType::BlockMesh => "BlockMesh",
            AssetType::SkeletonMesh => "SkeletonMesh",
            AssetType::Texture2D => "Texture2D",
            AssetType::BlockModel => "BlockModel",
            AssetType::SkeletonModel => "SkeletonModel",
            AssetType::SkeletonAnimation => "SkeletonAnimation",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How the raw bytes of a file should be read from storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    Text,
    Binary,
}

impl FileKind {
    /// `.gltf` files are JSON text; everything else is read as binary.
    pub fn from_extension(ext: &str) -> Self {
        if ext.eq_ignore_ascii_case("gltf") {
            FileKind::Text
        } else {
            FileKind::Binary
        }
    }
}
