//! Descriptors: everything needed to load an asset before it is loaded

use std::path::{Path, PathBuf};

use crate::identity::AssetIdentity;
use crate::types::{AssetType, FileKind};

/// Format-specific information a decoder needs beyond the file itself
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormatMeta {
    #[default]
    None,
    /// An animation must be posed against this skeleton mesh
    Animation { skeleton: Box<AssetDescriptor> },
}

/// A cheap, cloneable description of an asset that has not been loaded yet.
///
/// This is the unit of work pushed onto the loader's queues.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetDescriptor {
    identity: AssetIdentity,
    path: PathBuf,
    file_kind: FileKind,
    meta: FormatMeta,
}

impl AssetDescriptor {
    /// Describe the asset at `index` inside the file at `path`.
    ///
    /// The file kind is derived from the extension.
    pub fn new(asset_type: AssetType, path: impl Into<PathBuf>, index: u32) -> Self {
        let path = path.into();
        let file_kind = path
            .extension()
            .and_then(|e| e.to_str())
            .map(FileKind::from_extension)
            .unwrap_or(FileKind::Binary);
        Self {
            identity: AssetIdentity::new(asset_type, path.to_string_lossy(), index),
            path,
            file_kind,
            meta: FormatMeta::None,
        }
    }

    /// Describe an animation and the skeleton mesh it must be posed against
    pub fn animation(path: impl Into<PathBuf>, index: u32, skeleton: AssetDescriptor) -> Self {
        Self::new(AssetType::SkeletonAnimation, path, index).with_meta(FormatMeta::Animation {
            skeleton: Box::new(skeleton),
        })
    }

    /// Describe a sub-asset stored inside its parent's payload.
    ///
    /// Inline descriptors have an empty path and are never loaded on their own.
    pub fn inline(asset_type: AssetType, index: u32) -> Self {
        Self {
            identity: AssetIdentity::new(asset_type, "", index),
            path: PathBuf::new(),
            file_kind: FileKind::Binary,
            meta: FormatMeta::None,
        }
    }

    pub fn with_file_kind(mut self, file_kind: FileKind) -> Self {
        self.file_kind = file_kind;
        self
    }

    pub fn with_meta(mut self, meta: FormatMeta) -> Self {
        self.meta = meta;
        self
    }

    pub fn identity(&self) -> &AssetIdentity {
        &self.identity
    }

    pub fn asset_type(&self) -> AssetType {
        self.identity.asset_type()
    }

    /// The path as given by the caller, used for reading from storage
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn index(&self) -> u32 {
        self.identity.index()
    }

    pub fn file_kind(&self) -> FileKind {
        self.file_kind
    }

    pub fn meta(&self) -> &FormatMeta {
        &self.meta
    }

    /// Whether this asset can have sub-assets
    pub fn is_complex(&self) -> bool {
        self.asset_type().is_complex()
    }

    /// False for inline sub-assets
    pub fn has_path(&self) -> bool {
        !self.path.as_os_str().is_empty()
    }

    /// The skeleton mesh an animation descriptor references, if any
    pub fn skeleton(&self) -> Option<&AssetDescriptor> {
        match &self.meta {
            FormatMeta::Animation { skeleton } => Some(skeleton),
            FormatMeta::None => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_kind_from_extension() {
        let text = AssetDescriptor::new(AssetType::BlockMesh, "crate.gltf", 0);
        let binary = AssetDescriptor::new(AssetType::BlockMesh, "crate.glb", 0);
        assert_eq!(text.file_kind(), FileKind::Text);
        assert_eq!(binary.file_kind(), FileKind::Binary);
    }

    #[test]
    fn original_path_is_kept_for_reading() {
        let desc = AssetDescriptor::new(AssetType::Texture2D, "Textures/Stone.PNG", 0);
        assert_eq!(desc.path(), Path::new("Textures/Stone.PNG"));
        assert_eq!(desc.identity().path(), "textures/stone.png");
    }

    #[test]
    fn animation_references_skeleton() {
        let mesh = AssetDescriptor::new(AssetType::SkeletonMesh, "hero.glb", 0);
        let anim = AssetDescriptor::animation("walk.glb", 0, mesh.clone());
        assert!(anim.is_complex());
        assert_eq!(anim.skeleton(), Some(&mesh));
        assert_eq!(mesh.skeleton(), None);
    }

    #[test]
    fn inline_descriptor_has_no_path() {
        let desc = AssetDescriptor::inline(AssetType::Texture2D, 3);
        assert!(!desc.has_path());
        assert_eq!(desc.index(), 3);
        assert!(AssetDescriptor::new(AssetType::Texture2D, "a.png", 0).has_path());
    }
}
