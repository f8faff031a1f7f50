//! Composite assets and their sub-asset slots

use std::sync::Arc;

use quarry_core::AssetDescriptor;

use crate::asset::Asset;

/// A child reference held by a composite asset.
///
/// Decoders fill slots with placeholders that carry only a descriptor; the
/// pipeline replaces each placeholder with the shared, resolved instance.
#[derive(Debug, Clone)]
pub enum SubAsset {
    Placeholder(AssetDescriptor),
    Resolved(Arc<Asset>),
}

impl SubAsset {
    pub fn descriptor(&self) -> &AssetDescriptor {
        match self {
            SubAsset::Placeholder(descriptor) => descriptor,
            SubAsset::Resolved(asset) => asset.descriptor(),
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, SubAsset::Placeholder(_))
    }

    pub fn resolved(&self) -> Option<&Arc<Asset>> {
        match self {
            SubAsset::Resolved(asset) => Some(asset),
            SubAsset::Placeholder(_) => None,
        }
    }
}

impl From<Asset> for SubAsset {
    fn from(asset: Asset) -> Self {
        SubAsset::Resolved(Arc::new(asset))
    }
}

/// An unresolved slot reported by a decoder: its position in the parent's
/// sub-asset list and the descriptor of the asset that belongs there.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSlot {
    pub index: usize,
    pub descriptor: AssetDescriptor,
}

/// Static meshes together with the textures they are drawn with.
#[derive(Debug, Clone)]
pub struct BlockModel {
    pub descriptor: AssetDescriptor,
    pub meshes: Vec<SubAsset>,
    pub textures: Vec<SubAsset>,
}

/// Skinned meshes together with the textures they are drawn with.
#[derive(Debug, Clone)]
pub struct SkeletonModel {
    pub descriptor: AssetDescriptor,
    pub meshes: Vec<SubAsset>,
    pub textures: Vec<SubAsset>,
}
