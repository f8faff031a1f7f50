use std::sync::Arc;

use quarry_core::{AssetDescriptor, AssetIdentity, AssetType};

use crate::animation::SkeletonAnimation;
use crate::error::AssetError;
use crate::mesh::{BlockMesh, SkeletonMesh};
use crate::model::{BlockModel, PlaceholderSlot, SkeletonModel, SubAsset};
use crate::texture::Texture2D;

/// A resolved asset of any type.
///
/// Composite variants hold their children as [`SubAsset`] slots. Slots are
/// addressed by a stable index: meshes first, then textures; an animation
/// has exactly one slot, its skeleton. Basic variants have no slots.
#[derive(Debug, Clone)]
pub enum Asset {
    BlockMesh(BlockMesh),
    SkeletonMesh(SkeletonMesh),
    Texture2D(Texture2D),
    BlockModel(BlockModel),
    SkeletonModel(SkeletonModel),
    SkeletonAnimation(SkeletonAnimation),
}

impl Asset {
    pub fn asset_type(&self) -> AssetType {
        match self {
            Asset::BlockMesh(_) => AssetType::BlockMesh,
            Asset::SkeletonMesh(_) => AssetType::SkeletonMesh,
            Asset::Texture2D(_) => AssetType::Texture2D,
            Asset::BlockModel(_) => AssetType::BlockModel,
            Asset::SkeletonModel(_) => AssetType::SkeletonModel,
            Asset::SkeletonAnimation(_) => AssetType::SkeletonAnimation,
        }
    }

    pub fn descriptor(&self) -> &AssetDescriptor {
        match self {
            Asset::BlockMesh(a) => &a.descriptor,
            Asset::SkeletonMesh(a) => &a.descriptor,
            Asset::Texture2D(a) => &a.descriptor,
            Asset::BlockModel(a) => &a.descriptor,
            Asset::SkeletonModel(a) => &a.descriptor,
            Asset::SkeletonAnimation(a) => &a.descriptor,
        }
    }

    pub fn identity(&self) -> &AssetIdentity {
        self.descriptor().identity()
    }

    /// All sub-asset slots in index order.
    pub fn sub_assets(&self) -> Vec<&SubAsset> {
        match self {
            Asset::BlockModel(m) => m.meshes.iter().chain(&m.textures).collect(),
            Asset::SkeletonModel(m) => m.meshes.iter().chain(&m.textures).collect(),
            Asset::SkeletonAnimation(a) => vec![&a.skeleton],
            Asset::BlockMesh(_) | Asset::SkeletonMesh(_) | Asset::Texture2D(_) => Vec::new(),
        }
    }

    fn sub_asset_mut(&mut self, index: usize) -> Option<&mut SubAsset> {
        match self {
            Asset::BlockModel(m) => m.meshes.iter_mut().chain(&mut m.textures).nth(index),
            Asset::SkeletonModel(m) => m.meshes.iter_mut().chain(&mut m.textures).nth(index),
            Asset::SkeletonAnimation(a) if index == 0 => Some(&mut a.skeleton),
            _ => None,
        }
    }

    /// Slots that still hold a placeholder.
    pub fn placeholders(&self) -> Vec<PlaceholderSlot> {
        self.sub_assets()
            .into_iter()
            .enumerate()
            .filter_map(|(index, slot)| match slot {
                SubAsset::Placeholder(descriptor) => Some(PlaceholderSlot {
                    index,
                    descriptor: descriptor.clone(),
                }),
                SubAsset::Resolved(_) => None,
            })
            .collect()
    }

    pub fn is_fully_resolved(&self) -> bool {
        self.sub_assets().iter().all(|slot| !slot.is_placeholder())
    }

    /// Replace the placeholder at `slot.index` with a resolved asset.
    pub fn splice(&mut self, slot: &PlaceholderSlot, resolved: Arc<Asset>) -> Result<(), AssetError> {
        let target = self
            .sub_asset_mut(slot.index)
            .ok_or(AssetError::SlotOutOfRange(slot.index))?;

        let expected = match target {
            SubAsset::Placeholder(descriptor) => descriptor.asset_type(),
            SubAsset::Resolved(_) => return Err(AssetError::SlotAlreadyResolved(slot.index)),
        };
        if resolved.asset_type() != expected {
            return Err(AssetError::TypeMismatch {
                expected,
                found: resolved.asset_type(),
            });
        }

        *target = SubAsset::Resolved(resolved);
        Ok(())
    }

    pub fn as_block_mesh(&self) -> Option<&BlockMesh> {
        match self {
            Asset::BlockMesh(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_skeleton_mesh(&self) -> Option<&SkeletonMesh> {
        match self {
            Asset::SkeletonMesh(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_texture(&self) -> Option<&Texture2D> {
        match self {
            Asset::Texture2D(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_block_model(&self) -> Option<&BlockModel> {
        match self {
            Asset::BlockModel(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_skeleton_model(&self) -> Option<&SkeletonModel> {
        match self {
            Asset::SkeletonModel(a) => Some(a),
            _ => None,
        }
    }

    pub fn as_animation(&self) -> Option<&SkeletonAnimation> {
        match self {
            Asset::SkeletonAnimation(a) => Some(a),
            _ => None,
        }
    }
}
