//! Format decoding: raw bytes in, resolved (or partially resolved) assets out

use quarry_core::{AssetDescriptor, AssetType};

use crate::asset::Asset;
use crate::error::AssetError;
use crate::gltf_loader;
use crate::model::PlaceholderSlot;
use crate::storage::RawData;
use crate::texture;

/// The result of decoding one file.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub asset: Asset,
    /// Sub-asset slots that still need to be loaded and spliced in.
    pub placeholders: Vec<PlaceholderSlot>,
}

impl Decoded {
    /// Wrap an asset, reporting every placeholder slot it holds.
    pub fn new(asset: Asset) -> Self {
        let placeholders = asset.placeholders();
        Self {
            asset,
            placeholders,
        }
    }
}

/// Turns raw file contents into an in-memory asset.
///
/// Decoding runs synchronously on a parser worker and must not block on
/// other assets; composite assets report their unresolved children as
/// placeholders instead.
pub trait FormatDecoder: Send + Sync {
    fn decode(&self, descriptor: &AssetDescriptor, data: &RawData) -> Result<Decoded, AssetError>;
}

/// Decoder for every built-in asset type: images through `image`,
/// geometry, skins and animations through `gltf`.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardDecoder;

impl FormatDecoder for StandardDecoder {
    fn decode(&self, descriptor: &AssetDescriptor, data: &RawData) -> Result<Decoded, AssetError> {
        let bytes = data.as_bytes();

        let asset = match descriptor.asset_type() {
            AssetType::Texture2D => Asset::Texture2D(texture::decode_texture(descriptor, bytes)?),
            AssetType::BlockMesh => {
                let contents = gltf_loader::open_gltf(descriptor, bytes)?;
                Asset::BlockMesh(gltf_loader::load_block_mesh(descriptor, &contents)?)
            }
            AssetType::SkeletonMesh => {
                let contents = gltf_loader::open_gltf(descriptor, bytes)?;
                Asset::SkeletonMesh(gltf_loader::load_skeleton_mesh(descriptor, &contents)?)
            }
            AssetType::BlockModel => {
                let contents = gltf_loader::open_gltf(descriptor, bytes)?;
                Asset::BlockModel(gltf_loader::load_block_model(descriptor, &contents)?)
            }
            AssetType::SkeletonModel => {
                let contents = gltf_loader::open_gltf(descriptor, bytes)?;
                Asset::SkeletonModel(gltf_loader::load_skeleton_model(descriptor, &contents)?)
            }
            AssetType::SkeletonAnimation => {
                let contents = gltf_loader::open_gltf(descriptor, bytes)?;
                Asset::SkeletonAnimation(gltf_loader::load_animation(descriptor, &contents)?)
            }
        };

        Ok(Decoded::new(asset))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gltf_loader::tests::TRIANGLE_GLTF;
    use crate::texture::encode_png;

    #[test]
    fn basic_assets_report_no_placeholders() {
        let desc = AssetDescriptor::new(AssetType::Texture2D, "a.png", 0);
        let decoded = StandardDecoder
            .decode(&desc, &RawData::Binary(encode_png(1, 1)))
            .unwrap();
        assert_eq!(decoded.asset.asset_type(), AssetType::Texture2D);
        assert!(decoded.placeholders.is_empty());

        let desc = AssetDescriptor::new(AssetType::BlockMesh, "tri.gltf", 0);
        let decoded = StandardDecoder
            .decode(&desc, &RawData::Text(TRIANGLE_GLTF.to_string()))
            .unwrap();
        assert!(decoded.placeholders.is_empty());
    }

    #[test]
    fn animation_reports_its_skeleton() {
        let skeleton = AssetDescriptor::new(AssetType::SkeletonMesh, "hero.glb", 0);
        let desc = AssetDescriptor::animation("walk.gltf", 0, skeleton.clone());
        let decoded = StandardDecoder
            .decode(&desc, &RawData::Text(TRIANGLE_GLTF.to_string()))
            .unwrap();

        assert_eq!(
            decoded.placeholders,
            vec![PlaceholderSlot {
                index: 0,
                descriptor: skeleton
            }]
        );
    }

    #[test]
    fn wrong_payload_is_a_parse_error() {
        let desc = AssetDescriptor::new(AssetType::BlockMesh, "tri.gltf", 0);
        let result = StandardDecoder.decode(&desc, &RawData::Text("{ not json".into()));
        assert!(matches!(result, Err(AssetError::Parse { .. })));
    }
}
