use std::path::PathBuf;

use base64::Engine;
use gltf::animation::util::ReadOutputs;
use quarry_core::{AssetDescriptor, AssetType, Mat4, Quat, Vec3};
use tracing::debug;

use crate::animation::{AnimationChannel, ChannelValues, SkeletonAnimation};
use crate::asset::Asset;
use crate::error::AssetError;
use crate::mesh::{BlockMesh, Joint, MeshPrimitive, SkeletonMesh};
use crate::model::{BlockModel, SkeletonModel, SubAsset};
use crate::texture;

/// A parsed glTF document with its binary buffers loaded.
pub struct GltfContents {
    document: gltf::Document,
    buffers: Vec<gltf::buffer::Data>,
}

/// Parse a glTF 2.0 payload (.gltf JSON or .glb). Buffers must be embedded
/// (GLB binary chunk or data URIs).
pub fn open_gltf(descriptor: &AssetDescriptor, bytes: &[u8]) -> Result<GltfContents, AssetError> {
    let gltf::Gltf { document, blob } = gltf::Gltf::from_slice(bytes)
        .map_err(|e| AssetError::parse(descriptor.identity(), e.to_string()))?;
    let buffers = gltf::import_buffers(&document, None, blob)
        .map_err(|e| AssetError::parse(descriptor.identity(), e.to_string()))?;
    Ok(GltfContents { document, buffers })
}

impl GltfContents {
    fn mesh_at(&self, descriptor: &AssetDescriptor) -> Result<gltf::Mesh<'_>, AssetError> {
        self.document
            .meshes()
            .nth(descriptor.index() as usize)
            .ok_or_else(|| {
                AssetError::parse(
                    descriptor.identity(),
                    format!("no mesh at index {}", descriptor.index()),
                )
            })
    }

    /// The skin bound to `mesh` by any node that instantiates it.
    fn skin_for(&self, mesh: &gltf::Mesh<'_>) -> Option<gltf::Skin<'_>> {
        self.document
            .nodes()
            .filter(|node| node.mesh().map(|m| m.index()) == Some(mesh.index()))
            .find_map(|node| node.skin())
    }

    fn read_primitives(&self, mesh: &gltf::Mesh<'_>, skinned: bool) -> Vec<MeshPrimitive> {
        let mut primitives = Vec::new();

        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| Some(&self.buffers[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .map(|iter| iter.collect())
                .unwrap_or_default();

            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| iter.collect())
                .unwrap_or_default();

            let tex_coords = reader.read_tex_coords(0).map(|tc| tc.into_f32().collect());
            let colors = reader.read_colors(0).map(|c| c.into_rgba_f32().collect());
            let indices = reader.read_indices().map(|idx| idx.into_u32().collect());

            let (joints, weights) = if skinned {
                (
                    reader.read_joints(0).map(|j| j.into_u16().collect()),
                    reader.read_weights(0).map(|w| w.into_f32().collect()),
                )
            } else {
                (None, None)
            };

            primitives.push(MeshPrimitive {
                positions,
                normals,
                tex_coords,
                colors,
                indices,
                joints,
                weights,
            });
        }

        primitives
    }

    fn read_joints(&self, skin: &gltf::Skin<'_>) -> Vec<Joint> {
        let reader = skin.reader(|buffer| Some(&self.buffers[buffer.index()]));
        let inverse_binds: Vec<Mat4> = reader
            .read_inverse_bind_matrices()
            .map(|iter| iter.map(|m| Mat4::from_cols_array_2d(&m)).collect())
            .unwrap_or_default();

        skin.joints()
            .enumerate()
            .map(|(i, node)| Joint {
                name: node
                    .name()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("joint_{}", node.index())),
                node: node.index(),
                inverse_bind: inverse_binds.get(i).copied().unwrap_or(Mat4::IDENTITY),
            })
            .collect()
    }

    fn image_bytes(
        &self,
        descriptor: &AssetDescriptor,
        image: &gltf::Image<'_>,
    ) -> Result<Option<Vec<u8>>, AssetError> {
        match image.source() {
            gltf::image::Source::View { view, .. } => {
                let buffer = &self.buffers[view.buffer().index()];
                let start = view.offset();
                let end = start + view.length();
                let bytes = buffer.get(start..end).ok_or_else(|| {
                    AssetError::parse(descriptor.identity(), "image view exceeds buffer")
                })?;
                Ok(Some(bytes.to_vec()))
            }
            gltf::image::Source::Uri { uri, .. } => match uri.strip_prefix("data:") {
                Some(data) => {
                    let (_, payload) = data.split_once(";base64,").ok_or_else(|| {
                        AssetError::parse(descriptor.identity(), "image data URI is not base64")
                    })?;
                    let bytes = base64::engine::general_purpose::STANDARD
                        .decode(payload)
                        .map_err(|e| AssetError::parse(descriptor.identity(), e.to_string()))?;
                    Ok(Some(bytes))
                }
                None => Ok(None),
            },
        }
    }

    /// Textures of a model: embedded images are decoded inline, external
    /// image files become placeholders relative to the model's directory.
    fn model_textures(&self, descriptor: &AssetDescriptor) -> Result<Vec<SubAsset>, AssetError> {
        let mut textures = Vec::new();

        for (i, image) in self.document.images().enumerate() {
            match self.image_bytes(descriptor, &image)? {
                Some(bytes) => {
                    let inline = AssetDescriptor::inline(AssetType::Texture2D, i as u32);
                    let tex = texture::decode_texture(&inline, &bytes)?;
                    textures.push(Asset::Texture2D(tex).into());
                }
                None => {
                    let gltf::image::Source::Uri { uri, .. } = image.source() else {
                        continue;
                    };
                    let uri = urlencoding::decode(uri)
                        .map_err(|e| AssetError::parse(descriptor.identity(), e.to_string()))?;
                    let path = descriptor
                        .path()
                        .parent()
                        .map(|dir| dir.join(&*uri))
                        .unwrap_or_else(|| PathBuf::from(&*uri));
                    textures.push(SubAsset::Placeholder(AssetDescriptor::new(
                        AssetType::Texture2D,
                        path,
                        0,
                    )));
                }
            }
        }

        Ok(textures)
    }
}

/// Decode the static mesh at the descriptor's index.
pub fn load_block_mesh(
    descriptor: &AssetDescriptor,
    contents: &GltfContents,
) -> Result<BlockMesh, AssetError> {
    let mesh = contents.mesh_at(descriptor)?;
    let name = mesh.name().unwrap_or("unnamed").to_string();
    let primitives = contents.read_primitives(&mesh, false);

    debug!("Loaded mesh '{}' with {} primitives", name, primitives.len());
    Ok(BlockMesh {
        descriptor: descriptor.clone(),
        name,
        primitives,
    })
}

/// Decode the skinned mesh at the descriptor's index along with its skin.
pub fn load_skeleton_mesh(
    descriptor: &AssetDescriptor,
    contents: &GltfContents,
) -> Result<SkeletonMesh, AssetError> {
    let mesh = contents.mesh_at(descriptor)?;
    let skin = contents.skin_for(&mesh).ok_or_else(|| {
        AssetError::parse(descriptor.identity(), "mesh is not bound to a skin")
    })?;
    let name = mesh.name().unwrap_or("unnamed").to_string();
    let primitives = contents.read_primitives(&mesh, true);
    let joints = contents.read_joints(&skin);

    debug!(
        "Loaded skeleton mesh '{}' with {} primitives, {} joints",
        name,
        primitives.len(),
        joints.len()
    );
    Ok(SkeletonMesh {
        descriptor: descriptor.clone(),
        name,
        primitives,
        joints,
    })
}

/// Decode every mesh and image of a file as a static model.
pub fn load_block_model(
    descriptor: &AssetDescriptor,
    contents: &GltfContents,
) -> Result<BlockModel, AssetError> {
    let mut meshes = Vec::new();
    for mesh in contents.document.meshes() {
        let inline = AssetDescriptor::inline(AssetType::BlockMesh, mesh.index() as u32);
        meshes.push(
            Asset::BlockMesh(BlockMesh {
                descriptor: inline,
                name: mesh.name().unwrap_or("unnamed").to_string(),
                primitives: contents.read_primitives(&mesh, false),
            })
            .into(),
        );
    }
    let textures = contents.model_textures(descriptor)?;

    debug!(
        "Model '{}': {} meshes, {} textures",
        descriptor.path().display(),
        meshes.len(),
        textures.len()
    );
    Ok(BlockModel {
        descriptor: descriptor.clone(),
        meshes,
        textures,
    })
}

/// Decode every skinned mesh and image of a file as a skinned model.
pub fn load_skeleton_model(
    descriptor: &AssetDescriptor,
    contents: &GltfContents,
) -> Result<SkeletonModel, AssetError> {
    let mut meshes = Vec::new();
    for mesh in contents.document.meshes() {
        let Some(skin) = contents.skin_for(&mesh) else {
            continue;
        };
        let inline = AssetDescriptor::inline(AssetType::SkeletonMesh, mesh.index() as u32);
        meshes.push(
            Asset::SkeletonMesh(SkeletonMesh {
                descriptor: inline,
                name: mesh.name().unwrap_or("unnamed").to_string(),
                primitives: contents.read_primitives(&mesh, true),
                joints: contents.read_joints(&skin),
            })
            .into(),
        );
    }
    if meshes.is_empty() {
        return Err(AssetError::parse(descriptor.identity(), "no skinned meshes found"));
    }
    let textures = contents.model_textures(descriptor)?;

    Ok(SkeletonModel {
        descriptor: descriptor.clone(),
        meshes,
        textures,
    })
}

/// Decode the animation at the descriptor's index. The skeleton slot is left
/// as a placeholder for the mesh named in the descriptor's metadata.
pub fn load_animation(
    descriptor: &AssetDescriptor,
    contents: &GltfContents,
) -> Result<SkeletonAnimation, AssetError> {
    let skeleton = descriptor.skeleton().ok_or_else(|| {
        AssetError::parse(descriptor.identity(), "animation has no skeleton mesh")
    })?;
    let animation = contents
        .document
        .animations()
        .nth(descriptor.index() as usize)
        .ok_or_else(|| {
            AssetError::parse(
                descriptor.identity(),
                format!("no animation at index {}", descriptor.index()),
            )
        })?;

    let mut channels = Vec::new();
    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&contents.buffers[buffer.index()]));
        let times: Vec<f32> = reader
            .read_inputs()
            .map(|iter| iter.collect())
            .unwrap_or_default();

        let values = match reader.read_outputs() {
            Some(ReadOutputs::Translations(iter)) => {
                ChannelValues::Translation(iter.map(Vec3::from).collect())
            }
            Some(ReadOutputs::Rotations(rotations)) => {
                ChannelValues::Rotation(rotations.into_f32().map(Quat::from_array).collect())
            }
            Some(ReadOutputs::Scales(iter)) => ChannelValues::Scale(iter.map(Vec3::from).collect()),
            // Morph target weights do not drive the skeleton.
            Some(ReadOutputs::MorphTargetWeights(_)) | None => continue,
        };

        channels.push(AnimationChannel {
            target_node: channel.target().node().index(),
            times,
            values,
        });
    }

    let duration = channels
        .iter()
        .filter_map(|c| c.times.last().copied())
        .fold(0.0, f32::max);

    debug!(
        "Loaded animation '{}' with {} channels ({:.2}s)",
        animation.name().unwrap_or("unnamed"),
        channels.len(),
        duration
    );
    Ok(SkeletonAnimation {
        descriptor: descriptor.clone(),
        name: animation.name().unwrap_or("unnamed").to_string(),
        duration,
        channels,
        skeleton: SubAsset::Placeholder(skeleton.clone()),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::texture::encode_png;
    use std::path::Path;

    /// One triangle (mesh 0, node 0) and a two-key translation animation on node 0.
    pub(crate) const TRIANGLE_GLTF: &str = r#"{
        "asset": { "version": "2.0" },
        "buffers": [{
            "byteLength": 68,
            "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAAAAAAAAAAgD8AAAAAAAAAAAAAAAAAAAAAAAAAQAAAAAA="
        }],
        "bufferViews": [
            { "buffer": 0, "byteOffset": 0, "byteLength": 36 },
            { "buffer": 0, "byteOffset": 36, "byteLength": 8 },
            { "buffer": 0, "byteOffset": 44, "byteLength": 24 }
        ],
        "accessors": [
            { "bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
              "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0] },
            { "bufferView": 1, "componentType": 5126, "count": 2, "type": "SCALAR",
              "min": [0.0], "max": [1.0] },
            { "bufferView": 2, "componentType": 5126, "count": 2, "type": "VEC3" }
        ],
        "meshes": [{ "name": "tri", "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "nodes": [{ "name": "root", "mesh": 0 }],
        "animations": [{
            "name": "walk",
            "channels": [{ "sampler": 0, "target": { "node": 0, "path": "translation" } }],
            "samplers": [{ "input": 1, "output": 2, "interpolation": "LINEAR" }]
        }]
    }"#;

    fn glb(json: &str, bin: &[u8]) -> Vec<u8> {
        let mut json = json.as_bytes().to_vec();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }
        let mut bin = bin.to_vec();
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut out = Vec::with_capacity(total);
        out.extend_from_slice(b"glTF");
        out.extend_from_slice(&2u32.to_le_bytes());
        out.extend_from_slice(&(total as u32).to_le_bytes());
        out.extend_from_slice(&(json.len() as u32).to_le_bytes());
        out.extend_from_slice(b"JSON");
        out.extend_from_slice(&json);
        out.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        out.extend_from_slice(b"BIN\0");
        out.extend_from_slice(&bin);
        out
    }

    #[test]
    fn loads_block_mesh() {
        let desc = AssetDescriptor::new(AssetType::BlockMesh, "tri.gltf", 0);
        let contents = open_gltf(&desc, TRIANGLE_GLTF.as_bytes()).unwrap();
        let mesh = load_block_mesh(&desc, &contents).unwrap();

        assert_eq!(mesh.name, "tri");
        assert_eq!(mesh.primitives.len(), 1);
        assert_eq!(mesh.primitives[0].vertex_count(), 3);
        assert_eq!(mesh.primitives[0].positions[1], [1.0, 0.0, 0.0]);
        assert!(mesh.primitives[0].indices.is_none());
    }

    #[test]
    fn missing_mesh_index_is_a_parse_error() {
        let desc = AssetDescriptor::new(AssetType::BlockMesh, "tri.gltf", 4);
        let contents = open_gltf(&desc, TRIANGLE_GLTF.as_bytes()).unwrap();
        assert!(matches!(
            load_block_mesh(&desc, &contents),
            Err(AssetError::Parse { .. })
        ));
    }

    #[test]
    fn unskinned_mesh_is_not_a_skeleton_mesh() {
        let desc = AssetDescriptor::new(AssetType::SkeletonMesh, "tri.gltf", 0);
        let contents = open_gltf(&desc, TRIANGLE_GLTF.as_bytes()).unwrap();
        assert!(matches!(
            load_skeleton_mesh(&desc, &contents),
            Err(AssetError::Parse { .. })
        ));
    }

    #[test]
    fn loads_animation_with_skeleton_placeholder() {
        let skeleton = AssetDescriptor::new(AssetType::SkeletonMesh, "hero.glb", 0);
        let desc = AssetDescriptor::animation("walk.gltf", 0, skeleton.clone());
        let contents = open_gltf(&desc, TRIANGLE_GLTF.as_bytes()).unwrap();
        let anim = load_animation(&desc, &contents).unwrap();

        assert_eq!(anim.name, "walk");
        assert_eq!(anim.channels.len(), 1);
        assert_eq!(anim.channels[0].target_node, 0);
        assert_eq!(anim.channels[0].times, vec![0.0, 1.0]);
        match &anim.channels[0].values {
            ChannelValues::Translation(keys) => assert_eq!(keys[1], Vec3::new(0.0, 2.0, 0.0)),
            other => panic!("expected translation keys, got: {:?}", other),
        }
        assert!((anim.duration - 1.0).abs() < f32::EPSILON);
        assert_eq!(anim.skeleton.descriptor(), &skeleton);
        assert!(anim.skeleton.is_placeholder());
    }

    #[test]
    fn animation_without_skeleton_fails() {
        let desc = AssetDescriptor::new(AssetType::SkeletonAnimation, "walk.gltf", 0);
        let contents = open_gltf(&desc, TRIANGLE_GLTF.as_bytes()).unwrap();
        assert!(matches!(
            load_animation(&desc, &contents),
            Err(AssetError::Parse { .. })
        ));
    }

    #[test]
    fn model_embeds_and_references_textures() {
        let png = encode_png(2, 2);
        let json = format!(
            r#"{{
                "asset": {{ "version": "2.0" }},
                "buffers": [{{ "byteLength": {len} }}],
                "bufferViews": [{{ "buffer": 0, "byteOffset": 0, "byteLength": {len} }}],
                "images": [
                    {{ "bufferView": 0, "mimeType": "image/png" }},
                    {{ "uri": "wood.png" }},
                    {{ "uri": "../shared/oak%20planks.png" }}
                ]
            }}"#,
            len = png.len()
        );
        let desc = AssetDescriptor::new(AssetType::BlockModel, "models/crate.glb", 0);
        let contents = open_gltf(&desc, &glb(&json, &png)).unwrap();
        let model = load_block_model(&desc, &contents).unwrap();

        assert!(model.meshes.is_empty());
        assert_eq!(model.textures.len(), 3);

        let embedded = model.textures[0].resolved().expect("embedded texture is inline");
        assert_eq!(embedded.as_texture().unwrap().width, 2);

        let external = model.textures[1].descriptor();
        assert!(model.textures[1].is_placeholder());
        assert_eq!(external.asset_type(), AssetType::Texture2D);
        assert_eq!(external.path(), Path::new("models/wood.png"));

        let escaped = model.textures[2].descriptor();
        assert_eq!(escaped.path(), Path::new("models/../shared/oak planks.png"));
        assert_eq!(escaped.identity().path(), "shared/oak planks.png");
    }
}
