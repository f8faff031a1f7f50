use quarry_core::{AssetDescriptor, Mat4};

/// A static mesh asset (renderer-agnostic). Contains raw vertex data
/// extracted from a glTF file.
#[derive(Debug, Clone)]
pub struct BlockMesh {
    pub descriptor: AssetDescriptor,
    pub name: String,
    pub primitives: Vec<MeshPrimitive>,
}

/// A skinned mesh asset: vertex data plus the joints it is bound to.
#[derive(Debug, Clone)]
pub struct SkeletonMesh {
    pub descriptor: AssetDescriptor,
    pub name: String,
    pub primitives: Vec<MeshPrimitive>,
    pub joints: Vec<Joint>,
}

impl SkeletonMesh {
    /// Index of the joint with the given name
    pub fn joint_index(&self, name: &str) -> Option<usize> {
        self.joints.iter().position(|j| j.name == name)
    }
}

/// A single draw primitive within a mesh.
#[derive(Debug, Clone, Default)]
pub struct MeshPrimitive {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Option<Vec<[f32; 2]>>,
    pub colors: Option<Vec<[f32; 4]>>,
    pub indices: Option<Vec<u32>>,
    /// Four joint indices per vertex (skinned meshes only).
    pub joints: Option<Vec<[u16; 4]>>,
    /// Four joint weights per vertex (skinned meshes only).
    pub weights: Option<Vec<[f32; 4]>>,
}

impl MeshPrimitive {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// One joint of a skeleton.
#[derive(Debug, Clone)]
pub struct Joint {
    pub name: String,
    /// glTF node index the joint was read from; animation channels target it.
    pub node: usize,
    pub inverse_bind: Mat4,
}
