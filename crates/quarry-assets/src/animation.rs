use quarry_core::{AssetDescriptor, Quat, Vec3};

use crate::model::SubAsset;

/// A keyframed animation posed against a skeleton mesh.
#[derive(Debug, Clone)]
pub struct SkeletonAnimation {
    pub descriptor: AssetDescriptor,
    pub name: String,
    /// Length in seconds (time of the last keyframe of any channel).
    pub duration: f32,
    pub channels: Vec<AnimationChannel>,
    pub skeleton: SubAsset,
}

/// Keyframes driving one property of one skeleton node.
#[derive(Debug, Clone)]
pub struct AnimationChannel {
    /// glTF node index, matched against `Joint::node`.
    pub target_node: usize,
    pub times: Vec<f32>,
    pub values: ChannelValues,
}

#[derive(Debug, Clone)]
pub enum ChannelValues {
    Translation(Vec<Vec3>),
    Rotation(Vec<Quat>),
    Scale(Vec<Vec3>),
}

impl ChannelValues {
    pub fn len(&self) -> usize {
        match self {
            ChannelValues::Translation(v) | ChannelValues::Scale(v) => v.len(),
            ChannelValues::Rotation(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
