use std::fmt;

use crate::types::AssetType;

/// Unique name of one loadable resource: type, normalized path and the index
/// of the resource inside its file.
///
/// Paths are compared case-insensitively, so `Models/Hero.glb` and
/// `models\hero.glb` name the same asset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AssetIdentity {
    asset_type: AssetType,
    path: String,
    index: u32,
}

impl AssetIdentity {
    pub fn new(asset_type: AssetType, path: impl AsRef<str>, index: u32) -> Self {
        Self {
            asset_type,
            path: normalize_path(path.as_ref()),
            index,
        }
    }

    pub fn asset_type(&self) -> AssetType {
        self.asset_type
    }

    /// The normalized path (lowercase, forward slashes).
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn index(&self) -> u32 {
        self.index
    }
}

impl fmt::Display for AssetIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}#{}", self.asset_type, self.path, self.index)
    }
}

/// Lowercase, use forward slashes and resolve `.` and `..` segments
/// lexically. A `..` that climbs above a relative path is kept.
fn normalize_path(path: &str) -> String {
    let path = path.replace('\\', "/").to_ascii_lowercase();
    let absolute = path.starts_with('/');

    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => match segments.last().copied() {
                Some(last) if last != ".." => {
                    segments.pop();
                }
                _ if absolute => {}
                _ => segments.push(".."),
            },
            _ => segments.push(segment),
        }
    }

    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn path_is_case_insensitive() {
        let a = AssetIdentity::new(AssetType::BlockMesh, "Models/Hero.GLB", 0);
        let b = AssetIdentity::new(AssetType::BlockMesh, "models/hero.glb", 0);
        assert_eq!(a, b);

        let set: HashSet<_> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn separators_are_normalized() {
        let id = AssetIdentity::new(AssetType::Texture2D, ".\\textures\\\\stone.png", 0);
        assert_eq!(id.path(), "textures/stone.png");
    }

    #[test]
    fn dotdot_and_inner_dot_are_normalized() {
        let via_model = AssetIdentity::new(AssetType::Texture2D, "models/../textures/wood.png", 0);
        let direct = AssetIdentity::new(AssetType::Texture2D, "textures/wood.png", 0);
        assert_eq!(via_model, direct);

        let inner_dot = AssetIdentity::new(AssetType::Texture2D, "textures/./wood.png", 0);
        assert_eq!(inner_dot.path(), "textures/wood.png");

        let above = AssetIdentity::new(AssetType::Texture2D, "../shared/../../wood.png", 0);
        assert_eq!(above.path(), "../../wood.png");

        let rooted = AssetIdentity::new(AssetType::Texture2D, "/../assets/wood.png", 0);
        assert_eq!(rooted.path(), "/assets/wood.png");
    }

    #[test]
    fn type_and_index_distinguish() {
        let mesh = AssetIdentity::new(AssetType::BlockMesh, "a.glb", 0);
        let skel = AssetIdentity::new(AssetType::SkeletonMesh, "a.glb", 0);
        let second = AssetIdentity::new(AssetType::BlockMesh, "a.glb", 1);
        assert_ne!(mesh, skel);
        assert_ne!(mesh, second);
    }

    #[test]
    fn display_format() {
        let id = AssetIdentity::new(AssetType::SkeletonAnimation, "anim/Walk.glb", 2);
        assert_eq!(id.to_string(), "SkeletonAnimation:anim/walk.glb#2");
    }
}
