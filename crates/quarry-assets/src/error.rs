use std::path::PathBuf;

use quarry_core::{AssetIdentity, AssetType};

/// Errors that can occur during asset loading.
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("asset '{0}' is already loading or loaded")]
    AlreadyLoading(AssetIdentity),

    #[error("asset not found: {0}")]
    NotFound(PathBuf),

    #[error("I/O error loading '{0}': {1}")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("'{0}' is not valid UTF-8 text")]
    NotText(PathBuf),

    #[error("failed to parse '{identity}': {message}")]
    Parse {
        identity: AssetIdentity,
        message: String,
    },

    #[error("asset '{identity}' could not resolve its dependency '{dependency}'")]
    Dependency {
        identity: AssetIdentity,
        dependency: AssetIdentity,
    },

    #[error("asset '{0}' is neither loaded nor loading")]
    NotLoading(AssetIdentity),

    #[error("timed out waiting for '{0}'")]
    Timeout(AssetIdentity),

    #[error("cannot splice a {found} into a {expected} slot")]
    TypeMismatch {
        expected: AssetType,
        found: AssetType,
    },

    #[error("sub-asset slot {0} does not exist")]
    SlotOutOfRange(usize),

    #[error("sub-asset slot {0} is already resolved")]
    SlotAlreadyResolved(usize),

    #[error("invalid loader configuration: {0}")]
    InvalidConfig(String),

    #[error("failed to spawn loader thread: {0}")]
    ThreadSpawn(#[source] std::io::Error),

    #[error("the asset loader is shutting down")]
    ShuttingDown,
}

impl AssetError {
    pub(crate) fn parse(identity: &AssetIdentity, message: impl Into<String>) -> Self {
        AssetError::Parse {
            identity: identity.clone(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_asset() {
        let id = AssetIdentity::new(AssetType::Texture2D, "stone.png", 0);

        let err = AssetError::AlreadyLoading(id.clone());
        assert!(err.to_string().contains("Texture2D:stone.png#0"));

        let err = AssetError::parse(&id, "bad header");
        assert!(err.to_string().contains("bad header"));

        let err = AssetError::TypeMismatch {
            expected: AssetType::SkeletonMesh,
            found: AssetType::BlockMesh,
        };
        assert_eq!(err.to_string(), "cannot splice a BlockMesh into a SkeletonMesh slot");
    }
}
