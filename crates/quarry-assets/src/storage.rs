use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use quarry_core::FileKind;
use tracing::info;

use crate::error::AssetError;

/// Raw contents of a file as handed from the disk stage to a parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawData {
    Text(String),
    Binary(Vec<u8>),
}

impl RawData {
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            RawData::Text(text) => text.as_bytes(),
            RawData::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }
}

/// Source of raw asset bytes.
pub trait StorageReader: Send + Sync {
    fn read(&self, path: &Path, kind: FileKind) -> Result<RawData, AssetError>;
}

/// Reads assets from the local file system.
#[derive(Debug, Clone)]
pub struct FsStorage {
    base_path: PathBuf,
}

impl FsStorage {
    /// Create a storage reader rooted at the given base path.
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        let base_path = base_path.into();
        info!("FsStorage created with base path: {}", base_path.display());
        Self { base_path }
    }

    /// Resolve a relative asset path against the base path.
    fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_path.join(path)
        }
    }

    /// The base path this storage resolves relative paths against.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }
}

impl StorageReader for FsStorage {
    fn read(&self, path: &Path, kind: FileKind) -> Result<RawData, AssetError> {
        let full_path = self.resolve(path);
        let map_io = |e: io::Error| match e.kind() {
            io::ErrorKind::NotFound => AssetError::NotFound(full_path.clone()),
            io::ErrorKind::InvalidData if kind == FileKind::Text => {
                AssetError::NotText(full_path.clone())
            }
            _ => AssetError::Io(full_path.clone(), e),
        };

        match kind {
            FileKind::Text => fs::read_to_string(&full_path).map(RawData::Text).map_err(map_io),
            FileKind::Binary => fs::read(&full_path).map(RawData::Binary).map_err(map_io),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_returns_not_found() {
        let storage = FsStorage::new("/nonexistent");
        match storage.read(Path::new("does_not_exist.glb"), FileKind::Binary) {
            Err(AssetError::NotFound(path)) => {
                assert_eq!(path, PathBuf::from("/nonexistent/does_not_exist.glb"))
            }
            other => panic!("expected NotFound, got: {:?}", other),
        }
    }

    #[test]
    fn reads_text_and_binary() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("scene.gltf"), "{}").unwrap();
        fs::write(dir.path().join("blob.bin"), [0u8, 159, 146, 150]).unwrap();

        let storage = FsStorage::new(dir.path());
        assert_eq!(
            storage.read(Path::new("scene.gltf"), FileKind::Text).unwrap(),
            RawData::Text("{}".into())
        );
        assert_eq!(
            storage.read(Path::new("blob.bin"), FileKind::Binary).unwrap(),
            RawData::Binary(vec![0, 159, 146, 150])
        );
    }

    #[test]
    fn invalid_utf8_text_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.gltf"), [0xffu8, 0xfe]).unwrap();

        let storage = FsStorage::new(dir.path());
        assert!(matches!(
            storage.read(Path::new("bad.gltf"), FileKind::Text),
            Err(AssetError::NotText(_))
        ));
    }

    #[test]
    fn resolve_absolute_path() {
        let storage = FsStorage::new("/home/user/assets");
        assert_eq!(
            storage.resolve(Path::new("/absolute/path.glb")),
            PathBuf::from("/absolute/path.glb")
        );
    }

    #[test]
    fn resolve_relative_path() {
        let storage = FsStorage::new("/home/user/assets");
        assert_eq!(
            storage.resolve(Path::new("models/box.glb")),
            PathBuf::from("/home/user/assets/models/box.glb")
        );
    }
}
