//! Quarry Core - Asset identity and descriptor types
//!
//! This crate provides the value types shared by every stage of the loader:
//! - Asset type tags and raw file kinds
//! - Normalized, case-insensitive asset identities
//! - Descriptors carrying enough information to load an asset
//! - Math primitives used by decoded asset data (re-exported from glam)

pub mod descriptor;
pub mod identity;
pub mod types;

pub use descriptor::{AssetDescriptor, FormatMeta};
pub use glam::{Mat4, Quat, Vec3};
pub use identity::AssetIdentity;
pub use types::{AssetType, FileKind};
