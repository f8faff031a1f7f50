//! Quarry Assets - Concurrent asset loading pipeline
//!
//! Loads textures, meshes, models and animations on background workers.
//! Every identity is loaded at most once; composite assets request their
//! sub-assets at high priority and share the resolved instances.

mod animation;
mod asset;
mod config;
mod decoder;
mod error;
mod gltf_loader;
mod loader;
mod mesh;
mod model;
mod pipeline;
mod queue;
mod registry;
mod server;
mod stats;
mod storage;
mod table;
mod texture;

pub use animation::{AnimationChannel, ChannelValues, SkeletonAnimation};
pub use asset::Asset;
pub use config::LoaderConfig;
pub use decoder::{Decoded, FormatDecoder, StandardDecoder};
pub use error::AssetError;
pub use gltf_loader::{
    load_animation, load_block_mesh, load_block_model, load_skeleton_mesh, load_skeleton_model,
    open_gltf, GltfContents,
};
pub use loader::AssetLoader;
pub use mesh::{BlockMesh, Joint, MeshPrimitive, SkeletonMesh};
pub use model::{BlockModel, PlaceholderSlot, SkeletonModel, SubAsset};
pub use queue::WorkQueue;
pub use registry::IdentityRegistry;
pub use server::AssetServer;
pub use stats::{LoaderStats, StatsSnapshot};
pub use storage::{FsStorage, RawData, StorageReader};
pub use table::{CompletionSignal, LoadedTable};
pub use texture::{decode_texture, Texture2D, TextureFormat};
