pub mod asset;
pub mod gltf;
pub mod pending;

pub use asset::{AssetNode, LoadedAsset, MaterialData, MeshData, PrimitiveGroup, TextureData};
pub use gltf::{load_asset, load_asset_from_slice};
pub use pending::{spawn_load, LoadOutcome, PendingLoad};
