//! Scene data module
//!
//! CPU-side geometry, node hierarchy and materials consumed by the deferred
//! geometry pass, plus the asset source collaborator that provides them.

mod scene_data;
mod builder;
mod asset;

pub use scene_data::{Material, MaterialUniform, Node, Primitive, SceneData, Vertex};
pub use builder::SceneBuilder;
pub use asset::{AssetSource, StaticAssetSource};
