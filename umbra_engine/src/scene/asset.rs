/// Asset source collaborator
///
/// The renderer never parses files itself: it asks an `AssetSource` for an
/// already decoded `SceneData` once, before the geometry pass is built.

use crate::error::Result;
use super::scene_data::SceneData;

pub trait AssetSource {
    fn load_scene(&mut self) -> Result<SceneData>;
}

/// Hands out a prebuilt scene (procedural content, tests)
pub struct StaticAssetSource {
    scene: Option<SceneData>,
}

impl StaticAssetSource {
    pub fn new(scene: SceneData) -> Self {
        Self { scene: Some(scene) }
    }
}

impl AssetSource for StaticAssetSource {
    fn load_scene(&mut self) -> Result<SceneData> {
        self.scene
            .take()
            .ok_or_else(|| crate::error::Error::InvalidState("scene already loaded".to_string()))
    }
}
