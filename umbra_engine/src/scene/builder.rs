/// Procedural scene assembly
///
/// Used by asset sources that generate geometry instead of loading it.

use glam::{Mat4, Vec3, Vec4};

use crate::error::{Error, Result};
use super::scene_data::{Material, Node, Primitive, SceneData, Vertex};

#[derive(Default)]
pub struct SceneBuilder {
    data: SceneData,
}

impl SceneBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the material index
    pub fn add_material(&mut self, name: &str, base_color: Vec4, roughness: f32, metallic: f32) -> usize {
        self.data.materials.push(Material {
            name: name.to_string(),
            base_color,
            roughness,
            metallic,
        });
        self.data.materials.len() - 1
    }

    /// Returns the node index; `parent` must already exist
    pub fn add_node(&mut self, name: &str, parent: Option<usize>, local: Mat4) -> Result<usize> {
        if let Some(parent) = parent {
            if parent >= self.data.nodes.len() {
                return Err(Error::InvalidResource(format!(
                    "node '{}' attached to unknown parent {}",
                    name, parent
                )));
            }
        }
        self.data.nodes.push(Node {
            name: name.to_string(),
            parent,
            local,
            primitives: Vec::new(),
        });
        Ok(self.data.nodes.len() - 1)
    }

    /// Axis-aligned box centred on the node origin, 24 vertices with flat normals
    pub fn add_box(&mut self, node: usize, half_extents: Vec3, material: usize) -> Result<()> {
        // (outward normal, up); right = up x normal keeps faces counter-clockwise from outside
        const FACES: [([f32; 3], [f32; 3]); 6] = [
            ([1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
            ([0.0, 1.0, 0.0], [0.0, 0.0, -1.0]),
            ([0.0, -1.0, 0.0], [0.0, 0.0, 1.0]),
            ([0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
            ([0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ];
        let first_index = self.data.indices.len() as u32;
        for (normal, up) in FACES {
            let (n, u) = (Vec3::from(normal), Vec3::from(up));
            let r = u.cross(n);
            self.push_quad(n * half_extents, u * half_extents, r * half_extents, n, material);
        }
        self.attach(node, first_index, material)
    }

    /// Square in the node's XZ plane facing +Y
    pub fn add_plane(&mut self, node: usize, half_size: f32, material: usize) -> Result<()> {
        let first_index = self.data.indices.len() as u32;
        self.push_quad(
            Vec3::ZERO,
            Vec3::new(0.0, 0.0, -half_size),
            Vec3::new(half_size, 0.0, 0.0),
            Vec3::Y,
            material,
        );
        self.attach(node, first_index, material)
    }

    /// Validate and hand over the scene
    pub fn build(self) -> Result<SceneData> {
        self.data.validate()?;
        Ok(self.data)
    }

    fn push_quad(&mut self, center: Vec3, up: Vec3, right: Vec3, normal: Vec3, material: usize) {
        let color = self
            .data
            .materials
            .get(material)
            .map_or([1.0; 3], |m| m.base_color.truncate().to_array());
        let base = self.data.vertices.len() as u32;
        let corners = [
            (center - right - up, [0.0, 1.0]),
            (center + right - up, [1.0, 1.0]),
            (center + right + up, [1.0, 0.0]),
            (center - right + up, [0.0, 0.0]),
        ];
        for (position, uv) in corners {
            self.data.vertices.push(Vertex {
                position: position.to_array(),
                normal: normal.to_array(),
                uv,
                color,
            });
        }
        self.data
            .indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    fn attach(&mut self, node: usize, first_index: u32, material: usize) -> Result<()> {
        let index_count = self.data.indices.len() as u32 - first_index;
        let target = self
            .data
            .nodes
            .get_mut(node)
            .ok_or_else(|| Error::InvalidResource(format!("geometry attached to unknown node {}", node)))?;
        target.primitives.push(Primitive { first_index, index_count, material });
        Ok(())
    }
}

#[cfg(test)]
#[path = "builder_tests.rs"]
mod tests;
