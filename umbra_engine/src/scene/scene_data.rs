/// CPU-side scene payload handed over by an `AssetSource`.
///
/// Vertices and indices are interleaved into one vertex buffer and one index
/// buffer. Nodes form a hierarchy through parent links; a parent always
/// precedes its children, so world matrices resolve in a single forward walk.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec4};

use crate::error::{Error, Result};
use crate::graphics_device::{Format, VertexAttribute, VertexBinding, VertexInputRate, VertexLayout};

/// Interleaved vertex as consumed by the G-buffer vertex shader
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub uv: [f32; 2],
    pub color: [f32; 3],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;

    /// Binding 0, locations 0..=3
    pub fn layout() -> VertexLayout {
        let attribute = |location, format, offset| VertexAttribute { location, binding: 0, format, offset };
        VertexLayout {
            bindings: vec![VertexBinding {
                binding: 0,
                stride: Self::STRIDE,
                input_rate: VertexInputRate::Vertex,
            }],
            attributes: vec![
                attribute(0, Format::R32G32B32_SFLOAT, 0),
                attribute(1, Format::R32G32B32_SFLOAT, 12),
                attribute(2, Format::R32G32_SFLOAT, 24),
                attribute(3, Format::R32G32B32_SFLOAT, 32),
            ],
        }
    }
}

/// Range of the index buffer drawn with one material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Primitive {
    pub first_index: u32,
    pub index_count: u32,
    pub material: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    /// Index of the parent node, which must be lower than this node's index
    pub parent: Option<usize>,
    pub local: Mat4,
    pub primitives: Vec<Primitive>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub name: String,
    pub base_color: Vec4,
    pub roughness: f32,
    pub metallic: f32,
}

/// Material factors as laid out in the per-material uniform buffer
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniform {
    pub base_color: Vec4,
    /// x = roughness, y = metallic
    pub params: Vec4,
}

impl From<&Material> for MaterialUniform {
    fn from(material: &Material) -> Self {
        Self {
            base_color: material.base_color,
            params: Vec4::new(material.roughness, material.metallic, 0.0, 0.0),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub nodes: Vec<Node>,
    pub materials: Vec<Material>,
}

impl SceneData {
    /// Check every cross reference (parents, index ranges, materials, vertex indices)
    pub fn validate(&self) -> Result<()> {
        if self.vertices.is_empty() || self.indices.is_empty() {
            return Err(Error::InvalidResource("scene without geometry".to_string()));
        }
        if let Some(bad) = self.indices.iter().find(|&&i| i as usize >= self.vertices.len()) {
            return Err(Error::InvalidResource(format!(
                "index {} out of range for {} vertices",
                bad,
                self.vertices.len()
            )));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(parent) = node.parent {
                if parent >= i {
                    return Err(Error::InvalidResource(format!(
                        "node '{}' ({}) has parent {} which does not precede it",
                        node.name, i, parent
                    )));
                }
            }
            for primitive in &node.primitives {
                let end = primitive.first_index as usize + primitive.index_count as usize;
                if end > self.indices.len() {
                    return Err(Error::InvalidResource(format!(
                        "node '{}' draws indices {}..{} of {}",
                        node.name,
                        primitive.first_index,
                        end,
                        self.indices.len()
                    )));
                }
                if primitive.material >= self.materials.len() {
                    return Err(Error::InvalidResource(format!(
                        "node '{}' uses material {} of {}",
                        node.name,
                        primitive.material,
                        self.materials.len()
                    )));
                }
            }
        }
        Ok(())
    }

    /// World matrix of every node, in node order
    pub fn world_matrices(&self) -> Result<Vec<Mat4>> {
        let mut worlds: Vec<Mat4> = Vec::with_capacity(self.nodes.len());
        for (i, node) in self.nodes.iter().enumerate() {
            let world = match node.parent {
                Some(parent) => {
                    let parent_world = worlds.get(parent).ok_or_else(|| {
                        Error::InvalidResource(format!("node {} has unresolved parent {}", i, parent))
                    })?;
                    *parent_world * node.local
                }
                None => node.local,
            };
            worlds.push(world);
        }
        Ok(worlds)
    }

    /// Number of indexed draws recorded for the geometry pass
    pub fn draw_count(&self) -> usize {
        self.nodes.iter().map(|n| n.primitives.len()).sum()
    }

    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}

#[cfg(test)]
#[path = "scene_data_tests.rs"]
mod tests;
