/// Descriptor layouts, pool sizing and set writes

use bitflags::bitflags;
use rustc_hash::FxHashMap;

use crate::graphics_device::{GraphicsDevice, ImageLayout};

bitflags! {
    /// Shader stages (bit values follow the Vulkan numbering)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ShaderStageFlags: u32 {
        const VERTEX = 0x01;
        const FRAGMENT = 0x10;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DescriptorType {
    UniformBuffer,
    CombinedImageSampler,
}

/// One slot of a descriptor set layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorBinding {
    pub binding: u32,
    pub ty: DescriptorType,
    pub stages: ShaderStageFlags,
    pub count: u32,
}

impl DescriptorBinding {
    pub fn uniform_buffer(binding: u32, stages: ShaderStageFlags) -> Self {
        Self { binding, ty: DescriptorType::UniformBuffer, stages, count: 1 }
    }

    pub fn combined_image_sampler(binding: u32, stages: ShaderStageFlags) -> Self {
        Self { binding, ty: DescriptorType::CombinedImageSampler, stages, count: 1 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DescriptorSetLayoutDesc {
    pub bindings: Vec<DescriptorBinding>,
}

impl DescriptorSetLayoutDesc {
    pub fn new(bindings: Vec<DescriptorBinding>) -> Self {
        Self { bindings }
    }

    /// Whether the layout declares `binding` with a matching type
    pub fn declares(&self, binding: u32, ty: DescriptorType) -> bool {
        self.bindings.iter().any(|b| b.binding == binding && b.ty == ty)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DescriptorPoolSize {
    pub ty: DescriptorType,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescriptorPoolDesc {
    pub max_sets: u32,
    pub sizes: Vec<DescriptorPoolSize>,
}

/// Size a pool for `sets` concurrent sets of each layout
///
/// Descriptor counts are aggregated per type across every layout; the
/// result is sorted by type so it is stable across runs.
pub fn plan_descriptor_pool(layouts: &[(&DescriptorSetLayoutDesc, u32)]) -> DescriptorPoolDesc {
    let mut totals: FxHashMap<DescriptorType, u32> = FxHashMap::default();
    let mut max_sets = 0;

    for (layout, sets) in layouts {
        max_sets += sets;
        for binding in &layout.bindings {
            *totals.entry(binding.ty).or_insert(0) += binding.count * sets;
        }
    }

    let mut sizes: Vec<DescriptorPoolSize> = totals
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(ty, count)| DescriptorPoolSize { ty, count })
        .collect();
    sizes.sort_by_key(|size| size.ty);

    DescriptorPoolDesc { max_sets, sizes }
}

/// One binding update of a descriptor set
pub enum DescriptorWrite<'a, D: GraphicsDevice> {
    Buffer {
        binding: u32,
        buffer: &'a D::Buffer,
        offset: u64,
        range: u64,
    },
    Image {
        binding: u32,
        view: D::ImageView,
        sampler: &'a D::Sampler,
        layout: ImageLayout,
    },
}

impl<'a, D: GraphicsDevice> DescriptorWrite<'a, D> {
    pub fn binding(&self) -> u32 {
        match self {
            DescriptorWrite::Buffer { binding, .. } | DescriptorWrite::Image { binding, .. } => *binding,
        }
    }

    pub fn descriptor_type(&self) -> DescriptorType {
        match self {
            DescriptorWrite::Buffer { .. } => DescriptorType::UniformBuffer,
            DescriptorWrite::Image { .. } => DescriptorType::CombinedImageSampler,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressMode {
    Repeat,
    ClampToEdge,
}

/// Descriptor for creating a sampler
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerDesc {
    pub filter: Filter,
    pub address_mode: AddressMode,
    /// None disables anisotropic filtering
    pub max_anisotropy: Option<f32>,
}

impl Default for SamplerDesc {
    fn default() -> Self {
        Self {
            filter: Filter::Nearest,
            address_mode: AddressMode::ClampToEdge,
            max_anisotropy: None,
        }
    }
}

#[cfg(test)]
#[path = "descriptor_tests.rs"]
mod tests;
