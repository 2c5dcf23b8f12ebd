/// Descriptor set layouts, pools and sets
///
/// Sets are freed together with their pool, so `DescriptorSet` has no Drop.
/// Each set remembers the layout it was allocated with and rejects writes to
/// bindings that layout does not declare.

use ash::vk;
use std::sync::Arc;

use umbra_engine::umbra::device::{
    DescriptorPoolDesc, DescriptorSetLayoutDesc, DescriptorWrite,
};
use umbra_engine::umbra::{Error, Result};

use crate::vulkan::VulkanGraphicsDevice;
use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::{descriptor_type_to_vk, image_layout_to_vk, shader_stages_to_vk};

// ===== LAYOUT =====

pub struct DescriptorSetLayout {
    ctx: Arc<GpuContext>,
    pub(crate) layout: vk::DescriptorSetLayout,
    pub(crate) desc: DescriptorSetLayoutDesc,
}

impl DescriptorSetLayout {
    pub fn new(ctx: &Arc<GpuContext>, desc: &DescriptorSetLayoutDesc) -> Result<Self> {
        let bindings: Vec<vk::DescriptorSetLayoutBinding> = desc
            .bindings
            .iter()
            .map(|b| {
                vk::DescriptorSetLayoutBinding::default()
                    .binding(b.binding)
                    .descriptor_type(descriptor_type_to_vk(b.ty))
                    .descriptor_count(b.count)
                    .stage_flags(shader_stages_to_vk(b.stages))
            })
            .collect();

        let create_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
        let layout = unsafe {
            ctx.device
                .create_descriptor_set_layout(&create_info, None)
                .map_err(|e| vk_error("vkCreateDescriptorSetLayout", e))?
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            layout,
            desc: desc.clone(),
        })
    }
}

impl Drop for DescriptorSetLayout {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_set_layout(self.layout, None);
        }
    }
}

// ===== POOL =====

pub struct DescriptorPool {
    ctx: Arc<GpuContext>,
    pub(crate) pool: vk::DescriptorPool,
    pub(crate) desc: DescriptorPoolDesc,
}

impl DescriptorPool {
    pub fn new(ctx: &Arc<GpuContext>, desc: &DescriptorPoolDesc) -> Result<Self> {
        if desc.max_sets == 0 || desc.sizes.is_empty() {
            return Err(Error::InvalidResource(
                "descriptor pool needs at least one set and one pool size".to_string(),
            ));
        }

        let sizes: Vec<vk::DescriptorPoolSize> = desc
            .sizes
            .iter()
            .map(|s| vk::DescriptorPoolSize {
                ty: descriptor_type_to_vk(s.ty),
                descriptor_count: s.count,
            })
            .collect();

        let create_info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(desc.max_sets)
            .pool_sizes(&sizes);
        let pool = unsafe {
            ctx.device
                .create_descriptor_pool(&create_info, None)
                .map_err(|e| vk_error("vkCreateDescriptorPool", e))?
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            pool,
            desc: desc.clone(),
        })
    }

    pub fn allocate(&self, layout: &DescriptorSetLayout) -> Result<DescriptorSet> {
        let layouts = [layout.layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&layouts);

        let sets = unsafe {
            self.ctx
                .device
                .allocate_descriptor_sets(&alloc_info)
                .map_err(|e| vk_error("vkAllocateDescriptorSets", e))?
        };
        let set = sets
            .into_iter()
            .next()
            .ok_or_else(|| Error::BackendError("vkAllocateDescriptorSets returned no set".to_string()))?;

        Ok(DescriptorSet {
            set,
            layout: layout.desc.clone(),
        })
    }
}

impl Drop for DescriptorPool {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_descriptor_pool(self.pool, None);
        }
    }
}

// ===== SET =====

pub struct DescriptorSet {
    pub(crate) set: vk::DescriptorSet,
    layout: DescriptorSetLayoutDesc,
}

impl DescriptorSet {
    /// Reject writes whose binding or type the layout does not declare
    pub(crate) fn check_writes(&self, writes: &[DescriptorWrite<'_, VulkanGraphicsDevice>]) -> Result<()> {
        for write in writes {
            if !self.layout.declares(write.binding(), write.descriptor_type()) {
                return Err(Error::InvalidResource(format!(
                    "descriptor write to binding {} as {:?} not declared by the set layout",
                    write.binding(),
                    write.descriptor_type()
                )));
            }
        }
        Ok(())
    }

    pub(crate) fn update(&self, ctx: &GpuContext, writes: &[DescriptorWrite<'_, VulkanGraphicsDevice>]) -> Result<()> {
        self.check_writes(writes)?;

        // Info arrays first: the write structs borrow into them
        let buffer_infos: Vec<Option<vk::DescriptorBufferInfo>> = writes
            .iter()
            .map(|w| match w {
                DescriptorWrite::Buffer { buffer, offset, range, .. } => Some(vk::DescriptorBufferInfo {
                    buffer: buffer.buffer,
                    offset: *offset,
                    range: *range,
                }),
                DescriptorWrite::Image { .. } => None,
            })
            .collect();
        let image_infos: Vec<Option<vk::DescriptorImageInfo>> = writes
            .iter()
            .map(|w| match w {
                DescriptorWrite::Image { view, sampler, layout, .. } => Some(vk::DescriptorImageInfo {
                    sampler: sampler.sampler,
                    image_view: *view,
                    image_layout: image_layout_to_vk(*layout),
                }),
                DescriptorWrite::Buffer { .. } => None,
            })
            .collect();

        let vk_writes: Vec<vk::WriteDescriptorSet> = writes
            .iter()
            .enumerate()
            .map(|(i, w)| {
                let base = vk::WriteDescriptorSet::default()
                    .dst_set(self.set)
                    .dst_binding(w.binding())
                    .dst_array_element(0)
                    .descriptor_type(descriptor_type_to_vk(w.descriptor_type()));
                match (&buffer_infos[i], &image_infos[i]) {
                    (Some(info), _) => base.buffer_info(std::slice::from_ref(info)),
                    (None, Some(info)) => base.image_info(std::slice::from_ref(info)),
                    (None, None) => base,
                }
            })
            .collect();

        unsafe {
            ctx.device.update_descriptor_sets(&vk_writes, &[]);
        }
        Ok(())
    }
}
