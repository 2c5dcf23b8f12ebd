/// Buffer - Vulkan implementation of the engine Buffer trait

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use umbra_engine::umbra::device::{Buffer as DeviceBuffer, BufferDesc};
use umbra_engine::umbra::{Error, Result};

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::buffer_usage_to_vk;

pub struct Buffer {
    ctx: Arc<GpuContext>,
    pub(crate) buffer: vk::Buffer,
    allocation: Option<Allocation>,
    desc: BufferDesc,
}

impl Buffer {
    pub fn new(ctx: &Arc<GpuContext>, desc: &BufferDesc) -> Result<Self> {
        if desc.size == 0 {
            return Err(Error::InvalidResource("buffer of size 0".to_string()));
        }

        let create_info = vk::BufferCreateInfo::default()
            .size(desc.size)
            .usage(buffer_usage_to_vk(desc.usage))
            .sharing_mode(vk::SharingMode::EXCLUSIVE);

        let buffer = unsafe {
            ctx.device
                .create_buffer(&create_info, None)
                .map_err(|e| vk_error("vkCreateBuffer", e))?
        };

        let mut created = Self {
            ctx: Arc::clone(ctx),
            buffer,
            allocation: None,
            desc: *desc,
        };

        let requirements = unsafe { ctx.device.get_buffer_memory_requirements(buffer) };
        let allocation = ctx.allocate("buffer", requirements, desc.memory, true)?;
        let bound = unsafe { ctx.device.bind_buffer_memory(buffer, allocation.memory(), allocation.offset()) };
        created.allocation = Some(allocation);
        bound.map_err(|e| vk_error("vkBindBufferMemory", e))?;

        Ok(created)
    }
}

impl DeviceBuffer for Buffer {
    fn size(&self) -> u64 {
        self.desc.size
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        let end = offset.checked_add(data.len() as u64);
        if end.map_or(true, |end| end > self.desc.size) {
            return Err(Error::InvalidResource(format!(
                "buffer write of {} bytes at offset {} exceeds size {}",
                data.len(),
                offset,
                self.desc.size
            )));
        }

        let mapped = self
            .allocation
            .as_ref()
            .filter(|_| self.desc.is_host_visible())
            .and_then(|allocation| allocation.mapped_ptr())
            .ok_or_else(|| Error::InvalidResource("buffer is not host visible".to_string()))?;

        unsafe {
            std::ptr::copy_nonoverlapping(
                data.as_ptr(),
                (mapped.as_ptr() as *mut u8).add(offset as usize),
                data.len(),
            );
        }
        Ok(())
    }
}

impl Drop for Buffer {
    fn drop(&mut self) {
        if let Some(allocation) = self.allocation.take() {
            self.ctx.free(allocation);
        }
        unsafe {
            self.ctx.device.destroy_buffer(self.buffer, None);
        }
    }
}
