/// Semaphore and Fence RAII wrappers

use ash::vk;
use std::sync::Arc;

use umbra_engine::umbra::Result;

use crate::vulkan_context::{vk_error, GpuContext};

pub struct Semaphore {
    ctx: Arc<GpuContext>,
    pub(crate) semaphore: vk::Semaphore,
}

impl Semaphore {
    pub fn new(ctx: &Arc<GpuContext>) -> Result<Self> {
        let semaphore = unsafe {
            ctx.device
                .create_semaphore(&vk::SemaphoreCreateInfo::default(), None)
                .map_err(|e| vk_error("vkCreateSemaphore", e))?
        };
        Ok(Self { ctx: Arc::clone(ctx), semaphore })
    }
}

impl Drop for Semaphore {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_semaphore(self.semaphore, None);
        }
    }
}

pub struct Fence {
    ctx: Arc<GpuContext>,
    pub(crate) fence: vk::Fence,
}

impl Fence {
    /// `signaled` fences let the first wait of a frame slot return at once
    pub fn new(ctx: &Arc<GpuContext>, signaled: bool) -> Result<Self> {
        let flags = if signaled {
            vk::FenceCreateFlags::SIGNALED
        } else {
            vk::FenceCreateFlags::empty()
        };
        let fence = unsafe {
            ctx.device
                .create_fence(&vk::FenceCreateInfo::default().flags(flags), None)
                .map_err(|e| vk_error("vkCreateFence", e))?
        };
        Ok(Self { ctx: Arc::clone(ctx), fence })
    }
}

impl Drop for Fence {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_fence(self.fence, None);
        }
    }
}
