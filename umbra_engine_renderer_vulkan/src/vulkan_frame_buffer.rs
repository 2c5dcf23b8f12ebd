/// Framebuffer - Vulkan implementation of the engine Framebuffer trait
///
/// Wraps a VkFramebuffer binding a render pass to image views. Destroyed
/// when dropped; the views themselves belong to the swap chain or the
/// attachments.

use ash::vk;
use std::sync::Arc;

use umbra_engine::umbra::device::{Extent2D, Framebuffer as DeviceFramebuffer};
use umbra_engine::umbra::{Error, Result};

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_render_pass::RenderPass;

pub struct Framebuffer {
    ctx: Arc<GpuContext>,
    pub(crate) framebuffer: vk::Framebuffer,
    extent: Extent2D,
    attachment_count: usize,
}

impl Framebuffer {
    pub fn new(
        ctx: &Arc<GpuContext>,
        render_pass: &RenderPass,
        views: &[vk::ImageView],
        extent: Extent2D,
    ) -> Result<Self> {
        if views.len() != render_pass.attachment_count {
            return Err(Error::InvalidResource(format!(
                "framebuffer has {} views, render pass expects {}",
                views.len(),
                render_pass.attachment_count
            )));
        }
        if extent.is_zero_area() {
            return Err(Error::InvalidResource("framebuffer with zero extent".to_string()));
        }

        let create_info = vk::FramebufferCreateInfo::default()
            .render_pass(render_pass.render_pass)
            .attachments(views)
            .width(extent.width)
            .height(extent.height)
            .layers(1);

        let framebuffer = unsafe {
            ctx.device
                .create_framebuffer(&create_info, None)
                .map_err(|e| vk_error("vkCreateFramebuffer", e))?
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            framebuffer,
            extent,
            attachment_count: views.len(),
        })
    }
}

impl DeviceFramebuffer for Framebuffer {
    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn attachment_count(&self) -> usize {
        self.attachment_count
    }
}

impl Drop for Framebuffer {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_framebuffer(self.framebuffer, None);
        }
    }
}
