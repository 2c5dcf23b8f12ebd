/// RenderPass - VkRenderPass built from an engine `RenderPassLayout`

use ash::vk;
use std::sync::Arc;

use umbra_engine::umbra::device::RenderPassLayout;
use umbra_engine::umbra::Result;

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::{
    attachment_description_to_vk, attachment_reference_to_vk, subpass_dependency_to_vk,
};

pub struct RenderPass {
    ctx: Arc<GpuContext>,
    pub(crate) render_pass: vk::RenderPass,
    pub(crate) attachment_count: usize,
    /// Colour attachment count per subpass
    pub(crate) color_counts: Vec<usize>,
}

/// Per-subpass reference arrays, kept alive while the create info borrows them
struct SubpassRefs {
    color: Vec<vk::AttachmentReference>,
    depth: Option<vk::AttachmentReference>,
    input: Vec<vk::AttachmentReference>,
}

impl RenderPass {
    pub fn new(ctx: &Arc<GpuContext>, layout: &RenderPassLayout) -> Result<Self> {
        let attachments: Vec<vk::AttachmentDescription> =
            layout.attachments.iter().map(attachment_description_to_vk).collect();

        let refs: Vec<SubpassRefs> = layout
            .subpasses
            .iter()
            .map(|subpass| SubpassRefs {
                color: subpass.color.iter().map(attachment_reference_to_vk).collect(),
                depth: subpass.depth.as_ref().map(attachment_reference_to_vk),
                input: subpass.input.iter().map(attachment_reference_to_vk).collect(),
            })
            .collect();

        let subpasses: Vec<vk::SubpassDescription> = refs
            .iter()
            .map(|r| {
                let mut desc = vk::SubpassDescription::default()
                    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
                    .color_attachments(&r.color)
                    .input_attachments(&r.input);
                if let Some(depth) = r.depth.as_ref() {
                    desc = desc.depth_stencil_attachment(depth);
                }
                desc
            })
            .collect();

        let dependencies: Vec<vk::SubpassDependency> =
            layout.dependencies.iter().map(subpass_dependency_to_vk).collect();

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        let render_pass = unsafe {
            ctx.device
                .create_render_pass(&create_info, None)
                .map_err(|e| vk_error("vkCreateRenderPass", e))?
        };

        Ok(Self {
            ctx: Arc::clone(ctx),
            render_pass,
            attachment_count: attachments.len(),
            color_counts: (0..layout.subpass_count())
                .map(|subpass| layout.color_attachment_count(subpass))
                .collect(),
        })
    }
}

impl Drop for RenderPass {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_render_pass(self.render_pass, None);
        }
    }
}
