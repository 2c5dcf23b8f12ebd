/// Swap-chain-bound resources owned by the frame orchestrator
///
/// Creation order: swap chain → sync → composition render pass → depth
/// attachment → framebuffers → command lists + fences. Fields are declared
/// in the reverse order so they are dropped in reverse creation order.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graphics_device::{
    Attachment, AttachmentDesc, AttachmentRole, AttachmentSpec, ClearValue, Extent2D, Format,
    GraphicsDevice, PassOutput, Rect2D, RenderPassBegin, RenderPassDesc, RenderPassLayout,
    Swapchain,
};
use crate::{engine_debug, engine_info};
use super::frame_sync::FrameSync;

/// Composition pass: the swap image plus a depth buffer, one subpass
pub fn composition_pass_layout(color_format: Format, depth_format: Format) -> Result<RenderPassLayout> {
    RenderPassLayout::build(&RenderPassDesc {
        attachments: vec![
            AttachmentSpec::single(AttachmentRole::Framebuffer, color_format),
            AttachmentSpec::single(AttachmentRole::Depth, depth_format),
        ],
        subpass_count: 1,
        output: PassOutput::Present,
    })
}

pub struct BaseResources<D: GraphicsDevice> {
    /// One per swap image, created signaled
    pub composition_fences: Vec<D::Fence>,
    /// One per swap image
    pub composition_commands: Vec<D::CommandList>,
    pub framebuffers: Vec<D::Framebuffer>,
    pub depth: D::Attachment,
    pub render_pass: D::RenderPass,
    pub sync: FrameSync<D>,
    pub swapchain: D::Swapchain,
    clear_color: [f32; 4],
}

impl<D: GraphicsDevice> BaseResources<D> {
    /// Build everything for `window_extent`; fails if the surface has no usable extent
    pub fn new(device: &D, config: &Config, window_extent: Extent2D) -> Result<Self> {
        let swapchain = device.create_swapchain(window_extent, None)?.ok_or_else(|| {
            Error::InitializationFailed(format!(
                "surface has no usable extent for a {}x{} window",
                window_extent.width, window_extent.height
            ))
        })?;
        let image_count = swapchain.image_count();
        let sync = FrameSync::new(device, config.frames_in_flight, image_count)?;
        let render_pass =
            device.create_render_pass(&composition_pass_layout(swapchain.format(), device.depth_format())?)?;
        let depth = Self::create_depth(device, swapchain.extent())?;
        let framebuffers = Self::create_framebuffers(device, &render_pass, &swapchain, &depth)?;
        let (composition_commands, composition_fences) = Self::create_command_lists(device, image_count)?;

        engine_info!(
            "umbra::Renderer",
            "Swapchain ready: {}x{}, {} images, {:?}",
            swapchain.extent().width,
            swapchain.extent().height,
            image_count,
            swapchain.present_mode()
        );

        Ok(Self {
            composition_fences,
            composition_commands,
            framebuffers,
            depth,
            render_pass,
            sync,
            swapchain,
            clear_color: config.clear_color,
        })
    }

    /// Rebuild every swap-chain-dependent object for `window_extent`
    ///
    /// Returns `false` (and changes nothing) when the surface currently has
    /// no usable extent. The device must be idle.
    pub fn recreate(&mut self, device: &D, window_extent: Extent2D) -> Result<bool> {
        let swapchain = match device.create_swapchain(window_extent, Some(&self.swapchain))? {
            Some(swapchain) => swapchain,
            None => return Ok(false),
        };

        // Framebuffers reference views of the chain being retired
        self.framebuffers.clear();
        self.swapchain = swapchain;

        let image_count = self.swapchain.image_count();
        self.depth = Self::create_depth(device, self.swapchain.extent())?;
        self.framebuffers = Self::create_framebuffers(device, &self.render_pass, &self.swapchain, &self.depth)?;
        let (commands, fences) = Self::create_command_lists(device, image_count)?;
        self.composition_commands = commands;
        self.composition_fences = fences;
        self.sync.recreate_render_complete(device, image_count)?;

        engine_debug!(
            "umbra::Renderer",
            "Swapchain recreated: {}x{}, {} images",
            self.extent().width,
            self.extent().height,
            image_count
        );
        Ok(true)
    }

    pub fn extent(&self) -> Extent2D {
        self.swapchain.extent()
    }

    pub fn image_count(&self) -> usize {
        self.swapchain.image_count()
    }

    /// Render pass instance drawing into swap image `image_index`
    pub fn composition_begin(&self, image_index: usize) -> Result<RenderPassBegin<'_, D>> {
        let framebuffer = self.framebuffers.get(image_index).ok_or_else(|| {
            Error::InvalidResource(format!("no composition framebuffer for image {}", image_index))
        })?;
        Ok(RenderPassBegin {
            render_pass: &self.render_pass,
            framebuffer,
            render_area: Rect2D::from_extent(self.extent()),
            clear_values: vec![
                ClearValue::Color(self.clear_color),
                ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
            ],
        })
    }

    fn create_depth(device: &D, extent: Extent2D) -> Result<D::Attachment> {
        device.create_attachment(&AttachmentDesc {
            role: AttachmentRole::Depth,
            format: device.depth_format(),
            extent,
        })
    }

    fn create_framebuffers(
        device: &D,
        render_pass: &D::RenderPass,
        swapchain: &D::Swapchain,
        depth: &D::Attachment,
    ) -> Result<Vec<D::Framebuffer>> {
        (0..swapchain.image_count())
            .map(|i| {
                let view = swapchain.image_view(i).ok_or_else(|| {
                    Error::InvalidResource(format!("swap chain has no view for image {}", i))
                })?;
                device.create_framebuffer(render_pass, &[view, depth.view()], swapchain.extent())
            })
            .collect()
    }

    fn create_command_lists(device: &D, count: usize) -> Result<(Vec<D::CommandList>, Vec<D::Fence>)> {
        let commands = device.create_command_lists(count)?;
        let fences = (0..count)
            .map(|_| device.create_fence(true))
            .collect::<Result<Vec<_>>>()?;
        Ok((commands, fences))
    }
}
