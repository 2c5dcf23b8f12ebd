/// Attachment - image + view + memory for G-buffer and depth targets

use ash::vk;
use gpu_allocator::vulkan::Allocation;
use std::sync::Arc;

use umbra_engine::umbra::device::{
    Attachment as DeviceAttachment, AttachmentDesc, AttachmentRole, Extent2D, Format,
    MemoryPropertyFlags,
};
use umbra_engine::umbra::Result;

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::{aspect_mask, format_to_vk, image_usage_to_vk};

pub struct Attachment {
    ctx: Arc<GpuContext>,
    pub(crate) image: vk::Image,
    pub(crate) view: vk::ImageView,
    allocation: Option<Allocation>,
    desc: AttachmentDesc,
}

impl Attachment {
    pub fn new(ctx: &Arc<GpuContext>, desc: &AttachmentDesc) -> Result<Self> {
        desc.validate()?;

        let image_info = vk::ImageCreateInfo::default()
            .image_type(vk::ImageType::TYPE_2D)
            .format(format_to_vk(desc.format))
            .extent(vk::Extent3D {
                width: desc.extent.width,
                height: desc.extent.height,
                depth: 1,
            })
            .mip_levels(1)
            .array_layers(1)
            .samples(vk::SampleCountFlags::TYPE_1)
            .tiling(vk::ImageTiling::OPTIMAL)
            .usage(image_usage_to_vk(desc.role.image_usage()))
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .initial_layout(vk::ImageLayout::UNDEFINED);

        let image = unsafe {
            ctx.device
                .create_image(&image_info, None)
                .map_err(|e| vk_error("vkCreateImage (attachment)", e))?
        };

        let mut attachment = Self {
            ctx: Arc::clone(ctx),
            image,
            view: vk::ImageView::null(),
            allocation: None,
            desc: *desc,
        };

        let requirements = unsafe { ctx.device.get_image_memory_requirements(image) };
        let allocation = ctx.allocate(
            &format!("{:?} attachment", desc.role),
            requirements,
            MemoryPropertyFlags::DEVICE_LOCAL,
            false,
        )?;
        let bound = unsafe { ctx.device.bind_image_memory(image, allocation.memory(), allocation.offset()) };
        attachment.allocation = Some(allocation);
        bound.map_err(|e| vk_error("vkBindImageMemory", e))?;

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image)
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(format_to_vk(desc.format))
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: aspect_mask(desc.format),
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });
        attachment.view = unsafe {
            ctx.device
                .create_image_view(&view_info, None)
                .map_err(|e| vk_error("vkCreateImageView (attachment)", e))?
        };

        Ok(attachment)
    }
}

impl DeviceAttachment for Attachment {
    type ImageView = vk::ImageView;

    fn view(&self) -> vk::ImageView {
        self.view
    }

    fn role(&self) -> AttachmentRole {
        self.desc.role
    }

    fn format(&self) -> Format {
        self.desc.format
    }

    fn extent(&self) -> Extent2D {
        self.desc.extent
    }
}

impl Drop for Attachment {
    fn drop(&mut self) {
        unsafe {
            if self.view != vk::ImageView::null() {
                self.ctx.device.destroy_image_view(self.view, None);
            }
            if let Some(allocation) = self.allocation.take() {
                self.ctx.free(allocation);
            }
            self.ctx.device.destroy_image(self.image, None);
        }
    }
}
