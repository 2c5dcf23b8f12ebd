/// Swapchain - Vulkan implementation of the engine Swapchain trait
///
/// Surface queries are converted to engine types and handed to
/// `plan_swapchain`, so the format/present-mode/extent policy is shared with
/// the mock backend. Creation with an old chain passes it as
/// `old_swapchain`; the caller drops the old chain afterwards.

use ash::vk;
use std::sync::Arc;

use umbra_engine::umbra::device::{
    plan_swapchain, AcquireOutcome, Extent2D, Format, PresentMode, PresentOutcome,
    SurfaceFormat, SurfaceSupport, Swapchain as DeviceSwapchain,
};
use umbra_engine::umbra::{Error, Result};
use umbra_engine::{engine_debug, engine_info};

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::{
    aspect_mask, color_space_from_vk, color_space_to_vk, extent_to_vk, format_from_vk,
    format_to_vk, present_mode_from_vk, present_mode_to_vk, sharing_mode_to_vk,
    surface_capabilities_from_vk,
};

pub struct Swapchain {
    ctx: Arc<GpuContext>,
    pub(crate) swapchain: vk::SwapchainKHR,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
    format: Format,
    extent: Extent2D,
    present_mode: PresentMode,
    current_image: u32,
}

/// Query surface support from the device and convert it to engine types
///
/// Surface formats the engine has no name for are skipped.
pub(crate) fn query_surface_support(ctx: &GpuContext) -> Result<(SurfaceSupport, vk::SurfaceCapabilitiesKHR)> {
    unsafe {
        let caps = ctx
            .surface_loader
            .get_physical_device_surface_capabilities(ctx.physical_device, ctx.surface)
            .map_err(|e| vk_error("vkGetPhysicalDeviceSurfaceCapabilitiesKHR", e))?;
        let formats = ctx
            .surface_loader
            .get_physical_device_surface_formats(ctx.physical_device, ctx.surface)
            .map_err(|e| vk_error("vkGetPhysicalDeviceSurfaceFormatsKHR", e))?;
        let present_modes = ctx
            .surface_loader
            .get_physical_device_surface_present_modes(ctx.physical_device, ctx.surface)
            .map_err(|e| vk_error("vkGetPhysicalDeviceSurfacePresentModesKHR", e))?;

        let support = SurfaceSupport {
            capabilities: surface_capabilities_from_vk(&caps),
            formats: formats
                .iter()
                .filter_map(|f| {
                    format_from_vk(f.format).map(|format| SurfaceFormat {
                        format,
                        color_space: color_space_from_vk(f.color_space),
                    })
                })
                .collect(),
            present_modes: present_modes.into_iter().filter_map(present_mode_from_vk).collect(),
        };
        Ok((support, caps))
    }
}

impl Swapchain {
    /// Create a swap chain sized for `window_extent`
    ///
    /// `Ok(None)` when the surface extent has zero area.
    pub fn create(
        ctx: &Arc<GpuContext>,
        window_extent: Extent2D,
        vsync: bool,
        old: Option<&Swapchain>,
    ) -> Result<Option<Self>> {
        let (support, caps) = query_surface_support(ctx)?;
        let plan = match plan_swapchain(&support, window_extent, ctx.queue_families, vsync)? {
            Some(plan) => plan,
            None => {
                engine_debug!("umbra::vulkan", "Zero-area surface, no swap chain created");
                return Ok(None);
            }
        };

        let create_info = vk::SwapchainCreateInfoKHR::default()
            .surface(ctx.surface)
            .min_image_count(plan.image_count)
            .image_format(format_to_vk(plan.surface_format.format))
            .image_color_space(color_space_to_vk(plan.surface_format.color_space))
            .image_extent(extent_to_vk(plan.extent))
            .image_array_layers(1)
            .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
            .image_sharing_mode(sharing_mode_to_vk(plan.sharing_mode))
            .queue_family_indices(&plan.queue_family_indices)
            .pre_transform(caps.current_transform)
            .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
            .present_mode(present_mode_to_vk(plan.present_mode))
            .clipped(true)
            .old_swapchain(old.map_or(vk::SwapchainKHR::null(), |o| o.swapchain));

        let swapchain = unsafe {
            ctx.swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| vk_error("vkCreateSwapchainKHR", e))?
        };

        // Owned from here on: Drop releases whatever was created
        let mut chain = Self {
            ctx: Arc::clone(ctx),
            swapchain,
            images: Vec::new(),
            image_views: Vec::new(),
            format: plan.surface_format.format,
            extent: plan.extent,
            present_mode: plan.present_mode,
            current_image: 0,
        };

        chain.images = unsafe {
            ctx.swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| vk_error("vkGetSwapchainImagesKHR", e))?
        };

        for &image in &chain.images {
            let view_info = vk::ImageViewCreateInfo::default()
                .image(image)
                .view_type(vk::ImageViewType::TYPE_2D)
                .format(format_to_vk(chain.format))
                .components(vk::ComponentMapping::default())
                .subresource_range(vk::ImageSubresourceRange {
                    aspect_mask: aspect_mask(chain.format),
                    base_mip_level: 0,
                    level_count: 1,
                    base_array_layer: 0,
                    layer_count: 1,
                });
            let view = unsafe {
                ctx.device
                    .create_image_view(&view_info, None)
                    .map_err(|e| vk_error("vkCreateImageView (swap chain)", e))?
            };
            chain.image_views.push(view);
        }

        engine_info!(
            "umbra::vulkan",
            "Swap chain created: {}x{}, {} images, {:?}, {:?}",
            chain.extent.width,
            chain.extent.height,
            chain.images.len(),
            chain.format,
            chain.present_mode
        );
        Ok(Some(chain))
    }

    pub(crate) fn acquire(&mut self, signal: vk::Semaphore) -> Result<AcquireOutcome> {
        let result = unsafe {
            self.ctx
                .swapchain_loader
                .acquire_next_image(self.swapchain, u64::MAX, signal, vk::Fence::null())
        };
        match result {
            Ok((index, suboptimal)) => {
                self.current_image = index;
                Ok(AcquireOutcome::Acquired { index, suboptimal })
            }
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
            Err(e) => Err(vk_error("vkAcquireNextImageKHR", e)),
        }
    }

    pub(crate) fn present(&self, image_index: u32, wait: vk::Semaphore) -> Result<PresentOutcome> {
        if image_index as usize >= self.images.len() {
            return Err(Error::InvalidResource(format!(
                "present: image index {} out of range ({} images)",
                image_index,
                self.images.len()
            )));
        }

        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait];
        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        let result = unsafe {
            self.ctx
                .swapchain_loader
                .queue_present(self.ctx.present_queue, &present_info)
        };
        match result {
            Ok(false) => Ok(PresentOutcome::Presented),
            Ok(true) => Ok(PresentOutcome::Suboptimal),
            Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
            Err(e) => Err(vk_error("vkQueuePresentKHR", e)),
        }
    }
}

impl DeviceSwapchain for Swapchain {
    type ImageView = vk::ImageView;

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> Format {
        self.format
    }

    fn image_count(&self) -> usize {
        self.images.len()
    }

    fn image_view(&self, index: usize) -> Option<vk::ImageView> {
        self.image_views.get(index).copied()
    }

    fn current_image(&self) -> u32 {
        self.current_image
    }

    fn present_mode(&self) -> PresentMode {
        self.present_mode
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            for &view in &self.image_views {
                self.ctx.device.destroy_image_view(view, None);
            }
            self.ctx.swapchain_loader.destroy_swapchain(self.swapchain, None);
        }
    }
}
