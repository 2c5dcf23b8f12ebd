/// Sampler - VkSampler built from an engine `SamplerDesc`
///
/// Anisotropy is enabled only when requested and supported by the device,
/// and clamped to the device limit.

use ash::vk;
use std::sync::Arc;

use umbra_engine::engine_debug;
use umbra_engine::umbra::device::SamplerDesc;
use umbra_engine::umbra::Result;

use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::{address_mode_to_vk, filter_to_vk, mipmap_mode_to_vk};

pub struct Sampler {
    ctx: Arc<GpuContext>,
    pub(crate) sampler: vk::Sampler,
}

/// Effective max anisotropy, `None` when disabled
pub(crate) fn effective_anisotropy(requested: Option<f32>, supported: bool, device_max: f32) -> Option<f32> {
    match requested {
        Some(value) if supported && value > 1.0 => Some(value.min(device_max)),
        _ => None,
    }
}

impl Sampler {
    pub fn new(ctx: &Arc<GpuContext>, desc: &SamplerDesc) -> Result<Self> {
        let filter = filter_to_vk(desc.filter);
        let address = address_mode_to_vk(desc.address_mode);

        let mut create_info = vk::SamplerCreateInfo::default()
            .mag_filter(filter)
            .min_filter(filter)
            .mipmap_mode(mipmap_mode_to_vk(desc.filter))
            .address_mode_u(address)
            .address_mode_v(address)
            .address_mode_w(address)
            .mip_lod_bias(0.0)
            .min_lod(0.0)
            .max_lod(1.0)
            .border_color(vk::BorderColor::FLOAT_OPAQUE_WHITE)
            .compare_enable(false)
            .compare_op(vk::CompareOp::ALWAYS)
            .unnormalized_coordinates(false);

        match effective_anisotropy(desc.max_anisotropy, ctx.sampler_anisotropy, ctx.max_sampler_anisotropy) {
            Some(max) => {
                create_info = create_info.anisotropy_enable(true).max_anisotropy(max);
            }
            None => {
                if desc.max_anisotropy.is_some() && !ctx.sampler_anisotropy {
                    engine_debug!("umbra::vulkan", "Sampler anisotropy requested but unsupported, disabled");
                }
                create_info = create_info.anisotropy_enable(false).max_anisotropy(1.0);
            }
        }

        let sampler = unsafe {
            ctx.device
                .create_sampler(&create_info, None)
                .map_err(|e| vk_error("vkCreateSampler", e))?
        };

        Ok(Self { ctx: Arc::clone(ctx), sampler })
    }
}

impl Drop for Sampler {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_sampler(self.sampler, None);
        }
    }
}
