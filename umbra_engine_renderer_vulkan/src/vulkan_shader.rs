/// ShaderModule - VkShaderModule plus the bindings its SPIR-V declares
///
/// Reflection (spirq) records every descriptor binding and the push
/// constant block size, so pipeline creation can check them against the
/// declared set layouts and push constant ranges.

use ash::vk;
use std::ffi::CString;
use std::sync::Arc;

use umbra_engine::umbra::device::{DescriptorType, ShaderDesc, ShaderStage, SPIRV_MAGIC};
use umbra_engine::umbra::{Error, Result};
use umbra_engine::{engine_bail, engine_debug, engine_err};

use crate::vulkan_context::{vk_error, GpuContext};

/// One descriptor binding used by a shader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReflectedBinding {
    pub set: u32,
    pub binding: u32,
    pub ty: DescriptorType,
}

pub struct ShaderModule {
    ctx: Arc<GpuContext>,
    pub(crate) module: vk::ShaderModule,
    pub(crate) stage: ShaderStage,
    pub(crate) entry_point: CString,
    pub(crate) name: String,
    pub(crate) bindings: Vec<ReflectedBinding>,
    /// Size of the push constant block, if the shader declares one
    pub(crate) push_constant_size: Option<u32>,
}

impl ShaderModule {
    pub fn new(ctx: &Arc<GpuContext>, desc: &ShaderDesc<'_>) -> Result<Self> {
        if desc.code.first() != Some(&SPIRV_MAGIC) {
            return Err(Error::InvalidResource(format!(
                "shader '{}' is not SPIR-V (bad magic number)",
                desc.name
            )));
        }
        let entry_point = CString::new(desc.entry_point).map_err(|_| {
            Error::InvalidResource(format!("shader '{}' entry point contains a NUL byte", desc.name))
        })?;

        let (bindings, push_constant_size) = reflect_shader(desc.name, desc.code)?;

        let create_info = vk::ShaderModuleCreateInfo::default().code(desc.code);
        let module = unsafe {
            ctx.device
                .create_shader_module(&create_info, None)
                .map_err(|e| vk_error("vkCreateShaderModule", e))?
        };

        engine_debug!(
            "umbra::vulkan",
            "Shader '{}' ({:?}): {} bindings, push constants {:?}",
            desc.name,
            desc.stage,
            bindings.len(),
            push_constant_size
        );

        Ok(Self {
            ctx: Arc::clone(ctx),
            module,
            stage: desc.stage,
            entry_point,
            name: desc.name.to_string(),
            bindings,
            push_constant_size,
        })
    }
}

fn reflect_shader(name: &str, code: &[u32]) -> Result<(Vec<ReflectedBinding>, Option<u32>)> {
    let entry_points = spirq::ReflectConfig::new()
        .spv(code)
        .ref_all_rscs(true)
        .reflect()
        .map_err(|e| engine_err!("umbra::vulkan", "SPIR-V reflection of '{}' failed: {:?}", name, e))?;

    let mut bindings = Vec::new();
    let mut push_constant_size: Option<u32> = None;

    for entry_point in &entry_points {
        for var in entry_point.vars.iter() {
            match var {
                spirq::var::Variable::Descriptor { desc_bind, desc_ty, .. } => {
                    let ty = match desc_ty {
                        spirq::ty::DescriptorType::UniformBuffer() => DescriptorType::UniformBuffer,
                        spirq::ty::DescriptorType::CombinedImageSampler() => {
                            DescriptorType::CombinedImageSampler
                        }
                        other => engine_bail!(
                            "umbra::vulkan",
                            "Shader '{}' uses unsupported descriptor type {:?}",
                            name,
                            other
                        ),
                    };
                    let binding = ReflectedBinding {
                        set: desc_bind.set(),
                        binding: desc_bind.bind(),
                        ty,
                    };
                    if !bindings.contains(&binding) {
                        bindings.push(binding);
                    }
                }
                spirq::var::Variable::PushConstant { ty, .. } => {
                    let size = ty.nbyte().map(|s| s as u32);
                    push_constant_size = push_constant_size.max(size);
                }
                _ => {}
            }
        }
    }

    Ok((bindings, push_constant_size))
}

impl Drop for ShaderModule {
    fn drop(&mut self) {
        unsafe {
            self.ctx.device.destroy_shader_module(self.module, None);
        }
    }
}
