/// Pipeline - graphics pipeline and its layout
///
/// Built from an engine `PipelineDesc`. Shader reflection is compared with
/// the declared set layouts and push constant ranges; mismatches are logged
/// as warnings, the driver has the final word.

use ash::vk;
use std::sync::Arc;

use umbra_engine::umbra::device::{
    DescriptorSetLayoutDesc, PipelineDesc, PipelineKind, PushConstantRange, ShaderStageFlags,
};
use umbra_engine::umbra::{Error, Result};
use umbra_engine::{engine_debug, engine_warn};

use crate::vulkan::VulkanGraphicsDevice;
use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_format::{
    color_blend_attachment_to_vk, compare_op_to_vk, cull_mode_to_vk, dynamic_state_to_vk,
    format_to_vk, front_face_to_vk, input_rate_to_vk, polygon_mode_to_vk, sample_count_to_vk,
    shader_stage_to_vk, shader_stages_to_vk, topology_to_vk,
};
use crate::vulkan_shader::{ReflectedBinding, ShaderModule};

pub struct Pipeline {
    ctx: Arc<GpuContext>,
    pub(crate) pipeline: vk::Pipeline,
    pub(crate) layout: vk::PipelineLayout,
    pub(crate) kind: PipelineKind,
}

/// Reflected bindings that no declared set layout covers
pub(crate) fn undeclared_bindings(
    bindings: &[ReflectedBinding],
    set_layouts: &[&DescriptorSetLayoutDesc],
) -> Vec<ReflectedBinding> {
    bindings
        .iter()
        .filter(|b| {
            !set_layouts
                .get(b.set as usize)
                .is_some_and(|layout| layout.declares(b.binding, b.ty))
        })
        .copied()
        .collect()
}

/// Bytes of push constants visible to `stage` through the declared ranges
pub(crate) fn push_constant_coverage(stage: ShaderStageFlags, ranges: &[PushConstantRange]) -> u32 {
    ranges
        .iter()
        .filter(|r| r.stages.contains(stage))
        .map(|r| r.offset + r.size)
        .max()
        .unwrap_or(0)
}

fn check_reflection(kind: PipelineKind, shader: &ShaderModule, set_layouts: &[&DescriptorSetLayoutDesc], ranges: &[PushConstantRange]) {
    for missing in undeclared_bindings(&shader.bindings, set_layouts) {
        engine_warn!(
            "umbra::vulkan",
            "{:?} pipeline: shader '{}' uses set {} binding {} ({:?}) not declared by the set layouts",
            kind,
            shader.name,
            missing.set,
            missing.binding,
            missing.ty
        );
    }
    if let Some(size) = shader.push_constant_size {
        let covered = push_constant_coverage(shader.stage.flags(), ranges);
        if size > covered {
            engine_warn!(
                "umbra::vulkan",
                "{:?} pipeline: shader '{}' declares {} push constant bytes, ranges cover {}",
                kind,
                shader.name,
                size,
                covered
            );
        }
    }
}

impl Pipeline {
    pub fn new(ctx: &Arc<GpuContext>, desc: &PipelineDesc<'_, VulkanGraphicsDevice>) -> Result<Self> {
        desc.validate()?;

        let render_pass = desc.render_pass;
        let color_count = render_pass.color_counts.get(desc.subpass as usize).copied().ok_or_else(|| {
            Error::InvalidResource(format!(
                "{:?} pipeline targets subpass {} of a {}-subpass render pass",
                desc.kind,
                desc.subpass,
                render_pass.color_counts.len()
            ))
        })?;
        if desc.color_blend.len() != color_count {
            return Err(Error::InvalidResource(format!(
                "{:?} pipeline has {} blend attachments, subpass {} writes {} colour targets",
                desc.kind,
                desc.color_blend.len(),
                desc.subpass,
                color_count
            )));
        }

        let layout_descs: Vec<&DescriptorSetLayoutDesc> = desc.set_layouts.iter().map(|l| &l.desc).collect();
        check_reflection(desc.kind, desc.vertex_shader, &layout_descs, &desc.push_constant_ranges);
        check_reflection(desc.kind, desc.fragment_shader, &layout_descs, &desc.push_constant_ranges);

        // ----- Layout -----
        let set_layouts: Vec<vk::DescriptorSetLayout> = desc.set_layouts.iter().map(|l| l.layout).collect();
        let push_ranges: Vec<vk::PushConstantRange> = desc
            .push_constant_ranges
            .iter()
            .map(|r| vk::PushConstantRange {
                stage_flags: shader_stages_to_vk(r.stages),
                offset: r.offset,
                size: r.size,
            })
            .collect();
        let layout_info = vk::PipelineLayoutCreateInfo::default()
            .set_layouts(&set_layouts)
            .push_constant_ranges(&push_ranges);

        let layout = unsafe {
            ctx.device
                .create_pipeline_layout(&layout_info, None)
                .map_err(|e| vk_error("vkCreatePipelineLayout", e))?
        };

        // Owned from here on: Drop releases the layout if pipeline creation fails
        let mut created = Self {
            ctx: Arc::clone(ctx),
            pipeline: vk::Pipeline::null(),
            layout,
            kind: desc.kind,
        };

        // ----- Fixed-function state -----
        let stages = [
            vk::PipelineShaderStageCreateInfo::default()
                .stage(shader_stage_to_vk(desc.vertex_shader.stage))
                .module(desc.vertex_shader.module)
                .name(&desc.vertex_shader.entry_point),
            vk::PipelineShaderStageCreateInfo::default()
                .stage(shader_stage_to_vk(desc.fragment_shader.stage))
                .module(desc.fragment_shader.module)
                .name(&desc.fragment_shader.entry_point),
        ];

        let vertex_bindings: Vec<vk::VertexInputBindingDescription> = desc
            .vertex_layout
            .bindings
            .iter()
            .map(|b| vk::VertexInputBindingDescription {
                binding: b.binding,
                stride: b.stride,
                input_rate: input_rate_to_vk(b.input_rate),
            })
            .collect();
        let vertex_attributes: Vec<vk::VertexInputAttributeDescription> = desc
            .vertex_layout
            .attributes
            .iter()
            .map(|a| vk::VertexInputAttributeDescription {
                location: a.location,
                binding: a.binding,
                format: format_to_vk(a.format),
                offset: a.offset,
            })
            .collect();
        let vertex_input = vk::PipelineVertexInputStateCreateInfo::default()
            .vertex_binding_descriptions(&vertex_bindings)
            .vertex_attribute_descriptions(&vertex_attributes);

        let input_assembly = vk::PipelineInputAssemblyStateCreateInfo::default()
            .topology(topology_to_vk(desc.input_assembly.topology))
            .primitive_restart_enable(desc.input_assembly.primitive_restart);

        let viewport_state = vk::PipelineViewportStateCreateInfo::default()
            .viewport_count(desc.viewport.viewport_count)
            .scissor_count(desc.viewport.scissor_count);

        let rasterization = vk::PipelineRasterizationStateCreateInfo::default()
            .depth_clamp_enable(false)
            .rasterizer_discard_enable(false)
            .polygon_mode(polygon_mode_to_vk(desc.rasterization.polygon_mode))
            .line_width(desc.rasterization.line_width)
            .cull_mode(cull_mode_to_vk(desc.rasterization.cull_mode))
            .front_face(front_face_to_vk(desc.rasterization.front_face))
            .depth_bias_enable(false);

        let multisample = vk::PipelineMultisampleStateCreateInfo::default()
            .rasterization_samples(sample_count_to_vk(desc.multisample.sample_count))
            .sample_shading_enable(false)
            .alpha_to_coverage_enable(desc.multisample.alpha_to_coverage);

        let depth_stencil = vk::PipelineDepthStencilStateCreateInfo::default()
            .depth_test_enable(desc.depth_stencil.depth_test_enable)
            .depth_write_enable(desc.depth_stencil.depth_write_enable)
            .depth_compare_op(compare_op_to_vk(desc.depth_stencil.depth_compare_op))
            .depth_bounds_test_enable(false)
            .stencil_test_enable(desc.depth_stencil.stencil_test_enable)
            .back(vk::StencilOpState {
                compare_op: vk::CompareOp::ALWAYS,
                ..Default::default()
            });

        let blend_attachments: Vec<vk::PipelineColorBlendAttachmentState> =
            desc.color_blend.iter().map(color_blend_attachment_to_vk).collect();
        let color_blend = vk::PipelineColorBlendStateCreateInfo::default()
            .logic_op_enable(false)
            .attachments(&blend_attachments);

        let dynamic_states: Vec<vk::DynamicState> =
            desc.dynamic_states.iter().copied().map(dynamic_state_to_vk).collect();
        let dynamic_state = vk::PipelineDynamicStateCreateInfo::default().dynamic_states(&dynamic_states);

        let tessellation = vk::PipelineTessellationStateCreateInfo::default()
            .patch_control_points(desc.tessellation.patch_control_points);

        let mut pipeline_info = vk::GraphicsPipelineCreateInfo::default()
            .stages(&stages)
            .vertex_input_state(&vertex_input)
            .input_assembly_state(&input_assembly)
            .viewport_state(&viewport_state)
            .rasterization_state(&rasterization)
            .multisample_state(&multisample)
            .depth_stencil_state(&depth_stencil)
            .color_blend_state(&color_blend)
            .dynamic_state(&dynamic_state)
            .layout(layout)
            .render_pass(render_pass.render_pass)
            .subpass(desc.subpass);
        if desc.tessellation.patch_control_points > 0 {
            pipeline_info = pipeline_info.tessellation_state(&tessellation);
        }

        let pipelines = unsafe {
            ctx.device
                .create_graphics_pipelines(vk::PipelineCache::null(), &[pipeline_info], None)
                .map_err(|(_, e)| vk_error("vkCreateGraphicsPipelines", e))?
        };
        created.pipeline = pipelines
            .into_iter()
            .next()
            .ok_or_else(|| Error::BackendError("vkCreateGraphicsPipelines returned no pipeline".to_string()))?;

        engine_debug!("umbra::vulkan", "{:?} pipeline created", desc.kind);
        Ok(created)
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        unsafe {
            if self.pipeline != vk::Pipeline::null() {
                self.ctx.device.destroy_pipeline(self.pipeline, None);
            }
            self.ctx.device.destroy_pipeline_layout(self.layout, None);
        }
    }
}

#[cfg(test)]
#[path = "vulkan_pipeline_tests.rs"]
mod tests;
