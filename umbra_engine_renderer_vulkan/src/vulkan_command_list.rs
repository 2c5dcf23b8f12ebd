/// CommandList - Vulkan implementation of the engine CommandList trait
///
/// Each list owns its command pool (RESET_COMMAND_BUFFER) and one primary
/// command buffer. A `RecordingTracker` rejects out-of-order recording
/// before anything reaches the driver.

use ash::vk;
use std::sync::Arc;

use umbra_engine::umbra::device::{
    CommandList as DeviceCommandList, IndexType, RecordingState, RecordingTracker,
    Rect2D, RenderPassBegin, ShaderStageFlags, Viewport,
};
use umbra_engine::umbra::{Error, Result};

use crate::vulkan::VulkanGraphicsDevice;
use crate::vulkan_buffer::Buffer;
use crate::vulkan_context::{vk_error, GpuContext};
use crate::vulkan_descriptor_set::DescriptorSet;
use crate::vulkan_format::{
    clear_value_to_vk, index_type_to_vk, rect_to_vk, shader_stages_to_vk, viewport_to_vk,
};
use crate::vulkan_pipeline::Pipeline;

pub struct CommandList {
    ctx: Arc<GpuContext>,
    command_pool: vk::CommandPool,
    pub(crate) command_buffer: vk::CommandBuffer,
    tracker: RecordingTracker,
}

impl CommandList {
    pub fn new(ctx: &Arc<GpuContext>) -> Result<Self> {
        let pool_info = vk::CommandPoolCreateInfo::default()
            .queue_family_index(ctx.queue_families.graphics)
            .flags(vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);

        let command_pool = unsafe {
            ctx.device
                .create_command_pool(&pool_info, None)
                .map_err(|e| vk_error("vkCreateCommandPool", e))?
        };

        let mut list = Self {
            ctx: Arc::clone(ctx),
            command_pool,
            command_buffer: vk::CommandBuffer::null(),
            tracker: RecordingTracker::new(),
        };

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(command_pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let buffers = unsafe {
            ctx.device
                .allocate_command_buffers(&alloc_info)
                .map_err(|e| vk_error("vkAllocateCommandBuffers", e))?
        };
        list.command_buffer = buffers
            .into_iter()
            .next()
            .ok_or_else(|| Error::BackendError("vkAllocateCommandBuffers returned no buffer".to_string()))?;

        Ok(list)
    }

    /// Validation passed, ready for submission
    pub(crate) fn check_executable(&self) -> Result<()> {
        self.tracker.require_executable()
    }
}

impl DeviceCommandList<VulkanGraphicsDevice> for CommandList {
    fn begin(&mut self) -> Result<()> {
        self.tracker.begin()?;
        let begin_info = vk::CommandBufferBeginInfo::default();
        unsafe {
            self.ctx
                .device
                .reset_command_buffer(self.command_buffer, vk::CommandBufferResetFlags::empty())
                .map_err(|e| vk_error("vkResetCommandBuffer", e))?;
            self.ctx
                .device
                .begin_command_buffer(self.command_buffer, &begin_info)
                .map_err(|e| vk_error("vkBeginCommandBuffer", e))
        }
    }

    fn end(&mut self) -> Result<()> {
        self.tracker.end()?;
        unsafe {
            self.ctx
                .device
                .end_command_buffer(self.command_buffer)
                .map_err(|e| vk_error("vkEndCommandBuffer", e))
        }
    }

    fn begin_render_pass(&mut self, begin: &RenderPassBegin<'_, VulkanGraphicsDevice>) -> Result<()> {
        if begin.clear_values.len() != begin.render_pass.attachment_count {
            return Err(Error::InvalidResource(format!(
                "begin_render_pass: {} clear values for {} attachments",
                begin.clear_values.len(),
                begin.render_pass.attachment_count
            )));
        }
        self.tracker.begin_render_pass()?;

        let clear_values: Vec<vk::ClearValue> = begin.clear_values.iter().map(clear_value_to_vk).collect();
        let begin_info = vk::RenderPassBeginInfo::default()
            .render_pass(begin.render_pass.render_pass)
            .framebuffer(begin.framebuffer.framebuffer)
            .render_area(rect_to_vk(&begin.render_area))
            .clear_values(&clear_values);

        unsafe {
            self.ctx
                .device
                .cmd_begin_render_pass(self.command_buffer, &begin_info, vk::SubpassContents::INLINE);
        }
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.tracker.end_render_pass()?;
        unsafe {
            self.ctx.device.cmd_end_render_pass(self.command_buffer);
        }
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.tracker.require_recording("set_viewport")?;
        unsafe {
            self.ctx
                .device
                .cmd_set_viewport(self.command_buffer, 0, &[viewport_to_vk(&viewport)]);
        }
        Ok(())
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.tracker.require_recording("set_scissor")?;
        unsafe {
            self.ctx
                .device
                .cmd_set_scissor(self.command_buffer, 0, &[rect_to_vk(&scissor)]);
        }
        Ok(())
    }

    fn bind_pipeline(&mut self, pipeline: &Pipeline) -> Result<()> {
        self.tracker.require_recording("bind_pipeline")?;
        unsafe {
            self.ctx.device.cmd_bind_pipeline(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline.pipeline,
            );
        }
        Ok(())
    }

    fn bind_descriptor_sets(&mut self, pipeline: &Pipeline, first_set: u32, sets: &[&DescriptorSet]) -> Result<()> {
        self.tracker.require_recording("bind_descriptor_sets")?;
        let handles: Vec<vk::DescriptorSet> = sets.iter().map(|s| s.set).collect();
        unsafe {
            self.ctx.device.cmd_bind_descriptor_sets(
                self.command_buffer,
                vk::PipelineBindPoint::GRAPHICS,
                pipeline.layout,
                first_set,
                &handles,
                &[],
            );
        }
        Ok(())
    }

    fn push_constants(&mut self, pipeline: &Pipeline, stages: ShaderStageFlags, offset: u32, data: &[u8]) -> Result<()> {
        self.tracker.require_recording("push_constants")?;
        unsafe {
            self.ctx.device.cmd_push_constants(
                self.command_buffer,
                pipeline.layout,
                shader_stages_to_vk(stages),
                offset,
                data,
            );
        }
        Ok(())
    }

    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[(&Buffer, u64)]) -> Result<()> {
        self.tracker.require_recording("bind_vertex_buffers")?;
        let handles: Vec<vk::Buffer> = buffers.iter().map(|(b, _)| b.buffer).collect();
        let offsets: Vec<vk::DeviceSize> = buffers.iter().map(|(_, offset)| *offset).collect();
        unsafe {
            self.ctx
                .device
                .cmd_bind_vertex_buffers(self.command_buffer, first_binding, &handles, &offsets);
        }
        Ok(())
    }

    fn bind_index_buffer(&mut self, buffer: &Buffer, offset: u64, index_type: IndexType) -> Result<()> {
        self.tracker.require_recording("bind_index_buffer")?;
        unsafe {
            self.ctx.device.cmd_bind_index_buffer(
                self.command_buffer,
                buffer.buffer,
                offset,
                index_type_to_vk(index_type),
            );
        }
        Ok(())
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> Result<()> {
        self.tracker.require_render_pass("draw")?;
        unsafe {
            self.ctx.device.cmd_draw(
                self.command_buffer,
                vertex_count,
                instance_count,
                first_vertex,
                first_instance,
            );
        }
        Ok(())
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<()> {
        self.tracker.require_render_pass("draw_indexed")?;
        unsafe {
            self.ctx.device.cmd_draw_indexed(
                self.command_buffer,
                index_count,
                instance_count,
                first_index,
                vertex_offset,
                first_instance,
            );
        }
        Ok(())
    }

    fn recording_state(&self) -> RecordingState {
        self.tracker.state()
    }
}

impl Drop for CommandList {
    fn drop(&mut self) {
        unsafe {
            // Destroying the pool frees its command buffer
            self.ctx.device.destroy_command_pool(self.command_pool, None);
        }
    }
}
