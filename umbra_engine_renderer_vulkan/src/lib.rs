/*!
# Umbra - Vulkan Backend

Vulkan implementation of the `umbra_engine` `GraphicsDevice` trait, built on
ash for the bindings, ash-window for surface creation, gpu-allocator for
memory and spirq for shader reflection.

```no_run
use umbra_engine::umbra::Config;
use umbra_engine_renderer_vulkan::VulkanGraphicsDevice;

# fn run(window: &winit::window::Window) -> umbra_engine::umbra::Result<()> {
let config = Config::default();
let device = VulkanGraphicsDevice::new(window, &config)?;
# Ok(())
# }
```

Validation layers and the debug messenger are only compiled in with the
`vulkan-validation` feature.
*/

mod vulkan;
mod vulkan_context;
mod vulkan_format;
mod vulkan_swapchain;
mod vulkan_attachment;
mod vulkan_render_pass;
mod vulkan_frame_buffer;
mod vulkan_buffer;
mod vulkan_sampler;
mod vulkan_descriptor_set;
mod vulkan_shader;
mod vulkan_pipeline;
mod vulkan_command_list;
mod vulkan_sync;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use vulkan::VulkanGraphicsDevice;
pub use vulkan_attachment::Attachment;
pub use vulkan_buffer::Buffer;
pub use vulkan_command_list::CommandList;
pub use vulkan_context::GpuContext;
pub use vulkan_descriptor_set::{DescriptorPool, DescriptorSet, DescriptorSetLayout};
pub use vulkan_frame_buffer::Framebuffer;
pub use vulkan_pipeline::Pipeline;
pub use vulkan_render_pass::RenderPass;
pub use vulkan_sampler::Sampler;
pub use vulkan_shader::{ReflectedBinding, ShaderModule};
pub use vulkan_swapchain::Swapchain;
pub use vulkan_sync::{Fence, Semaphore};

#[cfg(feature = "vulkan-validation")]
pub use debug::{get_validation_stats, print_validation_stats_report};
