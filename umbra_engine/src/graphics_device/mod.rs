/// Graphics device module - backend-agnostic GPU vocabulary and planning

pub mod graphics_device;
pub mod format;
pub mod attachment;
pub mod render_pass;
pub mod frame_buffer;
pub mod swapchain;
pub mod device_selection;
pub mod memory;
pub mod buffer;
pub mod descriptor;
pub mod pipeline;
pub mod shader;
pub mod command_list;
pub mod sync;

pub use graphics_device::*;
pub use format::*;
pub use attachment::*;
pub use render_pass::*;
pub use frame_buffer::*;
pub use swapchain::*;
pub use device_selection::*;
pub use memory::*;
pub use buffer::*;
pub use descriptor::*;
pub use pipeline::*;
pub use shader::*;
pub use command_list::*;
pub use sync::*;

// Mock graphics device for tests (no GPU required)
#[cfg(test)]
pub mod mock_graphics_device;
