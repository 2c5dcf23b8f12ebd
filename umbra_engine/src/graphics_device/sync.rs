/// Synchronization vocabulary: pipeline stages, access masks, submissions

use bitflags::bitflags;

use crate::graphics_device::GraphicsDevice;

bitflags! {
    /// Pipeline stages (bit values follow the Vulkan numbering)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct PipelineStageFlags: u32 {
        const TOP_OF_PIPE = 0x0000_0001;
        const DRAW_INDIRECT = 0x0000_0002;
        const VERTEX_INPUT = 0x0000_0004;
        const VERTEX_SHADER = 0x0000_0008;
        const FRAGMENT_SHADER = 0x0000_0080;
        const EARLY_FRAGMENT_TESTS = 0x0000_0100;
        const LATE_FRAGMENT_TESTS = 0x0000_0200;
        const COLOR_ATTACHMENT_OUTPUT = 0x0000_0400;
        const TRANSFER = 0x0000_1000;
        const BOTTOM_OF_PIPE = 0x0000_2000;
    }
}

bitflags! {
    /// Memory access types (bit values follow the Vulkan numbering)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const UNIFORM_READ = 0x0000_0008;
        const INPUT_ATTACHMENT_READ = 0x0000_0010;
        const SHADER_READ = 0x0000_0020;
        const SHADER_WRITE = 0x0000_0040;
        const COLOR_ATTACHMENT_READ = 0x0000_0080;
        const COLOR_ATTACHMENT_WRITE = 0x0000_0100;
        const DEPTH_STENCIL_ATTACHMENT_READ = 0x0000_0200;
        const DEPTH_STENCIL_ATTACHMENT_WRITE = 0x0000_0400;
        const TRANSFER_READ = 0x0000_0800;
        const TRANSFER_WRITE = 0x0000_1000;
        const MEMORY_READ = 0x0000_8000;
        const MEMORY_WRITE = 0x0001_0000;
    }
}

/// A semaphore the submission waits on, and the stage that waits
pub struct SemaphoreWait<'a, D: GraphicsDevice> {
    pub semaphore: &'a D::Semaphore,
    pub stage: PipelineStageFlags,
}

/// One command list submitted to the graphics queue
///
/// At most one wait and one signal: the frame loop chains exactly
/// acquire → offscreen → composition → present.
pub struct Submission<'a, D: GraphicsDevice> {
    pub command_list: &'a D::CommandList,
    pub wait: Option<SemaphoreWait<'a, D>>,
    pub signal: Option<&'a D::Semaphore>,
    pub fence: Option<&'a D::Fence>,
}

impl<'a, D: GraphicsDevice> Submission<'a, D> {
    pub fn new(command_list: &'a D::CommandList) -> Self {
        Self {
            command_list,
            wait: None,
            signal: None,
            fence: None,
        }
    }

    pub fn wait_on(mut self, semaphore: &'a D::Semaphore, stage: PipelineStageFlags) -> Self {
        self.wait = Some(SemaphoreWait { semaphore, stage });
        self
    }

    pub fn signal(mut self, semaphore: &'a D::Semaphore) -> Self {
        self.signal = Some(semaphore);
        self
    }

    pub fn fence(mut self, fence: &'a D::Fence) -> Self {
        self.fence = Some(fence);
        self
    }
}
