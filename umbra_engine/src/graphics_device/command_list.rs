/// Command list trait and recording-state tracking
///
/// Every backend command list goes through `RecordingTracker`, so misuse
/// (commands outside begin/end, draws outside a render pass, nested passes)
/// is rejected identically by every backend.

use crate::error::{Error, Result};
use crate::graphics_device::{Extent2D, GraphicsDevice, IndexType, ShaderStageFlags};

/// Viewport rectangle + depth range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub min_depth: f32,
    pub max_depth: f32,
}

impl Viewport {
    /// Full-extent viewport with depth range [0, 1]
    pub fn from_extent(extent: Extent2D) -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: extent.width as f32,
            height: extent.height as f32,
            min_depth: 0.0,
            max_depth: 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect2D {
    pub x: i32,
    pub y: i32,
    pub extent: Extent2D,
}

impl Rect2D {
    pub fn from_extent(extent: Extent2D) -> Self {
        Self { x: 0, y: 0, extent }
    }
}

/// Clear value of one attachment, in attachment order
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ClearValue {
    Color([f32; 4]),
    DepthStencil { depth: f32, stencil: u32 },
}

/// Parameters of a render pass instance
pub struct RenderPassBegin<'a, D: GraphicsDevice> {
    pub render_pass: &'a D::RenderPass,
    pub framebuffer: &'a D::Framebuffer,
    pub render_area: Rect2D,
    pub clear_values: Vec<ClearValue>,
}

/// Recording state of a command list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordingState {
    /// Freshly allocated or reset
    Initial,
    Recording,
    InRenderPass,
    /// Ended and ready to submit
    Executable,
}

/// State machine shared by all command list implementations
#[derive(Debug, Clone, Copy)]
pub struct RecordingTracker {
    state: RecordingState,
}

impl RecordingTracker {
    pub fn new() -> Self {
        Self { state: RecordingState::Initial }
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    /// Begin recording; re-recording an executable list resets it
    pub fn begin(&mut self) -> Result<()> {
        match self.state {
            RecordingState::Initial | RecordingState::Executable => {
                self.state = RecordingState::Recording;
                Ok(())
            }
            state => Err(Self::misuse("begin", state)),
        }
    }

    pub fn end(&mut self) -> Result<()> {
        match self.state {
            RecordingState::Recording => {
                self.state = RecordingState::Executable;
                Ok(())
            }
            state => Err(Self::misuse("end", state)),
        }
    }

    pub fn begin_render_pass(&mut self) -> Result<()> {
        match self.state {
            RecordingState::Recording => {
                self.state = RecordingState::InRenderPass;
                Ok(())
            }
            state => Err(Self::misuse("begin_render_pass", state)),
        }
    }

    pub fn end_render_pass(&mut self) -> Result<()> {
        match self.state {
            RecordingState::InRenderPass => {
                self.state = RecordingState::Recording;
                Ok(())
            }
            state => Err(Self::misuse("end_render_pass", state)),
        }
    }

    /// State-setting and binding commands: anywhere between begin and end
    pub fn require_recording(&self, command: &str) -> Result<()> {
        match self.state {
            RecordingState::Recording | RecordingState::InRenderPass => Ok(()),
            state => Err(Self::misuse(command, state)),
        }
    }

    /// Draws: only inside a render pass
    pub fn require_render_pass(&self, command: &str) -> Result<()> {
        match self.state {
            RecordingState::InRenderPass => Ok(()),
            state => Err(Self::misuse(command, state)),
        }
    }

    /// Submission needs a fully recorded list
    pub fn require_executable(&self) -> Result<()> {
        match self.state {
            RecordingState::Executable => Ok(()),
            state => Err(Self::misuse("submit", state)),
        }
    }

    fn misuse(command: &str, state: RecordingState) -> Error {
        Error::BackendError(format!("{} is not allowed in {:?} state", command, state))
    }
}

impl Default for RecordingTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Command list recording API
///
/// Order-sensitive thin wrappers: the caller binds before drawing.
pub trait CommandList<D: GraphicsDevice> {
    fn begin(&mut self) -> Result<()>;
    fn end(&mut self) -> Result<()>;

    fn begin_render_pass(&mut self, begin: &RenderPassBegin<'_, D>) -> Result<()>;
    fn end_render_pass(&mut self) -> Result<()>;

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()>;
    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()>;

    fn bind_pipeline(&mut self, pipeline: &D::Pipeline) -> Result<()>;
    fn bind_descriptor_sets(
        &mut self,
        pipeline: &D::Pipeline,
        first_set: u32,
        sets: &[&D::DescriptorSet],
    ) -> Result<()>;
    fn push_constants(
        &mut self,
        pipeline: &D::Pipeline,
        stages: ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) -> Result<()>;
    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[(&D::Buffer, u64)]) -> Result<()>;
    fn bind_index_buffer(&mut self, buffer: &D::Buffer, offset: u64, index_type: IndexType) -> Result<()>;

    fn draw(&mut self, vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> Result<()>;
    fn draw_indexed(
        &mut self,
        index_count: u32,
        instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        first_instance: u32,
    ) -> Result<()>;

    fn recording_state(&self) -> RecordingState;
}

#[cfg(test)]
#[path = "command_list_tests.rs"]
mod tests;
