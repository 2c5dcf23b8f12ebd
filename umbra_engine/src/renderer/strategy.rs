/// Render strategy trait
///
/// The frame orchestrator owns the swap chain side (`BaseResources`) and
/// delegates everything pass-specific to a strategy: asset loading, its own
/// GPU resources, command recording and the per-frame submissions.

use std::time::Duration;

use crate::config::Config;
use crate::error::Result;
use crate::graphics_device::GraphicsDevice;
use super::base::BaseResources;
use super::uniforms::{CameraMatrices, DebugTarget};

/// Per-frame values handed to the strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameContext {
    /// Swap image acquired for this frame
    pub image_index: u32,
    /// Frame-in-flight slot
    pub frame_index: usize,
    /// Time since the previous drawn frame
    pub delta: Duration,
}

pub trait RenderStrategy<D: GraphicsDevice> {
    /// Load and upload scene data (called once, before `init`)
    fn load_assets(&mut self, device: &D, base: &BaseResources<D>) -> Result<()>;

    /// Create the strategy's GPU resources
    fn init(&mut self, device: &D, base: &BaseResources<D>, config: &Config) -> Result<()>;

    /// (Re)record every command list, the base composition lists included
    fn record_commands(&mut self, base: &mut BaseResources<D>) -> Result<()>;

    /// Submit the frame's work; the image acquired for `frame` is presented afterwards
    ///
    /// Returns the number of queue submissions made.
    fn render(&mut self, device: &D, base: &BaseResources<D>, frame: &FrameContext) -> Result<u32>;

    /// Rebuild extent-dependent resources after the base was recreated
    fn on_resize(&mut self, device: &D, base: &BaseResources<D>) -> Result<()>;

    /// Write per-frame uniform data
    fn update_uniforms(&mut self, frame: &FrameContext) -> Result<()>;

    /// Drop every GPU resource (device is idle)
    fn release(&mut self);

    fn set_camera(&mut self, _camera: CameraMatrices) {}

    fn set_debug_target(&mut self, _target: DebugTarget) {}
}
