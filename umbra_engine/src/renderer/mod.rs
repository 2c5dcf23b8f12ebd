/// Renderer module - frame orchestration and the deferred shading strategy

mod base;
mod deferred;
mod frame_sync;
pub mod recorder;
mod renderer;
mod state;
mod strategy;
mod uniforms;
mod window;

pub use base::{composition_pass_layout, BaseResources};
pub use deferred::{
    composition_set_layout, offscreen_pass_layout, offscreen_set_layout, DeferredStrategy, GBufferSlot,
    COMPOSITION_UBO_BINDING, GBUFFER_COLOR_COUNT, MODEL_PUSH_CONSTANT_SIZE,
};
pub use frame_sync::FrameSync;
pub use renderer::{FrameOutcome, Renderer, RendererStats};
pub use state::RendererState;
pub use strategy::{FrameContext, RenderStrategy};
pub use uniforms::{
    CameraMatrices, CompositionUniforms, DebugTarget, OffscreenUniforms, PointLight, LIGHT_COUNT,
};
pub use window::{wait_for_nonzero_extent, WindowSurface};
