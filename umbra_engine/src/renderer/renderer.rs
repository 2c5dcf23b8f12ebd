/// Frame orchestrator
///
/// Owns the graphics device, the swap-chain-bound `BaseResources` and a
/// `RenderStrategy`. Drives the lifecycle (init, draw, resize, shutdown)
/// and the per-frame acquire → render → present sequence.

use std::time::{Duration, Instant};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graphics_device::{AcquireOutcome, Extent2D, GraphicsDevice, PresentOutcome};
use crate::{engine_debug, engine_info, engine_trace, engine_warn};
use super::base::BaseResources;
use super::state::RendererState;
use super::strategy::{FrameContext, RenderStrategy};
use super::uniforms::{CameraMatrices, DebugTarget};
use super::window::{wait_for_nonzero_extent, WindowSurface};

/// What happened to one `draw_frame` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameOutcome {
    /// An image was queued for presentation
    Presented,
    /// Nothing was presented (not initialized, resize pending, chain out of date)
    Skipped,
}

/// Counters since init
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub frames_presented: u64,
    pub frames_skipped: u64,
    pub resizes: u64,
    pub submissions: u64,
}

pub struct Renderer<D: GraphicsDevice, S: RenderStrategy<D>> {
    // Dropped first: strategy resources, then base resources, then the device
    strategy: S,
    base: Option<BaseResources<D>>,
    device: D,
    config: Config,
    state: RendererState,
    pending_resize: bool,
    stats: RendererStats,
    last_frame: Option<Instant>,
    aspect_ratio: f32,
}

impl<D: GraphicsDevice, S: RenderStrategy<D>> Renderer<D, S> {
    pub fn new(device: D, strategy: S, config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            strategy,
            base: None,
            device,
            config,
            state: RendererState::Uninitialized,
            pending_resize: false,
            stats: RendererStats::default(),
            last_frame: None,
            aspect_ratio: 1.0,
        })
    }

    fn transition(&mut self, next: RendererState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(Error::InvalidState(format!(
                "renderer cannot go from {:?} to {:?}",
                self.state, next
            )));
        }
        engine_trace!("umbra::Renderer", "{:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(())
    }

    /// Create the swap chain side, then let the strategy load, build and record
    pub fn init<W: WindowSurface + ?Sized>(&mut self, window: &mut W) -> Result<()> {
        if self.state != RendererState::Uninitialized {
            return Err(Error::InvalidState(format!("init called in state {:?}", self.state)));
        }
        let extent = wait_for_nonzero_extent(
            window,
            self.config.resize_poll_attempts,
            self.config.resize_poll_interval,
        )
        .ok_or_else(|| Error::InitializationFailed("window never reported a non-zero size".to_string()))?;

        let mut base = BaseResources::new(&self.device, &self.config, extent)?;
        self.strategy.load_assets(&self.device, &base)?;
        self.strategy.init(&self.device, &base, &self.config)?;
        self.strategy.record_commands(&mut base)?;

        self.aspect_ratio = base.extent().aspect_ratio();
        engine_info!(
            "umbra::Renderer",
            "Renderer initialized at {}x{} ({} swap images, {} frames in flight)",
            base.extent().width,
            base.extent().height,
            base.image_count(),
            self.config.frames_in_flight
        );
        self.base = Some(base);
        self.transition(RendererState::Initialized)
    }

    /// Record that the window size changed; the rebuild happens on the next frame
    pub fn notify_resized(&mut self, extent: Extent2D) {
        engine_trace!("umbra::Renderer", "Resize requested: {}x{}", extent.width, extent.height);
        self.pending_resize = true;
    }

    /// Rebuild every extent-dependent resource
    ///
    /// A window that stays zero-sized for the whole poll window leaves the
    /// resize pending in `Resizing` state; frames are skipped until it succeeds.
    pub fn resize<W: WindowSurface + ?Sized>(&mut self, window: &mut W) -> Result<()> {
        if !self.state.has_resources() {
            return Err(Error::InvalidState(format!("resize called in state {:?}", self.state)));
        }
        if self.state == RendererState::Initialized {
            self.transition(RendererState::Resizing)?;
        }
        self.pending_resize = true;

        let extent = match wait_for_nonzero_extent(
            window,
            self.config.resize_poll_attempts,
            self.config.resize_poll_interval,
        ) {
            Some(extent) => extent,
            None => {
                engine_debug!("umbra::Renderer", "Window is zero-sized, resize deferred");
                return Ok(());
            }
        };

        self.device.wait_idle()?;
        let base = self
            .base
            .as_mut()
            .ok_or_else(|| Error::InvalidState("resize without base resources".to_string()))?;
        if !base.recreate(&self.device, extent)? {
            engine_debug!("umbra::Renderer", "Surface has no usable extent, resize deferred");
            return Ok(());
        }
        self.strategy.on_resize(&self.device, base)?;
        self.strategy.record_commands(base)?;

        self.aspect_ratio = base.extent().aspect_ratio();
        self.pending_resize = false;
        self.stats.resizes += 1;
        self.transition(RendererState::Initialized)
    }

    /// Acquire an image, let the strategy submit its passes, present
    pub fn draw_frame<W: WindowSurface + ?Sized>(&mut self, window: &mut W) -> Result<FrameOutcome> {
        match self.state {
            RendererState::Uninitialized => return Ok(FrameOutcome::Skipped),
            RendererState::Shutdown => {
                return Err(Error::InvalidState("draw_frame after shutdown".to_string()))
            }
            RendererState::Initialized | RendererState::Resizing => {}
        }

        if self.pending_resize || self.state == RendererState::Resizing {
            self.resize(window)?;
            if self.pending_resize {
                self.stats.frames_skipped += 1;
                return Ok(FrameOutcome::Skipped);
            }
        }

        let now = Instant::now();
        let delta = self.last_frame.map_or(Duration::ZERO, |last| now.duration_since(last));
        self.last_frame = Some(now);

        let acquired = {
            let base = self
                .base
                .as_mut()
                .ok_or_else(|| Error::InvalidState("draw_frame without base resources".to_string()))?;
            self.device
                .acquire_next_image(&mut base.swapchain, base.sync.present_complete())?
        };
        let image_index = match acquired {
            AcquireOutcome::OutOfDate => {
                engine_debug!("umbra::Renderer", "Swap chain out of date on acquire");
                self.stats.frames_skipped += 1;
                self.pending_resize = true;
                self.resize(window)?;
                return Ok(FrameOutcome::Skipped);
            }
            AcquireOutcome::Acquired { index, suboptimal } => {
                if suboptimal {
                    engine_trace!("umbra::Renderer", "Acquired suboptimal image {}", index);
                }
                index
            }
        };

        let present = {
            let base = self
                .base
                .as_ref()
                .ok_or_else(|| Error::InvalidState("draw_frame without base resources".to_string()))?;
            let frame = FrameContext {
                image_index,
                frame_index: base.sync.frame_index(),
                delta,
            };
            let submissions = self.strategy.render(&self.device, base, &frame)?;
            self.stats.submissions += u64::from(submissions);
            self.device
                .present(&base.swapchain, image_index, base.sync.render_complete(image_index)?)?
        };
        if let Some(base) = self.base.as_mut() {
            base.sync.advance();
        }

        let outcome = match present {
            PresentOutcome::Presented | PresentOutcome::Suboptimal => {
                self.stats.frames_presented += 1;
                FrameOutcome::Presented
            }
            PresentOutcome::OutOfDate => {
                engine_debug!("umbra::Renderer", "Swap chain out of date on present");
                self.stats.frames_skipped += 1;
                FrameOutcome::Skipped
            }
        };
        if present.needs_resize() {
            self.pending_resize = true;
            self.resize(window)?;
        }
        Ok(outcome)
    }

    /// Wait for the GPU, then release strategy and base resources
    ///
    /// Idempotent. Resources are released even if the idle wait fails; the
    /// wait error is returned afterwards.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.state == RendererState::Shutdown {
            return Ok(());
        }
        let idle = self.device.wait_idle();
        self.strategy.release();
        self.base = None;
        self.state = RendererState::Shutdown;
        engine_info!(
            "umbra::Renderer",
            "Renderer shut down ({} frames presented, {} skipped, {} resizes)",
            self.stats.frames_presented,
            self.stats.frames_skipped,
            self.stats.resizes
        );
        idle
    }

    pub fn set_camera(&mut self, camera: CameraMatrices) {
        self.strategy.set_camera(camera);
    }

    pub fn set_debug_target(&mut self, target: DebugTarget) {
        self.strategy.set_debug_target(target);
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn stats(&self) -> RendererStats {
        self.stats
    }

    pub fn is_resize_pending(&self) -> bool {
        self.pending_resize
    }

    /// Width / height of the current swap chain
    pub fn aspect_ratio(&self) -> f32 {
        self.aspect_ratio
    }

    /// Current swap chain extent, `None` before init and after shutdown
    pub fn extent(&self) -> Option<Extent2D> {
        self.base.as_ref().map(|base| base.extent())
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn strategy(&self) -> &S {
        &self.strategy
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

impl<D: GraphicsDevice, S: RenderStrategy<D>> Drop for Renderer<D, S> {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            engine_warn!("umbra::Renderer", "Device wait failed during shutdown: {}", e);
        }
    }
}

#[cfg(test)]
#[path = "renderer_tests.rs"]
mod tests;
