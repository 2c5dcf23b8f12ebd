/// Frame synchronization primitives
///
/// One present-complete semaphore per frame in flight (signaled by acquire),
/// one render-complete semaphore per swap image (signaled by the composition
/// submission, waited by present). The per-image half is rebuilt with the
/// swap chain.

use crate::error::{Error, Result};
use crate::graphics_device::GraphicsDevice;

pub struct FrameSync<D: GraphicsDevice> {
    render_complete: Vec<D::Semaphore>,
    present_complete: Vec<D::Semaphore>,
    frame_index: usize,
}

impl<D: GraphicsDevice> FrameSync<D> {
    pub fn new(device: &D, frames_in_flight: usize, image_count: usize) -> Result<Self> {
        let present_complete = (0..frames_in_flight)
            .map(|_| device.create_semaphore())
            .collect::<Result<Vec<_>>>()?;
        let render_complete = Self::create_render_complete(device, image_count)?;
        Ok(Self {
            render_complete,
            present_complete,
            frame_index: 0,
        })
    }

    fn create_render_complete(device: &D, image_count: usize) -> Result<Vec<D::Semaphore>> {
        (0..image_count).map(|_| device.create_semaphore()).collect()
    }

    /// Replace the per-image semaphores after the swap chain changed
    pub fn recreate_render_complete(&mut self, device: &D, image_count: usize) -> Result<()> {
        self.render_complete = Self::create_render_complete(device, image_count)?;
        Ok(())
    }

    /// Semaphore the acquire of the current frame signals
    pub fn present_complete(&self) -> &D::Semaphore {
        &self.present_complete[self.frame_index]
    }

    pub fn render_complete(&self, image_index: u32) -> Result<&D::Semaphore> {
        self.render_complete.get(image_index as usize).ok_or_else(|| {
            Error::InvalidResource(format!(
                "no render-complete semaphore for image {} ({} images)",
                image_index,
                self.render_complete.len()
            ))
        })
    }

    pub fn frame_index(&self) -> usize {
        self.frame_index
    }

    pub fn frames_in_flight(&self) -> usize {
        self.present_complete.len()
    }

    /// Move to the next frame-in-flight slot
    pub fn advance(&mut self) {
        self.frame_index = (self.frame_index + 1) % self.present_complete.len();
    }
}
