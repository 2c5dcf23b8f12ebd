/// Framebuffer trait - binds a render pass to concrete image views
///
/// One framebuffer per swap image for the composition pass, exactly one for
/// the offscreen G-buffer pass. Recreated only when its views change
/// (window resize).

use crate::graphics_device::Extent2D;

pub trait Framebuffer {
    fn extent(&self) -> Extent2D;

    /// Number of attachment views bound
    fn attachment_count(&self) -> usize;
}
