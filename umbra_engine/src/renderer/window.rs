/// Window collaborator
///
/// The renderer only needs the current framebuffer size and a way to let the
/// windowing system process events while it waits for a usable size.

use std::thread;
use std::time::Duration;

use crate::graphics_device::Extent2D;

pub trait WindowSurface {
    /// Drawable size in pixels (zero while minimized)
    fn framebuffer_extent(&self) -> Extent2D;

    /// Process pending window-system events
    fn pump_events(&mut self);
}

/// Poll until the window reports a non-zero extent, at most `attempts` times
///
/// Events are pumped between polls. Returns `None` if the window stayed
/// zero-sized.
pub fn wait_for_nonzero_extent<W: WindowSurface + ?Sized>(
    window: &mut W,
    attempts: u32,
    interval: Duration,
) -> Option<Extent2D> {
    for attempt in 0..attempts {
        let extent = window.framebuffer_extent();
        if !extent.is_zero_area() {
            return Some(extent);
        }
        window.pump_events();
        if attempt + 1 < attempts && !interval.is_zero() {
            thread::sleep(interval);
        }
    }
    None
}

#[cfg(test)]
#[path = "window_tests.rs"]
mod tests;
