/// Swap chain planning and the backend swap chain trait
///
/// `plan_swapchain` is the backend-agnostic selection logic: surface format,
/// present mode, extent, image count and queue sharing. Backends query the
/// surface, call the planner and create the chain from the returned plan.

use crate::error::{Error, Result};
use crate::graphics_device::{ColorSpace, Extent2D, Format};

/// Surface capabilities reported by the presentation engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceCapabilities {
    pub min_image_count: u32,
    /// 0 means no upper bound
    pub max_image_count: u32,
    /// `u32::MAX` on both axes means "the swap chain decides"
    pub current_extent: Extent2D,
    pub min_image_extent: Extent2D,
    pub max_image_extent: Extent2D,
}

impl SurfaceCapabilities {
    pub const UNDEFINED_EXTENT: Extent2D = Extent2D::new(u32::MAX, u32::MAX);
}

/// Format + colour space pair supported by a surface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceFormat {
    pub format: Format,
    pub color_space: ColorSpace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentMode {
    Immediate,
    Mailbox,
    Fifo,
    FifoRelaxed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharingMode {
    Exclusive,
    Concurrent,
}

/// Queue families used for rendering and presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    pub graphics: u32,
    pub present: u32,
}

impl QueueFamilyIndices {
    pub fn is_unified(&self) -> bool {
        self.graphics == self.present
    }
}

/// Everything the presentation engine reports for one surface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceSupport {
    pub capabilities: SurfaceCapabilities,
    pub formats: Vec<SurfaceFormat>,
    pub present_modes: Vec<PresentMode>,
}

/// Resolved swap chain parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwapchainPlan {
    pub surface_format: SurfaceFormat,
    pub present_mode: PresentMode,
    pub extent: Extent2D,
    pub image_count: u32,
    pub sharing_mode: SharingMode,
    /// Empty for exclusive sharing
    pub queue_family_indices: Vec<u32>,
}

impl SwapchainPlan {
    pub fn queue_family_index_count(&self) -> u32 {
        self.queue_family_indices.len() as u32
    }
}

/// Prefer B8G8R8A8_SRGB with sRGB non-linear colour space, else the first reported format
pub fn choose_surface_format(formats: &[SurfaceFormat]) -> Option<SurfaceFormat> {
    formats
        .iter()
        .find(|f| f.format == Format::B8G8R8A8_SRGB && f.color_space == ColorSpace::SrgbNonLinear)
        .or_else(|| formats.first())
        .copied()
}

/// Mailbox when available, Immediate only without vsync, Fifo otherwise
pub fn choose_present_mode(modes: &[PresentMode], vsync: bool) -> PresentMode {
    if modes.contains(&PresentMode::Mailbox) {
        PresentMode::Mailbox
    } else if !vsync && modes.contains(&PresentMode::Immediate) {
        PresentMode::Immediate
    } else {
        PresentMode::Fifo
    }
}

/// Surface extent, or the window extent clamped to capability bounds when the surface leaves it open
pub fn choose_extent(capabilities: &SurfaceCapabilities, window_extent: Extent2D) -> Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        window_extent.clamp(capabilities.min_image_extent, capabilities.max_image_extent)
    }
}

/// Fewest images a chain is built with
pub const MIN_SWAP_IMAGES: u32 = 2;

/// `min(max, min + 1)` with max == 0 meaning unbounded, never below `MIN_SWAP_IMAGES`
///
/// Callers reject surfaces whose `max_image_count` is below `MIN_SWAP_IMAGES` first.
pub fn choose_image_count(capabilities: &SurfaceCapabilities) -> u32 {
    let desired = capabilities.min_image_count + 1;
    let bounded = if capabilities.max_image_count == 0 {
        desired
    } else {
        desired.min(capabilities.max_image_count)
    };
    bounded.max(MIN_SWAP_IMAGES)
}

/// Concurrent sharing across two distinct families, exclusive otherwise
pub fn choose_sharing(families: QueueFamilyIndices) -> (SharingMode, Vec<u32>) {
    if families.is_unified() {
        (SharingMode::Exclusive, Vec::new())
    } else {
        (SharingMode::Concurrent, vec![families.graphics, families.present])
    }
}

/// Plan a swap chain for the surface
///
/// Returns `Ok(None)` when the resulting extent has zero area (minimized
/// window): no swap chain must be created in that case.
pub fn plan_swapchain(
    support: &SurfaceSupport,
    window_extent: Extent2D,
    families: QueueFamilyIndices,
    vsync: bool,
) -> Result<Option<SwapchainPlan>> {
    let surface_format = choose_surface_format(&support.formats).ok_or_else(|| {
        Error::InitializationFailed("surface reports no supported format".to_string())
    })?;
    if support.present_modes.is_empty() {
        return Err(Error::InitializationFailed(
            "surface reports no present mode".to_string(),
        ));
    }
    let max_images = support.capabilities.max_image_count;
    if max_images != 0 && max_images < MIN_SWAP_IMAGES {
        return Err(Error::InitializationFailed(format!(
            "surface allows at most {} swap image(s), {} are required",
            max_images, MIN_SWAP_IMAGES
        )));
    }

    if window_extent.is_zero_area() {
        return Ok(None);
    }
    let extent = choose_extent(&support.capabilities, window_extent);
    if extent.is_zero_area() {
        return Ok(None);
    }

    let (sharing_mode, queue_family_indices) = choose_sharing(families);

    Ok(Some(SwapchainPlan {
        surface_format,
        present_mode: choose_present_mode(&support.present_modes, vsync),
        extent,
        image_count: choose_image_count(&support.capabilities),
        sharing_mode,
        queue_family_indices,
    }))
}

/// Result of acquiring the next presentable image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// `suboptimal` frames are still drawn
    Acquired { index: u32, suboptimal: bool },
    /// The chain no longer matches the surface; the frame is skipped and the chain rebuilt
    OutOfDate,
}

/// Result of queueing an image for presentation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    /// Presented, but the chain should be rebuilt
    Suboptimal,
    /// Not presented, the chain must be rebuilt
    OutOfDate,
}

impl PresentOutcome {
    pub fn needs_resize(&self) -> bool {
        !matches!(self, PresentOutcome::Presented)
    }
}

/// Presentable image chain
///
/// Dropping the chain destroys its image views, then the chain itself.
pub trait Swapchain {
    type ImageView: Copy;

    fn extent(&self) -> Extent2D;
    fn format(&self) -> Format;
    fn image_count(&self) -> usize;
    fn image_view(&self, index: usize) -> Option<Self::ImageView>;
    /// Index returned by the last successful acquire
    fn current_image(&self) -> u32;
    fn present_mode(&self) -> PresentMode;
}

#[cfg(test)]
#[path = "swapchain_tests.rs"]
mod tests;
