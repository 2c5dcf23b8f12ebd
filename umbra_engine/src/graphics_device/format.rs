/// Pixel/vertex formats and extents shared by every backend

/// Pixel and vertex attribute formats
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    // Colour formats
    R8G8B8A8_SRGB,
    R8G8B8A8_UNORM,
    B8G8R8A8_SRGB,
    B8G8R8A8_UNORM,
    R16G16B16A16_SFLOAT,

    // Depth formats, in depth-probe preference order
    D32_SFLOAT_S8_UINT,
    D32_SFLOAT,
    D24_UNORM_S8_UINT,
    D16_UNORM_S8_UINT,
    D16_UNORM,

    // Vertex attribute formats
    R32_SFLOAT,
    R32G32_SFLOAT,
    R32G32B32_SFLOAT,
    R32G32B32A32_SFLOAT,
}

impl Format {
    /// Depth formats probed at device creation, best first
    pub const DEPTH_CANDIDATES: [Format; 5] = [
        Format::D32_SFLOAT_S8_UINT,
        Format::D32_SFLOAT,
        Format::D24_UNORM_S8_UINT,
        Format::D16_UNORM_S8_UINT,
        Format::D16_UNORM,
    ];

    pub fn is_depth(&self) -> bool {
        matches!(
            self,
            Format::D32_SFLOAT_S8_UINT
                | Format::D32_SFLOAT
                | Format::D24_UNORM_S8_UINT
                | Format::D16_UNORM_S8_UINT
                | Format::D16_UNORM
        )
    }

    pub fn has_stencil(&self) -> bool {
        matches!(
            self,
            Format::D32_SFLOAT_S8_UINT | Format::D24_UNORM_S8_UINT | Format::D16_UNORM_S8_UINT
        )
    }

    pub fn is_srgb(&self) -> bool {
        matches!(self, Format::R8G8B8A8_SRGB | Format::B8G8R8A8_SRGB)
    }

    /// Size in bytes of one texel / vertex element
    pub fn size_bytes(&self) -> u32 {
        match self {
            Format::R8G8B8A8_SRGB
            | Format::R8G8B8A8_UNORM
            | Format::B8G8R8A8_SRGB
            | Format::B8G8R8A8_UNORM => 4,
            Format::R16G16B16A16_SFLOAT => 8,
            Format::D32_SFLOAT_S8_UINT => 8,
            Format::D32_SFLOAT | Format::D24_UNORM_S8_UINT => 4,
            Format::D16_UNORM_S8_UINT => 3,
            Format::D16_UNORM => 2,
            Format::R32_SFLOAT => 4,
            Format::R32G32_SFLOAT => 8,
            Format::R32G32B32_SFLOAT => 12,
            Format::R32G32B32A32_SFLOAT => 16,
        }
    }
}

/// Colour space reported alongside a surface format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColorSpace {
    SrgbNonLinear,
    /// Any colour space this crate does not name
    Other(i32),
}

/// 2D size in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// A minimized window reports a zero-area extent
    pub fn is_zero_area(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width / height, 1.0 for a zero-area extent
    pub fn aspect_ratio(&self) -> f32 {
        if self.is_zero_area() {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    /// Clamp each axis into `[min, max]`
    pub fn clamp(&self, min: Extent2D, max: Extent2D) -> Extent2D {
        Extent2D {
            width: self.width.clamp(min.width, max.width.max(min.width)),
            height: self.height.clamp(min.height, max.height.max(min.height)),
        }
    }
}
