/// Attachment roles and the per-role description policy
///
/// An ordered list of `AttachmentSpec` is the input of one render pass. The
/// position of a spec in that list is its attachment index: descriptions,
/// subpass references and framebuffer views all use the same index.

use bitflags::bitflags;

use crate::error::{Error, Result};
use crate::graphics_device::{Extent2D, Format, SampleCount};

/// What an attachment is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentRole {
    /// Swap chain image, presented after the pass
    Framebuffer,
    /// Colour target written by one pass and sampled by the next
    Color,
    /// Depth/stencil target
    Depth,
    /// Written as colour in its first subpass, read as input attachment afterwards
    Input,
}

/// Load operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOp {
    Load,
    Clear,
    DontCare,
}

/// Store operation for an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    Store,
    DontCare,
}

/// Image layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageLayout {
    Undefined,
    ColorAttachment,
    DepthStencilAttachment,
    ShaderReadOnly,
    TransferSrc,
    TransferDst,
    PresentSrc,
}

bitflags! {
    /// Image usage requested at attachment creation
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ImageUsage: u32 {
        const TRANSFER_SRC = 0x01;
        const TRANSFER_DST = 0x02;
        const SAMPLED = 0x04;
        const COLOR_ATTACHMENT = 0x10;
        const DEPTH_STENCIL_ATTACHMENT = 0x20;
        const INPUT_ATTACHMENT = 0x80;
    }
}

/// Set of subpass indices an attachment takes part in (at most 32 subpasses)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SubpassSet(u32);

impl SubpassSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Membership in subpass 0 only
    pub const fn first() -> Self {
        Self(1)
    }

    pub fn from_indices(indices: &[u32]) -> Self {
        let mut set = Self::empty();
        for &index in indices {
            set = set.with(index);
        }
        set
    }

    pub fn with(self, index: u32) -> Self {
        debug_assert!(index < 32, "subpass index {} out of range", index);
        Self(self.0 | (1 << index))
    }

    pub fn contains(&self, index: u32) -> bool {
        index < 32 && self.0 & (1 << index) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// Lowest member, the subpass that first writes the attachment
    pub fn lowest(&self) -> Option<u32> {
        if self.0 == 0 {
            None
        } else {
            Some(self.0.trailing_zeros())
        }
    }

    /// Highest member + 1
    pub fn span(&self) -> u32 {
        32 - self.0.leading_zeros()
    }

    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        (0..32).filter(move |&i| self.contains(i))
    }
}

/// One entry of the ordered attachment list of a render pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentSpec {
    pub role: AttachmentRole,
    pub format: Format,
    pub subpasses: SubpassSet,
}

impl AttachmentSpec {
    pub fn new(role: AttachmentRole, format: Format, subpasses: SubpassSet) -> Self {
        Self { role, format, subpasses }
    }

    /// Attachment used by subpass 0 only
    pub fn single(role: AttachmentRole, format: Format) -> Self {
        Self::new(role, format, SubpassSet::first())
    }

    /// Role/format coherence: a Depth role needs a depth format and the others a colour one
    pub fn validate(&self, index: usize) -> Result<()> {
        let depth_role = self.role == AttachmentRole::Depth;
        if depth_role != self.format.is_depth() {
            return Err(Error::InvalidResource(format!(
                "attachment {}: role {:?} cannot use format {:?}",
                index, self.role, self.format
            )));
        }
        if self.subpasses.is_empty() {
            return Err(Error::InvalidResource(format!(
                "attachment {}: not used by any subpass",
                index
            )));
        }
        Ok(())
    }

    pub fn describe(&self) -> AttachmentDescription {
        self.role.describe(self.format)
    }
}

/// Fully resolved attachment description (one per attachment index)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDescription {
    pub format: Format,
    pub samples: SampleCount,
    pub load_op: LoadOp,
    pub store_op: StoreOp,
    pub stencil_load_op: LoadOp,
    pub stencil_store_op: StoreOp,
    pub initial_layout: ImageLayout,
    pub final_layout: ImageLayout,
}

impl AttachmentRole {
    /// Fixed load/store and layout policy for the role
    pub fn describe(self, format: Format) -> AttachmentDescription {
        let (load_op, store_op, stencil_load_op, final_layout) = match self {
            AttachmentRole::Framebuffer => {
                (LoadOp::Clear, StoreOp::Store, LoadOp::DontCare, ImageLayout::PresentSrc)
            }
            AttachmentRole::Depth => {
                (LoadOp::Clear, StoreOp::Store, LoadOp::Clear, ImageLayout::DepthStencilAttachment)
            }
            AttachmentRole::Color => {
                (LoadOp::DontCare, StoreOp::Store, LoadOp::DontCare, ImageLayout::ShaderReadOnly)
            }
            AttachmentRole::Input => {
                (LoadOp::Clear, StoreOp::DontCare, LoadOp::DontCare, ImageLayout::ShaderReadOnly)
            }
        };

        AttachmentDescription {
            format,
            samples: SampleCount::S1,
            load_op,
            store_op,
            stencil_load_op,
            stencil_store_op: StoreOp::DontCare,
            initial_layout: ImageLayout::Undefined,
            final_layout,
        }
    }

    /// Usage flags an image of this role is created with
    pub fn image_usage(self) -> ImageUsage {
        match self {
            AttachmentRole::Framebuffer => ImageUsage::COLOR_ATTACHMENT,
            AttachmentRole::Color => ImageUsage::COLOR_ATTACHMENT | ImageUsage::SAMPLED,
            AttachmentRole::Depth => ImageUsage::DEPTH_STENCIL_ATTACHMENT,
            AttachmentRole::Input => ImageUsage::COLOR_ATTACHMENT | ImageUsage::INPUT_ATTACHMENT,
        }
    }

    /// Framebuffer attachments reuse swap chain images and own no memory
    pub fn allocates_memory(self) -> bool {
        self != AttachmentRole::Framebuffer
    }
}

/// Descriptor for creating an attachment image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttachmentDesc {
    pub role: AttachmentRole,
    pub format: Format,
    pub extent: Extent2D,
}

impl AttachmentDesc {
    pub fn validate(&self) -> Result<()> {
        if !self.role.allocates_memory() {
            return Err(Error::InvalidResource(
                "Framebuffer attachments reuse swap chain views and are never allocated".to_string(),
            ));
        }
        if self.extent.is_zero_area() {
            return Err(Error::InvalidResource(format!(
                "{:?} attachment with zero extent {}x{}",
                self.role, self.extent.width, self.extent.height
            )));
        }
        AttachmentSpec::single(self.role, self.format).validate(0)
    }
}

/// Created attachment image (image + view + memory)
pub trait Attachment {
    type ImageView: Copy;

    fn view(&self) -> Self::ImageView;
    fn role(&self) -> AttachmentRole;
    fn format(&self) -> Format;
    fn extent(&self) -> Extent2D;
}

#[cfg(test)]
#[path = "attachment_tests.rs"]
mod tests;
