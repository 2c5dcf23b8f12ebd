/// Buffer descriptors and the backend buffer trait

use bitflags::bitflags;

use crate::error::Result;
use crate::graphics_device::MemoryPropertyFlags;

bitflags! {
    /// How a buffer is used (bit values follow the Vulkan numbering)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct BufferUsage: u32 {
        const TRANSFER_SRC = 0x01;
        const TRANSFER_DST = 0x02;
        const UNIFORM = 0x10;
        const INDEX = 0x40;
        const VERTEX = 0x80;
    }
}

/// Descriptor for creating a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDesc {
    /// Size in bytes
    pub size: u64,
    pub usage: BufferUsage,
    /// Memory properties the backing allocation must have
    pub memory: MemoryPropertyFlags,
}

impl BufferDesc {
    /// Host-visible uniform buffer, rewritten every frame
    pub fn uniform(size: u64) -> Self {
        Self {
            size,
            usage: BufferUsage::UNIFORM,
            memory: MemoryPropertyFlags::HOST_UPLOAD,
        }
    }

    /// Host-visible transfer source, dropped right after the copy
    pub fn staging(size: u64) -> Self {
        Self {
            size,
            usage: BufferUsage::TRANSFER_SRC,
            memory: MemoryPropertyFlags::HOST_UPLOAD,
        }
    }

    /// Device-local copy destination (vertex/index data)
    pub fn device_local(size: u64, usage: BufferUsage) -> Self {
        Self {
            size,
            usage: usage | BufferUsage::TRANSFER_DST,
            memory: MemoryPropertyFlags::DEVICE_LOCAL,
        }
    }

    pub fn is_host_visible(&self) -> bool {
        self.memory.contains(MemoryPropertyFlags::HOST_VISIBLE)
    }
}

/// GPU buffer
///
/// The buffer and its memory are released when dropped.
pub trait Buffer {
    /// Size in bytes
    fn size(&self) -> u64;

    /// Copy `data` at `offset` through the host mapping
    ///
    /// Fails on device-local buffers and on out-of-range writes.
    fn write(&self, offset: u64, data: &[u8]) -> Result<()>;
}
