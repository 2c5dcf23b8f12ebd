/// Memory type lookup
///
/// Two call styles: `find_memory_type` is soft (the caller decides what to
/// do without a match) and `find_memory_type_or_abort` is hard (no match
/// ends the process).

use bitflags::bitflags;

bitflags! {
    /// Memory property flags (bit values follow the Vulkan numbering)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MemoryPropertyFlags: u32 {
        const DEVICE_LOCAL = 0x01;
        const HOST_VISIBLE = 0x02;
        const HOST_COHERENT = 0x04;
        const HOST_CACHED = 0x08;
        const LAZILY_ALLOCATED = 0x10;
    }
}

impl MemoryPropertyFlags {
    /// Host-visible + coherent, for uniform and staging buffers
    pub const HOST_UPLOAD: Self = Self::HOST_VISIBLE.union(Self::HOST_COHERENT);
}

/// Where an allocation lives, from the allocator's point of view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryLocation {
    /// Host-visible memory written by the CPU
    CpuToGpu,
    /// Device-local memory only the GPU touches
    GpuOnly,
}

impl MemoryLocation {
    pub fn from_properties(properties: MemoryPropertyFlags) -> Self {
        if properties.contains(MemoryPropertyFlags::HOST_VISIBLE) {
            MemoryLocation::CpuToGpu
        } else {
            MemoryLocation::GpuOnly
        }
    }
}

/// First memory type allowed by `type_bits` whose flags contain `required`
pub fn find_memory_type(
    memory_types: &[MemoryPropertyFlags],
    type_bits: u32,
    required: MemoryPropertyFlags,
) -> Option<u32> {
    memory_types
        .iter()
        .enumerate()
        .take(32)
        .find(|(index, flags)| type_bits & (1 << index) != 0 && flags.contains(required))
        .map(|(index, _)| index as u32)
}

/// Like `find_memory_type`, but a missing type logs and aborts the process
pub fn find_memory_type_or_abort(
    memory_types: &[MemoryPropertyFlags],
    type_bits: u32,
    required: MemoryPropertyFlags,
) -> u32 {
    match find_memory_type(memory_types, type_bits, required) {
        Some(index) => index,
        None => crate::engine_fatal!(
            "umbra::Memory",
            "No memory type satisfies {:?} (type bits {:#b})",
            required,
            type_bits
        ),
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
