/// Physical device selection
///
/// Backends describe every enumerated GPU as a `PhysicalDeviceCandidate` and
/// let `select_physical_device` pick one, so the predicate stays testable
/// without a GPU.

use crate::graphics_device::QueueFamilyIndices;

/// Capabilities of one queue family relevant to rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueFamilyInfo {
    pub supports_graphics: bool,
    pub supports_present: bool,
}

/// Pick graphics + present families, preferring a single family doing both
pub fn find_queue_families(families: &[QueueFamilyInfo]) -> Option<QueueFamilyIndices> {
    if let Some(unified) = families
        .iter()
        .position(|f| f.supports_graphics && f.supports_present)
    {
        return Some(QueueFamilyIndices {
            graphics: unified as u32,
            present: unified as u32,
        });
    }

    let graphics = families.iter().position(|f| f.supports_graphics)?;
    let present = families.iter().position(|f| f.supports_present)?;
    Some(QueueFamilyIndices {
        graphics: graphics as u32,
        present: present as u32,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhysicalDeviceType {
    Discrete,
    Integrated,
    Virtual,
    Cpu,
    Other,
}

/// What the selection predicate needs to know about one GPU
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhysicalDeviceCandidate {
    pub name: String,
    pub device_type: PhysicalDeviceType,
    pub queue_families: Option<QueueFamilyIndices>,
    pub extensions: Vec<String>,
    pub surface_format_count: usize,
    pub present_mode_count: usize,
    pub sampler_anisotropy: bool,
}

impl PhysicalDeviceCandidate {
    /// Complete queue families, every required extension, a format and a present mode
    pub fn is_suitable(&self, required_extensions: &[&str]) -> bool {
        self.queue_families.is_some()
            && required_extensions
                .iter()
                .all(|req| self.extensions.iter().any(|ext| ext == req))
            && self.surface_format_count > 0
            && self.present_mode_count > 0
    }
}

/// Index of the first suitable device; anisotropic sampling breaks ties between suitable devices
pub fn select_physical_device(
    candidates: &[PhysicalDeviceCandidate],
    required_extensions: &[&str],
) -> Option<usize> {
    let suitable: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, c)| c.is_suitable(required_extensions))
        .map(|(i, _)| i)
        .collect();

    suitable
        .iter()
        .copied()
        .find(|&i| candidates[i].sampler_anisotropy)
        .or_else(|| suitable.first().copied())
}

#[cfg(test)]
#[path = "device_selection_tests.rs"]
mod tests;
