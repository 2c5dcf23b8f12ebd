//! Unit tests for the reflection checks in vulkan_pipeline.rs

use super::*;
use umbra_engine::umbra::device::{DescriptorBinding, DescriptorType};

fn composition_layout() -> DescriptorSetLayoutDesc {
    DescriptorSetLayoutDesc::new(vec![
        DescriptorBinding::combined_image_sampler(0, ShaderStageFlags::FRAGMENT),
        DescriptorBinding::combined_image_sampler(1, ShaderStageFlags::FRAGMENT),
        DescriptorBinding::combined_image_sampler(2, ShaderStageFlags::FRAGMENT),
        DescriptorBinding::uniform_buffer(3, ShaderStageFlags::FRAGMENT),
    ])
}

fn binding(set: u32, binding: u32, ty: DescriptorType) -> ReflectedBinding {
    ReflectedBinding { set, binding, ty }
}

// ============================================================================
// DESCRIPTOR BINDINGS
// ============================================================================

#[test]
fn test_declared_bindings_pass() {
    let layout = composition_layout();
    let used = [
        binding(0, 0, DescriptorType::CombinedImageSampler),
        binding(0, 3, DescriptorType::UniformBuffer),
    ];
    assert!(undeclared_bindings(&used, &[&layout]).is_empty());
}

#[test]
fn test_type_mismatch_is_reported() {
    let layout = composition_layout();
    let used = [binding(0, 3, DescriptorType::CombinedImageSampler)];
    assert_eq!(undeclared_bindings(&used, &[&layout]), used.to_vec());
}

#[test]
fn test_missing_set_is_reported() {
    let layout = composition_layout();
    let used = [binding(1, 0, DescriptorType::UniformBuffer)];
    assert_eq!(undeclared_bindings(&used, &[&layout]).len(), 1);
    assert_eq!(undeclared_bindings(&used, &[]).len(), 1);
}

// ============================================================================
// PUSH CONSTANTS
// ============================================================================

#[test]
fn test_push_constant_coverage_per_stage() {
    let ranges = [PushConstantRange {
        stages: ShaderStageFlags::VERTEX,
        offset: 0,
        size: 64,
    }];
    assert_eq!(push_constant_coverage(ShaderStageFlags::VERTEX, &ranges), 64);
    assert_eq!(push_constant_coverage(ShaderStageFlags::FRAGMENT, &ranges), 0);
    assert_eq!(push_constant_coverage(ShaderStageFlags::VERTEX, &[]), 0);
}

#[test]
fn test_push_constant_coverage_takes_furthest_range_end() {
    let ranges = [
        PushConstantRange { stages: ShaderStageFlags::VERTEX, offset: 0, size: 64 },
        PushConstantRange {
            stages: ShaderStageFlags::VERTEX | ShaderStageFlags::FRAGMENT,
            offset: 64,
            size: 16,
        },
    ];
    assert_eq!(push_constant_coverage(ShaderStageFlags::VERTEX, &ranges), 80);
    assert_eq!(push_constant_coverage(ShaderStageFlags::FRAGMENT, &ranges), 80);
}
