//! Integration tests for the public planning API
//!
//! Exercises the pieces a backend and an application combine before any GPU
//! object exists: swap chain planning, the two render pass layouts, the
//! descriptor layouts, procedural scenes and the uniform block layouts.
//! No GPU required.
//!
//! Run with: cargo test --test frame_planning_integration_tests

use std::mem;

use umbra_engine::glam::{Mat4, Vec3, Vec4};
use umbra_engine::umbra::device::{
    plan_swapchain, ColorSpace, DescriptorType, Extent2D, Format, ImageLayout, PresentMode,
    QueueFamilyIndices, SharingMode, SurfaceCapabilities, SurfaceFormat, SurfaceSupport,
};
use umbra_engine::umbra::render::{
    composition_pass_layout, composition_set_layout, offscreen_pass_layout, offscreen_set_layout,
    CompositionUniforms, OffscreenUniforms, COMPOSITION_UBO_BINDING, GBUFFER_COLOR_COUNT,
};
use umbra_engine::umbra::scene::{MaterialUniform, SceneBuilder};
use umbra_engine::umbra::Error;

fn desktop_surface() -> SurfaceSupport {
    SurfaceSupport {
        capabilities: SurfaceCapabilities {
            min_image_count: 2,
            max_image_count: 8,
            current_extent: SurfaceCapabilities::UNDEFINED_EXTENT,
            min_image_extent: Extent2D::new(1, 1),
            max_image_extent: Extent2D::new(4096, 4096),
        },
        formats: vec![
            SurfaceFormat { format: Format::B8G8R8A8_UNORM, color_space: ColorSpace::SrgbNonLinear },
            SurfaceFormat { format: Format::B8G8R8A8_SRGB, color_space: ColorSpace::SrgbNonLinear },
        ],
        present_modes: vec![PresentMode::Fifo, PresentMode::Immediate],
    }
}

// ============================================================================
// SWAP CHAIN PLANNING
// ============================================================================

#[test]
fn test_distinct_queue_families_share_concurrently() {
    let families = QueueFamilyIndices { graphics: 0, present: 1 };
    let plan = plan_swapchain(&desktop_surface(), Extent2D::new(1280, 720), families, true)
        .unwrap()
        .unwrap();

    assert_eq!(plan.sharing_mode, SharingMode::Concurrent);
    assert_eq!(plan.queue_family_index_count(), 2);
    assert_eq!(plan.queue_family_indices, vec![0, 1]);
    assert_eq!(plan.surface_format.format, Format::B8G8R8A8_SRGB);
    assert_eq!(plan.extent, Extent2D::new(1280, 720));
    assert_eq!(plan.image_count, 3);
}

#[test]
fn test_unified_queue_family_is_exclusive() {
    let families = QueueFamilyIndices { graphics: 2, present: 2 };
    let plan = plan_swapchain(&desktop_surface(), Extent2D::new(800, 600), families, true)
        .unwrap()
        .unwrap();

    assert_eq!(plan.sharing_mode, SharingMode::Exclusive);
    assert_eq!(plan.queue_family_index_count(), 0);
}

#[test]
fn test_vsync_off_prefers_immediate_without_mailbox() {
    let families = QueueFamilyIndices { graphics: 0, present: 0 };
    let vsync = plan_swapchain(&desktop_surface(), Extent2D::new(64, 64), families, true)
        .unwrap()
        .unwrap();
    let no_vsync = plan_swapchain(&desktop_surface(), Extent2D::new(64, 64), families, false)
        .unwrap()
        .unwrap();

    assert_eq!(vsync.present_mode, PresentMode::Fifo);
    assert_eq!(no_vsync.present_mode, PresentMode::Immediate);
}

#[test]
fn test_minimized_window_yields_no_plan() {
    let families = QueueFamilyIndices { graphics: 0, present: 0 };
    let plan = plan_swapchain(&desktop_surface(), Extent2D::new(0, 600), families, true).unwrap();
    assert!(plan.is_none());
}

#[test]
fn test_surface_without_formats_is_an_error() {
    let mut support = desktop_surface();
    support.formats.clear();
    let families = QueueFamilyIndices { graphics: 0, present: 0 };

    let result = plan_swapchain(&support, Extent2D::new(800, 600), families, true);
    assert!(matches!(result, Err(Error::InitializationFailed(_))));
}

// ============================================================================
// RENDER PASSES
// ============================================================================

#[test]
fn test_composition_pass_presents_and_keeps_depth() {
    let layout = composition_pass_layout(Format::B8G8R8A8_SRGB, Format::D32_SFLOAT).unwrap();

    assert_eq!(layout.subpass_count(), 1);
    assert_eq!(layout.attachments.len(), 2);
    assert_eq!(layout.attachments[0].final_layout, ImageLayout::PresentSrc);
    assert_eq!(layout.attachments[1].final_layout, ImageLayout::DepthStencilAttachment);
    assert_eq!(layout.color_attachment_count(0), 1);
    assert!(layout.subpasses[0].depth.is_some());
}

#[test]
fn test_offscreen_pass_writes_three_sampled_targets() {
    let layout = offscreen_pass_layout(Format::D24_UNORM_S8_UINT).unwrap();

    assert_eq!(layout.attachments.len(), GBUFFER_COLOR_COUNT + 1);
    assert_eq!(layout.color_attachment_count(0), GBUFFER_COLOR_COUNT);
    for color in &layout.attachments[..GBUFFER_COLOR_COUNT] {
        assert_eq!(color.final_layout, ImageLayout::ShaderReadOnly);
    }
    assert_eq!(layout.attachments[GBUFFER_COLOR_COUNT].format, Format::D24_UNORM_S8_UINT);
}

// ============================================================================
// DESCRIPTOR LAYOUTS
// ============================================================================

#[test]
fn test_composition_set_samples_gbuffer_and_reads_lights() {
    let layout = composition_set_layout();
    for binding in 0..3 {
        assert!(layout.declares(binding, DescriptorType::CombinedImageSampler));
    }
    assert!(layout.declares(COMPOSITION_UBO_BINDING, DescriptorType::UniformBuffer));
    assert!(!layout.declares(COMPOSITION_UBO_BINDING, DescriptorType::CombinedImageSampler));
}

#[test]
fn test_offscreen_set_has_camera_and_material_uniforms() {
    let layout = offscreen_set_layout();
    assert!(layout.declares(0, DescriptorType::UniformBuffer));
    assert!(layout.declares(1, DescriptorType::UniformBuffer));
    assert!(!layout.declares(2, DescriptorType::UniformBuffer));
}

// ============================================================================
// SCENES
// ============================================================================

#[test]
fn test_procedural_scene_builds() {
    let mut builder = SceneBuilder::new();
    let stone = builder.add_material("stone", Vec4::ONE, 0.7, 0.1);
    let root = builder.add_node("root", None, Mat4::IDENTITY).unwrap();
    let child = builder
        .add_node("child", Some(root), Mat4::from_translation(Vec3::Y))
        .unwrap();
    builder.add_box(child, Vec3::splat(0.5), stone).unwrap();
    builder.add_plane(root, 4.0, stone).unwrap();

    let scene = builder.build().unwrap();
    assert_eq!(scene.vertices.len(), 6 * 4 + 4);
    assert_eq!(scene.indices.len(), 6 * 6 + 6);
    assert_eq!(scene.nodes[1].parent, Some(0));
    assert_eq!(scene.nodes[1].primitives.len(), 1);
}

#[test]
fn test_scene_without_geometry_is_rejected() {
    let mut builder = SceneBuilder::new();
    builder.add_node("empty", None, Mat4::IDENTITY).unwrap();
    assert!(matches!(builder.build(), Err(Error::InvalidResource(_))));
}

#[test]
fn test_unknown_parent_is_rejected() {
    let mut builder = SceneBuilder::new();
    assert!(builder.add_node("orphan", Some(3), Mat4::IDENTITY).is_err());
}

// ============================================================================
// UNIFORM LAYOUTS
// ============================================================================

#[test]
fn test_uniform_blocks_match_std140_sizes() {
    // 6 lights x 32 bytes, view position, debug target padded to 16 bytes
    assert_eq!(mem::size_of::<CompositionUniforms>(), 224);
    assert_eq!(mem::size_of::<OffscreenUniforms>(), 128);
    assert_eq!(mem::size_of::<MaterialUniform>(), 32);
}
