//! Unit tests for pipeline.rs
//!
//! State block defaults and `PipelineDesc::validate`.

use crate::graphics_device::mock_graphics_device::{MockGraphicsDevice, MockRenderPass, MockShaderModule};
use crate::graphics_device::{
    AttachmentRole, AttachmentSpec, CompareOp, CullMode, DepthStencilState, DynamicState, Format,
    GraphicsDevice, IndexType, PassOutput, PipelineDesc, PipelineKind, PushConstantRange,
    RasterizationState, RenderPassDesc, RenderPassLayout, ShaderDesc, ShaderStage,
    ShaderStageFlags, VertexAttribute, VertexBinding, VertexInputRate, VertexLayout,
};
use crate::utils::EnumKey;

struct Fixture {
    vertex: MockShaderModule,
    fragment: MockShaderModule,
    pass: MockRenderPass,
    _device: MockGraphicsDevice,
}

fn fixture() -> Fixture {
    let device = MockGraphicsDevice::new();
    let code = [crate::graphics_device::SPIRV_MAGIC];
    let vertex = device
        .create_shader_module(&ShaderDesc { name: "gbuffer", stage: ShaderStage::Vertex, code: &code, entry_point: "main" })
        .unwrap();
    let fragment = device
        .create_shader_module(&ShaderDesc { name: "gbuffer", stage: ShaderStage::Fragment, code: &code, entry_point: "main" })
        .unwrap();
    let layout = RenderPassLayout::build(&RenderPassDesc {
        attachments: vec![
            AttachmentSpec::single(AttachmentRole::Framebuffer, Format::B8G8R8A8_SRGB),
            AttachmentSpec::single(AttachmentRole::Depth, Format::D32_SFLOAT),
        ],
        subpass_count: 1,
        output: PassOutput::Present,
    })
    .unwrap();
    let pass = device.create_render_pass(&layout).unwrap();
    Fixture { vertex, fragment, pass, _device: device }
}

fn position_layout(stride: u32, offset: u32) -> VertexLayout {
    VertexLayout {
        bindings: vec![VertexBinding { binding: 0, stride, input_rate: VertexInputRate::Vertex }],
        attributes: vec![VertexAttribute { location: 0, binding: 0, format: Format::R32G32B32_SFLOAT, offset }],
    }
}

// ============================================================================
// STATE BLOCKS
// ============================================================================

#[test]
fn test_index_type_size_bytes() {
    assert_eq!(IndexType::U16.size_bytes(), 2);
    assert_eq!(IndexType::U32.size_bytes(), 4);
}

#[test]
fn test_pipeline_kind_is_dense_enum_key() {
    assert_eq!(PipelineKind::COUNT, PipelineKind::ALL.len());
    for (i, kind) in PipelineKind::ALL.iter().enumerate() {
        assert_eq!(kind.index(), i);
    }
}

#[test]
fn test_default_state_blocks() {
    let raster = RasterizationState::default();
    assert_eq!(raster.cull_mode, CullMode::Back);
    assert_eq!(raster.line_width, 1.0);

    let depth = DepthStencilState::default();
    assert!(depth.depth_test_enable && depth.depth_write_enable);
    assert_eq!(depth.depth_compare_op, CompareOp::LessOrEqual);

    let off = DepthStencilState::disabled();
    assert!(!off.depth_test_enable && !off.depth_write_enable);
}

// ============================================================================
// VERTEX LAYOUT
// ============================================================================

#[test]
fn test_vertex_layout_valid() {
    assert!(position_layout(12, 0).validate().is_ok());
    assert!(VertexLayout::default().validate().is_ok());
}

#[test]
fn test_vertex_layout_attribute_overflows_stride() {
    assert!(position_layout(12, 4).validate().is_err());
}

#[test]
fn test_vertex_layout_undeclared_binding() {
    let mut layout = position_layout(12, 0);
    layout.attributes[0].binding = 1;
    assert!(layout.validate().is_err());
}

// ============================================================================
// PIPELINE DESC VALIDATION
// ============================================================================

#[test]
fn test_new_desc_has_dynamic_viewport_and_scissor() {
    let f = fixture();
    let desc = PipelineDesc::<MockGraphicsDevice>::new(PipelineKind::Composition, &f.vertex, &f.fragment, &f.pass);

    assert!(desc.dynamic_states.contains(&DynamicState::Viewport));
    assert!(desc.dynamic_states.contains(&DynamicState::Scissor));
    assert_eq!(desc.color_blend.len(), 1);
    assert!(desc.validate().is_ok());
}

#[test]
fn test_static_viewport_rejected() {
    let f = fixture();
    let mut desc = PipelineDesc::<MockGraphicsDevice>::new(PipelineKind::Offscreen, &f.vertex, &f.fragment, &f.pass);
    desc.dynamic_states = vec![DynamicState::Scissor];

    assert!(desc.validate().is_err());
}

#[test]
fn test_empty_color_blend_rejected() {
    let f = fixture();
    let mut desc = PipelineDesc::<MockGraphicsDevice>::new(PipelineKind::Offscreen, &f.vertex, &f.fragment, &f.pass);
    desc.color_blend.clear();

    assert!(desc.validate().is_err());
}

#[test]
fn test_push_constant_alignment() {
    let f = fixture();
    let mut desc = PipelineDesc::<MockGraphicsDevice>::new(PipelineKind::Offscreen, &f.vertex, &f.fragment, &f.pass);

    desc.push_constant_ranges = vec![PushConstantRange { stages: ShaderStageFlags::VERTEX, offset: 0, size: 64 }];
    assert!(desc.validate().is_ok());

    desc.push_constant_ranges = vec![PushConstantRange { stages: ShaderStageFlags::VERTEX, offset: 2, size: 64 }];
    assert!(desc.validate().is_err());

    desc.push_constant_ranges = vec![PushConstantRange { stages: ShaderStageFlags::VERTEX, offset: 0, size: 0 }];
    assert!(desc.validate().is_err());
}

#[test]
fn test_invalid_vertex_layout_propagates() {
    let f = fixture();
    let mut desc = PipelineDesc::<MockGraphicsDevice>::new(PipelineKind::Offscreen, &f.vertex, &f.fragment, &f.pass);
    desc.vertex_layout = position_layout(8, 0);

    assert!(desc.validate().is_err());
}
