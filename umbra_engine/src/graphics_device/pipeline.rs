/// Graphics pipeline state blocks and descriptor
///
/// A pipeline is assembled from fixed state blocks: vertex input, input
/// assembly, rasterization, colour blend, viewport, depth/stencil,
/// multisample, dynamic state and tessellation. Viewport and scissor are
/// always dynamic.

use crate::error::{Error, Result};
use crate::graphics_device::{Format, GraphicsDevice, ShaderStageFlags};
use crate::utils::EnumKey;

/// The two pipelines of the deferred renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineKind {
    /// Geometry pass writing the G-buffer
    Offscreen,
    /// Lighting pass reading the G-buffer
    Composition,
}

impl EnumKey for PipelineKind {
    const COUNT: usize = 2;
    const ALL: &'static [Self] = &[PipelineKind::Offscreen, PipelineKind::Composition];

    fn index(self) -> usize {
        self as usize
    }
}

// ===== VERTEX INPUT =====

/// Primitive topology
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
    TriangleStrip,
    LineList,
    PointList,
}

/// Index buffer element type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

impl IndexType {
    /// Size in bytes of one index element
    pub fn size_bytes(&self) -> u32 {
        match self {
            IndexType::U16 => 2,
            IndexType::U32 => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VertexInputRate {
    Vertex,
    Instance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttribute {
    pub location: u32,
    pub binding: u32,
    pub format: Format,
    /// Offset in bytes from the start of the vertex
    pub offset: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBinding {
    pub binding: u32,
    /// Stride in bytes between consecutive elements
    pub stride: u32,
    pub input_rate: VertexInputRate,
}

/// Vertex input layout (empty for full-screen passes generating vertices in the shader)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VertexLayout {
    pub bindings: Vec<VertexBinding>,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Every attribute must point at a declared binding and fit inside its stride
    pub fn validate(&self) -> Result<()> {
        for attribute in &self.attributes {
            let binding = self
                .bindings
                .iter()
                .find(|b| b.binding == attribute.binding)
                .ok_or_else(|| {
                    Error::InvalidResource(format!(
                        "vertex attribute {} uses undeclared binding {}",
                        attribute.location, attribute.binding
                    ))
                })?;
            if attribute.offset + attribute.format.size_bytes() > binding.stride {
                return Err(Error::InvalidResource(format!(
                    "vertex attribute {} overflows stride {}",
                    attribute.location, binding.stride
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputAssemblyState {
    pub topology: PrimitiveTopology,
    pub primitive_restart: bool,
}

impl Default for InputAssemblyState {
    fn default() -> Self {
        Self {
            topology: PrimitiveTopology::TriangleList,
            primitive_restart: false,
        }
    }
}

/// Push constant range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushConstantRange {
    pub stages: ShaderStageFlags,
    pub offset: u32,
    pub size: u32,
}

// ===== RASTERIZATION =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    None,
    Front,
    Back,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrontFace {
    CounterClockwise,
    Clockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolygonMode {
    Fill,
    Line,
    Point,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterizationState {
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
    pub polygon_mode: PolygonMode,
    pub line_width: f32,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
            polygon_mode: PolygonMode::Fill,
            line_width: 1.0,
        }
    }
}

// ===== DEPTH/STENCIL =====

/// Comparison operator for depth tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DepthStencilState {
    pub depth_test_enable: bool,
    pub depth_write_enable: bool,
    pub depth_compare_op: CompareOp,
    pub stencil_test_enable: bool,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enable: true,
            depth_write_enable: true,
            depth_compare_op: CompareOp::LessOrEqual,
            stencil_test_enable: false,
        }
    }
}

impl DepthStencilState {
    /// Full-screen passes neither test nor write depth
    pub fn disabled() -> Self {
        Self {
            depth_test_enable: false,
            depth_write_enable: false,
            depth_compare_op: CompareOp::Always,
            stencil_test_enable: false,
        }
    }
}

// ===== COLOR BLEND =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendFactor {
    Zero,
    One,
    SrcAlpha,
    OneMinusSrcAlpha,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendOp {
    Add,
    Subtract,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorWriteMask {
    pub r: bool,
    pub g: bool,
    pub b: bool,
    pub a: bool,
}

impl ColorWriteMask {
    pub const ALL: Self = Self { r: true, g: true, b: true, a: true };
}

/// Blend state of one colour attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorBlendAttachment {
    pub blend_enable: bool,
    pub src_color_factor: BlendFactor,
    pub dst_color_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_factor: BlendFactor,
    pub dst_alpha_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    pub color_write_mask: ColorWriteMask,
}

impl Default for ColorBlendAttachment {
    fn default() -> Self {
        Self {
            blend_enable: false,
            src_color_factor: BlendFactor::One,
            dst_color_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_factor: BlendFactor::One,
            dst_alpha_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            color_write_mask: ColorWriteMask::ALL,
        }
    }
}

// ===== MULTISAMPLE / VIEWPORT / DYNAMIC / TESSELLATION =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleCount {
    S1,
    S2,
    S4,
    S8,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultisampleState {
    pub sample_count: SampleCount,
    pub alpha_to_coverage: bool,
}

impl Default for MultisampleState {
    fn default() -> Self {
        Self {
            sample_count: SampleCount::S1,
            alpha_to_coverage: false,
        }
    }
}

/// Counts only: the rectangles themselves are dynamic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewportState {
    pub viewport_count: u32,
    pub scissor_count: u32,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            viewport_count: 1,
            scissor_count: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DynamicState {
    Viewport,
    Scissor,
    LineWidth,
    DepthBias,
}

/// Patch control points, 0 when tessellation is unused
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TessellationState {
    pub patch_control_points: u32,
}

// ===== PIPELINE DESCRIPTOR =====

/// Descriptor for creating a graphics pipeline
pub struct PipelineDesc<'a, D: GraphicsDevice> {
    pub kind: PipelineKind,
    pub vertex_shader: &'a D::ShaderModule,
    pub fragment_shader: &'a D::ShaderModule,
    pub vertex_layout: VertexLayout,
    pub input_assembly: InputAssemblyState,
    pub rasterization: RasterizationState,
    /// One entry per colour attachment of the subpass
    pub color_blend: Vec<ColorBlendAttachment>,
    pub viewport: ViewportState,
    pub depth_stencil: DepthStencilState,
    pub multisample: MultisampleState,
    pub dynamic_states: Vec<DynamicState>,
    pub tessellation: TessellationState,
    pub set_layouts: Vec<&'a D::DescriptorSetLayout>,
    pub push_constant_ranges: Vec<PushConstantRange>,
    pub render_pass: &'a D::RenderPass,
    pub subpass: u32,
}

impl<'a, D: GraphicsDevice> PipelineDesc<'a, D> {
    /// Default state blocks for `kind`, with dynamic viewport and scissor
    pub fn new(
        kind: PipelineKind,
        vertex_shader: &'a D::ShaderModule,
        fragment_shader: &'a D::ShaderModule,
        render_pass: &'a D::RenderPass,
    ) -> Self {
        Self {
            kind,
            vertex_shader,
            fragment_shader,
            vertex_layout: VertexLayout::default(),
            input_assembly: InputAssemblyState::default(),
            rasterization: RasterizationState::default(),
            color_blend: vec![ColorBlendAttachment::default()],
            viewport: ViewportState::default(),
            depth_stencil: DepthStencilState::default(),
            multisample: MultisampleState::default(),
            dynamic_states: vec![DynamicState::Viewport, DynamicState::Scissor],
            tessellation: TessellationState::default(),
            set_layouts: Vec::new(),
            push_constant_ranges: Vec::new(),
            render_pass,
            subpass: 0,
        }
    }

    /// Reject descriptors that bake viewport/scissor or have inconsistent vertex input
    pub fn validate(&self) -> Result<()> {
        for required in [DynamicState::Viewport, DynamicState::Scissor] {
            if !self.dynamic_states.contains(&required) {
                return Err(Error::InvalidResource(format!(
                    "{:?} pipeline must declare {:?} as dynamic state",
                    self.kind, required
                )));
            }
        }
        if self.color_blend.is_empty() {
            return Err(Error::InvalidResource(format!(
                "{:?} pipeline has no colour blend attachment",
                self.kind
            )));
        }
        for range in &self.push_constant_ranges {
            if range.size == 0 || range.size % 4 != 0 || range.offset % 4 != 0 {
                return Err(Error::InvalidResource(format!(
                    "{:?} pipeline push constant range {}+{} is not 4-byte aligned",
                    self.kind, range.offset, range.size
                )));
            }
        }
        self.vertex_layout.validate()
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
