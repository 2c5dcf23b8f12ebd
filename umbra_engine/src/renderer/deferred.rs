/// Deferred shading strategy
///
/// Geometry pass: the scene is drawn once into a four-slot G-buffer
/// (position, normal, albedo, depth) by a dedicated offscreen command list.
/// Composition pass: a full-screen triangle per swap image samples the
/// G-buffer and evaluates the point lights.
///
/// Per frame, the offscreen submission waits on the acquire semaphore and
/// signals the offscreen semaphore; the composition submission waits on the
/// offscreen semaphore and signals the image's render-complete semaphore.
///
/// Each swap image has its own lighting uniform buffer and composition set.
/// The host writes it only after the image's composition fence has signaled.

use std::mem;
use std::path::PathBuf;

use glam::Mat4;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::graphics_device::{
    load_shader_code, plan_descriptor_pool, Attachment, AttachmentDesc, AttachmentRole,
    AttachmentSpec, Buffer, BufferUsage, ClearValue, ColorBlendAttachment, CommandList, CullMode,
    DepthStencilState, DescriptorBinding, DescriptorSetLayoutDesc, DescriptorWrite, Extent2D,
    Format, GraphicsDevice, ImageLayout, IndexType, PassOutput, PipelineDesc, PipelineKind,
    PipelineStageFlags, PushConstantRange, Rect2D, RenderPassBegin, RenderPassDesc,
    RenderPassLayout, SamplerDesc, ShaderDesc, ShaderStage, ShaderStageFlags, Submission,
};
use crate::scene::{AssetSource, MaterialUniform, Vertex};
use crate::utils::{EnumKey, EnumMap};
use crate::{engine_debug, engine_info};
use super::base::BaseResources;
use super::recorder::{
    create_uniform_buffer, record_render_pass_scoped, set_full_viewport, upload_buffer, write_uniform,
};
use super::strategy::{FrameContext, RenderStrategy};
use super::uniforms::{CameraMatrices, CompositionUniforms, DebugTarget, OffscreenUniforms};

// ===== G-BUFFER LAYOUT =====

/// Attachments of the geometry pass, in attachment order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GBufferSlot {
    Position,
    Normal,
    Albedo,
    Depth,
}

impl EnumKey for GBufferSlot {
    const COUNT: usize = 4;
    const ALL: &'static [Self] = &[
        GBufferSlot::Position,
        GBufferSlot::Normal,
        GBufferSlot::Albedo,
        GBufferSlot::Depth,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

impl GBufferSlot {
    pub fn role(self) -> AttachmentRole {
        match self {
            GBufferSlot::Depth => AttachmentRole::Depth,
            _ => AttachmentRole::Color,
        }
    }

    pub fn format(self, depth_format: Format) -> Format {
        match self {
            GBufferSlot::Position | GBufferSlot::Normal => Format::R16G16B16A16_SFLOAT,
            GBufferSlot::Albedo => Format::R8G8B8A8_UNORM,
            GBufferSlot::Depth => depth_format,
        }
    }

    /// Composition sampler binding, `None` for depth
    pub fn sampler_binding(self) -> Option<u32> {
        match self {
            GBufferSlot::Position => Some(0),
            GBufferSlot::Normal => Some(1),
            GBufferSlot::Albedo => Some(2),
            GBufferSlot::Depth => None,
        }
    }

    fn clear_value(self) -> ClearValue {
        match self {
            GBufferSlot::Depth => ClearValue::DepthStencil { depth: 1.0, stencil: 0 },
            _ => ClearValue::Color([0.0; 4]),
        }
    }
}

/// Colour targets written by the geometry pass
pub const GBUFFER_COLOR_COUNT: usize = 3;

/// Composition uniform buffer binding
pub const COMPOSITION_UBO_BINDING: u32 = 3;

/// Model matrix, vertex stage
pub const MODEL_PUSH_CONSTANT_SIZE: u32 = mem::size_of::<Mat4>() as u32;

pub fn offscreen_pass_layout(depth_format: Format) -> Result<RenderPassLayout> {
    RenderPassLayout::build(&RenderPassDesc {
        attachments: GBufferSlot::ALL
            .iter()
            .map(|slot| AttachmentSpec::single(slot.role(), slot.format(depth_format)))
            .collect(),
        subpass_count: 1,
        output: PassOutput::Sampled,
    })
}

/// Three G-buffer samplers + the lighting uniform buffer, fragment stage
pub fn composition_set_layout() -> DescriptorSetLayoutDesc {
    let mut bindings: Vec<DescriptorBinding> = GBufferSlot::ALL
        .iter()
        .filter_map(|slot| slot.sampler_binding())
        .map(|binding| DescriptorBinding::combined_image_sampler(binding, ShaderStageFlags::FRAGMENT))
        .collect();
    bindings.push(DescriptorBinding::uniform_buffer(COMPOSITION_UBO_BINDING, ShaderStageFlags::FRAGMENT));
    DescriptorSetLayoutDesc::new(bindings)
}

/// Camera uniform (vertex) + material factors (fragment), one set per material
pub fn offscreen_set_layout() -> DescriptorSetLayoutDesc {
    DescriptorSetLayoutDesc::new(vec![
        DescriptorBinding::uniform_buffer(0, ShaderStageFlags::VERTEX),
        DescriptorBinding::uniform_buffer(1, ShaderStageFlags::FRAGMENT),
    ])
}

// ===== RESOURCES =====

struct DrawItem {
    model: Mat4,
    first_index: u32,
    index_count: u32,
    material: usize,
}

/// Uploaded scene, created by `load_assets`
struct SceneGeometry<D: GraphicsDevice> {
    draws: Vec<DrawItem>,
    material_buffers: Vec<D::Buffer>,
    index_buffer: D::Buffer,
    vertex_buffer: D::Buffer,
}

/// Lighting uniforms read by one swap image's composition list
struct CompositionFrame<D: GraphicsDevice> {
    set: D::DescriptorSet,
    ubo: D::Buffer,
}

/// Everything created by `init`, in reverse creation order
struct DeferredResources<D: GraphicsDevice> {
    pipelines: EnumMap<PipelineKind, D::Pipeline>,
    material_sets: Vec<D::DescriptorSet>,
    /// Indexed by swap image, rebuilt with the swap chain
    composition_frames: Vec<CompositionFrame<D>>,
    composition_pool: D::DescriptorPool,
    descriptor_pool: D::DescriptorPool,
    set_layouts: EnumMap<PipelineKind, D::DescriptorSetLayout>,
    sampler: D::Sampler,
    offscreen_ubo: D::Buffer,
    offscreen_framebuffer: D::Framebuffer,
    offscreen_pass: D::RenderPass,
    gbuffer: EnumMap<GBufferSlot, D::Attachment>,
    offscreen_fence: D::Fence,
    offscreen_semaphore: D::Semaphore,
    offscreen_commands: D::CommandList,
}

// ===== STRATEGY =====

pub struct DeferredStrategy<D: GraphicsDevice> {
    resources: Option<DeferredResources<D>>,
    geometry: Option<SceneGeometry<D>>,
    assets: Box<dyn AssetSource>,
    camera: CameraMatrices,
    debug_target: DebugTarget,
    /// Light animation phase in [0, 1)
    timer: f32,
    /// Light revolutions per second
    light_speed: f32,
    fence_timeout_ns: u64,
    shader_dir: PathBuf,
}

impl<D: GraphicsDevice> DeferredStrategy<D> {
    pub fn new(assets: Box<dyn AssetSource>) -> Self {
        Self {
            resources: None,
            geometry: None,
            assets,
            camera: CameraMatrices::default(),
            debug_target: DebugTarget::default(),
            timer: 0.0,
            light_speed: 0.05,
            fence_timeout_ns: Config::default().fence_timeout_ns,
            shader_dir: PathBuf::new(),
        }
    }

    /// 0 freezes the lights
    pub fn with_light_speed(mut self, revolutions_per_second: f32) -> Self {
        self.light_speed = revolutions_per_second;
        self
    }

    pub fn debug_target(&self) -> DebugTarget {
        self.debug_target
    }

    /// Extent of the G-buffer, `None` before `init`
    pub fn gbuffer_extent(&self) -> Option<Extent2D> {
        self.resources
            .as_ref()
            .and_then(|res| res.gbuffer.get(GBufferSlot::Position))
            .map(|attachment| attachment.extent())
    }

    /// Number of indexed draws recorded into the geometry pass
    pub fn draw_count(&self) -> usize {
        self.geometry.as_ref().map_or(0, |geometry| geometry.draws.len())
    }

    fn resources(&self) -> Result<&DeferredResources<D>> {
        self.resources
            .as_ref()
            .ok_or_else(|| Error::InvalidState("deferred resources used before init".to_string()))
    }

    fn create_gbuffer(device: &D, extent: Extent2D) -> Result<EnumMap<GBufferSlot, D::Attachment>> {
        EnumMap::try_from_fn(|slot: GBufferSlot| {
            device.create_attachment(&AttachmentDesc {
                role: slot.role(),
                format: slot.format(device.depth_format()),
                extent,
            })
        })
    }

    fn create_offscreen_framebuffer(
        device: &D,
        pass: &D::RenderPass,
        gbuffer: &EnumMap<GBufferSlot, D::Attachment>,
        extent: Extent2D,
    ) -> Result<D::Framebuffer> {
        let views = GBufferSlot::ALL
            .iter()
            .map(|slot| gbuffer.try_get(*slot).map(|attachment| attachment.view()))
            .collect::<Result<Vec<_>>>()?;
        device.create_framebuffer(pass, &views, extent)
    }

    /// Point the composition samplers at the current G-buffer
    fn write_composition_set(
        device: &D,
        set: &D::DescriptorSet,
        gbuffer: &EnumMap<GBufferSlot, D::Attachment>,
        sampler: &D::Sampler,
        ubo: &D::Buffer,
    ) -> Result<()> {
        let mut writes = Vec::with_capacity(GBUFFER_COLOR_COUNT + 1);
        for &slot in GBufferSlot::ALL {
            if let Some(binding) = slot.sampler_binding() {
                writes.push(DescriptorWrite::Image {
                    binding,
                    view: gbuffer.try_get(slot)?.view(),
                    sampler,
                    layout: ImageLayout::ShaderReadOnly,
                });
            }
        }
        writes.push(DescriptorWrite::Buffer {
            binding: COMPOSITION_UBO_BINDING,
            buffer: ubo,
            offset: 0,
            range: ubo.size(),
        });
        device.update_descriptor_set(set, &writes)
    }

    /// One lighting buffer + composition set per swap image, from a dedicated pool
    fn create_composition_frames(
        &self,
        device: &D,
        layout: &D::DescriptorSetLayout,
        gbuffer: &EnumMap<GBufferSlot, D::Attachment>,
        sampler: &D::Sampler,
        image_count: usize,
    ) -> Result<(D::DescriptorPool, Vec<CompositionFrame<D>>)> {
        let pool = device.create_descriptor_pool(&plan_descriptor_pool(&[(
            &composition_set_layout(),
            image_count as u32,
        )]))?;
        let uniforms = CompositionUniforms::animated(self.timer, &self.camera, self.debug_target);
        let frames = (0..image_count)
            .map(|_| {
                let ubo = create_uniform_buffer(device, &uniforms)?;
                let set = device.allocate_descriptor_set(&pool, layout)?;
                Self::write_composition_set(device, &set, gbuffer, sampler, &ubo)?;
                Ok(CompositionFrame { set, ubo })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok((pool, frames))
    }

    fn create_pipelines(
        &self,
        device: &D,
        set_layouts: &EnumMap<PipelineKind, D::DescriptorSetLayout>,
        offscreen_pass: &D::RenderPass,
        composition_pass: &D::RenderPass,
    ) -> Result<EnumMap<PipelineKind, D::Pipeline>> {
        EnumMap::try_from_fn(|kind: PipelineKind| {
            let (name, pass) = match kind {
                PipelineKind::Offscreen => ("gbuffer", offscreen_pass),
                PipelineKind::Composition => ("composition", composition_pass),
            };
            let vertex_code = load_shader_code(&self.shader_dir, name, ShaderStage::Vertex)?;
            let fragment_code = load_shader_code(&self.shader_dir, name, ShaderStage::Fragment)?;
            let vertex_shader = device.create_shader_module(&ShaderDesc {
                name,
                stage: ShaderStage::Vertex,
                code: &vertex_code,
                entry_point: "main",
            })?;
            let fragment_shader = device.create_shader_module(&ShaderDesc {
                name,
                stage: ShaderStage::Fragment,
                code: &fragment_code,
                entry_point: "main",
            })?;

            let mut desc = PipelineDesc::<D>::new(kind, &vertex_shader, &fragment_shader, pass);
            desc.rasterization.cull_mode = CullMode::None;
            desc.set_layouts = vec![set_layouts.try_get(kind)?];
            match kind {
                PipelineKind::Offscreen => {
                    desc.vertex_layout = Vertex::layout();
                    desc.color_blend = vec![ColorBlendAttachment::default(); GBUFFER_COLOR_COUNT];
                    desc.push_constant_ranges = vec![PushConstantRange {
                        stages: ShaderStageFlags::VERTEX,
                        offset: 0,
                        size: MODEL_PUSH_CONSTANT_SIZE,
                    }];
                }
                PipelineKind::Composition => {
                    desc.depth_stencil = DepthStencilState::disabled();
                }
            }
            device.create_pipeline(&desc)
        })
    }
}

impl<D: GraphicsDevice> RenderStrategy<D> for DeferredStrategy<D> {
    fn load_assets(&mut self, device: &D, _base: &BaseResources<D>) -> Result<()> {
        let scene = self.assets.load_scene()?;
        scene.validate()?;

        let worlds = scene.world_matrices()?;
        let draws: Vec<DrawItem> = scene
            .nodes
            .iter()
            .zip(worlds)
            .flat_map(|(node, model)| {
                node.primitives.iter().map(move |primitive| DrawItem {
                    model,
                    first_index: primitive.first_index,
                    index_count: primitive.index_count,
                    material: primitive.material,
                })
            })
            .collect();

        let vertex_buffer = upload_buffer(device, scene.vertex_bytes(), BufferUsage::VERTEX)?;
        let index_buffer = upload_buffer(device, scene.index_bytes(), BufferUsage::INDEX)?;
        let material_buffers = scene
            .materials
            .iter()
            .map(|material| create_uniform_buffer(device, &MaterialUniform::from(material)))
            .collect::<Result<Vec<_>>>()?;

        engine_info!(
            "umbra::Deferred",
            "Scene uploaded: {} vertices, {} indices, {} draws, {} materials",
            scene.vertices.len(),
            scene.indices.len(),
            draws.len(),
            scene.materials.len()
        );

        self.geometry = Some(SceneGeometry {
            draws,
            material_buffers,
            index_buffer,
            vertex_buffer,
        });
        Ok(())
    }

    fn init(&mut self, device: &D, base: &BaseResources<D>, config: &Config) -> Result<()> {
        self.fence_timeout_ns = config.fence_timeout_ns;
        self.shader_dir = config.shader_dir.clone();
        let material_count = self
            .geometry
            .as_ref()
            .map(|geometry| geometry.material_buffers.len())
            .ok_or_else(|| Error::InvalidState("deferred init before load_assets".to_string()))?;

        let offscreen_commands = device
            .create_command_lists(1)?
            .pop()
            .ok_or_else(|| Error::InitializationFailed("no offscreen command list".to_string()))?;
        let offscreen_semaphore = device.create_semaphore()?;
        let offscreen_fence = device.create_fence(true)?;

        let extent = base.extent();
        let gbuffer = Self::create_gbuffer(device, extent)?;
        let offscreen_pass = device.create_render_pass(&offscreen_pass_layout(device.depth_format())?)?;
        let offscreen_framebuffer = Self::create_offscreen_framebuffer(device, &offscreen_pass, &gbuffer, extent)?;

        let offscreen_ubo = create_uniform_buffer(device, &OffscreenUniforms::from_camera(&self.camera))?;
        let sampler = device.create_sampler(&SamplerDesc::default())?;

        let layout_descs: EnumMap<PipelineKind, DescriptorSetLayoutDesc> = EnumMap::from_fn(|kind| match kind {
            PipelineKind::Offscreen => offscreen_set_layout(),
            PipelineKind::Composition => composition_set_layout(),
        });
        let set_layouts = EnumMap::try_from_fn(|kind: PipelineKind| {
            device.create_descriptor_set_layout(layout_descs.try_get(kind)?)
        })?;
        let (composition_pool, composition_frames) = self.create_composition_frames(
            device,
            set_layouts.try_get(PipelineKind::Composition)?,
            &gbuffer,
            &sampler,
            base.image_count(),
        )?;
        let pool_desc = plan_descriptor_pool(&[(
            layout_descs.try_get(PipelineKind::Offscreen)?,
            (material_count as u32).max(1),
        )]);
        let descriptor_pool = device.create_descriptor_pool(&pool_desc)?;

        let material_sets = match &self.geometry {
            Some(geometry) => geometry
                .material_buffers
                .iter()
                .map(|material| {
                    let set = device
                        .allocate_descriptor_set(&descriptor_pool, set_layouts.try_get(PipelineKind::Offscreen)?)?;
                    device.update_descriptor_set(
                        &set,
                        &[
                            DescriptorWrite::Buffer {
                                binding: 0,
                                buffer: &offscreen_ubo,
                                offset: 0,
                                range: offscreen_ubo.size(),
                            },
                            DescriptorWrite::Buffer {
                                binding: 1,
                                buffer: material,
                                offset: 0,
                                range: material.size(),
                            },
                        ],
                    )?;
                    Ok(set)
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let pipelines = self.create_pipelines(device, &set_layouts, &offscreen_pass, &base.render_pass)?;

        engine_info!(
            "umbra::Deferred",
            "G-buffer ready: {}x{}, {} material sets, {} composition sets",
            extent.width,
            extent.height,
            material_count,
            composition_frames.len()
        );

        self.resources = Some(DeferredResources {
            pipelines,
            material_sets,
            composition_frames,
            composition_pool,
            descriptor_pool,
            set_layouts,
            sampler,
            offscreen_ubo,
            offscreen_framebuffer,
            offscreen_pass,
            gbuffer,
            offscreen_fence,
            offscreen_semaphore,
            offscreen_commands,
        });
        Ok(())
    }

    fn record_commands(&mut self, base: &mut BaseResources<D>) -> Result<()> {
        let res = self
            .resources
            .as_mut()
            .ok_or_else(|| Error::InvalidState("record before init".to_string()))?;
        let geometry = self
            .geometry
            .as_ref()
            .ok_or_else(|| Error::InvalidState("record before load_assets".to_string()))?;

        // Geometry pass
        let gbuffer_extent = res.gbuffer.try_get(GBufferSlot::Position)?.extent();
        let offscreen_pipeline = res.pipelines.try_get(PipelineKind::Offscreen)?;
        let material_sets = &res.material_sets;
        let begin = RenderPassBegin::<D> {
            render_pass: &res.offscreen_pass,
            framebuffer: &res.offscreen_framebuffer,
            render_area: Rect2D::from_extent(gbuffer_extent),
            clear_values: GBufferSlot::ALL.iter().map(|slot| slot.clear_value()).collect(),
        };
        record_render_pass_scoped::<D, _>(&mut res.offscreen_commands, &begin, |cmd| {
            set_full_viewport::<D>(cmd, gbuffer_extent)?;
            cmd.bind_pipeline(offscreen_pipeline)?;
            cmd.bind_vertex_buffers(0, &[(&geometry.vertex_buffer, 0)])?;
            cmd.bind_index_buffer(&geometry.index_buffer, 0, IndexType::U32)?;
            for draw in &geometry.draws {
                let set = material_sets.get(draw.material).ok_or_else(|| {
                    Error::InvalidResource(format!("no descriptor set for material {}", draw.material))
                })?;
                cmd.bind_descriptor_sets(offscreen_pipeline, 0, &[set])?;
                cmd.push_constants(
                    offscreen_pipeline,
                    ShaderStageFlags::VERTEX,
                    0,
                    bytemuck::bytes_of(&draw.model),
                )?;
                cmd.draw_indexed(draw.index_count, 1, draw.first_index, 0, 0)?;
            }
            Ok(())
        })?;

        // Composition pass, one list per swap image
        let composition_pipeline = res.pipelines.try_get(PipelineKind::Composition)?;
        let composition_frames = &res.composition_frames;
        let extent = base.extent();
        let mut commands = mem::take(&mut base.composition_commands);
        let recorded = commands.iter_mut().enumerate().try_for_each(|(image, cmd)| {
            let begin = base.composition_begin(image)?;
            let frame = composition_frames.get(image).ok_or_else(|| {
                Error::InvalidResource(format!("no composition set for image {}", image))
            })?;
            record_render_pass_scoped::<D, _>(cmd, &begin, |cmd| {
                set_full_viewport::<D>(cmd, extent)?;
                cmd.bind_pipeline(composition_pipeline)?;
                cmd.bind_descriptor_sets(composition_pipeline, 0, &[&frame.set])?;
                cmd.draw(3, 1, 0, 0)
            })
        });
        base.composition_commands = commands;
        recorded?;

        engine_debug!(
            "umbra::Deferred",
            "Recorded {} geometry draws and {} composition lists",
            geometry.draws.len(),
            base.composition_commands.len()
        );
        Ok(())
    }

    fn render(&mut self, device: &D, base: &BaseResources<D>, frame: &FrameContext) -> Result<u32> {
        let image = frame.image_index as usize;
        let (cmd, fence) = match (base.composition_commands.get(image), base.composition_fences.get(image)) {
            (Some(cmd), Some(fence)) => (cmd, fence),
            _ => {
                return Err(Error::InvalidResource(format!(
                    "no composition command list for image {}",
                    image
                )))
            }
        };

        // Both lists and the uniforms they read must be idle before the host writes
        device.wait_for_fence(&self.resources()?.offscreen_fence, self.fence_timeout_ns)?;
        device.wait_for_fence(fence, self.fence_timeout_ns)?;
        self.update_uniforms(frame)?;

        let res = self.resources()?;
        device.reset_fence(&res.offscreen_fence)?;
        device.submit(
            &Submission::<D>::new(&res.offscreen_commands)
                .wait_on(base.sync.present_complete(), PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
                .signal(&res.offscreen_semaphore)
                .fence(&res.offscreen_fence),
        )?;

        device.reset_fence(fence)?;
        device.submit(
            &Submission::<D>::new(cmd)
                .wait_on(&res.offscreen_semaphore, PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
                .signal(base.sync.render_complete(frame.image_index)?)
                .fence(fence),
        )?;
        Ok(2)
    }

    fn on_resize(&mut self, device: &D, base: &BaseResources<D>) -> Result<()> {
        let extent = base.extent();
        let (gbuffer, framebuffer, composition_pool, composition_frames) = {
            let res = self.resources()?;
            let gbuffer = Self::create_gbuffer(device, extent)?;
            let framebuffer = Self::create_offscreen_framebuffer(device, &res.offscreen_pass, &gbuffer, extent)?;
            let (pool, frames) = self.create_composition_frames(
                device,
                res.set_layouts.try_get(PipelineKind::Composition)?,
                &gbuffer,
                &res.sampler,
                base.image_count(),
            )?;
            (gbuffer, framebuffer, pool, frames)
        };

        let res = self
            .resources
            .as_mut()
            .ok_or_else(|| Error::InvalidState("resize before init".to_string()))?;
        // Sets go before their pool, the framebuffer before its attachments
        res.composition_frames = composition_frames;
        res.composition_pool = composition_pool;
        res.offscreen_framebuffer = framebuffer;
        res.gbuffer = gbuffer;

        engine_debug!(
            "umbra::Deferred",
            "G-buffer rebuilt at {}x{}, {} composition sets",
            extent.width,
            extent.height,
            res.composition_frames.len()
        );
        Ok(())
    }

    fn update_uniforms(&mut self, frame: &FrameContext) -> Result<()> {
        self.timer = (self.timer + frame.delta.as_secs_f32() * self.light_speed).fract();
        let res = self.resources()?;
        let composition = res.composition_frames.get(frame.image_index as usize).ok_or_else(|| {
            Error::InvalidResource(format!("no composition uniforms for image {}", frame.image_index))
        })?;
        write_uniform(&res.offscreen_ubo, &OffscreenUniforms::from_camera(&self.camera))?;
        write_uniform(
            &composition.ubo,
            &CompositionUniforms::animated(self.timer, &self.camera, self.debug_target),
        )
    }

    fn release(&mut self) {
        self.resources = None;
        self.geometry = None;
    }

    fn set_camera(&mut self, camera: CameraMatrices) {
        self.camera = camera;
    }

    fn set_debug_target(&mut self, target: DebugTarget) {
        self.debug_target = target;
    }
}

#[cfg(test)]
#[path = "deferred_tests.rs"]
mod tests;
