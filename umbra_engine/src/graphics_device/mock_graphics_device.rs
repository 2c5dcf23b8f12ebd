/// Mock graphics device for unit tests (no GPU required)
///
/// Every object is an RAII handle registered in a shared `MockState`: creation
/// and destruction are recorded in an event log and in a live-object table, so
/// tests can assert on submission order, semaphore chaining and leaks after
/// shutdown. Semaphores and fences carry a simulated signal state, and misuse
/// (waiting on an unsignaled semaphore, resubmitting an in-flight command
/// list, resetting a pending fence) is reported as an error.

use std::cell::Cell;
use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use rustc_hash::FxHashMap;

use crate::error::{Error, Result};
use crate::graphics_device::{
    plan_swapchain, AcquireOutcome, Attachment, AttachmentDesc, AttachmentRole, Buffer,
    BufferDesc, BufferUsage, ColorSpace, CommandList, DescriptorBinding,
    DescriptorPoolDesc, DescriptorSetLayoutDesc, DescriptorWrite, Extent2D, Format, Framebuffer,
    GraphicsDevice, IndexType, PipelineDesc, PipelineKind, PipelineStageFlags, PresentMode,
    PresentOutcome, QueueFamilyIndices, Rect2D, RecordingState, RecordingTracker,
    RenderPassBegin, RenderPassLayout, SamplerDesc, ShaderDesc, ShaderStage, ShaderStageFlags,
    SharingMode, Submission, shader_path, SPIRV_MAGIC, SurfaceCapabilities, SurfaceFormat, SurfaceSupport, Swapchain,
    Viewport,
};

type SharedState = Arc<Mutex<MockState>>;

fn lock(state: &SharedState) -> MutexGuard<'_, MockState> {
    state.lock().expect("mock state poisoned")
}

// ============================================================================
// Events
// ============================================================================

/// Everything the mock device observed, in call order
#[derive(Debug, Clone, PartialEq)]
pub enum MockEvent {
    Created { id: u64, kind: &'static str },
    Destroyed { id: u64, kind: &'static str },
    CreateSwapchain {
        id: u64,
        extent: Extent2D,
        image_count: u32,
        sharing_mode: SharingMode,
        queue_family_index_count: u32,
        retired: Option<u64>,
    },
    CreateAttachment { id: u64, role: AttachmentRole, format: Format, extent: Extent2D },
    CreateRenderPass { id: u64, attachment_count: usize, subpass_count: u32 },
    CreateFramebuffer { id: u64, extent: Extent2D, views: Vec<MockImageView> },
    CreatePipeline { id: u64, kind: PipelineKind },
    CopyBuffer { src: u64, dst: u64, size: u64 },
    /// Host write through a mapped buffer
    WriteBuffer { buffer: u64, size: u64 },
    UpdateDescriptorSet { set: u64, bindings: Vec<u32> },
    Acquire { swapchain: u64, outcome: AcquireOutcome, signal: u64 },
    Submit {
        command_list: u64,
        wait: Option<(u64, PipelineStageFlags)>,
        signal: Option<u64>,
        fence: Option<u64>,
    },
    Present { swapchain: u64, image_index: u32, wait: u64, outcome: PresentOutcome },
    WaitFence { fence: u64 },
    ResetFence { fence: u64 },
    WaitIdle,
}

/// Scripted result of the next `acquire_next_image`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockAcquire {
    Suboptimal,
    OutOfDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FenceState {
    Unsignaled,
    /// Submitted, signals at the next wait
    Pending,
    Signaled,
}

// ============================================================================
// Shared state
// ============================================================================

pub struct MockState {
    next_id: u64,
    live: FxHashMap<u64, &'static str>,
    events: Vec<MockEvent>,
    surface: SurfaceSupport,
    families: QueueFamilyIndices,
    vsync: bool,
    acquire_script: VecDeque<MockAcquire>,
    present_script: VecDeque<PresentOutcome>,
    semaphores: FxHashMap<u64, bool>,
    fences: FxHashMap<u64, FenceState>,
    /// Command list id -> fence guarding its last submission
    in_flight: FxHashMap<u64, u64>,
}

impl MockState {
    fn register(&mut self, kind: &'static str) -> u64 {
        self.next_id += 1;
        let id = self.next_id;
        self.live.insert(id, kind);
        id
    }

    fn fence_pending(&self, command_list: u64) -> bool {
        self.in_flight
            .get(&command_list)
            .and_then(|fence| self.fences.get(fence))
            .map_or(false, |state| *state == FenceState::Pending)
    }
}

/// RAII registration of one mock object
pub struct MockHandle {
    id: u64,
    kind: &'static str,
    state: SharedState,
}

impl MockHandle {
    fn new(state: &SharedState, kind: &'static str, log_creation: bool) -> Self {
        let mut guard = lock(state);
        let id = guard.register(kind);
        if log_creation {
            guard.events.push(MockEvent::Created { id, kind });
        }
        drop(guard);
        Self { id, kind, state: Arc::clone(state) }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

impl Drop for MockHandle {
    fn drop(&mut self) {
        if let Ok(mut state) = self.state.lock() {
            state.live.remove(&self.id);
            state.semaphores.remove(&self.id);
            state.fences.remove(&self.id);
            state.in_flight.remove(&self.id);
            state.events.push(MockEvent::Destroyed { id: self.id, kind: self.kind });
        }
    }
}

/// Test-side view of a mock device: scripting and inspection
#[derive(Clone)]
pub struct MockProbe {
    state: SharedState,
}

impl MockProbe {
    pub fn script_acquire(&self, outcome: MockAcquire) {
        lock(&self.state).acquire_script.push_back(outcome);
    }

    pub fn script_present(&self, outcome: PresentOutcome) {
        lock(&self.state).present_script.push_back(outcome);
    }

    pub fn events(&self) -> Vec<MockEvent> {
        lock(&self.state).events.clone()
    }

    pub fn clear_events(&self) {
        lock(&self.state).events.clear();
    }

    /// Kinds of every object still alive, sorted
    pub fn live_objects(&self) -> Vec<&'static str> {
        let mut kinds: Vec<&'static str> = lock(&self.state).live.values().copied().collect();
        kinds.sort_unstable();
        kinds
    }

    pub fn live_count(&self, kind: &str) -> usize {
        lock(&self.state).live.values().filter(|k| **k == kind).count()
    }

    pub fn submissions(&self) -> Vec<MockEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, MockEvent::Submit { .. }))
            .collect()
    }

    pub fn presents(&self) -> Vec<MockEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, MockEvent::Present { .. }))
            .collect()
    }

    pub fn swapchain_creations(&self) -> Vec<MockEvent> {
        self.events()
            .into_iter()
            .filter(|e| matches!(e, MockEvent::CreateSwapchain { .. }))
            .collect()
    }
}

// ============================================================================
// Mock device
// ============================================================================

pub struct MockGraphicsDevice {
    state: SharedState,
    depth_format: Format,
}

impl MockGraphicsDevice {
    /// Unified queue family, FIFO + mailbox, 2..=3 images, window-driven extent
    pub fn new() -> Self {
        let surface = SurfaceSupport {
            capabilities: SurfaceCapabilities {
                min_image_count: 2,
                max_image_count: 3,
                current_extent: SurfaceCapabilities::UNDEFINED_EXTENT,
                min_image_extent: Extent2D::new(1, 1),
                max_image_extent: Extent2D::new(4096, 4096),
            },
            formats: vec![SurfaceFormat {
                format: Format::B8G8R8A8_SRGB,
                color_space: ColorSpace::SrgbNonLinear,
            }],
            present_modes: vec![PresentMode::Fifo, PresentMode::Mailbox],
        };
        let state = MockState {
            next_id: 0,
            live: FxHashMap::default(),
            events: Vec::new(),
            surface,
            families: QueueFamilyIndices { graphics: 0, present: 0 },
            vsync: true,
            acquire_script: VecDeque::new(),
            present_script: VecDeque::new(),
            semaphores: FxHashMap::default(),
            fences: FxHashMap::default(),
            in_flight: FxHashMap::default(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            depth_format: Format::D32_SFLOAT_S8_UINT,
        }
    }

    pub fn with_queue_families(self, families: QueueFamilyIndices) -> Self {
        lock(&self.state).families = families;
        self
    }

    pub fn with_surface_support(self, surface: SurfaceSupport) -> Self {
        lock(&self.state).surface = surface;
        self
    }

    pub fn probe(&self) -> MockProbe {
        MockProbe { state: Arc::clone(&self.state) }
    }
}

impl Default for MockGraphicsDevice {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Mock objects
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MockImageView(pub u64);

pub struct MockSwapchain {
    pub handle: MockHandle,
    extent: Extent2D,
    format: Format,
    present_mode: PresentMode,
    views: Vec<MockImageView>,
    current_image: u32,
    next_image: u32,
}

impl Swapchain for MockSwapchain {
    type ImageView = MockImageView;

    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn format(&self) -> Format {
        self.format
    }

    fn image_count(&self) -> usize {
        self.views.len()
    }

    fn image_view(&self, index: usize) -> Option<MockImageView> {
        self.views.get(index).copied()
    }

    fn current_image(&self) -> u32 {
        self.current_image
    }

    fn present_mode(&self) -> PresentMode {
        self.present_mode
    }
}

pub struct MockAttachment {
    pub handle: MockHandle,
    role: AttachmentRole,
    format: Format,
    extent: Extent2D,
}

impl Attachment for MockAttachment {
    type ImageView = MockImageView;

    fn view(&self) -> MockImageView {
        MockImageView(self.handle.id)
    }

    fn role(&self) -> AttachmentRole {
        self.role
    }

    fn format(&self) -> Format {
        self.format
    }

    fn extent(&self) -> Extent2D {
        self.extent
    }
}

pub struct MockRenderPass {
    pub handle: MockHandle,
    pub layout: RenderPassLayout,
}

pub struct MockFramebuffer {
    pub handle: MockHandle,
    pub views: Vec<MockImageView>,
    extent: Extent2D,
}

impl Framebuffer for MockFramebuffer {
    fn extent(&self) -> Extent2D {
        self.extent
    }

    fn attachment_count(&self) -> usize {
        self.views.len()
    }
}

pub struct MockBuffer {
    pub handle: MockHandle,
    pub desc: BufferDesc,
    contents: Mutex<Vec<u8>>,
}

impl MockBuffer {
    pub fn contents(&self) -> Vec<u8> {
        self.contents.lock().expect("buffer contents poisoned").clone()
    }
}

impl Buffer for MockBuffer {
    fn size(&self) -> u64 {
        self.desc.size
    }

    fn write(&self, offset: u64, data: &[u8]) -> Result<()> {
        if !self.desc.is_host_visible() {
            return Err(Error::InvalidResource(format!(
                "buffer {} is not host visible",
                self.handle.id
            )));
        }
        let end = offset + data.len() as u64;
        if end > self.desc.size {
            return Err(Error::InvalidResource(format!(
                "write of {} bytes at {} overflows buffer of {} bytes",
                data.len(),
                offset,
                self.desc.size
            )));
        }
        let mut contents = self.contents.lock().expect("buffer contents poisoned");
        contents[offset as usize..end as usize].copy_from_slice(data);
        lock(&self.handle.state).events.push(MockEvent::WriteBuffer {
            buffer: self.handle.id,
            size: data.len() as u64,
        });
        Ok(())
    }
}

pub struct MockSampler {
    pub handle: MockHandle,
    pub desc: SamplerDesc,
}

pub struct MockDescriptorSetLayout {
    pub handle: MockHandle,
    pub desc: DescriptorSetLayoutDesc,
}

pub struct MockDescriptorPool {
    pub handle: MockHandle,
    pub desc: DescriptorPoolDesc,
    allocated: Cell<u32>,
}

pub struct MockDescriptorSet {
    pub handle: MockHandle,
    bindings: Vec<DescriptorBinding>,
}

pub struct MockShaderModule {
    pub handle: MockHandle,
    pub name: String,
    pub stage: ShaderStage,
}

pub struct MockPipeline {
    pub handle: MockHandle,
    pub kind: PipelineKind,
    pub push_constant_stages: ShaderStageFlags,
}

pub struct MockSemaphore {
    pub handle: MockHandle,
}

pub struct MockFence {
    pub handle: MockHandle,
}

// ============================================================================
// Mock command list
// ============================================================================

/// Recorded command, with object handles reduced to ids
#[derive(Debug, Clone, PartialEq)]
pub enum MockCommand {
    BeginRenderPass { render_pass: u64, framebuffer: u64, area: Rect2D, clear_count: usize },
    EndRenderPass,
    SetViewport(Viewport),
    SetScissor(Rect2D),
    BindPipeline(u64),
    BindDescriptorSets { pipeline: u64, first_set: u32, sets: Vec<u64> },
    PushConstants { stages: ShaderStageFlags, offset: u32, size: usize },
    BindVertexBuffers { first_binding: u32, buffers: Vec<u64> },
    BindIndexBuffer { buffer: u64, index_type: IndexType },
    Draw { vertex_count: u32, instance_count: u32 },
    DrawIndexed { index_count: u32, first_index: u32, vertex_offset: i32 },
}

pub struct MockCommandList {
    pub handle: MockHandle,
    pub commands: Vec<MockCommand>,
    tracker: RecordingTracker,
}

impl MockCommandList {
    pub fn draw_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, MockCommand::Draw { .. } | MockCommand::DrawIndexed { .. }))
            .count()
    }

    fn record(&mut self, command: &str, check: fn(&RecordingTracker, &str) -> Result<()>, recorded: MockCommand) -> Result<()> {
        check(&self.tracker, command)?;
        self.commands.push(recorded);
        Ok(())
    }
}

impl CommandList<MockGraphicsDevice> for MockCommandList {
    fn begin(&mut self) -> Result<()> {
        if lock(&self.handle.state).fence_pending(self.handle.id) {
            return Err(Error::BackendError(format!(
                "command list {} re-recorded while its submission is in flight",
                self.handle.id
            )));
        }
        self.tracker.begin()?;
        self.commands.clear();
        Ok(())
    }

    fn end(&mut self) -> Result<()> {
        self.tracker.end()
    }

    fn begin_render_pass(&mut self, begin: &RenderPassBegin<'_, MockGraphicsDevice>) -> Result<()> {
        let expected = begin.render_pass.layout.attachments.len();
        if begin.clear_values.len() != expected {
            return Err(Error::BackendError(format!(
                "{} clear values for a render pass with {} attachments",
                begin.clear_values.len(),
                expected
            )));
        }
        if begin.framebuffer.attachment_count() != expected {
            return Err(Error::BackendError(format!(
                "framebuffer with {} views for a render pass with {} attachments",
                begin.framebuffer.attachment_count(),
                expected
            )));
        }
        self.tracker.begin_render_pass()?;
        self.commands.push(MockCommand::BeginRenderPass {
            render_pass: begin.render_pass.handle.id,
            framebuffer: begin.framebuffer.handle.id,
            area: begin.render_area,
            clear_count: begin.clear_values.len(),
        });
        Ok(())
    }

    fn end_render_pass(&mut self) -> Result<()> {
        self.tracker.end_render_pass()?;
        self.commands.push(MockCommand::EndRenderPass);
        Ok(())
    }

    fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.record("set_viewport", RecordingTracker::require_recording, MockCommand::SetViewport(viewport))
    }

    fn set_scissor(&mut self, scissor: Rect2D) -> Result<()> {
        self.record("set_scissor", RecordingTracker::require_recording, MockCommand::SetScissor(scissor))
    }

    fn bind_pipeline(&mut self, pipeline: &MockPipeline) -> Result<()> {
        self.record(
            "bind_pipeline",
            RecordingTracker::require_recording,
            MockCommand::BindPipeline(pipeline.handle.id),
        )
    }

    fn bind_descriptor_sets(
        &mut self,
        pipeline: &MockPipeline,
        first_set: u32,
        sets: &[&MockDescriptorSet],
    ) -> Result<()> {
        self.record(
            "bind_descriptor_sets",
            RecordingTracker::require_recording,
            MockCommand::BindDescriptorSets {
                pipeline: pipeline.handle.id,
                first_set,
                sets: sets.iter().map(|s| s.handle.id).collect(),
            },
        )
    }

    fn push_constants(
        &mut self,
        pipeline: &MockPipeline,
        stages: ShaderStageFlags,
        offset: u32,
        data: &[u8],
    ) -> Result<()> {
        if !pipeline.push_constant_stages.contains(stages) {
            return Err(Error::BackendError(format!(
                "push constants for {:?} not declared by {:?} pipeline",
                stages, pipeline.kind
            )));
        }
        self.record(
            "push_constants",
            RecordingTracker::require_recording,
            MockCommand::PushConstants { stages, offset, size: data.len() },
        )
    }

    fn bind_vertex_buffers(&mut self, first_binding: u32, buffers: &[(&MockBuffer, u64)]) -> Result<()> {
        self.record(
            "bind_vertex_buffers",
            RecordingTracker::require_recording,
            MockCommand::BindVertexBuffers {
                first_binding,
                buffers: buffers.iter().map(|(b, _)| b.handle.id).collect(),
            },
        )
    }

    fn bind_index_buffer(&mut self, buffer: &MockBuffer, _offset: u64, index_type: IndexType) -> Result<()> {
        self.record(
            "bind_index_buffer",
            RecordingTracker::require_recording,
            MockCommand::BindIndexBuffer { buffer: buffer.handle.id, index_type },
        )
    }

    fn draw(&mut self, vertex_count: u32, instance_count: u32, _first_vertex: u32, _first_instance: u32) -> Result<()> {
        self.record(
            "draw",
            RecordingTracker::require_render_pass,
            MockCommand::Draw { vertex_count, instance_count },
        )
    }

    fn draw_indexed(
        &mut self,
        index_count: u32,
        _instance_count: u32,
        first_index: u32,
        vertex_offset: i32,
        _first_instance: u32,
    ) -> Result<()> {
        self.record(
            "draw_indexed",
            RecordingTracker::require_render_pass,
            MockCommand::DrawIndexed { index_count, first_index, vertex_offset },
        )
    }

    fn recording_state(&self) -> RecordingState {
        self.tracker.state()
    }
}

// ============================================================================
// GraphicsDevice implementation
// ============================================================================

impl GraphicsDevice for MockGraphicsDevice {
    type ImageView = MockImageView;
    type Swapchain = MockSwapchain;
    type Attachment = MockAttachment;
    type RenderPass = MockRenderPass;
    type Framebuffer = MockFramebuffer;
    type Buffer = MockBuffer;
    type Sampler = MockSampler;
    type DescriptorSetLayout = MockDescriptorSetLayout;
    type DescriptorPool = MockDescriptorPool;
    type DescriptorSet = MockDescriptorSet;
    type ShaderModule = MockShaderModule;
    type Pipeline = MockPipeline;
    type CommandList = MockCommandList;
    type Semaphore = MockSemaphore;
    type Fence = MockFence;

    fn depth_format(&self) -> Format {
        self.depth_format
    }

    fn queue_families(&self) -> QueueFamilyIndices {
        lock(&self.state).families
    }

    fn create_swapchain(
        &self,
        window_extent: Extent2D,
        old: Option<&MockSwapchain>,
    ) -> Result<Option<MockSwapchain>> {
        let (surface, families, vsync) = {
            let state = lock(&self.state);
            (state.surface.clone(), state.families, state.vsync)
        };
        let plan = match plan_swapchain(&surface, window_extent, families, vsync)? {
            Some(plan) => plan,
            None => return Ok(None),
        };

        let handle = MockHandle::new(&self.state, "Swapchain", false);
        let views = {
            let mut state = lock(&self.state);
            let views: Vec<MockImageView> = (0..plan.image_count)
                .map(|_| MockImageView(state.register("SwapchainImageView")))
                .collect();
            // Image views belong to the chain and go away with it
            for view in &views {
                state.live.remove(&view.0);
            }
            state.events.push(MockEvent::CreateSwapchain {
                id: handle.id,
                extent: plan.extent,
                image_count: plan.image_count,
                sharing_mode: plan.sharing_mode,
                queue_family_index_count: plan.queue_family_index_count(),
                retired: old.map(|o| o.handle.id),
            });
            views
        };

        Ok(Some(MockSwapchain {
            handle,
            extent: plan.extent,
            format: plan.surface_format.format,
            present_mode: plan.present_mode,
            views,
            current_image: 0,
            next_image: 0,
        }))
    }

    fn acquire_next_image(
        &self,
        swapchain: &mut MockSwapchain,
        signal: &MockSemaphore,
    ) -> Result<AcquireOutcome> {
        let mut state = lock(&self.state);
        let scripted = state.acquire_script.pop_front();
        let outcome = match scripted {
            Some(MockAcquire::OutOfDate) => AcquireOutcome::OutOfDate,
            other => {
                if state.semaphores.get(&signal.handle.id).copied().unwrap_or(false) {
                    return Err(Error::BackendError(format!(
                        "acquire signals semaphore {} which is already signaled",
                        signal.handle.id
                    )));
                }
                state.semaphores.insert(signal.handle.id, true);
                let index = swapchain.next_image;
                swapchain.current_image = index;
                swapchain.next_image = (index + 1) % swapchain.views.len() as u32;
                AcquireOutcome::Acquired {
                    index,
                    suboptimal: other == Some(MockAcquire::Suboptimal),
                }
            }
        };
        state.events.push(MockEvent::Acquire {
            swapchain: swapchain.handle.id,
            outcome,
            signal: signal.handle.id,
        });
        Ok(outcome)
    }

    fn present(
        &self,
        swapchain: &MockSwapchain,
        image_index: u32,
        wait: &MockSemaphore,
    ) -> Result<PresentOutcome> {
        if image_index as usize >= swapchain.views.len() {
            return Err(Error::BackendError(format!(
                "present of image {} on a chain of {}",
                image_index,
                swapchain.views.len()
            )));
        }
        let mut state = lock(&self.state);
        if !state.semaphores.get(&wait.handle.id).copied().unwrap_or(false) {
            return Err(Error::BackendError(format!(
                "present waits on semaphore {} which nothing signaled",
                wait.handle.id
            )));
        }
        state.semaphores.insert(wait.handle.id, false);
        let outcome = state.present_script.pop_front().unwrap_or(PresentOutcome::Presented);
        state.events.push(MockEvent::Present {
            swapchain: swapchain.handle.id,
            image_index,
            wait: wait.handle.id,
            outcome,
        });
        Ok(outcome)
    }

    fn create_attachment(&self, desc: &AttachmentDesc) -> Result<MockAttachment> {
        desc.validate()?;
        let handle = MockHandle::new(&self.state, "Attachment", false);
        lock(&self.state).events.push(MockEvent::CreateAttachment {
            id: handle.id,
            role: desc.role,
            format: desc.format,
            extent: desc.extent,
        });
        Ok(MockAttachment {
            handle,
            role: desc.role,
            format: desc.format,
            extent: desc.extent,
        })
    }

    fn create_render_pass(&self, layout: &RenderPassLayout) -> Result<MockRenderPass> {
        let handle = MockHandle::new(&self.state, "RenderPass", false);
        lock(&self.state).events.push(MockEvent::CreateRenderPass {
            id: handle.id,
            attachment_count: layout.attachments.len(),
            subpass_count: layout.subpass_count(),
        });
        Ok(MockRenderPass { handle, layout: layout.clone() })
    }

    fn create_framebuffer(
        &self,
        render_pass: &MockRenderPass,
        views: &[MockImageView],
        extent: Extent2D,
    ) -> Result<MockFramebuffer> {
        if views.len() != render_pass.layout.attachments.len() {
            return Err(Error::InvalidResource(format!(
                "framebuffer with {} views for a render pass with {} attachments",
                views.len(),
                render_pass.layout.attachments.len()
            )));
        }
        if extent.is_zero_area() {
            return Err(Error::InvalidResource("framebuffer with zero extent".to_string()));
        }
        let handle = MockHandle::new(&self.state, "Framebuffer", false);
        lock(&self.state).events.push(MockEvent::CreateFramebuffer {
            id: handle.id,
            extent,
            views: views.to_vec(),
        });
        Ok(MockFramebuffer { handle, views: views.to_vec(), extent })
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<MockBuffer> {
        if desc.size == 0 {
            return Err(Error::InvalidResource("buffer of size 0".to_string()));
        }
        Ok(MockBuffer {
            handle: MockHandle::new(&self.state, "Buffer", true),
            desc: *desc,
            contents: Mutex::new(vec![0; desc.size as usize]),
        })
    }

    fn copy_buffer(&self, src: &MockBuffer, dst: &MockBuffer, size: u64) -> Result<()> {
        if !src.desc.usage.contains(BufferUsage::TRANSFER_SRC)
            || !dst.desc.usage.contains(BufferUsage::TRANSFER_DST)
        {
            return Err(Error::BackendError("copy between buffers without transfer usage".to_string()));
        }
        if size > src.desc.size || size > dst.desc.size {
            return Err(Error::BackendError(format!("copy of {} bytes overflows a buffer", size)));
        }
        let data = src.contents();
        dst.contents.lock().expect("buffer contents poisoned")[..size as usize]
            .copy_from_slice(&data[..size as usize]);
        lock(&self.state).events.push(MockEvent::CopyBuffer {
            src: src.handle.id,
            dst: dst.handle.id,
            size,
        });
        Ok(())
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<MockSampler> {
        Ok(MockSampler {
            handle: MockHandle::new(&self.state, "Sampler", true),
            desc: *desc,
        })
    }

    fn create_descriptor_set_layout(&self, desc: &DescriptorSetLayoutDesc) -> Result<MockDescriptorSetLayout> {
        Ok(MockDescriptorSetLayout {
            handle: MockHandle::new(&self.state, "DescriptorSetLayout", true),
            desc: desc.clone(),
        })
    }

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<MockDescriptorPool> {
        Ok(MockDescriptorPool {
            handle: MockHandle::new(&self.state, "DescriptorPool", true),
            desc: desc.clone(),
            allocated: Cell::new(0),
        })
    }

    fn allocate_descriptor_set(
        &self,
        pool: &MockDescriptorPool,
        layout: &MockDescriptorSetLayout,
    ) -> Result<MockDescriptorSet> {
        if pool.allocated.get() >= pool.desc.max_sets {
            return Err(Error::OutOfMemory);
        }
        pool.allocated.set(pool.allocated.get() + 1);
        Ok(MockDescriptorSet {
            handle: MockHandle::new(&self.state, "DescriptorSet", true),
            bindings: layout.desc.bindings.clone(),
        })
    }

    fn update_descriptor_set(
        &self,
        set: &MockDescriptorSet,
        writes: &[DescriptorWrite<'_, Self>],
    ) -> Result<()> {
        for write in writes {
            let declared = set
                .bindings
                .iter()
                .any(|b| b.binding == write.binding() && b.ty == write.descriptor_type());
            if !declared {
                return Err(Error::InvalidResource(format!(
                    "binding {} ({:?}) is not declared by the set layout",
                    write.binding(),
                    write.descriptor_type()
                )));
            }
        }
        lock(&self.state).events.push(MockEvent::UpdateDescriptorSet {
            set: set.handle.id,
            bindings: writes.iter().map(|w| w.binding()).collect(),
        });
        Ok(())
    }

    fn create_shader_module(&self, desc: &ShaderDesc<'_>) -> Result<MockShaderModule> {
        Ok(MockShaderModule {
            handle: MockHandle::new(&self.state, "ShaderModule", true),
            name: desc.name.to_string(),
            stage: desc.stage,
        })
    }

    fn create_pipeline(&self, desc: &PipelineDesc<'_, Self>) -> Result<MockPipeline> {
        desc.validate()?;
        if desc.vertex_shader.stage != ShaderStage::Vertex || desc.fragment_shader.stage != ShaderStage::Fragment {
            return Err(Error::InvalidResource(format!("{:?} pipeline with swapped shader stages", desc.kind)));
        }
        let expected = desc.render_pass.layout.color_attachment_count(desc.subpass);
        if desc.color_blend.len() != expected {
            return Err(Error::InvalidResource(format!(
                "{:?} pipeline has {} blend attachments, subpass {} writes {}",
                desc.kind,
                desc.color_blend.len(),
                desc.subpass,
                expected
            )));
        }
        let handle = MockHandle::new(&self.state, "Pipeline", false);
        lock(&self.state).events.push(MockEvent::CreatePipeline { id: handle.id, kind: desc.kind });
        Ok(MockPipeline {
            handle,
            kind: desc.kind,
            push_constant_stages: desc
                .push_constant_ranges
                .iter()
                .fold(ShaderStageFlags::empty(), |acc, r| acc | r.stages),
        })
    }

    fn create_command_lists(&self, count: usize) -> Result<Vec<MockCommandList>> {
        Ok((0..count)
            .map(|_| MockCommandList {
                handle: MockHandle::new(&self.state, "CommandList", true),
                commands: Vec::new(),
                tracker: RecordingTracker::new(),
            })
            .collect())
    }

    fn create_semaphore(&self) -> Result<MockSemaphore> {
        let handle = MockHandle::new(&self.state, "Semaphore", true);
        lock(&self.state).semaphores.insert(handle.id, false);
        Ok(MockSemaphore { handle })
    }

    fn create_fence(&self, signaled: bool) -> Result<MockFence> {
        let handle = MockHandle::new(&self.state, "Fence", true);
        let initial = if signaled { FenceState::Signaled } else { FenceState::Unsignaled };
        lock(&self.state).fences.insert(handle.id, initial);
        Ok(MockFence { handle })
    }

    fn wait_for_fence(&self, fence: &MockFence, _timeout_ns: u64) -> Result<()> {
        let mut state = lock(&self.state);
        state.events.push(MockEvent::WaitFence { fence: fence.handle.id });
        match state.fences.get(&fence.handle.id) {
            Some(FenceState::Pending) | Some(FenceState::Signaled) => {
                state.fences.insert(fence.handle.id, FenceState::Signaled);
                Ok(())
            }
            _ => Err(Error::Timeout(format!("fence {} never signaled", fence.handle.id))),
        }
    }

    fn reset_fence(&self, fence: &MockFence) -> Result<()> {
        let mut state = lock(&self.state);
        if state.fences.get(&fence.handle.id) == Some(&FenceState::Pending) {
            return Err(Error::BackendError(format!(
                "fence {} reset while its submission is in flight",
                fence.handle.id
            )));
        }
        state.fences.insert(fence.handle.id, FenceState::Unsignaled);
        state.events.push(MockEvent::ResetFence { fence: fence.handle.id });
        Ok(())
    }

    fn submit(&self, submission: &Submission<'_, Self>) -> Result<()> {
        let command_list = submission.command_list;
        if command_list.recording_state() != RecordingState::Executable {
            return Err(Error::BackendError(format!(
                "submit of command list {} in {:?} state",
                command_list.handle.id,
                command_list.recording_state()
            )));
        }

        let mut state = lock(&self.state);
        if state.fence_pending(command_list.handle.id) {
            return Err(Error::BackendError(format!(
                "command list {} resubmitted while in flight",
                command_list.handle.id
            )));
        }
        if let Some(wait) = &submission.wait {
            if !state.semaphores.get(&wait.semaphore.handle.id).copied().unwrap_or(false) {
                return Err(Error::BackendError(format!(
                    "submission waits on semaphore {} which nothing signaled",
                    wait.semaphore.handle.id
                )));
            }
        }
        if let Some(signal) = submission.signal {
            if state.semaphores.get(&signal.handle.id).copied().unwrap_or(false) {
                return Err(Error::BackendError(format!(
                    "submission signals semaphore {} which is already signaled",
                    signal.handle.id
                )));
            }
        }
        if let Some(fence) = submission.fence {
            if state.fences.get(&fence.handle.id) != Some(&FenceState::Unsignaled) {
                return Err(Error::BackendError(format!(
                    "submission fence {} is not unsignaled",
                    fence.handle.id
                )));
            }
        }

        if let Some(wait) = &submission.wait {
            state.semaphores.insert(wait.semaphore.handle.id, false);
        }
        if let Some(signal) = submission.signal {
            state.semaphores.insert(signal.handle.id, true);
        }
        if let Some(fence) = submission.fence {
            state.fences.insert(fence.handle.id, FenceState::Pending);
            state.in_flight.insert(command_list.handle.id, fence.handle.id);
        }
        state.events.push(MockEvent::Submit {
            command_list: command_list.handle.id,
            wait: submission.wait.as_ref().map(|w| (w.semaphore.handle.id, w.stage)),
            signal: submission.signal.map(|s| s.handle.id),
            fence: submission.fence.map(|f| f.handle.id),
        });
        Ok(())
    }

    fn wait_idle(&self) -> Result<()> {
        let mut state = lock(&self.state);
        for fence in state.fences.values_mut() {
            if *fence == FenceState::Pending {
                *fence = FenceState::Signaled;
            }
        }
        state.events.push(MockEvent::WaitIdle);
        Ok(())
    }
}

// ============================================================================
// Shader fixtures
// ============================================================================

/// Write minimal SPIR-V headers for every shader the deferred strategy loads
///
/// Returns a fresh directory under the system temp dir, unique per `tag`.
pub fn write_test_shaders(tag: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("umbra_shaders_{}_{}", std::process::id(), tag));
    std::fs::create_dir_all(&dir).expect("create shader dir");
    let header: Vec<u8> = [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0]
        .iter()
        .flat_map(|word| word.to_le_bytes())
        .collect();
    for name in ["gbuffer", "composition"] {
        for stage in [ShaderStage::Vertex, ShaderStage::Fragment] {
            std::fs::write(shader_path(&dir, name, stage), &header).expect("write shader");
        }
    }
    dir
}

#[cfg(test)]
#[path = "mock_graphics_device_tests.rs"]
mod tests;
