/// GraphicsDevice trait - backend factory and queue interface
///
/// One trait family with associated types instead of trait objects: the
/// frame orchestrator is generic over the device, so every handle it holds
/// is the backend's concrete RAII type and no downcasting is needed.

use std::fmt;

use crate::error::Result;
use crate::graphics_device::{
    AcquireOutcome, Attachment, AttachmentDesc, Buffer, BufferDesc, CommandList,
    DescriptorPoolDesc, DescriptorSetLayoutDesc, DescriptorWrite, Extent2D, Format, Framebuffer,
    PipelineDesc, PresentOutcome, QueueFamilyIndices, RenderPassLayout, SamplerDesc, ShaderDesc,
    Submission, Swapchain,
};

pub trait GraphicsDevice: Sized {
    type ImageView: Copy + PartialEq + fmt::Debug;
    type Swapchain: Swapchain<ImageView = Self::ImageView>;
    type Attachment: Attachment<ImageView = Self::ImageView>;
    type RenderPass;
    type Framebuffer: Framebuffer;
    type Buffer: Buffer;
    type Sampler;
    type DescriptorSetLayout;
    type DescriptorPool;
    type DescriptorSet;
    type ShaderModule;
    type Pipeline;
    type CommandList: CommandList<Self>;
    type Semaphore;
    type Fence;

    // ===== DEVICE QUERIES =====

    /// Depth format selected at device creation
    fn depth_format(&self) -> Format;

    fn queue_families(&self) -> QueueFamilyIndices;

    // ===== SWAP CHAIN =====

    /// Create a swap chain for `window_extent`, retiring `old` if given
    ///
    /// Returns `Ok(None)` for a zero-area extent (minimized window). The
    /// caller drops `old` once the new chain is live.
    fn create_swapchain(
        &self,
        window_extent: Extent2D,
        old: Option<&Self::Swapchain>,
    ) -> Result<Option<Self::Swapchain>>;

    /// Acquire the next image, signaling `signal` when it is ready
    fn acquire_next_image(
        &self,
        swapchain: &mut Self::Swapchain,
        signal: &Self::Semaphore,
    ) -> Result<AcquireOutcome>;

    /// Queue `image_index` for presentation once `wait` is signaled
    fn present(
        &self,
        swapchain: &Self::Swapchain,
        image_index: u32,
        wait: &Self::Semaphore,
    ) -> Result<PresentOutcome>;

    // ===== ATTACHMENTS / PASSES =====

    fn create_attachment(&self, desc: &AttachmentDesc) -> Result<Self::Attachment>;

    fn create_render_pass(&self, layout: &RenderPassLayout) -> Result<Self::RenderPass>;

    /// `views` follow the attachment order of the render pass
    fn create_framebuffer(
        &self,
        render_pass: &Self::RenderPass,
        views: &[Self::ImageView],
        extent: Extent2D,
    ) -> Result<Self::Framebuffer>;

    // ===== RESOURCES =====

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Self::Buffer>;

    /// Synchronous staging copy: one-shot command list, fresh fence, blocking wait
    fn copy_buffer(&self, src: &Self::Buffer, dst: &Self::Buffer, size: u64) -> Result<()>;

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<Self::Sampler>;

    fn create_descriptor_set_layout(
        &self,
        desc: &DescriptorSetLayoutDesc,
    ) -> Result<Self::DescriptorSetLayout>;

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<Self::DescriptorPool>;

    /// Sets live as long as their pool
    fn allocate_descriptor_set(
        &self,
        pool: &Self::DescriptorPool,
        layout: &Self::DescriptorSetLayout,
    ) -> Result<Self::DescriptorSet>;

    /// Rewrite bindings of an existing set in place
    fn update_descriptor_set(
        &self,
        set: &Self::DescriptorSet,
        writes: &[DescriptorWrite<'_, Self>],
    ) -> Result<()>;

    fn create_shader_module(&self, desc: &ShaderDesc<'_>) -> Result<Self::ShaderModule>;

    fn create_pipeline(&self, desc: &PipelineDesc<'_, Self>) -> Result<Self::Pipeline>;

    // ===== COMMANDS / SYNC =====

    fn create_command_lists(&self, count: usize) -> Result<Vec<Self::CommandList>>;

    fn create_semaphore(&self) -> Result<Self::Semaphore>;

    fn create_fence(&self, signaled: bool) -> Result<Self::Fence>;

    /// Block until `fence` is signaled; expiry is `Error::Timeout`
    fn wait_for_fence(&self, fence: &Self::Fence, timeout_ns: u64) -> Result<()>;

    fn reset_fence(&self, fence: &Self::Fence) -> Result<()>;

    fn submit(&self, submission: &Submission<'_, Self>) -> Result<()>;

    /// Block until every queue is idle
    fn wait_idle(&self) -> Result<()>;
}
