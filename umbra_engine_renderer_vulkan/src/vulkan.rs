/// VulkanGraphicsDevice - ash implementation of the engine GraphicsDevice trait
///
/// Creation order: instance (+ validation messenger), surface, physical
/// device selection, logical device and queues, allocator, upload pool.
/// Everything is then owned by a shared `GpuContext`; each created object
/// keeps an `Arc` to it, so the device is destroyed after the last object.

use ash::vk;
use gpu_allocator::vulkan::{Allocator, AllocatorCreateDesc};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::ffi::CString;
use std::sync::Arc;

use umbra_engine::umbra::device::{
    find_memory_type, find_queue_families, select_physical_device, AcquireOutcome,
    AttachmentDesc, Buffer as DeviceBuffer, BufferDesc, DescriptorPoolDesc,
    DescriptorSetLayoutDesc, DescriptorWrite, Extent2D, Format, GraphicsDevice,
    MemoryPropertyFlags, PhysicalDeviceCandidate, PipelineDesc, PresentOutcome,
    QueueFamilyIndices, QueueFamilyInfo, RenderPassLayout, SamplerDesc, ShaderDesc, Submission,
};
use umbra_engine::umbra::{Config, Error, Result, ValidationStats};
use umbra_engine::{engine_debug, engine_error, engine_info, engine_warn};

use crate::vulkan_attachment::Attachment;
use crate::vulkan_buffer::Buffer;
use crate::vulkan_command_list::CommandList;
use crate::vulkan_context::{vk_error, DeviceParts, GpuContext, InstanceParts};
use crate::vulkan_descriptor_set::{DescriptorPool, DescriptorSet, DescriptorSetLayout};
use crate::vulkan_format::{
    device_type_from_vk, format_to_vk, memory_properties_from_vk, pipeline_stages_to_vk,
};
use crate::vulkan_frame_buffer::Framebuffer;
use crate::vulkan_pipeline::Pipeline;
use crate::vulkan_render_pass::RenderPass;
use crate::vulkan_sampler::Sampler;
use crate::vulkan_shader::ShaderModule;
use crate::vulkan_swapchain::Swapchain;
use crate::vulkan_sync::{Fence, Semaphore};

const SOURCE: &str = "umbra::vulkan";

const REQUIRED_DEVICE_EXTENSIONS: [&str; 1] = ["VK_KHR_swapchain"];

#[cfg(feature = "vulkan-validation")]
const VALIDATION_LAYER: &std::ffi::CStr = c"VK_LAYER_KHRONOS_validation";

pub struct VulkanGraphicsDevice {
    ctx: Arc<GpuContext>,
    depth_format: Format,
    vsync: bool,
    fence_timeout_ns: u64,
    device_name: String,
}

/// Device chosen by `pick_physical_device`
struct PhysicalDeviceChoice {
    physical_device: vk::PhysicalDevice,
    name: String,
    queue_families: QueueFamilyIndices,
    sampler_anisotropy: bool,
    max_sampler_anisotropy: f32,
}

impl VulkanGraphicsDevice {
    pub fn new<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<Self> {
        config.validate()?;

        let instance_parts = create_instance(window, config)?;
        let (device_parts, choice) = match create_device(&instance_parts) {
            Ok(created) => created,
            Err(e) => {
                destroy_instance_parts(instance_parts);
                return Err(e);
            }
        };

        let depth_format = match probe_depth_format(&instance_parts.instance, device_parts.physical_device) {
            Some(format) => format,
            None => {
                engine_error!(SOURCE, "No supported depth format among {:?}", Format::DEPTH_CANDIDATES);
                destroy_device_parts(device_parts);
                destroy_instance_parts(instance_parts);
                return Err(Error::InitializationFailed("no supported depth format".to_string()));
            }
        };

        let ctx = Arc::new(GpuContext::new(instance_parts, device_parts));

        engine_info!(
            SOURCE,
            "Vulkan device ready: {} (graphics family {}, present family {}, depth {:?})",
            choice.name,
            choice.queue_families.graphics,
            choice.queue_families.present,
            depth_format
        );

        Ok(Self {
            ctx,
            depth_format,
            vsync: config.vsync,
            fence_timeout_ns: config.fence_timeout_ns,
            device_name: choice.name,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Validation message counters; all zero without the `vulkan-validation` feature
    pub fn validation_stats(&self) -> ValidationStats {
        #[cfg(feature = "vulkan-validation")]
        {
            crate::debug::get_validation_stats()
        }
        #[cfg(not(feature = "vulkan-validation"))]
        {
            ValidationStats::default()
        }
    }
}

// ===== CREATION HELPERS =====

fn create_instance<W: HasDisplayHandle + HasWindowHandle>(window: &W, config: &Config) -> Result<InstanceParts> {
    let entry = unsafe {
        ash::Entry::load().map_err(|e| {
            engine_error!(SOURCE, "Failed to load Vulkan library: {:?}", e);
            Error::InitializationFailed(format!("Failed to load Vulkan library: {:?}", e))
        })?
    };

    let app_name = CString::new(config.app_name.as_str())
        .map_err(|_| Error::InitializationFailed("application name contains a NUL byte".to_string()))?;
    let (major, minor, patch) = config.app_version;
    let app_info = vk::ApplicationInfo::default()
        .application_name(&app_name)
        .application_version(vk::make_api_version(0, major, minor, patch))
        .engine_name(c"Umbra")
        .engine_version(vk::make_api_version(0, 0, 1, 0))
        .api_version(vk::API_VERSION_1_0);

    let display_handle = window.display_handle().map_err(|e| {
        engine_error!(SOURCE, "Failed to get display handle: {}", e);
        Error::InitializationFailed(format!("Failed to get display handle: {}", e))
    })?;
    let window_handle = window.window_handle().map_err(|e| {
        engine_error!(SOURCE, "Failed to get window handle: {}", e);
        Error::InitializationFailed(format!("Failed to get window handle: {}", e))
    })?;

    #[allow(unused_mut)]
    let mut extension_names = ash_window::enumerate_required_extensions(display_handle.as_raw())
        .map_err(|e| {
            engine_error!(SOURCE, "Failed to get required instance extensions: {:?}", e);
            Error::InitializationFailed(format!("Failed to get required extensions: {:?}", e))
        })?
        .to_vec();
    #[allow(unused_mut)]
    let mut layer_names: Vec<*const std::os::raw::c_char> = Vec::new();

    #[cfg(feature = "vulkan-validation")]
    let validation = config.enable_validation;
    #[cfg(not(feature = "vulkan-validation"))]
    if config.enable_validation {
        engine_warn!(SOURCE, "Validation requested but the vulkan-validation feature is disabled");
    }

    #[cfg(feature = "vulkan-validation")]
    if validation {
        let layers = unsafe {
            entry
                .enumerate_instance_layer_properties()
                .map_err(|e| vk_error("vkEnumerateInstanceLayerProperties", e))?
        };
        let available = layers
            .iter()
            .any(|layer| layer.layer_name_as_c_str().is_ok_and(|name| name == VALIDATION_LAYER));
        if !available {
            engine_error!(SOURCE, "Validation layer {:?} is not installed", VALIDATION_LAYER);
            return Err(Error::InitializationFailed(
                "validation layers requested, but not available".to_string(),
            ));
        }
        layer_names.push(VALIDATION_LAYER.as_ptr());
        extension_names.push(ash::ext::debug_utils::NAME.as_ptr());
    }

    let create_info = vk::InstanceCreateInfo::default()
        .application_info(&app_info)
        .enabled_layer_names(&layer_names)
        .enabled_extension_names(&extension_names);

    let instance = unsafe {
        entry.create_instance(&create_info, None).map_err(|e| {
            engine_error!(SOURCE, "Failed to create Vulkan instance: {:?}", e);
            Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
        })?
    };

    #[cfg(feature = "vulkan-validation")]
    let debug_messenger = if validation {
        match create_debug_messenger(&entry, &instance, config) {
            Ok(messenger) => Some(messenger),
            Err(e) => {
                unsafe { instance.destroy_instance(None) };
                return Err(e);
            }
        }
    } else {
        None
    };

    let surface_result = unsafe {
        ash_window::create_surface(&entry, &instance, display_handle.as_raw(), window_handle.as_raw(), None)
    };
    let surface = match surface_result {
        Ok(surface) => surface,
        Err(e) => {
            engine_error!(SOURCE, "Failed to create surface: {:?}", e);
            #[cfg(feature = "vulkan-validation")]
            if let Some((debug_utils, messenger)) = debug_messenger {
                crate::debug::cleanup_debug_config();
                unsafe { debug_utils.destroy_debug_utils_messenger(messenger, None) };
            }
            unsafe { instance.destroy_instance(None) };
            return Err(Error::InitializationFailed(format!("Failed to create surface: {:?}", e)));
        }
    };
    let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);

    Ok(InstanceParts {
        entry,
        instance,
        surface,
        surface_loader,
        #[cfg(feature = "vulkan-validation")]
        debug_messenger,
    })
}

#[cfg(feature = "vulkan-validation")]
fn create_debug_messenger(
    entry: &ash::Entry,
    instance: &ash::Instance,
    config: &Config,
) -> Result<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)> {
    let debug_config = crate::debug::DebugConfig::from_engine_config(config);
    let severity = debug_config.severity_flags();
    crate::debug::init_debug_config(debug_config);

    let debug_utils = ash::ext::debug_utils::Instance::new(entry, instance);
    let debug_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(severity)
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(crate::debug::vulkan_debug_callback));

    let messenger = unsafe {
        debug_utils.create_debug_utils_messenger(&debug_info, None).map_err(|e| {
            engine_error!(SOURCE, "Failed to create debug messenger: {:?}", e);
            Error::InitializationFailed(format!("Failed to create debug messenger: {:?}", e))
        })?
    };
    Ok((debug_utils, messenger))
}

fn destroy_instance_parts(parts: InstanceParts) {
    unsafe {
        parts.surface_loader.destroy_surface(parts.surface, None);
        #[cfg(feature = "vulkan-validation")]
        if let Some((debug_utils, messenger)) = parts.debug_messenger {
            crate::debug::cleanup_debug_config();
            debug_utils.destroy_debug_utils_messenger(messenger, None);
        }
        parts.instance.destroy_instance(None);
    }
}

fn destroy_device_parts(parts: DeviceParts) {
    drop(parts.allocator);
    unsafe {
        parts.device.destroy_command_pool(parts.upload_command_pool, None);
        parts.device.destroy_device(None);
    }
}

/// Gather what selection needs to know about every physical device
fn pick_physical_device(parts: &InstanceParts) -> Result<PhysicalDeviceChoice> {
    let instance = &parts.instance;
    let physical_devices = unsafe {
        instance.enumerate_physical_devices().map_err(|e| {
            engine_error!(SOURCE, "Failed to enumerate physical devices: {:?}", e);
            Error::InitializationFailed(format!("Failed to enumerate physical devices: {:?}", e))
        })?
    };

    let mut candidates = Vec::with_capacity(physical_devices.len());
    let mut limits = Vec::with_capacity(physical_devices.len());
    for &pd in &physical_devices {
        let (properties, features, families, extensions, format_count, mode_count) = unsafe {
            let properties = instance.get_physical_device_properties(pd);
            let features = instance.get_physical_device_features(pd);
            let families: Vec<QueueFamilyInfo> = instance
                .get_physical_device_queue_family_properties(pd)
                .iter()
                .enumerate()
                .map(|(i, family)| QueueFamilyInfo {
                    supports_graphics: family.queue_flags.contains(vk::QueueFlags::GRAPHICS),
                    supports_present: parts
                        .surface_loader
                        .get_physical_device_surface_support(pd, i as u32, parts.surface)
                        .unwrap_or(false),
                })
                .collect();
            let extensions: Vec<String> = instance
                .enumerate_device_extension_properties(pd)
                .unwrap_or_default()
                .iter()
                .filter_map(|ext| ext.extension_name_as_c_str().ok())
                .map(|name| name.to_string_lossy().into_owned())
                .collect();
            let format_count = parts
                .surface_loader
                .get_physical_device_surface_formats(pd, parts.surface)
                .map(|f| f.len())
                .unwrap_or(0);
            let mode_count = parts
                .surface_loader
                .get_physical_device_surface_present_modes(pd, parts.surface)
                .map(|m| m.len())
                .unwrap_or(0);
            (properties, features, families, extensions, format_count, mode_count)
        };

        let name = properties
            .device_name_as_c_str()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|_| "unknown device".to_string());
        engine_debug!(SOURCE, "Found GPU: {} ({:?})", name, properties.device_type);

        candidates.push(PhysicalDeviceCandidate {
            name,
            device_type: device_type_from_vk(properties.device_type),
            queue_families: find_queue_families(&families),
            extensions,
            surface_format_count: format_count,
            present_mode_count: mode_count,
            sampler_anisotropy: features.sampler_anisotropy == vk::TRUE,
        });
        limits.push(properties.limits.max_sampler_anisotropy);
    }

    let index = select_physical_device(&candidates, &REQUIRED_DEVICE_EXTENSIONS).ok_or_else(|| {
        engine_error!(SOURCE, "No suitable GPU among {} device(s)", candidates.len());
        Error::InitializationFailed("failed to find a suitable GPU".to_string())
    })?;
    let chosen = &candidates[index];
    let queue_families = chosen
        .queue_families
        .ok_or_else(|| Error::InitializationFailed("selected GPU has no queue families".to_string()))?;

    Ok(PhysicalDeviceChoice {
        physical_device: physical_devices[index],
        name: chosen.name.clone(),
        queue_families,
        sampler_anisotropy: chosen.sampler_anisotropy,
        max_sampler_anisotropy: limits[index],
    })
}

fn create_device(parts: &InstanceParts) -> Result<(DeviceParts, PhysicalDeviceChoice)> {
    let choice = pick_physical_device(parts)?;
    let instance = &parts.instance;
    let families = choice.queue_families;

    let queue_priorities = [1.0];
    let mut queue_create_infos = vec![vk::DeviceQueueCreateInfo::default()
        .queue_family_index(families.graphics)
        .queue_priorities(&queue_priorities)];
    if !families.is_unified() {
        queue_create_infos.push(
            vk::DeviceQueueCreateInfo::default()
                .queue_family_index(families.present)
                .queue_priorities(&queue_priorities),
        );
    }

    let device_extension_names = [ash::khr::swapchain::NAME.as_ptr()];
    let device_features = vk::PhysicalDeviceFeatures::default().sampler_anisotropy(choice.sampler_anisotropy);
    let device_create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(&queue_create_infos)
        .enabled_extension_names(&device_extension_names)
        .enabled_features(&device_features);

    let device = unsafe {
        instance
            .create_device(choice.physical_device, &device_create_info, None)
            .map_err(|e| {
                engine_error!(SOURCE, "Failed to create logical device: {:?}", e);
                Error::InitializationFailed(format!("Failed to create device: {:?}", e))
            })?
    };

    let graphics_queue = unsafe { device.get_device_queue(families.graphics, 0) };
    let present_queue = unsafe { device.get_device_queue(families.present, 0) };

    let memory_properties = unsafe { instance.get_physical_device_memory_properties(choice.physical_device) };
    let memory_types: Vec<MemoryPropertyFlags> = memory_properties
        .memory_types_as_slice()
        .iter()
        .map(|t| memory_properties_from_vk(t.property_flags))
        .collect();
    match find_memory_type(
        &memory_types,
        u32::MAX,
        MemoryPropertyFlags::DEVICE_LOCAL | MemoryPropertyFlags::HOST_VISIBLE,
    ) {
        Some(index) => engine_debug!(SOURCE, "Host-visible device-local memory: type {}", index),
        None => engine_debug!(SOURCE, "No host-visible device-local memory type"),
    }

    let upload_pool_info = vk::CommandPoolCreateInfo::default()
        .queue_family_index(families.graphics)
        .flags(vk::CommandPoolCreateFlags::TRANSIENT | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER);
    let upload_command_pool = match unsafe { device.create_command_pool(&upload_pool_info, None) } {
        Ok(pool) => pool,
        Err(e) => {
            unsafe { device.destroy_device(None) };
            return Err(vk_error("vkCreateCommandPool (upload)", e));
        }
    };

    let allocator = Allocator::new(&AllocatorCreateDesc {
        instance: instance.clone(),
        device: device.clone(),
        physical_device: choice.physical_device,
        debug_settings: Default::default(),
        buffer_device_address: false,
        allocation_sizes: Default::default(),
    });
    let allocator = match allocator {
        Ok(allocator) => allocator,
        Err(e) => {
            engine_error!(SOURCE, "Failed to create GPU allocator: {:?}", e);
            unsafe {
                device.destroy_command_pool(upload_command_pool, None);
                device.destroy_device(None);
            }
            return Err(Error::InitializationFailed(format!("Failed to create allocator: {:?}", e)));
        }
    };

    Ok((
        DeviceParts {
            device,
            allocator,
            graphics_queue,
            present_queue,
            queue_families: families,
            physical_device: choice.physical_device,
            memory_types,
            sampler_anisotropy: choice.sampler_anisotropy,
            max_sampler_anisotropy: choice.max_sampler_anisotropy,
            upload_command_pool,
        },
        choice,
    ))
}

/// First depth candidate usable as an optimal-tiling depth/stencil attachment
fn probe_depth_format(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> Option<Format> {
    Format::DEPTH_CANDIDATES.into_iter().find(|&format| {
        let properties =
            unsafe { instance.get_physical_device_format_properties(physical_device, format_to_vk(format)) };
        properties
            .optimal_tiling_features
            .contains(vk::FormatFeatureFlags::DEPTH_STENCIL_ATTACHMENT)
    })
}

// ===== ONE-SHOT UPLOAD =====

impl VulkanGraphicsDevice {
    fn submit_one_shot_copy(&self, command_buffer: vk::CommandBuffer, src: &Buffer, dst: &Buffer, size: u64) -> Result<()> {
        let device = &self.ctx.device;
        let begin_info =
            vk::CommandBufferBeginInfo::default().flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
        unsafe {
            device
                .begin_command_buffer(command_buffer, &begin_info)
                .map_err(|e| vk_error("vkBeginCommandBuffer (upload)", e))?;
            device.cmd_copy_buffer(
                command_buffer,
                src.buffer,
                dst.buffer,
                &[vk::BufferCopy { src_offset: 0, dst_offset: 0, size }],
            );
            device
                .end_command_buffer(command_buffer)
                .map_err(|e| vk_error("vkEndCommandBuffer (upload)", e))?;
        }

        let fence = Fence::new(&self.ctx, false)?;
        let command_buffers = [command_buffer];
        let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);
        unsafe {
            device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], fence.fence)
                .map_err(|e| vk_error("vkQueueSubmit (upload)", e))?;
        }
        let waited = self.wait_for_fence(&fence, self.fence_timeout_ns);
        // The fence and command buffer may still be in use after a failed wait
        if waited.is_err() {
            unsafe { device.device_wait_idle().ok() };
        }
        waited
    }
}

impl GraphicsDevice for VulkanGraphicsDevice {
    type ImageView = vk::ImageView;
    type Swapchain = Swapchain;
    type Attachment = Attachment;
    type RenderPass = RenderPass;
    type Framebuffer = Framebuffer;
    type Buffer = Buffer;
    type Sampler = Sampler;
    type DescriptorSetLayout = DescriptorSetLayout;
    type DescriptorPool = DescriptorPool;
    type DescriptorSet = DescriptorSet;
    type ShaderModule = ShaderModule;
    type Pipeline = Pipeline;
    type CommandList = CommandList;
    type Semaphore = Semaphore;
    type Fence = Fence;

    fn depth_format(&self) -> Format {
        self.depth_format
    }

    fn queue_families(&self) -> QueueFamilyIndices {
        self.ctx.queue_families
    }

    fn create_swapchain(&self, window_extent: Extent2D, old: Option<&Swapchain>) -> Result<Option<Swapchain>> {
        Swapchain::create(&self.ctx, window_extent, self.vsync, old)
    }

    fn acquire_next_image(&self, swapchain: &mut Swapchain, signal: &Semaphore) -> Result<AcquireOutcome> {
        swapchain.acquire(signal.semaphore)
    }

    fn present(&self, swapchain: &Swapchain, image_index: u32, wait: &Semaphore) -> Result<PresentOutcome> {
        swapchain.present(image_index, wait.semaphore)
    }

    fn create_attachment(&self, desc: &AttachmentDesc) -> Result<Attachment> {
        Attachment::new(&self.ctx, desc)
    }

    fn create_render_pass(&self, layout: &RenderPassLayout) -> Result<RenderPass> {
        RenderPass::new(&self.ctx, layout)
    }

    fn create_framebuffer(&self, render_pass: &RenderPass, views: &[vk::ImageView], extent: Extent2D) -> Result<Framebuffer> {
        Framebuffer::new(&self.ctx, render_pass, views, extent)
    }

    fn create_buffer(&self, desc: &BufferDesc) -> Result<Buffer> {
        Buffer::new(&self.ctx, desc)
    }

    fn copy_buffer(&self, src: &Buffer, dst: &Buffer, size: u64) -> Result<()> {
        if size == 0 || size > src.size() || size > dst.size() {
            return Err(Error::InvalidResource(format!(
                "copy of {} bytes between buffers of {} and {} bytes",
                size,
                src.size(),
                dst.size()
            )));
        }

        let pool = self
            .ctx
            .upload_command_pool
            .lock()
            .map_err(|_| Error::BackendError("upload command pool mutex poisoned".to_string()))?;

        let alloc_info = vk::CommandBufferAllocateInfo::default()
            .command_pool(*pool)
            .level(vk::CommandBufferLevel::PRIMARY)
            .command_buffer_count(1);
        let command_buffer = unsafe {
            self.ctx
                .device
                .allocate_command_buffers(&alloc_info)
                .map_err(|e| vk_error("vkAllocateCommandBuffers (upload)", e))?
        }
        .into_iter()
        .next()
        .ok_or_else(|| Error::BackendError("vkAllocateCommandBuffers returned no buffer".to_string()))?;

        let result = self.submit_one_shot_copy(command_buffer, src, dst, size);
        unsafe {
            self.ctx.device.free_command_buffers(*pool, &[command_buffer]);
        }
        result
    }

    fn create_sampler(&self, desc: &SamplerDesc) -> Result<Sampler> {
        Sampler::new(&self.ctx, desc)
    }

    fn create_descriptor_set_layout(&self, desc: &DescriptorSetLayoutDesc) -> Result<DescriptorSetLayout> {
        DescriptorSetLayout::new(&self.ctx, desc)
    }

    fn create_descriptor_pool(&self, desc: &DescriptorPoolDesc) -> Result<DescriptorPool> {
        DescriptorPool::new(&self.ctx, desc)
    }

    fn allocate_descriptor_set(&self, pool: &DescriptorPool, layout: &DescriptorSetLayout) -> Result<DescriptorSet> {
        pool.allocate(layout)
    }

    fn update_descriptor_set(&self, set: &DescriptorSet, writes: &[DescriptorWrite<'_, Self>]) -> Result<()> {
        set.update(&self.ctx, writes)
    }

    fn create_shader_module(&self, desc: &ShaderDesc<'_>) -> Result<ShaderModule> {
        ShaderModule::new(&self.ctx, desc)
    }

    fn create_pipeline(&self, desc: &PipelineDesc<'_, Self>) -> Result<Pipeline> {
        Pipeline::new(&self.ctx, desc)
    }

    fn create_command_lists(&self, count: usize) -> Result<Vec<CommandList>> {
        (0..count).map(|_| CommandList::new(&self.ctx)).collect()
    }

    fn create_semaphore(&self) -> Result<Semaphore> {
        Semaphore::new(&self.ctx)
    }

    fn create_fence(&self, signaled: bool) -> Result<Fence> {
        Fence::new(&self.ctx, signaled)
    }

    fn wait_for_fence(&self, fence: &Fence, timeout_ns: u64) -> Result<()> {
        let result = unsafe { self.ctx.device.wait_for_fences(&[fence.fence], true, timeout_ns) };
        match result {
            Ok(()) => Ok(()),
            Err(vk::Result::TIMEOUT) => {
                engine_warn!(SOURCE, "Fence not signaled within {} ns", timeout_ns);
                Err(Error::Timeout(format!("fence not signaled within {} ns", timeout_ns)))
            }
            Err(e) => Err(vk_error("vkWaitForFences", e)),
        }
    }

    fn reset_fence(&self, fence: &Fence) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .reset_fences(&[fence.fence])
                .map_err(|e| vk_error("vkResetFences", e))
        }
    }

    fn submit(&self, submission: &Submission<'_, Self>) -> Result<()> {
        submission.command_list.check_executable()?;

        let command_buffers = [submission.command_list.command_buffer];
        let (wait_semaphores, wait_stages): (Vec<vk::Semaphore>, Vec<vk::PipelineStageFlags>) = submission
            .wait
            .iter()
            .map(|w| (w.semaphore.semaphore, pipeline_stages_to_vk(w.stage)))
            .unzip();
        let signal_semaphores: Vec<vk::Semaphore> =
            submission.signal.iter().map(|s| s.semaphore).collect();

        let submit_info = vk::SubmitInfo::default()
            .wait_semaphores(&wait_semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&command_buffers)
            .signal_semaphores(&signal_semaphores);
        let fence = submission.fence.map_or(vk::Fence::null(), |f| f.fence);

        unsafe {
            self.ctx
                .device
                .queue_submit(self.ctx.graphics_queue, &[submit_info], fence)
                .map_err(|e| vk_error("vkQueueSubmit", e))
        }
    }

    fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.ctx
                .device
                .device_wait_idle()
                .map_err(|e| vk_error("vkDeviceWaitIdle", e))
        }
    }
}

impl Drop for VulkanGraphicsDevice {
    fn drop(&mut self) {
        #[cfg(feature = "vulkan-validation")]
        if self.validation_stats().total() > 0 {
            crate::debug::print_validation_stats_report();
        }
        engine_debug!(SOURCE, "Vulkan device '{}' released", self.device_name);
    }
}
