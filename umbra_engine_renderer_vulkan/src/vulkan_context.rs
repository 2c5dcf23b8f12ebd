/// GpuContext - instance, surface, device and allocator shared by every Vulkan object
///
/// Each RAII wrapper (buffer, attachment, swap chain, pipeline...) keeps an
/// `Arc<GpuContext>`, so the device outlives everything created from it and
/// is torn down exactly once, when the last wrapper is gone.

use ash::vk;
use gpu_allocator::vulkan::{Allocation, AllocationCreateDesc, AllocationScheme, Allocator};
use gpu_allocator::AllocationError;
use std::mem::ManuallyDrop;
use std::sync::Mutex;

use umbra_engine::{engine_err, engine_error};
use umbra_engine::umbra::device::{
    find_memory_type_or_abort, MemoryLocation, MemoryPropertyFlags, QueueFamilyIndices,
};
use umbra_engine::umbra::Error;

/// Log a failed Vulkan call and convert its result code
///
/// Host and device memory exhaustion become `Error::OutOfMemory`, anything
/// else a `BackendError` naming the call.
pub(crate) fn vk_error(call: &str, result: vk::Result) -> Error {
    engine_error!("umbra::vulkan", "{} failed: {:?}", call, result);
    match result {
        vk::Result::ERROR_OUT_OF_HOST_MEMORY | vk::Result::ERROR_OUT_OF_DEVICE_MEMORY => Error::OutOfMemory,
        _ => Error::BackendError(format!("{} failed: {:?}", call, result)),
    }
}

pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// GPU memory allocator
    /// Wrapped in ManuallyDrop so its pages are freed BEFORE the device is destroyed
    pub allocator: ManuallyDrop<Mutex<Allocator>>,

    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub queue_families: QueueFamilyIndices,

    pub physical_device: vk::PhysicalDevice,
    /// Property flags of every memory type, indexed like the physical device reports them
    pub memory_types: Vec<MemoryPropertyFlags>,
    pub sampler_anisotropy: bool,
    pub max_sampler_anisotropy: f32,

    /// Reusable command pool for one-shot staging copies
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub upload_command_pool: Mutex<vk::CommandPool>,

    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,
    pub swapchain_loader: ash::khr::swapchain::Device,

    instance: ash::Instance,

    /// Debug utils loader + messenger (validation builds only)
    #[cfg(feature = "vulkan-validation")]
    pub(crate) debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    /// Keeps the loader library mapped until the instance is gone
    _entry: ash::Entry,
}

/// Device-level pieces, grouped to keep `GpuContext::new` readable
pub struct DeviceParts {
    pub device: ash::Device,
    pub allocator: Allocator,
    pub graphics_queue: vk::Queue,
    pub present_queue: vk::Queue,
    pub queue_families: QueueFamilyIndices,
    pub physical_device: vk::PhysicalDevice,
    pub memory_types: Vec<MemoryPropertyFlags>,
    pub sampler_anisotropy: bool,
    pub max_sampler_anisotropy: f32,
    pub upload_command_pool: vk::CommandPool,
}

/// Instance-level pieces
pub struct InstanceParts {
    pub entry: ash::Entry,
    pub instance: ash::Instance,
    pub surface: vk::SurfaceKHR,
    pub surface_loader: ash::khr::surface::Instance,
    #[cfg(feature = "vulkan-validation")]
    pub debug_messenger: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,
}

impl GpuContext {
    pub fn new(instance_parts: InstanceParts, device_parts: DeviceParts) -> Self {
        let swapchain_loader =
            ash::khr::swapchain::Device::new(&instance_parts.instance, &device_parts.device);
        Self {
            device: device_parts.device,
            allocator: ManuallyDrop::new(Mutex::new(device_parts.allocator)),
            graphics_queue: device_parts.graphics_queue,
            present_queue: device_parts.present_queue,
            queue_families: device_parts.queue_families,
            physical_device: device_parts.physical_device,
            memory_types: device_parts.memory_types,
            sampler_anisotropy: device_parts.sampler_anisotropy,
            max_sampler_anisotropy: device_parts.max_sampler_anisotropy,
            upload_command_pool: Mutex::new(device_parts.upload_command_pool),
            surface: instance_parts.surface,
            surface_loader: instance_parts.surface_loader,
            swapchain_loader,
            instance: instance_parts.instance,
            #[cfg(feature = "vulkan-validation")]
            debug_messenger: instance_parts.debug_messenger,
            _entry: instance_parts.entry,
        }
    }

    pub fn instance(&self) -> &ash::Instance {
        &self.instance
    }

    /// Allocate memory for `requirements` with at least `properties`
    ///
    /// The memory type must exist on this device; a missing one aborts.
    pub fn allocate(
        &self,
        name: &str,
        requirements: vk::MemoryRequirements,
        properties: MemoryPropertyFlags,
        linear: bool,
    ) -> Result<Allocation, Error> {
        find_memory_type_or_abort(&self.memory_types, requirements.memory_type_bits, properties);

        let location = crate::vulkan_format::memory_location_to_allocator(
            MemoryLocation::from_properties(properties),
        );
        let mut allocator = self
            .allocator
            .lock()
            .map_err(|_| engine_err!("umbra::vulkan", "GPU allocator mutex poisoned"))?;
        allocator
            .allocate(&AllocationCreateDesc {
                name,
                requirements,
                location,
                linear,
                allocation_scheme: AllocationScheme::GpuAllocatorManaged,
            })
            .map_err(|e| match e {
                AllocationError::OutOfMemory => {
                    engine_error!("umbra::vulkan", "Out of GPU memory allocating '{}'", name);
                    Error::OutOfMemory
                }
                other => engine_err!("umbra::vulkan", "Allocation of '{}' failed: {:?}", name, other),
            })
    }

    /// Return an allocation to the allocator; never fails during teardown
    pub fn free(&self, allocation: Allocation) {
        if let Ok(mut allocator) = self.allocator.lock() {
            allocator.free(allocation).ok();
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        unsafe {
            self.device.device_wait_idle().ok();

            // 1. Free every VkDeviceMemory page while the device is alive
            ManuallyDrop::drop(&mut self.allocator);

            // 2. Upload pool
            if let Ok(mut pool) = self.upload_command_pool.lock() {
                if *pool != vk::CommandPool::null() {
                    self.device.destroy_command_pool(*pool, None);
                    *pool = vk::CommandPool::null();
                }
            }

            // 3. Device, then the surface it presented to
            self.device.destroy_device(None);
            self.surface_loader.destroy_surface(self.surface, None);

            // 4. Messenger before the instance; no callbacks during teardown
            #[cfg(feature = "vulkan-validation")]
            {
                crate::debug::cleanup_debug_config();
                if let Some((debug_utils, messenger)) = self.debug_messenger.take() {
                    debug_utils.destroy_debug_utils_messenger(messenger, None);
                }
            }

            self.instance.destroy_instance(None);
        }
    }
}
