/// GpuContext - Shared GPU state for all Vulkan objects
///
/// Contains everything the renderer components need for GPU operations:
/// - Device for Vulkan API calls
/// - Graphics+present queue for submission
/// - Cached memory properties for memory-type classification
/// - Command pool for one-shot upload operations

use crate::error::{Error, Result};
use crate::viewer_error;
use ash::vk;

/// Shared GPU context for all Vulkan resources.
///
/// This struct is shared (via `Arc`) by every component so device, queue and
/// memory-property references are not duplicated per resource. No component
/// other than `VulkanRenderer` may destroy the device or instance.
///
/// Note: device and instance destruction is handled by VulkanRenderer::drop()
/// to keep the teardown order in one place.
pub struct GpuContext {
    /// Vulkan logical device
    pub device: ash::Device,

    /// Physical device the logical device was created from
    pub physical_device: vk::PhysicalDevice,

    /// Queue supporting both graphics and presentation
    pub graphics_queue: vk::Queue,

    /// Family index of `graphics_queue`
    pub graphics_queue_family: u32,

    /// Memory properties snapshot, queried once at device creation
    pub memory_properties: vk::PhysicalDeviceMemoryProperties,

    /// Reusable command pool for one-shot upload operations
    /// (created with TRANSIENT + RESET_COMMAND_BUFFER flags)
    pub upload_command_pool: vk::CommandPool,
}

impl GpuContext {
    pub fn new(
        device: ash::Device,
        physical_device: vk::PhysicalDevice,
        graphics_queue: vk::Queue,
        graphics_queue_family: u32,
        memory_properties: vk::PhysicalDeviceMemoryProperties,
        upload_command_pool: vk::CommandPool,
    ) -> Self {
        Self {
            device,
            physical_device,
            graphics_queue,
            graphics_queue_family,
            memory_properties,
            upload_command_pool,
        }
    }

    /// Find the first device memory type matching `type_bits` and `required`.
    ///
    /// `type_bits` is the `memory_type_bits` mask from a
    /// `vk::MemoryRequirements` query; bit i allows memory type index i.
    ///
    /// # Errors
    ///
    /// Returns `Error::NoCompatibleMemoryType` when no allowed type carries
    /// all the required property flags. This is a fatal device-capability
    /// condition, not a retryable failure.
    pub fn find_memory_type(
        &self,
        type_bits: u32,
        required: vk::MemoryPropertyFlags,
    ) -> Result<u32> {
        classify_memory_type(&self.memory_properties, type_bits, required).ok_or_else(|| {
            viewer_error!(
                "viewer::GpuContext",
                "No memory type satisfies bits {:#b} with properties {:?}",
                type_bits,
                required
            );
            Error::NoCompatibleMemoryType
        })
    }

    /// Record and submit a one-shot command buffer, blocking on a fence
    /// until the GPU has executed it.
    ///
    /// Used for initialization-time uploads (texture staging, layout
    /// transitions outside the frame loop). The stall is intentional: these
    /// are not steady-state operations.
    pub fn run_one_shot<F>(&self, record: F) -> Result<()>
    where
        F: FnOnce(vk::CommandBuffer) -> Result<()>,
    {
        unsafe {
            let alloc_info = vk::CommandBufferAllocateInfo::default()
                .command_pool(self.upload_command_pool)
                .level(vk::CommandBufferLevel::PRIMARY)
                .command_buffer_count(1);

            let buffers = self.device.allocate_command_buffers(&alloc_info).map_err(|e| {
                viewer_error!("viewer::GpuContext", "Failed to allocate one-shot buffer: {:?}", e);
                Error::BackendError(format!("Failed to allocate one-shot buffer: {:?}", e))
            })?;
            let cmd = buffers[0];

            let result = (|| -> Result<()> {
                let begin_info = vk::CommandBufferBeginInfo::default()
                    .flags(vk::CommandBufferUsageFlags::ONE_TIME_SUBMIT);
                self.device.begin_command_buffer(cmd, &begin_info).map_err(|e| {
                    viewer_error!("viewer::GpuContext", "Failed to begin one-shot buffer: {:?}", e);
                    Error::BackendError(format!("Failed to begin one-shot buffer: {:?}", e))
                })?;

                record(cmd)?;

                self.device.end_command_buffer(cmd).map_err(|e| {
                    viewer_error!("viewer::GpuContext", "Failed to end one-shot buffer: {:?}", e);
                    Error::BackendError(format!("Failed to end one-shot buffer: {:?}", e))
                })?;

                let fence = self
                    .device
                    .create_fence(&vk::FenceCreateInfo::default(), None)
                    .map_err(|e| {
                        viewer_error!("viewer::GpuContext", "Failed to create upload fence: {:?}", e);
                        Error::BackendError(format!("Failed to create upload fence: {:?}", e))
                    })?;

                let command_buffers = [cmd];
                let submit_info = vk::SubmitInfo::default().command_buffers(&command_buffers);

                let submit_result = self
                    .device
                    .queue_submit(self.graphics_queue, &[submit_info], fence)
                    .and_then(|_| self.device.wait_for_fences(&[fence], true, u64::MAX));

                self.device.destroy_fence(fence, None);

                submit_result.map_err(|e| {
                    viewer_error!("viewer::GpuContext", "One-shot submission failed: {:?}", e);
                    Error::BackendError(format!("One-shot submission failed: {:?}", e))
                })
            })();

            self.device.free_command_buffers(self.upload_command_pool, &buffers);
            result
        }
    }

    /// Block until all GPU work on the device has completed.
    pub fn wait_idle(&self) -> Result<()> {
        unsafe {
            self.device.device_wait_idle().map_err(|e| {
                viewer_error!("viewer::GpuContext", "Device wait idle failed: {:?}", e);
                Error::BackendError(format!("Device wait idle failed: {:?}", e))
            })
        }
    }
}

impl Drop for GpuContext {
    fn drop(&mut self) {
        // NOTE: device, pool and instance destruction is handled by
        // VulkanRenderer::drop() so the teardown order lives in one place.
        // This Drop impl intentionally does nothing.
    }
}

/// Scan bit positions 0..31 of `type_bits` and return the first index whose
/// memory type carries all of `required`.
///
/// Pure helper behind `GpuContext::find_memory_type`, kept free-standing so
/// it can be tested against synthetic memory-property tables.
pub(crate) fn classify_memory_type(
    properties: &vk::PhysicalDeviceMemoryProperties,
    type_bits: u32,
    required: vk::MemoryPropertyFlags,
) -> Option<u32> {
    let mut bits = type_bits;
    for i in 0..32u32 {
        if bits & 1 == 1
            && i < properties.memory_type_count
            && properties.memory_types[i as usize]
                .property_flags
                .contains(required)
        {
            return Some(i);
        }
        bits >>= 1;
    }
    None
}
