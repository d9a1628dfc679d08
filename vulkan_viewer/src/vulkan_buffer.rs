/// Host-visible GPU buffers
///
/// Two flavors: one-shot buffers filled at creation (vertex data, staging
/// uploads) and a persistently mapped uniform buffer refreshed every frame.
/// Memory is allocated directly through the context's memory-type
/// classification; allocations are host-visible and explicitly flushed, so
/// no coherent-memory requirement is imposed on the device.

use crate::error::{Error, Result};
use crate::vulkan_context::GpuContext;
use crate::viewer_error;
use ash::vk;
use std::sync::Arc;

/// A buffer whose contents are written once at creation.
pub struct DeviceBuffer {
    context: Arc<GpuContext>,
    pub buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    pub size: vk::DeviceSize,
}

impl DeviceBuffer {
    /// Create a host-visible buffer and fill it with `data`.
    pub fn new(context: Arc<GpuContext>, usage: vk::BufferUsageFlags, data: &[u8]) -> Result<Self> {
        let size = data.len() as vk::DeviceSize;
        let (buffer, memory) = allocate_host_visible(&context, usage, size)?;

        unsafe {
            let mapped = context
                .device
                .map_memory(memory, 0, size, vk::MemoryMapFlags::empty())
                .map_err(|e| {
                    viewer_error!("viewer::DeviceBuffer", "Failed to map buffer memory: {:?}", e);
                    Error::BackendError(format!("Failed to map buffer memory: {:?}", e))
                })?;
            std::ptr::copy_nonoverlapping(data.as_ptr(), mapped as *mut u8, data.len());

            let flush_range = vk::MappedMemoryRange::default()
                .memory(memory)
                .offset(0)
                .size(vk::WHOLE_SIZE);
            context
                .device
                .flush_mapped_memory_ranges(&[flush_range])
                .map_err(|e| {
                    viewer_error!("viewer::DeviceBuffer", "Failed to flush buffer memory: {:?}", e);
                    Error::BackendError(format!("Failed to flush buffer memory: {:?}", e))
                })?;
            context.device.unmap_memory(memory);

            context
                .device
                .bind_buffer_memory(buffer, memory, 0)
                .map_err(|e| {
                    viewer_error!("viewer::DeviceBuffer", "Failed to bind buffer memory: {:?}", e);
                    Error::BackendError(format!("Failed to bind buffer memory: {:?}", e))
                })?;
        }

        Ok(Self {
            context,
            buffer,
            memory,
            size,
        })
    }
}

impl Drop for DeviceBuffer {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_buffer(self.buffer, None);
            self.context.device.free_memory(self.memory, None);
        }
    }
}

/// A uniform buffer kept persistently mapped for per-frame updates.
pub struct UniformBuffer {
    context: Arc<GpuContext>,
    pub buffer: vk::Buffer,
    memory: vk::DeviceMemory,
    mapped: *mut u8,
    pub size: vk::DeviceSize,
}

impl UniformBuffer {
    pub fn new(context: Arc<GpuContext>, size: vk::DeviceSize) -> Result<Self> {
        let (buffer, memory) =
            allocate_host_visible(&context, vk::BufferUsageFlags::UNIFORM_BUFFER, size)?;

        let mapped = unsafe {
            let ptr = context
                .device
                .map_memory(memory, 0, size, vk::MemoryMapFlags::empty())
                .map_err(|e| {
                    viewer_error!("viewer::UniformBuffer", "Failed to map uniform memory: {:?}", e);
                    Error::BackendError(format!("Failed to map uniform memory: {:?}", e))
                })?;

            context
                .device
                .bind_buffer_memory(buffer, memory, 0)
                .map_err(|e| {
                    viewer_error!("viewer::UniformBuffer", "Failed to bind uniform memory: {:?}", e);
                    Error::BackendError(format!("Failed to bind uniform memory: {:?}", e))
                })?;

            ptr as *mut u8
        };

        Ok(Self {
            context,
            buffer,
            memory,
            mapped,
            size,
        })
    }

    /// Overwrite the mapped contents with `data`.
    ///
    /// Invalidates the range before the write (GPU reads since the last
    /// update must not be clobbered mid-flight) and flushes it after, since
    /// the memory is not required to be coherent.
    pub fn update(&self, data: &[u8]) -> Result<()> {
        if data.len() as vk::DeviceSize > self.size {
            viewer_error!(
                "viewer::UniformBuffer",
                "Update of {} bytes exceeds buffer size {}",
                data.len(),
                self.size
            );
            return Err(Error::InvalidResource(format!(
                "Uniform update of {} bytes exceeds buffer size {}",
                data.len(),
                self.size
            )));
        }

        let range = vk::MappedMemoryRange::default()
            .memory(self.memory)
            .offset(0)
            .size(vk::WHOLE_SIZE);

        unsafe {
            self.context
                .device
                .invalidate_mapped_memory_ranges(&[range])
                .map_err(|e| {
                    viewer_error!("viewer::UniformBuffer", "Failed to invalidate range: {:?}", e);
                    Error::BackendError(format!("Failed to invalidate range: {:?}", e))
                })?;

            std::ptr::copy_nonoverlapping(data.as_ptr(), self.mapped, data.len());

            self.context
                .device
                .flush_mapped_memory_ranges(&[range])
                .map_err(|e| {
                    viewer_error!("viewer::UniformBuffer", "Failed to flush range: {:?}", e);
                    Error::BackendError(format!("Failed to flush range: {:?}", e))
                })?;
        }
        Ok(())
    }
}

impl Drop for UniformBuffer {
    fn drop(&mut self) {
        unsafe {
            self.context.device.unmap_memory(self.memory);
            self.context.device.destroy_buffer(self.buffer, None);
            self.context.device.free_memory(self.memory, None);
        }
    }
}

/// Create a buffer backed by freshly allocated host-visible memory.
///
/// The memory is NOT yet bound for the `DeviceBuffer` path (binding happens
/// after the initial fill there) but callers must bind before GPU use.
fn allocate_host_visible(
    context: &GpuContext,
    usage: vk::BufferUsageFlags,
    size: vk::DeviceSize,
) -> Result<(vk::Buffer, vk::DeviceMemory)> {
    let buffer_info = vk::BufferCreateInfo::default()
        .size(size)
        .usage(usage)
        .sharing_mode(vk::SharingMode::EXCLUSIVE);

    unsafe {
        let buffer = context.device.create_buffer(&buffer_info, None).map_err(|e| {
            viewer_error!("viewer::DeviceBuffer", "Failed to create buffer: {:?}", e);
            Error::InitializationFailed(format!("Failed to create buffer: {:?}", e))
        })?;

        let requirements = context.device.get_buffer_memory_requirements(buffer);
        let memory_type = context.find_memory_type(
            requirements.memory_type_bits,
            vk::MemoryPropertyFlags::HOST_VISIBLE,
        )?;

        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type);

        let memory = context.device.allocate_memory(&alloc_info, None).map_err(|e| {
            viewer_error!("viewer::DeviceBuffer", "Failed to allocate buffer memory: {:?}", e);
            context.device.destroy_buffer(buffer, None);
            Error::InitializationFailed(format!("Failed to allocate buffer memory: {:?}", e))
        })?;

        Ok((buffer, memory))
    }
}
