/// Descriptor set management
///
/// The binding strategy sits behind a small capability trait so the
/// scheduler and pipeline never depend on a concrete layout. One
/// implementation exists: the cube's uniform-plus-sampler binding.

use crate::error::{Error, Result};
use crate::vulkan_buffer::UniformBuffer;
use crate::vulkan_context::GpuContext;
use crate::vulkan_texture::Texture;
use crate::viewer_error;
use ash::vk;
use std::sync::Arc;

/// Capability interface for a resource-binding strategy.
///
/// Call order: `create_layout` → `create_pipeline_layout` → `create_pool` →
/// `create_set`. Alternate binding strategies implement this trait without
/// touching the frame scheduler or pipeline construction.
pub trait DescriptorBinding {
    /// Create the descriptor set layout describing the bindings.
    fn create_layout(&mut self) -> Result<()>;

    /// Create the pipeline layout wrapping the descriptor layout.
    fn create_pipeline_layout(&mut self) -> Result<()>;

    /// Create the descriptor pool the sets are allocated from.
    fn create_pool(&mut self) -> Result<()>;

    /// Allocate and write the descriptor set.
    fn create_set(&mut self, uniform: &UniformBuffer, texture: &Texture) -> Result<()>;

    fn pipeline_layout(&self) -> vk::PipelineLayout;
    fn descriptor_set(&self) -> vk::DescriptorSet;
}

/// The cube's binding: binding 0 = uniform buffer (vertex stage, MVP),
/// binding 1 = combined image sampler (fragment stage).
pub struct CubeBinding {
    context: Arc<GpuContext>,
    layout: vk::DescriptorSetLayout,
    pipeline_layout: vk::PipelineLayout,
    pool: vk::DescriptorPool,
    set: vk::DescriptorSet,
}

impl CubeBinding {
    pub fn new(context: Arc<GpuContext>) -> Self {
        Self {
            context,
            layout: vk::DescriptorSetLayout::null(),
            pipeline_layout: vk::PipelineLayout::null(),
            pool: vk::DescriptorPool::null(),
            set: vk::DescriptorSet::null(),
        }
    }
}

impl DescriptorBinding for CubeBinding {
    fn create_layout(&mut self) -> Result<()> {
        let bindings = [
            vk::DescriptorSetLayoutBinding::default()
                .binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::VERTEX),
            vk::DescriptorSetLayoutBinding::default()
                .binding(1)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .descriptor_count(1)
                .stage_flags(vk::ShaderStageFlags::FRAGMENT),
        ];

        let layout_info = vk::DescriptorSetLayoutCreateInfo::default().bindings(&bindings);
        self.layout = unsafe {
            self.context
                .device
                .create_descriptor_set_layout(&layout_info, None)
                .map_err(|e| {
                    viewer_error!("viewer::CubeBinding", "Failed to create descriptor layout: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to create descriptor layout: {:?}",
                        e
                    ))
                })?
        };
        Ok(())
    }

    fn create_pipeline_layout(&mut self) -> Result<()> {
        let set_layouts = [self.layout];
        let layout_info = vk::PipelineLayoutCreateInfo::default().set_layouts(&set_layouts);
        self.pipeline_layout = unsafe {
            self.context
                .device
                .create_pipeline_layout(&layout_info, None)
                .map_err(|e| {
                    viewer_error!("viewer::CubeBinding", "Failed to create pipeline layout: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to create pipeline layout: {:?}",
                        e
                    ))
                })?
        };
        Ok(())
    }

    fn create_pool(&mut self) -> Result<()> {
        let pool_sizes = [
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::UNIFORM_BUFFER,
                descriptor_count: 1,
            },
            vk::DescriptorPoolSize {
                ty: vk::DescriptorType::COMBINED_IMAGE_SAMPLER,
                descriptor_count: 1,
            },
        ];

        let pool_info = vk::DescriptorPoolCreateInfo::default()
            .max_sets(1)
            .pool_sizes(&pool_sizes);
        self.pool = unsafe {
            self.context
                .device
                .create_descriptor_pool(&pool_info, None)
                .map_err(|e| {
                    viewer_error!("viewer::CubeBinding", "Failed to create descriptor pool: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to create descriptor pool: {:?}",
                        e
                    ))
                })?
        };
        Ok(())
    }

    fn create_set(&mut self, uniform: &UniformBuffer, texture: &Texture) -> Result<()> {
        let set_layouts = [self.layout];
        let alloc_info = vk::DescriptorSetAllocateInfo::default()
            .descriptor_pool(self.pool)
            .set_layouts(&set_layouts);

        self.set = unsafe {
            self.context
                .device
                .allocate_descriptor_sets(&alloc_info)
                .map_err(|e| {
                    viewer_error!("viewer::CubeBinding", "Failed to allocate descriptor set: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to allocate descriptor set: {:?}",
                        e
                    ))
                })?[0]
        };

        let buffer_info = [vk::DescriptorBufferInfo {
            buffer: uniform.buffer,
            offset: 0,
            range: uniform.size,
        }];
        let image_info = [vk::DescriptorImageInfo {
            sampler: texture.sampler,
            image_view: texture.view,
            image_layout: texture.layout(),
        }];

        let writes = [
            vk::WriteDescriptorSet::default()
                .dst_set(self.set)
                .dst_binding(0)
                .descriptor_type(vk::DescriptorType::UNIFORM_BUFFER)
                .buffer_info(&buffer_info),
            vk::WriteDescriptorSet::default()
                .dst_set(self.set)
                .dst_binding(1)
                .descriptor_type(vk::DescriptorType::COMBINED_IMAGE_SAMPLER)
                .image_info(&image_info),
        ];

        unsafe {
            self.context.device.update_descriptor_sets(&writes, &[]);
        }
        Ok(())
    }

    fn pipeline_layout(&self) -> vk::PipelineLayout {
        self.pipeline_layout
    }

    fn descriptor_set(&self) -> vk::DescriptorSet {
        self.set
    }
}

impl Drop for CubeBinding {
    fn drop(&mut self) {
        unsafe {
            // Sets are returned with the pool
            if self.pool != vk::DescriptorPool::null() {
                self.context.device.destroy_descriptor_pool(self.pool, None);
            }
            if self.pipeline_layout != vk::PipelineLayout::null() {
                self.context
                    .device
                    .destroy_pipeline_layout(self.pipeline_layout, None);
            }
            if self.layout != vk::DescriptorSetLayout::null() {
                self.context
                    .device
                    .destroy_descriptor_set_layout(self.layout, None);
            }
        }
    }
}
