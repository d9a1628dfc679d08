/// GPU images: the depth attachment and the sampled cube texture
///
/// Both paths allocate memory through the context's memory-type
/// classification and establish their layouts through the tracked
/// transition protocol, the texture via a fenced one-shot staging upload.

use crate::error::{Error, Result};
use crate::vulkan_barrier::TrackedImage;
use crate::vulkan_buffer::DeviceBuffer;
use crate::vulkan_context::GpuContext;
use crate::{viewer_debug, viewer_error};
use ash::vk;
use std::sync::Arc;

/// Depth attachment sized to the swapchain extent.
///
/// Rebuilt wholesale on resize; never sampled.
pub struct DepthBuffer {
    context: Arc<GpuContext>,
    image: TrackedImage,
    memory: vk::DeviceMemory,
    pub view: vk::ImageView,
    pub format: vk::Format,
}

impl DepthBuffer {
    pub const FORMAT: vk::Format = vk::Format::D16_UNORM;

    pub fn new(context: Arc<GpuContext>, extent: vk::Extent2D) -> Result<Self> {
        let (image, memory) = create_image(
            &context,
            extent,
            Self::FORMAT,
            vk::ImageUsageFlags::DEPTH_STENCIL_ATTACHMENT,
            vk::MemoryPropertyFlags::empty(),
        )?;
        let mut image = TrackedImage::new(image);

        // The attachment layout must be established before the render pass
        // first uses the image
        context.run_one_shot(|cmd| {
            unsafe {
                image.transition(
                    &context.device,
                    cmd,
                    vk::ImageAspectFlags::DEPTH,
                    vk::ImageLayout::UNDEFINED,
                    vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                    full_subresource_range(vk::ImageAspectFlags::DEPTH),
                );
            }
            Ok(())
        })?;

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image.image())
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(Self::FORMAT)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::DEPTH,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        let view = unsafe {
            context.device.create_image_view(&view_info, None).map_err(|e| {
                viewer_error!("viewer::DepthBuffer", "Failed to create depth view: {:?}", e);
                Error::InitializationFailed(format!("Failed to create depth view: {:?}", e))
            })?
        };

        viewer_debug!(
            "viewer::DepthBuffer",
            "Depth buffer created: {}x{}, {:?}",
            extent.width,
            extent.height,
            Self::FORMAT
        );

        Ok(Self {
            context,
            image,
            memory,
            view,
            format: Self::FORMAT,
        })
    }
}

impl Drop for DepthBuffer {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_image_view(self.view, None);
            self.context.device.destroy_image(self.image.image(), None);
            self.context.device.free_memory(self.memory, None);
        }
    }
}

/// Sampled RGBA texture uploaded through a host-visible staging buffer.
pub struct Texture {
    context: Arc<GpuContext>,
    image: TrackedImage,
    memory: vk::DeviceMemory,
    pub view: vk::ImageView,
    pub sampler: vk::Sampler,
}

impl Texture {
    /// Upload `pixels` (tightly packed RGBA8) as a sampled texture.
    ///
    /// The staging copy runs in a fenced one-shot submission; the image ends
    /// in SHADER_READ_ONLY_OPTIMAL, ready for descriptor binding.
    pub fn from_rgba8(
        context: Arc<GpuContext>,
        width: u32,
        height: u32,
        pixels: &[u8],
        max_anisotropy: Option<f32>,
    ) -> Result<Self> {
        if pixels.len() != rgba8_byte_len(width, height) {
            viewer_error!(
                "viewer::Texture",
                "Pixel data length {} does not match {}x{} RGBA8",
                pixels.len(),
                width,
                height
            );
            return Err(Error::InvalidResource(format!(
                "Pixel data length {} does not match {}x{} RGBA8",
                pixels.len(),
                width,
                height
            )));
        }

        let staging = DeviceBuffer::new(
            context.clone(),
            vk::BufferUsageFlags::TRANSFER_SRC,
            pixels,
        )?;

        let extent = vk::Extent2D { width, height };
        let (image, memory) = create_image(
            &context,
            extent,
            vk::Format::R8G8B8A8_UNORM,
            vk::ImageUsageFlags::TRANSFER_DST | vk::ImageUsageFlags::SAMPLED,
            vk::MemoryPropertyFlags::DEVICE_LOCAL,
        )?;
        let mut image = TrackedImage::new(image);

        context.run_one_shot(|cmd| {
            unsafe {
                image.transition(
                    &context.device,
                    cmd,
                    vk::ImageAspectFlags::COLOR,
                    vk::ImageLayout::UNDEFINED,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    full_subresource_range(vk::ImageAspectFlags::COLOR),
                );

                let region = vk::BufferImageCopy {
                    buffer_offset: 0,
                    buffer_row_length: 0,
                    buffer_image_height: 0,
                    image_subresource: vk::ImageSubresourceLayers {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        mip_level: 0,
                        base_array_layer: 0,
                        layer_count: 1,
                    },
                    image_offset: vk::Offset3D { x: 0, y: 0, z: 0 },
                    image_extent: vk::Extent3D {
                        width,
                        height,
                        depth: 1,
                    },
                };
                context.device.cmd_copy_buffer_to_image(
                    cmd,
                    staging.buffer,
                    image.image(),
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    &[region],
                );

                image.transition(
                    &context.device,
                    cmd,
                    vk::ImageAspectFlags::COLOR,
                    vk::ImageLayout::TRANSFER_DST_OPTIMAL,
                    vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
                    full_subresource_range(vk::ImageAspectFlags::COLOR),
                );
            }
            Ok(())
        })?;
        // Staging buffer is free to drop now: the fence wait inside
        // run_one_shot guarantees the copy completed
        drop(staging);

        let view_info = vk::ImageViewCreateInfo::default()
            .image(image.image())
            .view_type(vk::ImageViewType::TYPE_2D)
            .format(vk::Format::R8G8B8A8_UNORM)
            .subresource_range(vk::ImageSubresourceRange {
                aspect_mask: vk::ImageAspectFlags::COLOR,
                base_mip_level: 0,
                level_count: 1,
                base_array_layer: 0,
                layer_count: 1,
            });

        unsafe {
            let view = context.device.create_image_view(&view_info, None).map_err(|e| {
                viewer_error!("viewer::Texture", "Failed to create texture view: {:?}", e);
                Error::InitializationFailed(format!("Failed to create texture view: {:?}", e))
            })?;

            let mut sampler_info = vk::SamplerCreateInfo::default()
                .mag_filter(vk::Filter::LINEAR)
                .min_filter(vk::Filter::LINEAR)
                .mipmap_mode(vk::SamplerMipmapMode::LINEAR)
                .address_mode_u(vk::SamplerAddressMode::REPEAT)
                .address_mode_v(vk::SamplerAddressMode::REPEAT)
                .address_mode_w(vk::SamplerAddressMode::REPEAT)
                .border_color(vk::BorderColor::FLOAT_OPAQUE_WHITE);
            if let Some(max) = max_anisotropy {
                sampler_info = sampler_info.anisotropy_enable(true).max_anisotropy(max);
            }

            let sampler = context.device.create_sampler(&sampler_info, None).map_err(|e| {
                viewer_error!("viewer::Texture", "Failed to create sampler: {:?}", e);
                context.device.destroy_image_view(view, None);
                Error::InitializationFailed(format!("Failed to create sampler: {:?}", e))
            })?;

            viewer_debug!("viewer::Texture", "Texture uploaded: {}x{}", width, height);

            Ok(Self {
                context,
                image,
                memory,
                view,
                sampler,
            })
        }
    }

    /// The descriptor-ready layout established by the upload.
    pub fn layout(&self) -> vk::ImageLayout {
        self.image.layout()
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        unsafe {
            self.context.device.destroy_sampler(self.sampler, None);
            self.context.device.destroy_image_view(self.view, None);
            self.context.device.destroy_image(self.image.image(), None);
            self.context.device.free_memory(self.memory, None);
        }
    }
}

/// Procedural checkerboard pixels (RGBA8), the demo's stand-in for a real
/// texture asset.
pub fn checkerboard_rgba8(width: u32, height: u32, cell: u32) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(rgba8_byte_len(width, height));
    for y in 0..height {
        for x in 0..width {
            let on = ((x / cell) + (y / cell)) % 2 == 0;
            if on {
                pixels.extend_from_slice(&[230, 230, 230, 255]);
            } else {
                pixels.extend_from_slice(&[40, 40, 120, 255]);
            }
        }
    }
    pixels
}

/// Byte length of a tightly packed RGBA8 image, computed in usize so large
/// dimensions cannot overflow the u32 pixel math.
pub(crate) fn rgba8_byte_len(width: u32, height: u32) -> usize {
    width as usize * height as usize * 4
}

fn full_subresource_range(aspect_mask: vk::ImageAspectFlags) -> vk::ImageSubresourceRange {
    vk::ImageSubresourceRange {
        aspect_mask,
        base_mip_level: 0,
        level_count: 1,
        base_array_layer: 0,
        layer_count: 1,
    }
}

/// Create a 2D OPTIMAL-tiling image with bound, freshly allocated memory.
fn create_image(
    context: &GpuContext,
    extent: vk::Extent2D,
    format: vk::Format,
    usage: vk::ImageUsageFlags,
    required_memory: vk::MemoryPropertyFlags,
) -> Result<(vk::Image, vk::DeviceMemory)> {
    let image_info = vk::ImageCreateInfo::default()
        .image_type(vk::ImageType::TYPE_2D)
        .format(format)
        .extent(vk::Extent3D {
            width: extent.width,
            height: extent.height,
            depth: 1,
        })
        .mip_levels(1)
        .array_layers(1)
        .samples(vk::SampleCountFlags::TYPE_1)
        .tiling(vk::ImageTiling::OPTIMAL)
        .usage(usage)
        .sharing_mode(vk::SharingMode::EXCLUSIVE)
        .initial_layout(vk::ImageLayout::UNDEFINED);

    unsafe {
        let image = context.device.create_image(&image_info, None).map_err(|e| {
            viewer_error!("viewer::Texture", "Failed to create image: {:?}", e);
            Error::InitializationFailed(format!("Failed to create image: {:?}", e))
        })?;

        let requirements = context.device.get_image_memory_requirements(image);
        let memory_type =
            context.find_memory_type(requirements.memory_type_bits, required_memory)?;

        let alloc_info = vk::MemoryAllocateInfo::default()
            .allocation_size(requirements.size)
            .memory_type_index(memory_type);

        let memory = context.device.allocate_memory(&alloc_info, None).map_err(|e| {
            viewer_error!("viewer::Texture", "Failed to allocate image memory: {:?}", e);
            context.device.destroy_image(image, None);
            Error::InitializationFailed(format!("Failed to allocate image memory: {:?}", e))
        })?;

        context.device.bind_image_memory(image, memory, 0).map_err(|e| {
            viewer_error!("viewer::Texture", "Failed to bind image memory: {:?}", e);
            context.device.destroy_image(image, None);
            context.device.free_memory(memory, None);
            Error::InitializationFailed(format!("Failed to bind image memory: {:?}", e))
        })?;

        Ok((image, memory))
    }
}
