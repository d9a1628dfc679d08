/// Swapchain - surface ownership and presentable image management
///
/// Owns the native surface, negotiates format/present-mode/extent/image-count
/// with the platform, creates the chain of presentable images and their
/// views, and hands out the next image to render into. Rebuild passes the
/// old swapchain handle to the creation call so the platform can recycle
/// resources; the old handle is destroyed only after the new one is live.

use crate::error::{Error, Result};
use crate::vulkan_context::GpuContext;
use crate::{viewer_error, viewer_info};
use ash::vk;
use std::sync::Arc;

/// Result of asking the platform for the next presentable image.
///
/// Out-of-date is not an error: the caller must rebuild the swapchain and
/// skip the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// An image is available for writing once the signaled semaphore fires.
    /// `suboptimal` means the surface no longer matches exactly and a
    /// rebuild should happen soon, but the image is still presentable.
    Ready { index: u32, suboptimal: bool },

    /// The surface no longer matches the swapchain at all; rebuild first.
    OutOfDate,
}

/// Result of queueing an image for presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PresentOutcome {
    Presented,
    Suboptimal,
    OutOfDate,
}

/// Negotiated swapchain parameters, derived once per (re)build from a fresh
/// capabilities snapshot.
#[derive(Debug, Clone, Copy)]
pub struct SwapchainConfig {
    pub format: vk::SurfaceFormatKHR,
    pub present_mode: vk::PresentModeKHR,
    pub extent: vk::Extent2D,
    pub image_count: u32,
    pub pre_transform: vk::SurfaceTransformFlagsKHR,
}

impl SwapchainConfig {
    /// Derive a full configuration from a capabilities snapshot plus the
    /// reported format and present-mode lists.
    pub fn derive(
        capabilities: &vk::SurfaceCapabilitiesKHR,
        formats: &[vk::SurfaceFormatKHR],
        present_modes: &[vk::PresentModeKHR],
        window_width: u32,
        window_height: u32,
    ) -> Result<Self> {
        let format = choose_surface_format(formats)?;
        Ok(Self {
            format,
            present_mode: choose_present_mode(present_modes),
            extent: choose_extent(capabilities, window_width, window_height),
            image_count: choose_image_count(capabilities),
            pre_transform: choose_pre_transform(capabilities),
        })
    }
}

/// Pick the surface format.
///
/// A single entry with format UNDEFINED means the platform has no
/// preference; fall back to B8G8R8A8_UNORM. Otherwise take the first
/// reported entry verbatim.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Result<vk::SurfaceFormatKHR> {
    match formats {
        [] => {
            viewer_error!("viewer::Swapchain", "Surface reported no formats");
            Err(Error::InitializationFailed(
                "Surface reported no formats".to_string(),
            ))
        }
        [only] if only.format == vk::Format::UNDEFINED => Ok(vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: only.color_space,
        }),
        [first, ..] => Ok(*first),
    }
}

/// Pick the present mode: MAILBOX > IMMEDIATE > FIFO.
///
/// FIFO is always supported by contract, so it is the unconditional
/// fallback.
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR]) -> vk::PresentModeKHR {
    if present_modes.contains(&vk::PresentModeKHR::MAILBOX) {
        vk::PresentModeKHR::MAILBOX
    } else if present_modes.contains(&vk::PresentModeKHR::IMMEDIATE) {
        vk::PresentModeKHR::IMMEDIATE
    } else {
        vk::PresentModeKHR::FIFO
    }
}

/// Pick the image count: one more than the minimum, clamped to the maximum
/// when the platform reports one (max of 0 means unbounded).
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
    let desired = capabilities.min_image_count + 1;
    if capabilities.max_image_count > 0 {
        desired.min(capabilities.max_image_count)
    } else {
        desired
    }
}

/// Pick the extent: the platform's current extent unless it reports the
/// "window manager decides" sentinel, in which case the window size is
/// clamped into the supported bounds.
pub fn choose_extent(
    capabilities: &vk::SurfaceCapabilitiesKHR,
    window_width: u32,
    window_height: u32,
) -> vk::Extent2D {
    if capabilities.current_extent.width != u32::MAX {
        capabilities.current_extent
    } else {
        vk::Extent2D {
            width: window_width.clamp(
                capabilities.min_image_extent.width,
                capabilities.max_image_extent.width,
            ),
            height: window_height.clamp(
                capabilities.min_image_extent.height,
                capabilities.max_image_extent.height,
            ),
        }
    }
}

/// Pick the pre-transform: identity when supported, otherwise whatever the
/// platform currently applies.
pub fn choose_pre_transform(
    capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::SurfaceTransformFlagsKHR {
    if capabilities
        .supported_transforms
        .contains(vk::SurfaceTransformFlagsKHR::IDENTITY)
    {
        vk::SurfaceTransformFlagsKHR::IDENTITY
    } else {
        capabilities.current_transform
    }
}

/// Find a queue family supporting both graphics and presentation to
/// `surface`.
///
/// Only the combined-family path is modeled; a device exposing graphics and
/// present on disjoint families is rejected as unusable for this renderer.
pub fn find_graphics_present_family(
    surface_loader: &ash::khr::surface::Instance,
    surface: vk::SurfaceKHR,
    physical_device: vk::PhysicalDevice,
    queue_families: &[vk::QueueFamilyProperties],
) -> Result<u32> {
    for (index, family) in queue_families.iter().enumerate() {
        if !family.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
            continue;
        }
        let supports_present = unsafe {
            surface_loader
                .get_physical_device_surface_support(physical_device, index as u32, surface)
                .map_err(|e| {
                    viewer_error!("viewer::Swapchain", "Surface support query failed: {:?}", e);
                    Error::InitializationFailed(format!("Surface support query failed: {:?}", e))
                })?
        };
        if supports_present {
            return Ok(index as u32);
        }
    }

    viewer_error!(
        "viewer::Swapchain",
        "No queue family supports both graphics and presentation"
    );
    Err(Error::InitializationFailed(
        "No queue family supports both graphics and presentation".to_string(),
    ))
}

/// Vulkan swapchain and its presentable images.
///
/// Exactly one swapchain is live at a time. The image handles are owned by
/// the platform and never individually destroyed; the views are owned here
/// and invalidated as a batch on rebuild or teardown.
pub struct Swapchain {
    context: Arc<GpuContext>,

    surface: vk::SurfaceKHR,
    surface_loader: ash::khr::surface::Instance,

    swapchain: vk::SwapchainKHR,
    swapchain_loader: ash::khr::swapchain::Device,

    config: SwapchainConfig,
    images: Vec<vk::Image>,
    image_views: Vec<vk::ImageView>,
}

impl Swapchain {
    /// Build the swapchain for the first time.
    pub fn new(
        context: Arc<GpuContext>,
        surface_loader: ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
        swapchain_loader: ash::khr::swapchain::Device,
        window_width: u32,
        window_height: u32,
    ) -> Result<Self> {
        let mut swapchain = Self {
            context,
            surface,
            surface_loader,
            swapchain: vk::SwapchainKHR::null(),
            swapchain_loader,
            config: SwapchainConfig {
                format: vk::SurfaceFormatKHR::default(),
                present_mode: vk::PresentModeKHR::FIFO,
                extent: vk::Extent2D::default(),
                image_count: 0,
                pre_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
            },
            images: Vec::new(),
            image_views: Vec::new(),
        };
        swapchain.rebuild(window_width, window_height)?;
        Ok(swapchain)
    }

    /// (Re)build the chain from a fresh capabilities snapshot.
    ///
    /// The previous swapchain handle (if any) is passed to the creation call
    /// for resource recycling and destroyed only after the new chain exists.
    /// Partial failures are not rolled back individually; the whole build is
    /// considered failed and must be retried from a clean teardown.
    pub fn rebuild(&mut self, window_width: u32, window_height: u32) -> Result<()> {
        let device = &self.context.device;
        unsafe {
            // Old views are invalidated as a batch before the new chain
            for view in self.image_views.drain(..) {
                device.destroy_image_view(view, None);
            }

            let capabilities = self
                .surface_loader
                .get_physical_device_surface_capabilities(self.context.physical_device, self.surface)
                .map_err(|e| {
                    viewer_error!("viewer::Swapchain", "Failed to get surface capabilities: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface capabilities: {:?}", e))
                })?;

            let formats = self
                .surface_loader
                .get_physical_device_surface_formats(self.context.physical_device, self.surface)
                .map_err(|e| {
                    viewer_error!("viewer::Swapchain", "Failed to get surface formats: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get surface formats: {:?}", e))
                })?;

            let present_modes = self
                .surface_loader
                .get_physical_device_surface_present_modes(self.context.physical_device, self.surface)
                .map_err(|e| {
                    viewer_error!("viewer::Swapchain", "Failed to get present modes: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get present modes: {:?}", e))
                })?;

            let config = SwapchainConfig::derive(
                &capabilities,
                &formats,
                &present_modes,
                window_width,
                window_height,
            )?;

            let old_swapchain = self.swapchain;
            let create_info = vk::SwapchainCreateInfoKHR::default()
                .surface(self.surface)
                .min_image_count(config.image_count)
                .image_format(config.format.format)
                .image_color_space(config.format.color_space)
                .image_extent(config.extent)
                .image_array_layers(1)
                .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
                .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
                .pre_transform(config.pre_transform)
                .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
                .present_mode(config.present_mode)
                .clipped(true)
                .old_swapchain(old_swapchain);

            let swapchain = self
                .swapchain_loader
                .create_swapchain(&create_info, None)
                .map_err(|e| {
                    viewer_error!("viewer::Swapchain", "Failed to create swapchain: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create swapchain: {:?}", e))
                })?;

            // Retire the old chain now that the replacement is live. The
            // resize path must never destroy it a second time.
            if old_swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(old_swapchain, None);
            }
            self.swapchain = swapchain;
            self.config = config;

            self.images = self
                .swapchain_loader
                .get_swapchain_images(swapchain)
                .map_err(|e| {
                    viewer_error!("viewer::Swapchain", "Failed to get swapchain images: {:?}", e);
                    Error::InitializationFailed(format!("Failed to get swapchain images: {:?}", e))
                })?;

            for &image in &self.images {
                let view_info = vk::ImageViewCreateInfo::default()
                    .image(image)
                    .view_type(vk::ImageViewType::TYPE_2D)
                    .format(config.format.format)
                    .components(vk::ComponentMapping {
                        r: vk::ComponentSwizzle::IDENTITY,
                        g: vk::ComponentSwizzle::IDENTITY,
                        b: vk::ComponentSwizzle::IDENTITY,
                        a: vk::ComponentSwizzle::IDENTITY,
                    })
                    .subresource_range(vk::ImageSubresourceRange {
                        aspect_mask: vk::ImageAspectFlags::COLOR,
                        base_mip_level: 0,
                        level_count: 1,
                        base_array_layer: 0,
                        layer_count: 1,
                    });

                let view = device.create_image_view(&view_info, None).map_err(|e| {
                    viewer_error!("viewer::Swapchain", "Failed to create swapchain image view: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create image view: {:?}", e))
                })?;
                self.image_views.push(view);
            }

            viewer_info!(
                "viewer::Swapchain",
                "Swapchain built: {}x{}, {} images, {:?}, {:?}",
                config.extent.width,
                config.extent.height,
                self.images.len(),
                config.format.format,
                config.present_mode
            );

            Ok(())
        }
    }

    /// Ask the platform for the index of the next presentable image,
    /// signaling `semaphore` when the image becomes writable.
    ///
    /// The wait is effectively unbounded, which is correct for a
    /// single-frame-in-flight design.
    pub fn acquire_next(&self, semaphore: vk::Semaphore) -> Result<AcquireOutcome> {
        unsafe {
            match self.swapchain_loader.acquire_next_image(
                self.swapchain,
                u64::MAX,
                semaphore,
                vk::Fence::null(),
            ) {
                Ok((index, suboptimal)) => Ok(AcquireOutcome::Ready { index, suboptimal }),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(AcquireOutcome::OutOfDate),
                Err(e) => {
                    viewer_error!("viewer::Swapchain", "Failed to acquire next image: {:?}", e);
                    Err(Error::BackendError(format!(
                        "Failed to acquire next image: {:?}",
                        e
                    )))
                }
            }
        }
    }

    /// Queue `image_index` for presentation once `wait_semaphore` fires.
    pub fn present(
        &self,
        queue: vk::Queue,
        image_index: u32,
        wait_semaphore: vk::Semaphore,
    ) -> Result<PresentOutcome> {
        let swapchains = [self.swapchain];
        let image_indices = [image_index];
        let wait_semaphores = [wait_semaphore];

        let present_info = vk::PresentInfoKHR::default()
            .wait_semaphores(&wait_semaphores)
            .swapchains(&swapchains)
            .image_indices(&image_indices);

        unsafe {
            match self.swapchain_loader.queue_present(queue, &present_info) {
                Ok(false) => Ok(PresentOutcome::Presented),
                Ok(true) | Err(vk::Result::SUBOPTIMAL_KHR) => Ok(PresentOutcome::Suboptimal),
                Err(vk::Result::ERROR_OUT_OF_DATE_KHR) => Ok(PresentOutcome::OutOfDate),
                Err(e) => {
                    viewer_error!("viewer::Swapchain", "Failed to present image: {:?}", e);
                    Err(Error::BackendError(format!(
                        "Failed to present image: {:?}",
                        e
                    )))
                }
            }
        }
    }

    pub fn config(&self) -> &SwapchainConfig {
        &self.config
    }

    pub fn extent(&self) -> vk::Extent2D {
        self.config.extent
    }

    pub fn format(&self) -> vk::Format {
        self.config.format.format
    }

    pub fn image_count(&self) -> usize {
        self.images.len()
    }

    pub fn image_views(&self) -> &[vk::ImageView] {
        &self.image_views
    }
}

impl Drop for Swapchain {
    fn drop(&mut self) {
        unsafe {
            self.context.device.device_wait_idle().ok();

            for &view in &self.image_views {
                self.context.device.destroy_image_view(view, None);
            }

            if self.swapchain != vk::SwapchainKHR::null() {
                self.swapchain_loader.destroy_swapchain(self.swapchain, None);
            }

            self.surface_loader.destroy_surface(self.surface, None);
        }
    }
}
