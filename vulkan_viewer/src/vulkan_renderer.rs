/// VulkanRenderer - top-level owner of every GPU object
///
/// One renderer owns the instance, device, context, swapchain, pipeline and
/// drawable resources by value; every other component holds non-owning
/// references (Arc'd context, copied handles) and never destroys them.
/// The renderer also implements the coordinated resize: drain the GPU,
/// tear down size-dependent objects in dependency order, rebuild, re-record.

use crate::error::{Error, Result};
use crate::vulkan_buffer::{DeviceBuffer, UniformBuffer};
use crate::vulkan_context::GpuContext;
use crate::vulkan_descriptor::{CubeBinding, DescriptorBinding};
use crate::vulkan_frame::{FrameScheduler, FrameStatus};
use crate::vulkan_pipeline::{Pipeline, Vertex};
use crate::vulkan_shader::ShaderPair;
use crate::vulkan_swapchain::{find_graphics_present_family, Swapchain};
use crate::vulkan_texture::{checkerboard_rgba8, DepthBuffer, Texture};
use crate::{viewer_debug, viewer_error, viewer_info};
use ash::vk;
use glam::{Mat4, Vec3};
use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use std::sync::Arc;
use winit::window::Window;

/// Renderer construction parameters.
pub struct RendererConfig {
    /// Application name reported to the driver
    pub app_name: String,

    /// Precompiled SPIR-V for the vertex stage
    pub vertex_shader: Vec<u8>,

    /// Precompiled SPIR-V for the fragment stage
    pub fragment_shader: Vec<u8>,

    /// Request sampler anisotropy when the device supports it
    pub anisotropy: bool,

    /// Validation messenger settings
    #[cfg(feature = "vulkan-validation")]
    pub debug: crate::debug::DebugConfig,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            app_name: "Vulkan Viewer".to_string(),
            vertex_shader: Vec::new(),
            fragment_shader: Vec::new(),
            anisotropy: true,
            #[cfg(feature = "vulkan-validation")]
            debug: crate::debug::DebugConfig::default(),
        }
    }
}

/// Re-entry guard for the resize path.
///
/// `begin()` refuses to start a teardown while the renderer is unprepared
/// or a resize is already running, so a duplicate resize event observes the
/// already-rebuilt state instead of double-freeing the chain.
#[derive(Debug, Default)]
pub(crate) struct ResizeGuard {
    prepared: bool,
    resizing: bool,
}

impl ResizeGuard {
    pub(crate) fn mark_prepared(&mut self) {
        self.prepared = true;
    }

    pub(crate) fn begin(&mut self) -> bool {
        if !self.prepared || self.resizing {
            return false;
        }
        self.prepared = false;
        self.resizing = true;
        true
    }

    pub(crate) fn end(&mut self) {
        self.resizing = false;
    }

    #[cfg(test)]
    pub(crate) fn is_resizing(&self) -> bool {
        self.resizing
    }
}

/// The renderer. See the module docs for the ownership model.
pub struct VulkanRenderer {
    // Bring-up state, destroyed last (in Drop, after all components)
    _entry: ash::Entry,
    instance: ash::Instance,
    #[cfg(feature = "vulkan-validation")]
    debug_utils: Option<(ash::ext::debug_utils::Instance, vk::DebugUtilsMessengerEXT)>,

    context: Arc<GpuContext>,
    max_anisotropy: Option<f32>,

    // Components, held in Options so the resize path can tear them down in
    // dependency order
    swapchain: Option<Swapchain>,
    depth: Option<DepthBuffer>,
    render_pass: vk::RenderPass,
    framebuffers: Vec<vk::Framebuffer>,
    shaders: Option<ShaderPair>,
    vertex_buffer: Option<DeviceBuffer>,
    uniform: Option<UniformBuffer>,
    texture: Option<Texture>,
    descriptors: Option<Box<dyn DescriptorBinding>>,
    pipeline: Option<Pipeline>,
    scheduler: Option<FrameScheduler>,

    guard: ResizeGuard,
    rotation: f32,
    window_size: (u32, u32),
    config: RendererConfig,
}

impl VulkanRenderer {
    /// Bring up the full renderer against `window`.
    ///
    /// Fatal configuration errors (no usable queue family, creation
    /// failures) propagate as `Error`; there is no degraded mode.
    pub fn new(window: &Window, config: RendererConfig) -> Result<Self> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1), size.height.max(1));

        let entry = unsafe {
            ash::Entry::load().map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "Failed to load Vulkan library: {}", e);
                Error::InitializationFailed(format!("Failed to load Vulkan library: {}", e))
            })?
        };

        let display_handle = window
            .display_handle()
            .map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "No display handle: {}", e);
                Error::InitializationFailed(format!("No display handle: {}", e))
            })?
            .as_raw();
        let window_handle = window
            .window_handle()
            .map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "No window handle: {}", e);
                Error::InitializationFailed(format!("No window handle: {}", e))
            })?
            .as_raw();

        let instance = Self::create_instance(&entry, display_handle, &config)?;

        #[cfg(feature = "vulkan-validation")]
        let debug_utils = {
            crate::debug::init_debug_config(config.debug.clone());
            let loader = ash::ext::debug_utils::Instance::new(&entry, &instance);
            let create_info = crate::debug::messenger_create_info();
            let messenger = unsafe {
                loader.create_debug_utils_messenger(&create_info, None).map_err(|e| {
                    viewer_error!("viewer::VulkanRenderer", "Failed to create debug messenger: {:?}", e);
                    Error::InitializationFailed(format!(
                        "Failed to create debug messenger: {:?}",
                        e
                    ))
                })?
            };
            viewer_debug!("viewer::VulkanRenderer", "Validation messenger installed");
            Some((loader, messenger))
        };

        let surface_loader = ash::khr::surface::Instance::new(&entry, &instance);
        let surface = unsafe {
            ash_window::create_surface(&entry, &instance, display_handle, window_handle, None)
                .map_err(|e| {
                    viewer_error!("viewer::VulkanRenderer", "Failed to create surface: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create surface: {:?}", e))
                })?
        };

        let (physical_device, queue_family) =
            Self::pick_physical_device(&instance, &surface_loader, surface)?;

        let (device, max_anisotropy) =
            Self::create_device(&instance, physical_device, queue_family, &config)?;

        let graphics_queue = unsafe { device.get_device_queue(queue_family, 0) };
        let memory_properties =
            unsafe { instance.get_physical_device_memory_properties(physical_device) };

        let upload_pool_info = vk::CommandPoolCreateInfo::default()
            .flags(
                vk::CommandPoolCreateFlags::TRANSIENT
                    | vk::CommandPoolCreateFlags::RESET_COMMAND_BUFFER,
            )
            .queue_family_index(queue_family);
        let upload_command_pool = unsafe {
            device.create_command_pool(&upload_pool_info, None).map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "Failed to create upload pool: {:?}", e);
                Error::InitializationFailed(format!("Failed to create upload pool: {:?}", e))
            })?
        };

        let context = Arc::new(GpuContext::new(
            device,
            physical_device,
            graphics_queue,
            queue_family,
            memory_properties,
            upload_command_pool,
        ));

        let swapchain_loader = ash::khr::swapchain::Device::new(&instance, &context.device);
        let swapchain = Swapchain::new(
            context.clone(),
            surface_loader,
            surface,
            swapchain_loader,
            width,
            height,
        )?;

        let mut renderer = Self {
            _entry: entry,
            instance,
            #[cfg(feature = "vulkan-validation")]
            debug_utils,
            context,
            max_anisotropy,
            swapchain: Some(swapchain),
            depth: None,
            render_pass: vk::RenderPass::null(),
            framebuffers: Vec::new(),
            shaders: None,
            vertex_buffer: None,
            uniform: None,
            texture: None,
            descriptors: None,
            pipeline: None,
            scheduler: None,
            guard: ResizeGuard::default(),
            rotation: 0.0,
            window_size: (width, height),
            config,
        };

        renderer.build_resources()?;
        renderer.prepare()?;

        viewer_info!("viewer::VulkanRenderer", "Renderer initialized ({}x{})", width, height);
        Ok(renderer)
    }

    fn create_instance(
        entry: &ash::Entry,
        display_handle: raw_window_handle::RawDisplayHandle,
        config: &RendererConfig,
    ) -> Result<ash::Instance> {
        let app_name = std::ffi::CString::new(config.app_name.as_str()).map_err(|_| {
            Error::InvalidResource("Application name contains a NUL byte".to_string())
        })?;

        let app_info = vk::ApplicationInfo::default()
            .application_name(&app_name)
            .application_version(vk::make_api_version(0, 0, 1, 0))
            .engine_name(&app_name)
            .api_version(vk::API_VERSION_1_0);

        let surface_extensions = ash_window::enumerate_required_extensions(display_handle)
            .map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "No surface extensions for this platform: {:?}", e);
                Error::InitializationFailed(format!(
                    "No surface extensions for this platform: {:?}",
                    e
                ))
            })?;

        let mut extensions = surface_extensions.to_vec();
        #[cfg(feature = "vulkan-validation")]
        extensions.push(ash::ext::debug_utils::NAME.as_ptr());

        #[cfg(feature = "vulkan-validation")]
        let layers: Vec<*const std::os::raw::c_char> =
            vec![c"VK_LAYER_KHRONOS_validation".as_ptr()];
        #[cfg(not(feature = "vulkan-validation"))]
        let layers: Vec<*const std::os::raw::c_char> = Vec::new();

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(&layers)
            .enabled_extension_names(&extensions);

        unsafe {
            entry.create_instance(&create_info, None).map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "Failed to create instance: {:?}", e);
                Error::InitializationFailed(format!("Failed to create instance: {:?}", e))
            })
        }
    }

    /// Pick the first physical device exposing a combined graphics+present
    /// queue family for `surface`.
    fn pick_physical_device(
        instance: &ash::Instance,
        surface_loader: &ash::khr::surface::Instance,
        surface: vk::SurfaceKHR,
    ) -> Result<(vk::PhysicalDevice, u32)> {
        let devices = unsafe {
            instance.enumerate_physical_devices().map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "Failed to enumerate devices: {:?}", e);
                Error::InitializationFailed(format!("Failed to enumerate devices: {:?}", e))
            })?
        };

        for device in devices {
            let families =
                unsafe { instance.get_physical_device_queue_family_properties(device) };
            if let Ok(family) =
                find_graphics_present_family(surface_loader, surface, device, &families)
            {
                return Ok((device, family));
            }
        }

        viewer_error!(
            "viewer::VulkanRenderer",
            "No physical device can render and present to this surface"
        );
        Err(Error::InitializationFailed(
            "No physical device can render and present to this surface".to_string(),
        ))
    }

    fn create_device(
        instance: &ash::Instance,
        physical_device: vk::PhysicalDevice,
        queue_family: u32,
        config: &RendererConfig,
    ) -> Result<(ash::Device, Option<f32>)> {
        let priorities = [1.0f32];
        let queue_info = vk::DeviceQueueCreateInfo::default()
            .queue_family_index(queue_family)
            .queue_priorities(&priorities);
        let queue_infos = [queue_info];

        let supported = unsafe { instance.get_physical_device_features(physical_device) };
        let properties = unsafe { instance.get_physical_device_properties(physical_device) };

        let use_anisotropy = config.anisotropy && supported.sampler_anisotropy == vk::TRUE;
        let enabled_features =
            vk::PhysicalDeviceFeatures::default().sampler_anisotropy(use_anisotropy);

        let extensions = [ash::khr::swapchain::NAME.as_ptr()];

        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_infos)
            .enabled_extension_names(&extensions)
            .enabled_features(&enabled_features);

        let device = unsafe {
            instance
                .create_device(physical_device, &create_info, None)
                .map_err(|e| {
                    viewer_error!("viewer::VulkanRenderer", "Failed to create device: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create device: {:?}", e))
                })?
        };

        let max_anisotropy = use_anisotropy.then(|| properties.limits.max_sampler_anisotropy);
        Ok((device, max_anisotropy))
    }

    /// Build everything downstream of the swapchain: depth, render pass,
    /// framebuffers, drawable resources, descriptors, pipeline, scheduler.
    fn build_resources(&mut self) -> Result<()> {
        let swapchain = self
            .swapchain
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Swapchain not built".to_string()))?;
        let extent = swapchain.extent();
        let color_format = swapchain.format();
        let image_count = swapchain.image_count();

        self.depth = Some(DepthBuffer::new(self.context.clone(), extent)?);
        self.render_pass = self.create_render_pass(color_format)?;
        self.create_framebuffers(extent)?;

        let vertices = cube_vertices();
        self.vertex_buffer = Some(DeviceBuffer::new(
            self.context.clone(),
            vk::BufferUsageFlags::VERTEX_BUFFER,
            bytemuck::cast_slice(&vertices),
        )?);

        self.uniform = Some(UniformBuffer::new(
            self.context.clone(),
            std::mem::size_of::<Mat4>() as vk::DeviceSize,
        )?);

        let pixels = checkerboard_rgba8(256, 256, 32);
        self.texture = Some(Texture::from_rgba8(
            self.context.clone(),
            256,
            256,
            &pixels,
            self.max_anisotropy,
        )?);

        if self.shaders.is_none() {
            self.shaders = Some(ShaderPair::from_spirv(
                self.context.clone(),
                &self.config.vertex_shader,
                &self.config.fragment_shader,
            )?);
        }

        let mut binding = Box::new(CubeBinding::new(self.context.clone()));
        binding.create_layout()?;
        binding.create_pipeline_layout()?;
        binding.create_pool()?;
        {
            let uniform = self.uniform.as_ref().ok_or_else(|| {
                Error::InvalidResource("Uniform buffer not built".to_string())
            })?;
            let texture = self.texture.as_ref().ok_or_else(|| {
                Error::InvalidResource("Texture not built".to_string())
            })?;
            binding.create_set(uniform, texture)?;
        }

        let shaders = self
            .shaders
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Shaders not built".to_string()))?;
        self.pipeline = Some(Pipeline::new(
            self.context.clone(),
            shaders,
            binding.pipeline_layout(),
            self.render_pass,
        )?);
        self.descriptors = Some(binding);

        let mut scheduler = FrameScheduler::new(self.context.clone())?;
        scheduler.allocate_buffers(image_count)?;
        self.scheduler = Some(scheduler);

        self.update_uniform()?;
        Ok(())
    }

    fn create_render_pass(&self, color_format: vk::Format) -> Result<vk::RenderPass> {
        let attachments = [
            vk::AttachmentDescription {
                format: color_format,
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: vk::AttachmentLoadOp::CLEAR,
                store_op: vk::AttachmentStoreOp::STORE,
                stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
                stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
                initial_layout: vk::ImageLayout::UNDEFINED,
                final_layout: vk::ImageLayout::PRESENT_SRC_KHR,
                ..Default::default()
            },
            vk::AttachmentDescription {
                format: DepthBuffer::FORMAT,
                samples: vk::SampleCountFlags::TYPE_1,
                load_op: vk::AttachmentLoadOp::CLEAR,
                store_op: vk::AttachmentStoreOp::DONT_CARE,
                stencil_load_op: vk::AttachmentLoadOp::DONT_CARE,
                stencil_store_op: vk::AttachmentStoreOp::DONT_CARE,
                initial_layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                final_layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
                ..Default::default()
            },
        ];

        let color_refs = [vk::AttachmentReference {
            attachment: 0,
            layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        }];
        let depth_ref = vk::AttachmentReference {
            attachment: 1,
            layout: vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
        };

        let subpasses = [vk::SubpassDescription::default()
            .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
            .color_attachments(&color_refs)
            .depth_stencil_attachment(&depth_ref)];

        // The color attachment is written only after the acquire semaphore
        // fires at this same stage
        let dependencies = [vk::SubpassDependency {
            src_subpass: vk::SUBPASS_EXTERNAL,
            dst_subpass: 0,
            src_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            dst_stage_mask: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
            src_access_mask: vk::AccessFlags::empty(),
            dst_access_mask: vk::AccessFlags::COLOR_ATTACHMENT_WRITE,
            ..Default::default()
        }];

        let create_info = vk::RenderPassCreateInfo::default()
            .attachments(&attachments)
            .subpasses(&subpasses)
            .dependencies(&dependencies);

        unsafe {
            self.context.device.create_render_pass(&create_info, None).map_err(|e| {
                viewer_error!("viewer::VulkanRenderer", "Failed to create render pass: {:?}", e);
                Error::InitializationFailed(format!("Failed to create render pass: {:?}", e))
            })
        }
    }

    fn create_framebuffers(&mut self, extent: vk::Extent2D) -> Result<()> {
        let swapchain = self
            .swapchain
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Swapchain not built".to_string()))?;
        let depth = self
            .depth
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Depth buffer not built".to_string()))?;

        for &view in swapchain.image_views() {
            let attachments = [view, depth.view];
            let create_info = vk::FramebufferCreateInfo::default()
                .render_pass(self.render_pass)
                .attachments(&attachments)
                .width(extent.width)
                .height(extent.height)
                .layers(1);

            let framebuffer = unsafe {
                self.context.device.create_framebuffer(&create_info, None).map_err(|e| {
                    viewer_error!("viewer::VulkanRenderer", "Failed to create framebuffer: {:?}", e);
                    Error::InitializationFailed(format!("Failed to create framebuffer: {:?}", e))
                })?
            };
            self.framebuffers.push(framebuffer);
        }
        Ok(())
    }

    /// Record one command buffer per presentable image.
    ///
    /// The renderer is not presentable until this completes; the resize
    /// guard gates on it.
    pub fn prepare(&mut self) -> Result<()> {
        let swapchain = self
            .swapchain
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Swapchain not built".to_string()))?;
        let extent = swapchain.extent();
        let render_pass = self.render_pass;
        let framebuffers = &self.framebuffers;
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Pipeline not built".to_string()))?;
        let descriptors = self
            .descriptors
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Descriptors not built".to_string()))?;
        let vertex_buffer = self
            .vertex_buffer
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Vertex buffer not built".to_string()))?;
        let scheduler = self
            .scheduler
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Scheduler not built".to_string()))?;

        if scheduler.command_buffer_count() != framebuffers.len() {
            viewer_error!(
                "viewer::VulkanRenderer",
                "Command buffer count {} does not match image count {}",
                scheduler.command_buffer_count(),
                framebuffers.len()
            );
            return Err(Error::InvalidResource(
                "Command buffer count does not match image count".to_string(),
            ));
        }

        let device = &self.context.device;
        scheduler.record_all(|cmd, slot| {
            let clear_values = [
                vk::ClearValue {
                    color: vk::ClearColorValue {
                        float32: [0.1, 0.1, 0.15, 1.0],
                    },
                },
                vk::ClearValue {
                    depth_stencil: vk::ClearDepthStencilValue {
                        depth: 1.0,
                        stencil: 0,
                    },
                },
            ];

            let begin_info = vk::RenderPassBeginInfo::default()
                .render_pass(render_pass)
                .framebuffer(framebuffers[slot])
                .render_area(vk::Rect2D {
                    offset: vk::Offset2D { x: 0, y: 0 },
                    extent,
                })
                .clear_values(&clear_values);

            unsafe {
                device.cmd_begin_render_pass(cmd, &begin_info, vk::SubpassContents::INLINE);
                device.cmd_bind_pipeline(
                    cmd,
                    vk::PipelineBindPoint::GRAPHICS,
                    pipeline.pipeline,
                );
                device.cmd_bind_descriptor_sets(
                    cmd,
                    vk::PipelineBindPoint::GRAPHICS,
                    descriptors.pipeline_layout(),
                    0,
                    &[descriptors.descriptor_set()],
                    &[],
                );
                device.cmd_bind_vertex_buffers(cmd, 0, &[vertex_buffer.buffer], &[0]);

                let viewport = vk::Viewport {
                    x: 0.0,
                    y: 0.0,
                    width: extent.width as f32,
                    height: extent.height as f32,
                    min_depth: 0.0,
                    max_depth: 1.0,
                };
                device.cmd_set_viewport(cmd, 0, &[viewport]);
                device.cmd_set_scissor(
                    cmd,
                    0,
                    &[vk::Rect2D {
                        offset: vk::Offset2D { x: 0, y: 0 },
                        extent,
                    }],
                );

                device.cmd_draw(cmd, 36, 1, 0, 0);
                device.cmd_end_render_pass(cmd);
            }
            Ok(())
        })?;

        self.guard.mark_prepared();
        Ok(())
    }

    /// Advance the cube rotation and refresh the mapped MVP.
    pub fn update(&mut self) -> Result<()> {
        self.rotation += 0.0005;
        if self.rotation > std::f32::consts::TAU {
            self.rotation -= std::f32::consts::TAU;
        }
        self.update_uniform()
    }

    fn update_uniform(&self) -> Result<()> {
        let (width, height) = self.window_size;
        let aspect = width as f32 / height.max(1) as f32;

        let projection = Mat4::perspective_rh(45f32.to_radians(), aspect, 0.1, 100.0);
        let view = Mat4::look_at_rh(
            Vec3::new(0.0, 3.0, 5.0),
            Vec3::ZERO,
            Vec3::new(0.0, -1.0, 0.0),
        );
        let model = Mat4::from_rotation_y(self.rotation);
        // GL-style clip space -> Vulkan clip space (flipped Y, half Z)
        let clip = Mat4::from_cols_array(&[
            1.0, 0.0, 0.0, 0.0, //
            0.0, -1.0, 0.0, 0.0, //
            0.0, 0.0, 0.5, 0.0, //
            0.0, 0.0, 0.5, 1.0,
        ]);
        let mvp = clip * projection * view * model;

        let uniform = self
            .uniform
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Uniform buffer not built".to_string()))?;
        uniform.update(bytemuck::bytes_of(&mvp))
    }

    /// Run one frame cycle. `NeedsRebuild` means the caller should invoke
    /// [`VulkanRenderer::resize`] before the next frame.
    pub fn render_frame(&mut self) -> Result<FrameStatus> {
        let swapchain = self
            .swapchain
            .as_ref()
            .ok_or_else(|| Error::InvalidResource("Swapchain not built".to_string()))?;
        let scheduler = self
            .scheduler
            .as_mut()
            .ok_or_else(|| Error::InvalidResource("Scheduler not built".to_string()))?;
        scheduler.render_frame(swapchain)
    }

    /// Coordinated reaction to a window-size change (or a stale surface).
    ///
    /// Drains the GPU, then tears down and rebuilds in dependency order:
    /// framebuffers → pipeline+cache → descriptors → render pass →
    /// swapchain (old handle retired by the rebuild) → vertex/uniform
    /// buffers → texture → depth buffer; then the full build sequence and a
    /// fresh prepare. Duplicate events are absorbed by the guard.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if !self.guard.begin() {
            viewer_debug!("viewer::VulkanRenderer", "Resize ignored (not prepared or already resizing)");
            return Ok(());
        }
        let width = width.max(1);
        let height = height.max(1);
        self.window_size = (width, height);

        viewer_info!("viewer::VulkanRenderer", "Resizing to {}x{}", width, height);

        let result = self.rebuild_after_resize(width, height);
        self.guard.end();

        if let Err(e) = &result {
            // No recovery path: a renderer that cannot rebuild its
            // presentation chain must surface the failure to the caller
            viewer_error!("viewer::VulkanRenderer", "Resize rebuild failed: {}", e);
        }
        result
    }

    fn rebuild_after_resize(&mut self, width: u32, height: u32) -> Result<()> {
        // The GPU may still reference everything below
        self.context.wait_idle()?;

        unsafe {
            for framebuffer in self.framebuffers.drain(..) {
                self.context.device.destroy_framebuffer(framebuffer, None);
            }
        }
        self.pipeline = None;
        self.descriptors = None;
        unsafe {
            if self.render_pass != vk::RenderPass::null() {
                self.context.device.destroy_render_pass(self.render_pass, None);
                self.render_pass = vk::RenderPass::null();
            }
        }

        // The surface and swapchain handle survive: rebuild retires the old
        // chain internally, exactly once
        if let Some(swapchain) = self.swapchain.as_mut() {
            swapchain.rebuild(width, height)?;
        }

        self.vertex_buffer = None;
        self.uniform = None;
        self.texture = None;
        self.depth = None;
        self.scheduler = None;

        self.build_resources()?;
        self.prepare()
    }

    pub fn window_size(&self) -> (u32, u32) {
        self.window_size
    }
}

impl Drop for VulkanRenderer {
    fn drop(&mut self) {
        unsafe {
            self.context.device.device_wait_idle().ok();

            // Components first, in dependency order
            self.scheduler = None;
            self.pipeline = None;
            self.descriptors = None;
            self.shaders = None;
            self.texture = None;
            self.uniform = None;
            self.vertex_buffer = None;
            for framebuffer in self.framebuffers.drain(..) {
                self.context.device.destroy_framebuffer(framebuffer, None);
            }
            if self.render_pass != vk::RenderPass::null() {
                self.context.device.destroy_render_pass(self.render_pass, None);
            }
            self.depth = None;
            // Swapchain drop also destroys the surface
            self.swapchain = None;

            self.context
                .device
                .destroy_command_pool(self.context.upload_command_pool, None);
            self.context.device.destroy_device(None);

            #[cfg(feature = "vulkan-validation")]
            if let Some((loader, messenger)) = self.debug_utils.take() {
                loader.destroy_debug_utils_messenger(messenger, None);
            }

            self.instance.destroy_instance(None);
        }
    }
}

/// The 36 vertices of a unit cube, one quad per face, textured 0..1.
fn cube_vertices() -> [Vertex; 36] {
    const P: f32 = 1.0;
    const N: f32 = -1.0;

    fn v(x: f32, y: f32, z: f32, u: f32, t: f32) -> Vertex {
        Vertex {
            pos: [x, y, z, 1.0],
            uv: [u, t],
        }
    }

    [
        // Front (+z)
        v(N, N, P, 0.0, 0.0), v(P, N, P, 1.0, 0.0), v(P, P, P, 1.0, 1.0),
        v(N, N, P, 0.0, 0.0), v(P, P, P, 1.0, 1.0), v(N, P, P, 0.0, 1.0),
        // Back (-z)
        v(P, N, N, 0.0, 0.0), v(N, N, N, 1.0, 0.0), v(N, P, N, 1.0, 1.0),
        v(P, N, N, 0.0, 0.0), v(N, P, N, 1.0, 1.0), v(P, P, N, 0.0, 1.0),
        // Left (-x)
        v(N, N, N, 0.0, 0.0), v(N, N, P, 1.0, 0.0), v(N, P, P, 1.0, 1.0),
        v(N, N, N, 0.0, 0.0), v(N, P, P, 1.0, 1.0), v(N, P, N, 0.0, 1.0),
        // Right (+x)
        v(P, N, P, 0.0, 0.0), v(P, N, N, 1.0, 0.0), v(P, P, N, 1.0, 1.0),
        v(P, N, P, 0.0, 0.0), v(P, P, N, 1.0, 1.0), v(P, P, P, 0.0, 1.0),
        // Top (+y)
        v(N, P, P, 0.0, 0.0), v(P, P, P, 1.0, 0.0), v(P, P, N, 1.0, 1.0),
        v(N, P, P, 0.0, 0.0), v(P, P, N, 1.0, 1.0), v(N, P, N, 0.0, 1.0),
        // Bottom (-y)
        v(N, N, N, 0.0, 0.0), v(P, N, N, 1.0, 0.0), v(P, N, P, 1.0, 1.0),
        v(N, N, N, 0.0, 0.0), v(P, N, P, 1.0, 1.0), v(N, N, P, 0.0, 1.0),
    ]
}
