/*!
# Vulkan Viewer

A tutorial-grade Vulkan renderer built on the Ash bindings.

The crate brings up a GPU context, negotiates a presentation swapchain with
the platform, uploads vertex/uniform/texture data, builds a fixed graphics
pipeline, and drives a per-frame acquire/submit/present cycle for a single
rotating textured cube in a winit window.

## Architecture

- **GpuContext**: shared device/queue state plus memory-type selection
- **Swapchain**: surface ownership, format/present-mode/extent negotiation,
  presentable image views, rebuild with old-swapchain retirement
- **FrameScheduler**: semaphore-ordered acquire → submit → present cycle
- **VulkanRenderer**: top-level owner of every GPU object, including the
  guarded teardown/rebuild path that reacts to window resizes

Frame staleness (out-of-date or suboptimal surfaces) is reported through
dedicated status enums rather than errors, so the caller can rebuild and
skip a frame instead of unwinding.
*/

// Core modules
mod error;
pub mod log;

// Vulkan implementation modules
mod vulkan_barrier;
mod vulkan_buffer;
mod vulkan_context;
mod vulkan_descriptor;
mod vulkan_frame;
mod vulkan_pipeline;
mod vulkan_renderer;
mod vulkan_shader;
mod vulkan_swapchain;
mod vulkan_texture;

#[cfg(feature = "vulkan-validation")]
mod debug;

pub use error::{Error, Result};

#[cfg(feature = "vulkan-validation")]
pub use debug::{DebugConfig, DebugOutput, DebugSeverity};

pub use vulkan_barrier::{set_image_layout, transition_masks, TrackedImage};
pub use vulkan_buffer::{DeviceBuffer, UniformBuffer};
pub use vulkan_context::GpuContext;
pub use vulkan_descriptor::{CubeBinding, DescriptorBinding};
pub use vulkan_frame::{FrameScheduler, FrameStatus, FrameSyncPair};
pub use vulkan_pipeline::{Pipeline, Vertex};
pub use vulkan_renderer::{RendererConfig, VulkanRenderer};
pub use vulkan_shader::ShaderPair;
pub use vulkan_swapchain::{
    choose_extent, choose_image_count, choose_present_mode, choose_pre_transform,
    choose_surface_format, AcquireOutcome, PresentOutcome, Swapchain, SwapchainConfig,
};
pub use vulkan_texture::{checkerboard_rgba8, DepthBuffer, Texture};

// Re-export math library at crate root
pub use glam;

// Unit test modules (kept next to the code they exercise)
#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod log_tests;
#[cfg(test)]
mod vulkan_barrier_tests;
#[cfg(test)]
mod vulkan_context_tests;
#[cfg(test)]
mod vulkan_frame_tests;
#[cfg(test)]
mod vulkan_renderer_tests;
#[cfg(test)]
mod vulkan_swapchain_tests;
#[cfg(test)]
mod vulkan_texture_tests;
