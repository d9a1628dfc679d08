//! Integration tests for swapchain configuration derivation
//!
//! Exercises `SwapchainConfig::derive` end to end against synthetic
//! capability snapshots, the way `Swapchain::rebuild` calls it.

use ash::vk;
use vulkan_viewer::SwapchainConfig;

fn desktop_capabilities() -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: 2,
        max_image_count: 8,
        current_extent: vk::Extent2D {
            width: 1280,
            height: 720,
        },
        min_image_extent: vk::Extent2D {
            width: 1,
            height: 1,
        },
        max_image_extent: vk::Extent2D {
            width: 4096,
            height: 4096,
        },
        supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY,
        current_transform: vk::SurfaceTransformFlagsKHR::IDENTITY,
        ..Default::default()
    }
}

#[test]
fn test_derive_typical_desktop_surface() {
    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_SRGB,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    let present_modes = [
        vk::PresentModeKHR::FIFO,
        vk::PresentModeKHR::MAILBOX,
        vk::PresentModeKHR::IMMEDIATE,
    ];

    let config =
        SwapchainConfig::derive(&desktop_capabilities(), &formats, &present_modes, 1280, 720)
            .unwrap();

    assert_eq!(config.format.format, vk::Format::B8G8R8A8_SRGB);
    assert_eq!(config.present_mode, vk::PresentModeKHR::MAILBOX);
    assert_eq!(config.image_count, 3);
    assert_eq!(config.extent.width, 1280);
    assert_eq!(config.extent.height, 720);
    assert_eq!(config.pre_transform, vk::SurfaceTransformFlagsKHR::IDENTITY);
}

#[test]
fn test_derive_no_preference_format_surface() {
    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::UNDEFINED,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    let present_modes = [vk::PresentModeKHR::FIFO];

    let config =
        SwapchainConfig::derive(&desktop_capabilities(), &formats, &present_modes, 1280, 720)
            .unwrap();

    assert_eq!(config.format.format, vk::Format::B8G8R8A8_UNORM);
    assert_eq!(config.format.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
    assert_eq!(config.present_mode, vk::PresentModeKHR::FIFO);
}

#[test]
fn test_derive_wayland_style_sentinel_extent() {
    let mut capabilities = desktop_capabilities();
    capabilities.current_extent = vk::Extent2D {
        width: u32::MAX,
        height: u32::MAX,
    };

    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    let present_modes = [vk::PresentModeKHR::FIFO];

    // The window size flows through, clamped into the supported bounds
    let config =
        SwapchainConfig::derive(&capabilities, &formats, &present_modes, 8000, 100).unwrap();
    assert_eq!(config.extent.width, 4096);
    assert_eq!(config.extent.height, 100);
}

#[test]
fn test_derive_fails_without_formats() {
    let present_modes = [vk::PresentModeKHR::FIFO];
    let result = SwapchainConfig::derive(&desktop_capabilities(), &[], &present_modes, 1280, 720);
    assert!(result.is_err());
}

#[test]
fn test_derive_tight_image_count_bound() {
    let mut capabilities = desktop_capabilities();
    capabilities.min_image_count = 3;
    capabilities.max_image_count = 3;

    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::B8G8R8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    let present_modes = [vk::PresentModeKHR::FIFO];

    let config =
        SwapchainConfig::derive(&capabilities, &formats, &present_modes, 1280, 720).unwrap();
    assert_eq!(config.image_count, 3);
}
