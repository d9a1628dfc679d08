//! Unit tests for swapchain configuration choosers
//!
//! All choosers are pure over capability snapshots and reported lists, so
//! they run against synthetic data without a GPU.

use crate::vulkan_swapchain::{
    choose_extent, choose_image_count, choose_present_mode, choose_pre_transform,
    choose_surface_format,
};
use ash::vk;

fn capabilities(min_images: u32, max_images: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
        min_image_count: min_images,
        max_image_count: max_images,
        current_extent: vk::Extent2D {
            width: 800,
            height: 600,
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

// ============================================================================
// IMAGE COUNT TESTS
// ============================================================================

#[test]
fn test_image_count_min_plus_one_clamped_to_max() {
    // min=2, max=3: desired 3 stays within the bound
    assert_eq!(choose_image_count(&capabilities(2, 3)), 3);
}

#[test]
fn test_image_count_clamped_when_max_equals_min() {
    assert_eq!(choose_image_count(&capabilities(2, 2)), 2);
}

#[test]
fn test_image_count_unbounded_when_max_is_zero() {
    // max of 0 means the platform imposes no upper bound
    assert_eq!(choose_image_count(&capabilities(4, 0)), 5);
}

// ============================================================================
// SURFACE FORMAT TESTS
// ============================================================================

#[test]
fn test_format_fallback_on_single_undefined_entry() {
    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::UNDEFINED,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
    assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
}

#[test]
fn test_format_first_entry_taken_verbatim() {
    let formats = [
        vk::SurfaceFormatKHR {
            format: vk::Format::R8G8B8A8_SRGB,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
        vk::SurfaceFormatKHR {
            format: vk::Format::B8G8R8A8_UNORM,
            color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
        },
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::R8G8B8A8_SRGB);
}

#[test]
fn test_format_single_defined_entry_is_kept() {
    let formats = [vk::SurfaceFormatKHR {
        format: vk::Format::R8G8B8A8_UNORM,
        color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
    }];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::R8G8B8A8_UNORM);
}

#[test]
fn test_format_empty_list_is_an_error() {
    assert!(choose_surface_format(&[]).is_err());
}

// ============================================================================
// PRESENT MODE TESTS
// ============================================================================

#[test]
fn test_present_mode_mailbox_preferred() {
    let modes = [
        vk::PresentModeKHR::FIFO,
        vk::PresentModeKHR::IMMEDIATE,
        vk::PresentModeKHR::MAILBOX,
    ];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
}

#[test]
fn test_present_mode_mailbox_preferred_regardless_of_order() {
    let modes = [
        vk::PresentModeKHR::MAILBOX,
        vk::PresentModeKHR::FIFO,
        vk::PresentModeKHR::IMMEDIATE,
    ];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::MAILBOX);
}

#[test]
fn test_present_mode_immediate_over_fifo() {
    let modes = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::IMMEDIATE);
}

#[test]
fn test_present_mode_fifo_fallback() {
    let modes = [vk::PresentModeKHR::FIFO];
    assert_eq!(choose_present_mode(&modes), vk::PresentModeKHR::FIFO);
}

// ============================================================================
// EXTENT TESTS
// ============================================================================

#[test]
fn test_extent_uses_platform_current_extent() {
    let caps = capabilities(2, 3);
    let extent = choose_extent(&caps, 1024, 768);
    assert_eq!(extent.width, 800);
    assert_eq!(extent.height, 600);
}

#[test]
fn test_extent_clamps_window_size_on_sentinel() {
    let mut caps = capabilities(2, 3);
    caps.current_extent = vk::Extent2D {
        width: u32::MAX,
        height: u32::MAX,
    };
    caps.max_image_extent = vk::Extent2D {
        width: 1920,
        height: 1080,
    };

    let extent = choose_extent(&caps, 2560, 1440);
    assert_eq!(extent.width, 1920);
    assert_eq!(extent.height, 1080);

    let extent = choose_extent(&caps, 0, 0);
    assert_eq!(extent.width, 1);
    assert_eq!(extent.height, 1);
}

// ============================================================================
// PRE-TRANSFORM TESTS
// ============================================================================

#[test]
fn test_pre_transform_identity_when_supported() {
    let mut caps = capabilities(2, 3);
    caps.supported_transforms =
        vk::SurfaceTransformFlagsKHR::IDENTITY | vk::SurfaceTransformFlagsKHR::ROTATE_90;
    caps.current_transform = vk::SurfaceTransformFlagsKHR::ROTATE_90;
    assert_eq!(
        choose_pre_transform(&caps),
        vk::SurfaceTransformFlagsKHR::IDENTITY
    );
}

#[test]
fn test_pre_transform_falls_back_to_current() {
    let mut caps = capabilities(2, 3);
    caps.supported_transforms = vk::SurfaceTransformFlagsKHR::ROTATE_90;
    caps.current_transform = vk::SurfaceTransformFlagsKHR::ROTATE_90;
    assert_eq!(
        choose_pre_transform(&caps),
        vk::SurfaceTransformFlagsKHR::ROTATE_90
    );
}
