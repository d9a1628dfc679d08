//! Unit tests for layout transition access masks
//!
//! `transition_masks` is a pure table over layout pairs, so every
//! documented pair is checked against synthetic inputs.

use crate::vulkan_barrier::{transition_masks, TrackedImage};
use ash::vk;

// ============================================================================
// SOURCE ACCESS TESTS
// ============================================================================

#[test]
fn test_undefined_source_waits_on_nothing() {
    let (src, _) = transition_masks(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );
    assert_eq!(src, vk::AccessFlags::empty());
}

#[test]
fn test_preinitialized_source_waits_on_host_writes() {
    let (src, _) = transition_masks(
        vk::ImageLayout::PREINITIALIZED,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );
    assert_eq!(src, vk::AccessFlags::HOST_WRITE);
}

#[test]
fn test_transfer_dst_source_waits_on_transfer_writes() {
    let (src, _) = transition_masks(
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    );
    assert_eq!(src, vk::AccessFlags::TRANSFER_WRITE);
}

#[test]
fn test_color_attachment_source_waits_on_attachment_writes() {
    let (src, _) = transition_masks(
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );
    assert_eq!(src, vk::AccessFlags::COLOR_ATTACHMENT_WRITE);
}

#[test]
fn test_unlisted_source_is_treated_as_visible() {
    let (src, _) = transition_masks(
        vk::ImageLayout::GENERAL,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );
    assert_eq!(src, vk::AccessFlags::empty());
}

// ============================================================================
// DESTINATION ACCESS TESTS
// ============================================================================

#[test]
fn test_transfer_dst_destination() {
    let (_, dst) = transition_masks(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );
    assert_eq!(dst, vk::AccessFlags::TRANSFER_WRITE);
}

#[test]
fn test_present_src_destination() {
    let (_, dst) = transition_masks(
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        vk::ImageLayout::PRESENT_SRC_KHR,
    );
    assert_eq!(dst, vk::AccessFlags::TRANSFER_WRITE);
}

#[test]
fn test_shader_read_only_destination_forces_transfer_source() {
    // A texture becomes samplable only after the staging copy completes,
    // so the source access is forced regardless of the declared old layout
    let (src, dst) = transition_masks(
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    );
    assert_eq!(src, vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(dst, vk::AccessFlags::SHADER_READ);

    let (src, dst) = transition_masks(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    );
    assert_eq!(src, vk::AccessFlags::TRANSFER_WRITE);
    assert_eq!(dst, vk::AccessFlags::SHADER_READ);
}

#[test]
fn test_color_attachment_destination() {
    let (_, dst) = transition_masks(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    );
    assert_eq!(dst, vk::AccessFlags::COLOR_ATTACHMENT_READ);
}

#[test]
fn test_depth_stencil_destination() {
    let (_, dst) = transition_masks(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
    );
    assert_eq!(dst, vk::AccessFlags::DEPTH_STENCIL_ATTACHMENT_WRITE);
}

#[test]
fn test_unlisted_destination_gets_no_access() {
    let (_, dst) = transition_masks(vk::ImageLayout::UNDEFINED, vk::ImageLayout::GENERAL);
    assert_eq!(dst, vk::AccessFlags::empty());
}

// ============================================================================
// TABLE STABILITY TESTS
// ============================================================================

#[test]
fn test_masks_are_deterministic() {
    // Same pair, same masks, every time
    let first = transition_masks(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
    );
    let second = transition_masks(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
    );
    assert_eq!(first, second);
}

// ============================================================================
// TRACKED IMAGE TESTS
// ============================================================================

#[test]
fn test_tracked_image_starts_undefined() {
    let tracked = TrackedImage::new(vk::Image::null());
    assert_eq!(tracked.layout(), vk::ImageLayout::UNDEFINED);
    assert_eq!(tracked.image(), vk::Image::null());
}

#[test]
fn test_tag_follows_transitions() {
    let mut tracked = TrackedImage::new(vk::Image::null());

    tracked.apply_transition(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );
    assert_eq!(tracked.layout(), vk::ImageLayout::TRANSFER_DST_OPTIMAL);

    // The established layout is the valid old layout for the next step
    tracked.apply_transition(
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    );
    assert_eq!(tracked.layout(), vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL);
}

#[test]
fn test_undefined_old_layout_always_accepted() {
    let mut tracked = TrackedImage::new(vk::Image::null());
    tracked.apply_transition(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
    );

    // Discarding the contents resets the image regardless of the tag
    tracked.apply_transition(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL,
    );
    assert_eq!(
        tracked.layout(),
        vk::ImageLayout::DEPTH_STENCIL_ATTACHMENT_OPTIMAL
    );
}

#[test]
#[should_panic(expected = "layout transition")]
fn test_stale_old_layout_asserts() {
    let mut tracked = TrackedImage::new(vk::Image::null());
    tracked.apply_transition(
        vk::ImageLayout::UNDEFINED,
        vk::ImageLayout::TRANSFER_DST_OPTIMAL,
    );

    // Claims COLOR_ATTACHMENT_OPTIMAL but the image is in TRANSFER_DST
    tracked.apply_transition(
        vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
        vk::ImageLayout::SHADER_READ_ONLY_OPTIMAL,
    );
}
