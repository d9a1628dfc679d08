//! Unit tests for frame status resolution
//!
//! The acquire/submit/present cycle itself needs a device, but the folding
//! of staleness signals into a frame status is pure and tested here.

use crate::vulkan_frame::{resolve_frame_status, FrameStatus};
use crate::vulkan_swapchain::PresentOutcome;

// ============================================================================
// STATUS RESOLUTION TESTS
// ============================================================================

#[test]
fn test_clean_present_is_presented() {
    assert_eq!(
        resolve_frame_status(false, PresentOutcome::Presented),
        FrameStatus::Presented
    );
}

#[test]
fn test_suboptimal_acquire_schedules_rebuild() {
    // The frame still displayed, but the surface no longer matches
    assert_eq!(
        resolve_frame_status(true, PresentOutcome::Presented),
        FrameStatus::NeedsRebuild
    );
}

#[test]
fn test_suboptimal_present_schedules_rebuild() {
    assert_eq!(
        resolve_frame_status(false, PresentOutcome::Suboptimal),
        FrameStatus::NeedsRebuild
    );
}

#[test]
fn test_out_of_date_present_schedules_rebuild() {
    assert_eq!(
        resolve_frame_status(false, PresentOutcome::OutOfDate),
        FrameStatus::NeedsRebuild
    );
}

#[test]
fn test_both_signals_stale_schedules_rebuild() {
    assert_eq!(
        resolve_frame_status(true, PresentOutcome::OutOfDate),
        FrameStatus::NeedsRebuild
    );
}

// ============================================================================
// INDEX SEQUENCE TESTS
// ============================================================================

/// Validates an acquired-index stream the way `render_frame` does: every
/// index must name an existing command-buffer slot, and indices may repeat
/// or arrive in any order.
fn validate_indices(slot_count: usize, indices: &[u32]) -> bool {
    indices.iter().all(|&i| (i as usize) < slot_count)
}

#[test]
fn test_acquired_indices_may_repeat_and_reorder() {
    // A mailbox-mode platform is free to hand back any live image
    assert!(validate_indices(3, &[0, 2, 1, 1, 0, 2, 2]));
}

#[test]
fn test_acquired_index_out_of_range_is_rejected() {
    assert!(!validate_indices(3, &[0, 1, 3]));
}

#[test]
fn test_empty_sequence_is_valid() {
    assert!(validate_indices(3, &[]));
}
