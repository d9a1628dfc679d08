//! Unit tests for the resize re-entry guard

use crate::vulkan_renderer::ResizeGuard;

// ============================================================================
// RESIZE GUARD TESTS
// ============================================================================

#[test]
fn test_begin_refused_before_first_prepare() {
    let mut guard = ResizeGuard::default();
    assert!(!guard.begin());
    assert!(!guard.is_resizing());
}

#[test]
fn test_begin_allowed_once_prepared() {
    let mut guard = ResizeGuard::default();
    guard.mark_prepared();
    assert!(guard.begin());
    assert!(guard.is_resizing());
}

#[test]
fn test_duplicate_begin_absorbed_while_resizing() {
    let mut guard = ResizeGuard::default();
    guard.mark_prepared();
    assert!(guard.begin());

    // A second resize event arriving mid-teardown must not start another
    assert!(!guard.begin());
    assert!(guard.is_resizing());
}

#[test]
fn test_begin_refused_after_end_until_reprepared() {
    let mut guard = ResizeGuard::default();
    guard.mark_prepared();
    assert!(guard.begin());
    guard.end();

    // end() alone does not re-arm the guard; the rebuild must complete
    assert!(!guard.begin());
}

#[test]
fn test_full_resize_cycle_allows_next_resize() {
    let mut guard = ResizeGuard::default();
    guard.mark_prepared();

    assert!(guard.begin());
    guard.mark_prepared();
    guard.end();

    assert!(guard.begin());
    assert!(guard.is_resizing());
}
