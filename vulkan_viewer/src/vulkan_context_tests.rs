//! Unit tests for memory-type classification
//!
//! The scan is pure over a memory-properties snapshot, so it is exercised
//! with synthetic tables (no GPU required).

use crate::vulkan_context::classify_memory_type;
use ash::vk;

/// Build a properties snapshot exposing the given property flags at
/// indices 0..n
fn properties_with(flags: &[vk::MemoryPropertyFlags]) -> vk::PhysicalDeviceMemoryProperties {
    let mut properties = vk::PhysicalDeviceMemoryProperties::default();
    properties.memory_type_count = flags.len() as u32;
    for (i, &property_flags) in flags.iter().enumerate() {
        properties.memory_types[i] = vk::MemoryType {
            property_flags,
            heap_index: 0,
        };
    }
    properties
}

const A: vk::MemoryPropertyFlags = vk::MemoryPropertyFlags::DEVICE_LOCAL;
const B: vk::MemoryPropertyFlags = vk::MemoryPropertyFlags::HOST_VISIBLE;

// ============================================================================
// CLASSIFICATION TESTS
// ============================================================================

#[test]
fn test_first_matching_index_wins() {
    // Device exposes [A, A|B, B, none]; mask allows indices 1 and 2
    let properties = properties_with(&[A, A | B, B, vk::MemoryPropertyFlags::empty()]);
    assert_eq!(classify_memory_type(&properties, 0b0110, A | B), Some(1));
}

#[test]
fn test_mask_excludes_earlier_candidates() {
    let properties = properties_with(&[A, A | B, B, vk::MemoryPropertyFlags::empty()]);
    // Only index 2 is allowed by the mask
    assert_eq!(classify_memory_type(&properties, 0b0100, B), Some(2));
}

#[test]
fn test_unmatchable_combination_is_not_found() {
    let properties = properties_with(&[A, A | B, B, vk::MemoryPropertyFlags::empty()]);
    // Index 3 has no flags at all
    assert_eq!(classify_memory_type(&properties, 0b1000, A), None);
}

#[test]
fn test_empty_mask_is_not_found() {
    let properties = properties_with(&[A, B]);
    assert_eq!(classify_memory_type(&properties, 0, A), None);
}

#[test]
fn test_required_subset_of_type_flags_matches() {
    // A type carrying more flags than required still satisfies the request
    let properties = properties_with(&[A | B]);
    assert_eq!(classify_memory_type(&properties, 0b0001, B), Some(0));
}

#[test]
fn test_no_required_flags_takes_first_allowed() {
    let properties = properties_with(&[A, B]);
    assert_eq!(
        classify_memory_type(&properties, 0b0010, vk::MemoryPropertyFlags::empty()),
        Some(1)
    );
}

#[test]
fn test_indices_beyond_type_count_are_skipped() {
    let properties = properties_with(&[A]);
    // Bit 5 is set but the device only reports one type
    assert_eq!(classify_memory_type(&properties, 0b100000, A), None);
}
