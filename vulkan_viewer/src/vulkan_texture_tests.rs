//! Unit tests for texture pixel-data helpers

use crate::vulkan_texture::{checkerboard_rgba8, rgba8_byte_len};

// ============================================================================
// PIXEL LENGTH TESTS
// ============================================================================

#[test]
fn test_rgba8_byte_len_small() {
    assert_eq!(rgba8_byte_len(256, 256), 256 * 256 * 4);
    assert_eq!(rgba8_byte_len(1, 1), 4);
    assert_eq!(rgba8_byte_len(0, 256), 0);
}

#[test]
#[cfg(target_pointer_width = "64")]
fn test_rgba8_byte_len_large_dimensions_do_not_overflow() {
    // 65536 x 65536 x 4 exceeds u32; the usize math must stay exact
    assert_eq!(rgba8_byte_len(65_536, 65_536), 17_179_869_184usize);
    assert_eq!(rgba8_byte_len(u32::MAX, 1), u32::MAX as usize * 4);
}

// ============================================================================
// CHECKERBOARD TESTS
// ============================================================================

#[test]
fn test_checkerboard_length_matches_dimensions() {
    let pixels = checkerboard_rgba8(64, 32, 8);
    assert_eq!(pixels.len(), rgba8_byte_len(64, 32));
}

#[test]
fn test_checkerboard_alternates_per_cell() {
    let pixels = checkerboard_rgba8(16, 16, 8);

    // (0,0) and (8,0) sit in adjacent cells
    let first = &pixels[0..4];
    let across = &pixels[8 * 4..8 * 4 + 4];
    assert_ne!(first, across);

    // (0,0) and (8,8) are diagonal cells, same color
    let diagonal_offset = (8 * 16 + 8) * 4;
    let diagonal = &pixels[diagonal_offset..diagonal_offset + 4];
    assert_eq!(first, diagonal);
}

#[test]
fn test_checkerboard_is_opaque() {
    let pixels = checkerboard_rgba8(8, 8, 4);
    assert!(pixels.chunks_exact(4).all(|px| px[3] == 255));
}
