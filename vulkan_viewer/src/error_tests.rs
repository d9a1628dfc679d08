//! Unit tests for error formatting

use crate::error::Error;

// ============================================================================
// DISPLAY FORMATTING TESTS
// ============================================================================

#[test]
fn test_initialization_failed_display() {
    let error = Error::InitializationFailed("No Vulkan driver".to_string());
    assert_eq!(error.to_string(), "Initialization failed: No Vulkan driver");
}

#[test]
fn test_backend_error_display() {
    let error = Error::BackendError("VK_ERROR_DEVICE_LOST".to_string());
    assert_eq!(error.to_string(), "Backend error: VK_ERROR_DEVICE_LOST");
}

#[test]
fn test_no_compatible_memory_type_display() {
    let error = Error::NoCompatibleMemoryType;
    assert_eq!(error.to_string(), "No compatible memory type on this device");
}

#[test]
fn test_invalid_resource_display() {
    let error = Error::InvalidResource("image index 7 out of range".to_string());
    assert_eq!(
        error.to_string(),
        "Invalid resource: image index 7 out of range"
    );
}

#[test]
fn test_error_is_std_error() {
    fn assert_std_error<E: std::error::Error>(_e: &E) {}
    assert_std_error(&Error::NoCompatibleMemoryType);
}

#[test]
fn test_error_is_cloneable() {
    let error = Error::BackendError("transient".to_string());
    let cloned = error.clone();
    assert_eq!(error.to_string(), cloned.to_string());
}
