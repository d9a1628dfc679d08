//! Unit tests for the logging system
//!
//! These tests swap the global logger, so they run serially.

use crate::log::{self, LogEntry, Logger, LogSeverity};
use serial_test::serial;
use std::sync::{Arc, Mutex};

/// Logger that records every entry for inspection
struct CaptureLogger {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl Logger for CaptureLogger {
    fn log(&self, entry: &LogEntry) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.push(entry.clone());
        }
    }
}

fn install_capture() -> Arc<Mutex<Vec<LogEntry>>> {
    let entries = Arc::new(Mutex::new(Vec::new()));
    log::set_logger(CaptureLogger {
        entries: entries.clone(),
    });
    entries
}

// ============================================================================
// SEVERITY TESTS
// ============================================================================

#[test]
fn test_severity_ordering() {
    assert!(LogSeverity::Trace < LogSeverity::Debug);
    assert!(LogSeverity::Debug < LogSeverity::Info);
    assert!(LogSeverity::Info < LogSeverity::Warn);
    assert!(LogSeverity::Warn < LogSeverity::Error);
}

// ============================================================================
// MACRO DISPATCH TESTS
// ============================================================================

#[test]
#[serial]
fn test_info_macro_dispatches_entry() {
    let entries = install_capture();

    crate::viewer_info!("viewer::Test", "swapchain has {} images", 3);

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Info);
    assert_eq!(entries[0].source, "viewer::Test");
    assert_eq!(entries[0].message, "swapchain has 3 images");
    assert!(entries[0].file.is_none());
    assert!(entries[0].line.is_none());

    drop(entries);
    log::reset_logger();
}

#[test]
#[serial]
fn test_error_macro_carries_file_and_line() {
    let entries = install_capture();

    crate::viewer_error!("viewer::Test", "acquire failed");

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Error);
    assert!(entries[0].file.is_some());
    assert!(entries[0].line.is_some());

    drop(entries);
    log::reset_logger();
}

#[test]
#[serial]
fn test_err_macro_logs_and_returns_error() {
    let entries = install_capture();

    let error = crate::viewer_err!("viewer::Test", "present failed: {}", "OUT_OF_DATE");
    assert_eq!(error.to_string(), "Backend error: present failed: OUT_OF_DATE");

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].severity, LogSeverity::Error);
    assert_eq!(entries[0].message, "present failed: OUT_OF_DATE");

    drop(entries);
    log::reset_logger();
}

#[test]
#[serial]
fn test_bail_macro_early_returns() {
    fn failing() -> crate::Result<()> {
        crate::viewer_bail!("viewer::Test", "nothing to render");
    }

    let entries = install_capture();
    let result = failing();
    assert!(result.is_err());

    let entries = entries.lock().unwrap();
    assert_eq!(entries.len(), 1);

    drop(entries);
    log::reset_logger();
}

#[test]
#[serial]
fn test_reset_logger_restores_default() {
    let entries = install_capture();
    log::reset_logger();

    // The capture logger is gone; nothing should be recorded
    crate::viewer_info!("viewer::Test", "after reset");
    assert!(entries.lock().unwrap().is_empty());
}
