//! JSON output helpers for `--json` code paths.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::domain::{CatalogError, ConfigError, RunError, TagError};

/// Pretty-print any report.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn format_report<T: Serialize>(report: &T) -> Result<String> {
    serde_json::to_string_pretty(report).context("JSON serialization failed")
}

/// Format a JSON error object.
///
/// Output (pretty-printed):
/// ```json
/// {
///   "error": true,
///   "message": "...",
///   "code": "..."
/// }
/// ```
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn format_error(message: &str, code: &str) -> Result<String> {
    let obj = serde_json::json!({
        "error": true,
        "message": message,
        "code": code,
    });
    serde_json::to_string_pretty(&obj).context("JSON serialization failed")
}

/// Stable machine-readable code for the error that ended a run.
#[must_use]
pub fn error_code(error: &anyhow::Error) -> &'static str {
    for cause in error.chain() {
        if let Some(run) = cause.downcast_ref::<RunError>() {
            return match run {
                RunError::SubscriptionUnavailable => "SUBSCRIPTION_UNAVAILABLE",
                RunError::StepFailed { .. } => "STEP_FAILED",
                RunError::ManualCleanupRequired { .. } => "MANUAL_CLEANUP_REQUIRED",
            };
        }
        if cause.is::<ConfigError>() || cause.is::<TagError>() {
            return "INVALID_CONFIG";
        }
        if cause.is::<CatalogError>() {
            return "INVALID_CATALOG";
        }
    }
    "COMMAND_FAILED"
}
