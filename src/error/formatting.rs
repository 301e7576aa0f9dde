//! Error formatting utilities
//!
//! Flattens error cause chains into a single line for the CLI and logs.

use crate::Error;
use std::error::Error as StdError;

/// Format error for display
///
/// Walks the `source()` chain and appends every cause not already contained
/// in the message.
pub fn format_error(error: &Error) -> String {
    let formatted = match error {
        Error::InvalidDatapointDescriptor {
            index,
            name: Some(name),
            message,
        } => format!("Invalid datapoint descriptor #{} ({}): {}", index, name, message),

        Error::MalformedEnvironmentValue {
            var,
            value,
            message,
        } => format!("Malformed value for {} (value: '{}'): {}", var, value, message),

        _ => error.to_string(),
    };

    let mut result = formatted;
    let mut source = error.source();

    while let Some(cause) = source {
        if !result.contains(&cause.to_string()) {
            result = format!("{} (caused by {})", result, cause);
        }
        source = cause.source();
    }

    result
}

/// Format error for logging with structured data
pub fn format_error_for_logging(error: &Error) -> serde_json::Value {
    let mut log_data = serde_json::json!({
        "message": format_error(error),
        "category": error.category(),
    });

    match error {
        Error::MalformedEnvironmentValue { var, .. } => {
            log_data["variable"] = serde_json::Value::String(var.clone());
        }
        Error::InvalidDatapointDescriptor { index, .. } => {
            log_data["index"] = serde_json::Value::Number((*index).into());
        }
        Error::Config { field, .. } => {
            log_data["field"] = serde_json::Value::String(field.clone());
        }
        _ => {}
    }

    log_data
}
