//! Error types for configuration loading
//!
//! Every failure surfaces at startup. Nothing in this crate falls back to a
//! default once a value has been supplied and failed to parse.

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    /// An environment variable holds a value that does not parse as its expected type
    #[error("Malformed value for {var}: {message}")]
    MalformedEnvironmentValue {
        /// Name of the environment variable
        var: String,
        /// The raw value as found in the environment (lossy for non-UTF-8 content)
        value: String,
        /// What went wrong while parsing
        message: String,
    },

    /// A polling list entry is structurally invalid
    #[error("Invalid datapoint descriptor #{index}: {message}")]
    InvalidDatapointDescriptor {
        /// Position of the entry in the polling list
        index: usize,
        /// Datapoint name when it could be read
        name: Option<String>,
        /// Description of the violation
        message: String,
    },

    /// Configuration errors outside of the environment layer (file values, format specs)
    #[error("Configuration error in {field}: {message}")]
    Config {
        /// The configuration field that has an error
        field: String,
        /// Error message describing the issue
        message: String,
    },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML configuration parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML rendering errors
    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a malformed environment value error
    pub fn malformed_env(
        var: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::MalformedEnvironmentValue {
            var: var.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    /// Create an invalid datapoint descriptor error
    pub fn invalid_datapoint(index: usize, name: Option<&str>, message: impl Into<String>) -> Self {
        Self::InvalidDatapointDescriptor {
            index,
            name: name.map(str::to_string),
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Config {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            Error::MalformedEnvironmentValue { .. } => "environment",
            Error::InvalidDatapointDescriptor { .. } => "datapoint",
            Error::Config { .. } => "config",
            Error::Json(..) => "json",
            Error::Toml(..) | Error::TomlSer(..) => "toml",
            Error::Io(..) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::config("data_hex_format", "not a hex spec");
        assert!(matches!(err, Error::Config { .. }));
        assert_eq!(
            err.to_string(),
            "Configuration error in data_hex_format: not a hex spec"
        );
    }

    #[test]
    fn test_malformed_env_error() {
        let err = Error::malformed_env("VS2_TIMEOUT", "abc", "invalid digit found in string");
        assert_eq!(
            err.to_string(),
            "Malformed value for VS2_TIMEOUT: invalid digit found in string"
        );
        assert_eq!(err.category(), "environment");
    }

    #[test]
    fn test_invalid_datapoint_error() {
        let err = Error::invalid_datapoint(3, Some("KesselTemp"), "length must be positive");
        match &err {
            Error::InvalidDatapointDescriptor { index, name, .. } => {
                assert_eq!(*index, 3);
                assert_eq!(name.as_deref(), Some("KesselTemp"));
            }
            _ => panic!("Expected InvalidDatapointDescriptor"),
        }
        assert!(err.to_string().contains("#3"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());

        let err: Error = json_err.unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
        assert_eq!(err.category(), "json");
    }
}
