//! Error types for capplan.
//!
//! Every model returns `Result<T, ModelError>` instead of panicking.
//! Out-of-domain input is an error; a result that is mathematically
//! unbounded (unstable queue, vanishing tail probability) is NOT an error
//! and is carried by explicit variants in the result types instead.

use thiserror::Error;

/// Result type alias for capplan operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// Unified error type for all capplan operations.
///
/// # Design
///
/// Errors are:
/// 1. Immediately detectable (type-safe)
/// 2. Self-documenting (the offending parameter is named)
/// 3. Isolated: models hold no state, so a rejected query never affects
///    the next call
#[derive(Debug, Error)]
pub enum ModelError {
    // ===== Domain Errors =====
    /// A model parameter is outside its mathematical domain.
    #[error("Invalid parameter '{name}' = {value}: {reason}")]
    InvalidParameter {
        /// Name of the parameter (e.g. `failure_prob`).
        name: &'static str,
        /// The rejected value, rendered for display.
        value: String,
        /// The constraint that was violated.
        reason: String,
    },

    // ===== Configuration Errors =====
    /// Invalid configuration value.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// YAML parsing error.
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    /// Validation error.
    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    // ===== I/O Errors =====
    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ModelError {
    /// Create an invalid-parameter error.
    #[must_use]
    pub fn invalid(
        name: &'static str,
        value: impl std::fmt::Display,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a configuration error with a message.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a serialization error.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Check if this error rejects a model input (as opposed to a config or I/O failure).
    #[must_use]
    pub const fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }

    /// Name of the rejected parameter, if this is an invalid-parameter error.
    #[must_use]
    pub const fn parameter_name(&self) -> Option<&'static str> {
        match self {
            Self::InvalidParameter { name, .. } => Some(*name),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_parameter_detection() {
        let err = ModelError::invalid("arrival_rate", -1.0, "must be positive");
        assert!(err.is_invalid_parameter());
        assert_eq!(err.parameter_name(), Some("arrival_rate"));

        let config = ModelError::config("bad");
        assert!(!config.is_invalid_parameter());
        assert_eq!(config.parameter_name(), None);
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = ModelError::invalid("failure_prob", 1.5, "must lie in [0, 1]");
        let msg = err.to_string();
        assert!(msg.contains("failure_prob"));
        assert!(msg.contains("1.5"));
        assert!(msg.contains("[0, 1]"));
    }

    #[test]
    fn test_error_config() {
        let err = ModelError::config("service_rate must be positive");
        let msg = err.to_string();
        assert!(msg.contains("Configuration error"));
        assert!(msg.contains("service_rate"));
    }

    #[test]
    fn test_error_serialization() {
        let err = ModelError::serialization("failed to serialize");
        assert!(!err.is_invalid_parameter());
        assert!(err.to_string().contains("Serialization error"));
    }

    #[test]
    fn test_error_io_from() {
        let err: ModelError = std::io::Error::other("file not found").into();
        assert!(!err.is_invalid_parameter());
        let msg = err.to_string();
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("file not found"));
    }

    #[test]
    fn test_error_yaml_from() {
        let yaml_err = serde_yaml::from_str::<u64>("not: [a number").unwrap_err();
        let err: ModelError = yaml_err.into();
        assert!(err.to_string().contains("YAML parsing error"));
    }

    #[test]
    fn test_error_debug() {
        let err = ModelError::config("test");
        let debug = format!("{err:?}");
        assert!(debug.contains("Config"));
    }
}
