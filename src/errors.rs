//! Error handling for the access engine
//!
//! Errors only surface while loading and validating tables or parsing
//! names supplied by callers. Resolving permissions for a user never fails.

use thiserror::Error;

/// Main error type for the access engine
#[derive(Error, Debug)]
pub enum AccessError {
    #[error("Schema violation in {context}: unknown capability {area}.{key}")]
    SchemaViolation {
        context: String,
        area: String,
        key: String,
    },

    #[error("Unknown feature area: {area}")]
    UnknownFeatureArea { area: String },

    #[error("Unknown legacy check: {name}")]
    UnknownLegacyCheck { name: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O operation failed: {operation}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {context}")]
    Serialization {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Type alias for Result with AccessError
pub type AccessResult<T> = Result<T, AccessError>;

impl AccessError {
    /// Create a schema violation error
    pub fn schema_violation(
        context: impl Into<String>,
        area: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::SchemaViolation {
            context: context.into(),
            area: area.into(),
            key: key.into(),
        }
    }

    /// Create an unknown feature area error
    pub fn unknown_area(area: impl Into<String>) -> Self {
        Self::UnknownFeatureArea { area: area.into() }
    }

    /// Create an unknown legacy check error
    pub fn unknown_legacy_check(name: impl Into<String>) -> Self {
        Self::UnknownLegacyCheck { name: name.into() }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(operation: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            operation: operation.into(),
            source,
        }
    }

    /// Create a serialization error
    pub fn serialization(context: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Serialization {
            context: context.into(),
            source,
        }
    }
}

impl From<figment::Error> for AccessError {
    fn from(err: figment::Error) -> Self {
        AccessError::config(err.to_string())
    }
}

impl From<serde_json::Error> for AccessError {
    fn from(err: serde_json::Error) -> Self {
        AccessError::serialization("json_operation", err)
    }
}

impl From<std::io::Error> for AccessError {
    fn from(err: std::io::Error) -> Self {
        AccessError::io("io_operation", err)
    }
}
