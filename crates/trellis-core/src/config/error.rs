//! # Trellis Configuration Errors
//!
//! Defines [`ConfigError`], raised while reading, parsing or rendering
//! configuration documents. Problems with the components a document
//! describes (unknown types, bad lifestyles) are kernel errors instead.
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error during operation '{operation}' on path '{path}': {source}")]
    Io {
        path: PathBuf,
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported configuration format for path: {0}")]
    UnsupportedFormat(PathBuf),

    #[error("Serialization to '{format}' failed: {source}")]
    Serialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[error("Deserialization from '{format}' failed: {source}")]
    Deserialization {
        format: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl ConfigError {
    pub(crate) fn serialization(
        format: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::Serialization {
            format: format.to_string(),
            source: Box::new(source),
        }
    }

    pub(crate) fn deserialization(
        format: &str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ConfigError::Deserialization {
            format: format.to_string(),
            source: Box::new(source),
        }
    }
}
