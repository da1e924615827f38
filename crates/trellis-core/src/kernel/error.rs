//! # Trellis Kernel Errors
//!
//! Defines error types specific to the Trellis Kernel.
//!
//! This module includes [`Error`], the primary enum encompassing the
//! configuration and injection failures that can occur while registering,
//! constructing or starting components. Absence of a component is never an
//! error: resolution methods return `Ok(None)` for it.
use std::result::Result as StdResult;

use thiserror::Error as ThisError;

use crate::config::error::ConfigError;

/// Error type for kernel registration, resolution and lifecycle operations
#[derive(Debug, ThisError)]
pub enum Error {
    /// The implementation type does not declare exactly one constructor.
    #[error("Cannot create component '{id}': type '{type_name}' declares {count} constructors, expected exactly one")]
    ConstructorSelection {
        id: String,
        type_name: String,
        count: usize,
    },

    /// A required argument was empty.
    #[error("Invalid argument '{name}': value must not be empty")]
    InvalidArgument { name: String },

    /// A constructor required a service that no scope could provide.
    #[error("Component '{id}' requires service '{service}', which is not registered")]
    MissingDependency { id: String, service: String },

    /// Assigning a resolved dependency to a component failed.
    #[error("Failed to inject service '{service}' into '{type_name}'")]
    Injection {
        service: String,
        type_name: String,
        #[source]
        source: Box<Error>,
    },

    /// A constructor reported a failure of its own.
    #[error("Constructor of component '{id}' (type '{type_name}') failed")]
    Construction {
        id: String,
        type_name: String,
        #[source]
        source: Box<Error>,
    },

    /// A write-once value was assigned a second time.
    #[error("Write-once value '{name}' has already been set")]
    WriteOnceViolated { name: String },

    /// A lifecycle hook returned an error.
    #[error("Lifecycle hook {phase} failed for component '{component}'")]
    Lifecycle {
        phase: LifecyclePhase,
        component: String,
        #[source]
        source: Box<Error>,
    },

    /// A catalog key has no registered implementation type.
    #[error("Unknown component type '{key}'")]
    UnknownType { key: String },

    /// A catalog key was registered twice.
    #[error("Component type '{key}' is already registered")]
    DuplicateType { key: String },

    /// Loading or parsing a configuration document failed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Generic error with message
    #[error("Error: {0}")]
    Other(String),
}

impl Error {
    /// Returns true for errors caused by how components were declared, as
    /// opposed to failures raised by component code itself.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::ConstructorSelection { .. }
                | Error::InvalidArgument { .. }
                | Error::MissingDependency { .. }
                | Error::WriteOnceViolated { .. }
                | Error::UnknownType { .. }
                | Error::DuplicateType { .. }
        )
    }

    pub(crate) fn invalid_argument(name: impl Into<String>) -> Self {
        Error::InvalidArgument { name: name.into() }
    }
}

/// The lifecycle notification that was being delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ThisError)]
pub enum LifecyclePhase {
    #[error("Start")]
    Start,
    #[error("Stop")]
    Stop,
}

/// Shorthand for Result with our Error type
pub type Result<T> = StdResult<T, Error>;

impl From<&str> for Error {
    fn from(msg: &str) -> Self {
        Error::Other(msg.to_string())
    }
}

impl From<String> for Error {
    fn from(msg: String) -> Self {
        Error::Other(msg)
    }
}
