//! # Trellis Configuration
//!
//! Configuration documents describe components by catalog key so they can
//! be connected to a kernel without code. JSON is always available; YAML
//! and TOML are enabled by the `yaml-config` and `toml-config` features.
pub mod data;
pub mod document;
pub mod error;

pub use data::{ConfigData, ConfigFormat};
pub use document::{ComponentConfig, KernelConfig};
pub use error::ConfigError;
