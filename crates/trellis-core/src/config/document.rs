use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::catalog::TypeCatalog;
use crate::config::data::{ConfigData, ConfigFormat};
use crate::config::error::ConfigError;
use crate::kernel::descriptor::{self, Descriptor, Lifestyle, Parameters};
use crate::kernel::error::Result;
use crate::kernel::microkernel::Kernel;

/// A configuration document: the components to connect, in order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KernelConfig {
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// One component entry of a [`KernelConfig`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentConfig {
    /// Component id; generated when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Catalog key of the implementation type
    #[serde(rename = "type")]
    pub type_key: String,
    #[serde(default)]
    pub lifestyle: Lifestyle,
    #[serde(default, skip_serializing_if = "Parameters::is_empty")]
    pub parameters: Parameters,
    #[serde(default, skip_serializing_if = "ConfigData::is_empty")]
    pub properties: ConfigData,
}

impl KernelConfig {
    /// Reads a document, picking the format from the file extension.
    pub fn load(path: &Path) -> std::result::Result<Self, ConfigError> {
        let format = ConfigFormat::from_path(path)
            .ok_or_else(|| ConfigError::UnsupportedFormat(path.to_path_buf()))?;
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            operation: "read".to_string(),
            source,
        })?;
        Self::parse(&data, format)
    }

    pub fn parse(data: &str, format: ConfigFormat) -> std::result::Result<Self, ConfigError> {
        format.parse(data)
    }

    pub fn render(&self, format: ConfigFormat) -> std::result::Result<String, ConfigError> {
        format.render(self)
    }

    /// Connects every component to `kernel`, resolving implementation types
    /// through `catalog`. Each descriptor records `origin` as its declaring
    /// source. Returns the ids used, in document order.
    pub fn apply(&self, kernel: &Kernel, catalog: &TypeCatalog, origin: &str) -> Result<Vec<String>> {
        let mut ids = Vec::with_capacity(self.components.len());
        for component in &self.components {
            let entry = catalog.get(&component.type_key)?;
            let id = match component.id.as_deref() {
                Some(id) if !id.is_empty() => id.to_string(),
                _ => descriptor::generate_id(),
            };

            let descriptor = Descriptor::new(
                id.clone(),
                entry.services().to_vec(),
                entry.implementation().clone(),
                component.lifestyle,
                component.parameters.clone(),
                component.properties.clone(),
            );
            descriptor.declare(origin)?;
            kernel.connect_descriptor(descriptor)?;
            ids.push(id);
        }
        log::info!("Applied {} component(s) from {}", ids.len(), origin);
        Ok(ids)
    }
}
