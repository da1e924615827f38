//! # Trellis Type Catalog
//!
//! An explicit registry from string keys to implementation types, populated
//! at startup. Configuration documents name component types by these keys.
use std::collections::HashMap;

use crate::kernel::activation::ImplementationType;
use crate::kernel::component::ServiceBinding;
use crate::kernel::error::{Error, Result};

/// An implementation type and the services it is advertised under by default
#[derive(Debug, Clone)]
pub struct CatalogEntry {
    implementation: ImplementationType,
    services: Vec<ServiceBinding>,
}

impl CatalogEntry {
    pub fn new(implementation: impl Into<ImplementationType>, services: Vec<ServiceBinding>) -> Self {
        Self {
            implementation: implementation.into(),
            services,
        }
    }

    pub fn implementation(&self) -> &ImplementationType {
        &self.implementation
    }

    pub fn services(&self) -> &[ServiceBinding] {
        &self.services
    }
}

/// Registry of component types addressable by key
#[derive(Debug, Clone, Default)]
pub struct TypeCatalog {
    entries: HashMap<String, CatalogEntry>,
}

impl TypeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `entry` under `key`. Keys are unique.
    pub fn register(&mut self, key: impl Into<String>, entry: CatalogEntry) -> Result<()> {
        let key = key.into();
        if key.is_empty() {
            return Err(Error::invalid_argument("key"));
        }
        if self.entries.contains_key(&key) {
            return Err(Error::DuplicateType { key });
        }
        log::debug!("Catalog: '{}' -> {}", key, entry.implementation().name());
        self.entries.insert(key, entry);
        Ok(())
    }

    /// Looks `key` up, failing with [`Error::UnknownType`] when absent.
    pub fn get(&self, key: &str) -> Result<&CatalogEntry> {
        self.entries.get(key).ok_or_else(|| Error::UnknownType {
            key: key.to_string(),
        })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
