use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::data::ConfigData;
use crate::kernel::activation::ImplementationType;
use crate::kernel::component::{ServiceBinding, ServiceType};
use crate::kernel::error::{Error, Result};
use crate::utils::WriteOnce;

/// Caching policy of a registered component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifestyle {
    /// A new instance per resolution, never cached
    Transient,
    /// Built once, cached, and eagerly materialized by `Kernel::start`
    #[default]
    Singleton,
    /// Built once and cached, but only to satisfy injection; not eagerly started
    DependencyInjectionOnly,
}

impl Lifestyle {
    /// Whether instances of this lifestyle are kept in the instance store.
    pub fn is_cached(&self) -> bool {
        matches!(self, Lifestyle::Singleton | Lifestyle::DependencyInjectionOnly)
    }
}

/// A fresh unique component id.
pub fn generate_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Free-form component properties handed to constructors
pub type Properties = ConfigData;

/// A named constructor argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    pub name: String,
    #[serde(default)]
    pub value: Value,
}

/// Ordered constructor arguments
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Parameters(Vec<Parameter>);

impl Parameters {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a parameter, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(name, value);
        self
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.push(Parameter {
            name: name.into(),
            value: value.into(),
        });
    }

    /// Value of the first parameter named `name`, deserialized as `T`.
    pub fn get<T: for<'de> Deserialize<'de>>(&self, name: &str) -> Option<T> {
        self.0
            .iter()
            .find(|p| p.name == name)
            .and_then(|p| serde_json::from_value(p.value.clone()).ok())
    }

    /// Value at `index`, deserialized as `T`.
    pub fn at<T: for<'de> Deserialize<'de>>(&self, index: usize) -> Option<T> {
        self.0
            .get(index)
            .and_then(|p| serde_json::from_value(p.value.clone()).ok())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Parameter> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Parameter>> for Parameters {
    fn from(parameters: Vec<Parameter>) -> Self {
        Self(parameters)
    }
}

/// A registered component declaration
pub struct Descriptor {
    id: String,
    services: Arc<[ServiceBinding]>,
    implementation: ImplementationType,
    lifestyle: Lifestyle,
    parameters: Parameters,
    properties: Properties,
    declared_by: WriteOnce<String>,
}

impl Descriptor {
    pub fn new(
        id: impl Into<String>,
        services: Vec<ServiceBinding>,
        implementation: ImplementationType,
        lifestyle: Lifestyle,
        parameters: Parameters,
        properties: Properties,
    ) -> Self {
        Self {
            id: id.into(),
            services: services.into(),
            implementation,
            lifestyle,
            parameters,
            properties,
            declared_by: WriteOnce::new("declared_by"),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn services(&self) -> impl Iterator<Item = ServiceType> + '_ {
        self.services.iter().map(ServiceBinding::service)
    }

    pub(crate) fn bindings(&self) -> Arc<[ServiceBinding]> {
        self.services.clone()
    }

    pub fn provides(&self, service: &ServiceType) -> bool {
        self.services().any(|s| s == *service)
    }

    pub fn implementation(&self) -> &ImplementationType {
        &self.implementation
    }

    pub fn lifestyle(&self) -> Lifestyle {
        self.lifestyle
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Where this descriptor was declared, e.g. a configuration file.
    pub fn declared_by(&self) -> Option<&str> {
        self.declared_by.get().map(String::as_str)
    }

    /// Records the declaring origin. May only be called once.
    pub fn declare(&self, origin: impl Into<String>) -> Result<()> {
        self.declared_by.set(origin.into())
    }
}

impl fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Descriptor")
            .field("id", &self.id)
            .field("services", &self.services().collect::<Vec<_>>())
            .field("implementation", &self.implementation.service_type())
            .field("lifestyle", &self.lifestyle)
            .finish_non_exhaustive()
    }
}

/// Registered descriptors of one kernel scope, kept in registration order
#[derive(Debug, Default)]
pub struct DescriptorStore {
    entries: BTreeMap<u64, Arc<Descriptor>>,
    by_id: HashMap<String, u64>,
    next_seq: u64,
}

impl DescriptorStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor. The first registration of an id governs lookup by
    /// that id until it is removed.
    pub fn add(&mut self, descriptor: Descriptor) -> Result<Arc<Descriptor>> {
        if descriptor.id().is_empty() {
            return Err(Error::invalid_argument("descriptor.id"));
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        let descriptor = Arc::new(descriptor);
        if self.by_id.contains_key(descriptor.id()) {
            log::warn!(
                "Component id '{}' is already registered; the earlier registration keeps the id",
                descriptor.id()
            );
        } else {
            self.by_id.insert(descriptor.id().to_string(), seq);
        }
        self.entries.insert(seq, descriptor.clone());
        Ok(descriptor)
    }

    /// Removes every descriptor registered under `id`.
    pub fn remove(&mut self, id: &str) -> bool {
        if self.by_id.remove(id).is_none() {
            return false;
        }
        self.entries.retain(|_, d| d.id() != id);
        true
    }

    pub fn get(&self, id: &str) -> Option<Arc<Descriptor>> {
        self.by_id
            .get(id)
            .and_then(|seq| self.entries.get(seq))
            .cloned()
    }

    /// First-registered descriptor advertising `service`.
    pub fn get_by_type(&self, service: &ServiceType) -> Option<Arc<Descriptor>> {
        self.entries.values().find(|d| d.provides(service)).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn contains_type(&self, service: &ServiceType) -> bool {
        self.entries.values().any(|d| d.provides(service))
    }

    /// Descriptors in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Descriptor>> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
