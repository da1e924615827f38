use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::kernel::activation::{self, ImplementationType};
use crate::kernel::builder::KernelBuilder;
use crate::kernel::component::{Component, Instance, ServiceBinding, ServiceType};
use crate::kernel::constants;
use crate::kernel::descriptor::{self, Descriptor, DescriptorStore, Lifestyle, Parameters, Properties};
use crate::kernel::error::{Error, LifecyclePhase, Result};
use crate::kernel::instance::InstanceStore;
use crate::kernel::lifecycle::{self, PauseGuard};
use crate::kernel::locator::{Locator, ServiceProvider};

/// A component registry scope: registration, resolution and lifecycle.
///
/// Lookups that miss locally are delegated to the parent scope, so a child
/// sees its own components and its ancestors', never the other way round.
pub struct Kernel {
    id: Option<String>,
    parent: Option<Weak<Kernel>>,
    descriptors: Mutex<DescriptorStore>,
    instances: Mutex<InstanceStore>,
    started: AtomicBool,
}

impl Kernel {
    /// Creates a root kernel.
    pub fn new() -> Arc<Self> {
        Self::create(None, None)
    }

    /// Creates a child scope of `parent`. The child holds only a weak
    /// reference; once the parent is dropped, delegation stops at the child.
    pub fn child(parent: &Arc<Kernel>, id: impl Into<String>) -> Arc<Self> {
        Self::create(Some(id.into()), Some(Arc::downgrade(parent)))
    }

    fn create(id: Option<String>, parent: Option<Weak<Kernel>>) -> Arc<Self> {
        Arc::new_cyclic(|this: &Weak<Kernel>| {
            let builtins: Arc<[ServiceBinding]> = vec![
                ServiceBinding::concrete::<Kernel>(),
                ServiceBinding::new::<Kernel, dyn Locator>(|k| k),
                ServiceBinding::new::<Kernel, dyn ServiceProvider>(|k| k),
            ]
            .into();
            let services: Vec<ServiceType> = builtins.iter().map(ServiceBinding::service).collect();

            // Reachable by type only, so every id stays free for user components.
            let mut instances = InstanceStore::new();
            instances.add(None, &services, Instance::scope(this.clone(), builtins));

            Kernel {
                id,
                parent,
                descriptors: Mutex::new(DescriptorStore::new()),
                instances: Mutex::new(instances),
                started: AtomicBool::new(false),
            }
        })
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The parent scope, if there is one and it is still alive.
    pub fn parent(&self) -> Option<Arc<Kernel>> {
        self.parent.as_ref().and_then(Weak::upgrade)
    }

    /// Fluent registration façade over [`Kernel::connect`].
    pub fn builder(&self) -> KernelBuilder<'_> {
        KernelBuilder::new(self)
    }

    // --- Registration ---

    /// Registers a component. A missing or empty id is replaced by a fresh
    /// UUID. Nothing is instantiated. Returns the id used.
    pub fn connect(
        &self,
        id: Option<&str>,
        services: Vec<ServiceBinding>,
        implementation: ImplementationType,
        lifestyle: Lifestyle,
        parameters: Parameters,
        properties: Properties,
    ) -> Result<String> {
        let id = match id {
            Some(id) if !id.is_empty() => id.to_string(),
            _ => descriptor::generate_id(),
        };
        let descriptor = Descriptor::new(
            id.clone(),
            services,
            implementation,
            lifestyle,
            parameters,
            properties,
        );
        self.connect_descriptor(descriptor)?;
        Ok(id)
    }

    /// Registers a prepared descriptor.
    pub fn connect_descriptor(&self, descriptor: Descriptor) -> Result<Arc<Descriptor>> {
        let descriptor = self.descriptors().add(descriptor)?;
        log::debug!(
            "Connected component '{}' ({}, {:?})",
            descriptor.id(),
            descriptor.implementation().name(),
            descriptor.lifestyle()
        );
        Ok(descriptor)
    }

    /// Removes the descriptor registered under `id` and evicts any cached
    /// instance with that id. Returns whether a descriptor existed.
    pub fn disconnect(&self, id: &str) -> Result<bool> {
        if id.is_empty() {
            return Err(Error::invalid_argument("id"));
        }
        let existed = self.descriptors().remove(id);
        let evicted = self.instances().remove(id);
        log::debug!(
            "Disconnected component '{}' (descriptor: {}, cached instance: {})",
            id,
            existed,
            evicted
        );
        Ok(existed)
    }

    pub fn descriptor(&self, id: &str) -> Option<Arc<Descriptor>> {
        self.descriptors().get(id)
    }

    /// Ids of the local descriptors, in registration order.
    pub fn component_ids(&self) -> Vec<String> {
        self.descriptors()
            .iter()
            .map(|d| d.id().to_string())
            .collect()
    }

    // --- Resolution ---

    /// Resolves a service by type: cached instances first, then local
    /// descriptors, then the parent scope. `Ok(None)` means nobody provides it.
    pub fn get_service(&self, service: &ServiceType) -> Result<Option<Instance>> {
        let cached = self.instances().get_by_type(service);
        if cached.is_some() {
            return Ok(cached);
        }

        let descriptor = self.descriptors().get_by_type(service);
        if let Some(descriptor) = descriptor {
            return self.create_service(&descriptor).map(Some);
        }

        match self.parent() {
            Some(parent) => parent.get_service(service),
            None => Ok(None),
        }
    }

    /// Resolves a component by id, with the same order as [`Kernel::get_service`].
    pub fn get_service_by_id(&self, id: &str) -> Result<Option<Instance>> {
        if id.is_empty() {
            return Err(Error::invalid_argument("id"));
        }

        let cached = self.instances().get(id);
        if cached.is_some() {
            return Ok(cached);
        }

        let descriptor = self.descriptors().get(id);
        if let Some(descriptor) = descriptor {
            return self.create_service(&descriptor).map(Some);
        }

        match self.parent() {
            Some(parent) => parent.get_service_by_id(id),
            None => Ok(None),
        }
    }

    /// Resolves `id` and returns it only if it satisfies `service`.
    pub fn get_as(&self, id: &str, service: &ServiceType) -> Result<Option<Instance>> {
        Ok(self
            .get_service_by_id(id)?
            .filter(|instance| instance.satisfies(service)))
    }

    /// Typed lookup by service type.
    pub fn get<S: ?Sized + 'static>(&self) -> Result<Option<Arc<S>>> {
        Ok(self
            .get_service(&ServiceType::of::<S>())?
            .and_then(|instance| instance.cast::<S>()))
    }

    /// Typed lookup by id; absent when the component is not an `S`.
    pub fn get_named<S: ?Sized + 'static>(&self, id: &str) -> Result<Option<Arc<S>>> {
        Ok(self
            .get_as(id, &ServiceType::of::<S>())?
            .and_then(|instance| instance.cast::<S>()))
    }

    /// Builds an unregistered, never cached instance with full injection.
    pub fn build(
        &self,
        implementation: ImplementationType,
        parameters: Parameters,
        properties: Properties,
    ) -> Result<Instance> {
        let descriptor = Descriptor::new(
            constants::TRANSIENT_ID,
            Vec::new(),
            implementation,
            Lifestyle::Transient,
            parameters,
            properties,
        );
        self.create_service(&descriptor)
    }

    /// Typed variant of [`Kernel::build`].
    pub fn build_as<T: Component>(
        &self,
        implementation: ImplementationType,
        parameters: Parameters,
        properties: Properties,
    ) -> Result<Arc<T>> {
        let type_name = implementation.name();
        self.build(implementation, parameters, properties)?
            .cast::<T>()
            .ok_or_else(|| {
                Error::Other(format!(
                    "Built '{}' but it is not a '{}'",
                    type_name,
                    std::any::type_name::<T>()
                ))
            })
    }

    pub fn contains(&self, id: &str) -> bool {
        let local = self.instances().contains(id) || self.descriptors().contains(id);
        local || self.parent().is_some_and(|parent| parent.contains(id))
    }

    pub fn contains_type(&self, service: &ServiceType) -> bool {
        let local =
            self.instances().contains_type(service) || self.descriptors().contains_type(service);
        local || self.parent().is_some_and(|parent| parent.contains_type(service))
    }

    pub fn contains_service<S: ?Sized + 'static>(&self) -> bool {
        self.contains_type(&ServiceType::of::<S>())
    }

    fn create_service(&self, descriptor: &Descriptor) -> Result<Instance> {
        let instance = activation::construct(self, descriptor)?;
        if descriptor.lifestyle().is_cached() {
            let services: Vec<ServiceType> = descriptor.services().collect();
            self.instances()
                .add(Some(descriptor.id()), &services, instance.clone());
            log::debug!("Cached instance of component '{}'", descriptor.id());
        }
        Ok(instance)
    }

    // --- Lifecycle ---

    pub fn is_started(&self) -> bool {
        self.started.load(Ordering::SeqCst)
    }

    /// Materializes every singleton not yet built, in registration order,
    /// then delivers the start notification to every stored instance.
    /// Does nothing when already started.
    pub fn start(&self) -> Result<()> {
        if self.is_started() {
            return Ok(());
        }
        log::info!("Starting kernel {}", self.display_id());

        let singletons: Vec<Arc<Descriptor>> = self
            .descriptors()
            .iter()
            .filter(|d| d.lifestyle() == Lifestyle::Singleton)
            .cloned()
            .collect();
        for descriptor in singletons {
            let cached = self.instances().contains(descriptor.id());
            if !cached {
                self.create_service(&descriptor)?;
            }
        }

        let instances = self.instances().instances();
        lifecycle::notify(self, &instances, LifecyclePhase::Start)?;

        self.started.store(true, Ordering::SeqCst);
        log::info!("Kernel {} started ({} instances)", self.display_id(), instances.len());
        Ok(())
    }

    /// Delivers the stop notification to every stored instance. Does
    /// nothing when not started.
    pub fn stop(&self) -> Result<()> {
        if !self.is_started() {
            return Ok(());
        }
        log::info!("Stopping kernel {}", self.display_id());

        let instances = self.instances().instances();
        lifecycle::notify(self, &instances, LifecyclePhase::Stop)?;

        self.started.store(false, Ordering::SeqCst);
        log::info!("Kernel {} stopped", self.display_id());
        Ok(())
    }

    /// Temporarily clears the started flag; it is restored when the guard drops.
    pub fn pause(&self) -> PauseGuard<'_> {
        PauseGuard::new(self)
    }

    pub(crate) fn swap_started(&self, started: bool) -> bool {
        self.started.swap(started, Ordering::SeqCst)
    }

    fn display_id(&self) -> &str {
        self.id.as_deref().unwrap_or("<root>")
    }

    fn descriptors(&self) -> MutexGuard<'_, DescriptorStore> {
        self.descriptors.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn instances(&self) -> MutexGuard<'_, InstanceStore> {
        self.instances.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Component for Kernel {
    fn component_name(&self) -> &'static str {
        "Kernel"
    }
}

impl ServiceProvider for Kernel {
    fn get_service(&self, service: &ServiceType) -> Result<Option<Instance>> {
        Kernel::get_service(self, service)
    }
}

impl Locator for Kernel {
    fn get_service_by_id(&self, id: &str) -> Result<Option<Instance>> {
        Kernel::get_service_by_id(self, id)
    }

    fn get_as(&self, id: &str, service: &ServiceType) -> Result<Option<Instance>> {
        Kernel::get_as(self, id, service)
    }

    fn contains(&self, id: &str) -> bool {
        Kernel::contains(self, id)
    }

    fn contains_type(&self, service: &ServiceType) -> bool {
        Kernel::contains_type(self, service)
    }
}

impl fmt::Debug for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Kernel")
            .field("id", &self.id)
            .field("has_parent", &self.parent.is_some())
            .field("started", &self.is_started())
            .finish_non_exhaustive()
    }
}
