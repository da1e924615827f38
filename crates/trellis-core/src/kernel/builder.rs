use std::sync::Arc;

use serde_json::Value;

use crate::kernel::activation::{Context, Implementation, ImplementationType};
use crate::kernel::component::{Component, ServiceBinding};
use crate::kernel::descriptor::{Lifestyle, Parameters, Properties};
use crate::kernel::error::Result;
use crate::kernel::microkernel::Kernel;

/// Fluent registration façade, obtained from [`Kernel::builder`].
///
/// ```
/// use std::sync::Arc;
/// use trellis_core::{Component, Kernel};
///
/// trait Greeter: Send + Sync {
///     fn greet(&self) -> String;
/// }
///
/// struct English;
/// impl Component for English {}
/// impl Greeter for English {
///     fn greet(&self) -> String {
///         "hello".into()
///     }
/// }
///
/// let kernel = Kernel::new();
/// kernel
///     .builder()
///     .register(|_| Ok(English))
///     .id("greeter")
///     .provides::<dyn Greeter>(|c| c)
///     .connect()
///     .unwrap();
///
/// let greeter: Arc<dyn Greeter> = kernel.get::<dyn Greeter>().unwrap().unwrap();
/// assert_eq!(greeter.greet(), "hello");
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KernelBuilder<'k> {
    kernel: &'k Kernel,
}

impl<'k> KernelBuilder<'k> {
    pub(crate) fn new(kernel: &'k Kernel) -> Self {
        Self { kernel }
    }

    /// Starts a registration for `T` built by `constructor`.
    pub fn register<T, F>(&self, constructor: F) -> Registration<'k, T>
    where
        T: Component,
        F: Fn(&Context<'_>) -> Result<T> + Send + Sync + 'static,
    {
        self.register_type(ImplementationType::of::<T>().constructor(constructor))
    }

    /// Starts a registration from a prepared implementation declaration.
    pub fn register_type<T: Component>(&self, implementation: Implementation<T>) -> Registration<'k, T> {
        Registration {
            kernel: self.kernel,
            id: None,
            services: Vec::new(),
            implementation,
            lifestyle: Lifestyle::Singleton,
            parameters: Parameters::new(),
            properties: Properties::new(),
        }
    }
}

/// One pending registration. Nothing reaches the kernel until [`Registration::connect`].
#[must_use = "a registration does nothing until `connect` is called"]
pub struct Registration<'k, T> {
    kernel: &'k Kernel,
    id: Option<String>,
    services: Vec<ServiceBinding>,
    implementation: Implementation<T>,
    lifestyle: Lifestyle,
    parameters: Parameters,
    properties: Properties,
}

impl<'k, T: Component> Registration<'k, T> {
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Advertises the component as service `S`.
    pub fn provides<S>(mut self, convert: fn(Arc<T>) -> Arc<S>) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
    {
        self.services.push(ServiceBinding::new(convert));
        self
    }

    /// Advertises the component under its own concrete type.
    pub fn provides_self(mut self) -> Self {
        self.services.push(ServiceBinding::concrete::<T>());
        self
    }

    /// See [`Implementation::inject`].
    pub fn inject<S, F>(mut self, setter: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<S>) -> Result<()> + Send + Sync + 'static,
    {
        self.implementation = self.implementation.inject(setter);
        self
    }

    pub fn lifestyle(mut self, lifestyle: Lifestyle) -> Self {
        self.lifestyle = lifestyle;
        self
    }

    pub fn singleton(self) -> Self {
        self.lifestyle(Lifestyle::Singleton)
    }

    pub fn transient(self) -> Self {
        self.lifestyle(Lifestyle::Transient)
    }

    pub fn dependency_injection_only(self) -> Self {
        self.lifestyle(Lifestyle::DependencyInjectionOnly)
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.parameters.push(name, value);
        self
    }

    pub fn property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key, value);
        self
    }

    /// Registers the component and returns its id.
    pub fn connect(self) -> Result<String> {
        self.kernel.connect(
            self.id.as_deref(),
            self.services,
            self.implementation.build(),
            self.lifestyle,
            self.parameters,
            self.properties,
        )
    }
}
