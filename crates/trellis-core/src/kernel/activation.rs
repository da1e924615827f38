//! Component construction: constructor selection, property injection and
//! the erased implementation types that carry both.
//!
//! Constructors and injectors are declared explicitly per implementation
//! type instead of being discovered at runtime. A constructor receives a
//! [`Context`] through which it resolves its dependencies from the kernel
//! that is building it.
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::kernel::component::{Component, Instance, ServiceBinding, ServiceType};
use crate::kernel::descriptor::{Descriptor, Parameters, Properties};
use crate::kernel::error::{Error, Result};
use crate::kernel::microkernel::Kernel;

type ConstructFn =
    Arc<dyn Fn(&Context<'_>) -> Result<Box<dyn Any + Send + Sync>> + Send + Sync>;
type InjectFn =
    Arc<dyn Fn(&mut (dyn Any + Send + Sync + 'static), &Kernel) -> Result<bool> + Send + Sync>;
type SealFn = fn(Box<dyn Any + Send + Sync>, Arc<[ServiceBinding]>) -> Option<Instance>;

#[derive(Clone)]
struct Injector {
    service: ServiceType,
    apply: InjectFn,
}

/// A concrete component type with its declared constructors and injectors
#[derive(Clone)]
pub struct ImplementationType {
    ty: ServiceType,
    constructors: Vec<ConstructFn>,
    injectors: Vec<Injector>,
    seal: SealFn,
}

impl ImplementationType {
    /// Starts declaring implementation type `T`.
    pub fn of<T: Component>() -> Implementation<T> {
        Implementation {
            inner: ImplementationType {
                ty: ServiceType::of::<T>(),
                constructors: Vec::new(),
                injectors: Vec::new(),
                seal: seal::<T>,
            },
            _marker: PhantomData,
        }
    }

    /// Shorthand for a type with a single constructor and no injectors.
    pub fn new<T, F>(constructor: F) -> Self
    where
        T: Component,
        F: Fn(&Context<'_>) -> Result<T> + Send + Sync + 'static,
    {
        Self::of::<T>().constructor(constructor).into()
    }

    pub fn service_type(&self) -> ServiceType {
        self.ty
    }

    pub fn name(&self) -> &'static str {
        self.ty.name()
    }

    pub fn constructor_count(&self) -> usize {
        self.constructors.len()
    }

    /// Service types this implementation accepts through property injection.
    pub fn injected_services(&self) -> impl Iterator<Item = ServiceType> + '_ {
        self.injectors.iter().map(|i| i.service)
    }

    fn select_constructor(&self, id: &str) -> Result<&ConstructFn> {
        match self.constructors.as_slice() {
            [only] => Ok(only),
            all => Err(Error::ConstructorSelection {
                id: id.to_string(),
                type_name: self.ty.name().to_string(),
                count: all.len(),
            }),
        }
    }
}

impl fmt::Debug for ImplementationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImplementationType")
            .field("type", &self.ty)
            .field("constructors", &self.constructors.len())
            .field("injected", &self.injected_services().collect::<Vec<_>>())
            .finish()
    }
}

/// Typed declaration of an [`ImplementationType`].
pub struct Implementation<T> {
    inner: ImplementationType,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Component> Implementation<T> {
    /// Declares a constructor. Exactly one must be declared for the type to
    /// be constructible.
    pub fn constructor<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&Context<'_>) -> Result<T> + Send + Sync + 'static,
    {
        let construct: ConstructFn = Arc::new(move |context: &Context<'_>| {
            constructor(context).map(|object| Box::new(object) as Box<dyn Any + Send + Sync>)
        });
        self.inner.constructors.push(construct);
        self
    }

    /// Declares a settable dependency of service type `S`. After
    /// construction the kernel resolves `S`; when found, `setter` receives
    /// it, otherwise the component is left untouched.
    pub fn inject<S, F>(mut self, setter: F) -> Self
    where
        S: ?Sized + Send + Sync + 'static,
        F: Fn(&mut T, Arc<S>) -> Result<()> + Send + Sync + 'static,
    {
        let apply: InjectFn = Arc::new(
            move |target: &mut (dyn Any + Send + Sync + 'static), kernel: &Kernel| -> Result<bool> {
                let Some(target) = target.downcast_mut::<T>() else {
                    return Ok(false);
                };
                match kernel.get::<S>()? {
                    Some(service) => {
                        setter(target, service)?;
                        Ok(true)
                    }
                    None => Ok(false),
                }
            },
        );
        self.inner.injectors.push(Injector {
            service: ServiceType::of::<S>(),
            apply,
        });
        self
    }

    pub fn build(self) -> ImplementationType {
        self.inner
    }
}

impl<T: Component> From<Implementation<T>> for ImplementationType {
    fn from(implementation: Implementation<T>) -> Self {
        implementation.build()
    }
}

fn seal<T: Component>(
    object: Box<dyn Any + Send + Sync>,
    services: Arc<[ServiceBinding]>,
) -> Option<Instance> {
    object
        .downcast::<T>()
        .ok()
        .map(|object| Instance::owned(*object, services))
}

/// What a constructor sees while its component is being built
pub struct Context<'a> {
    kernel: &'a Kernel,
    descriptor: &'a Descriptor,
}

impl<'a> Context<'a> {
    pub fn kernel(&self) -> &'a Kernel {
        self.kernel
    }

    /// Id of the descriptor being built.
    pub fn id(&self) -> &str {
        self.descriptor.id()
    }

    pub fn parameters(&self) -> &Parameters {
        self.descriptor.parameters()
    }

    pub fn properties(&self) -> &Properties {
        self.descriptor.properties()
    }

    /// Resolves `S`; `None` when no scope provides it.
    pub fn get<S: ?Sized + 'static>(&self) -> Result<Option<Arc<S>>> {
        self.kernel.get::<S>()
    }

    pub fn get_named<S: ?Sized + 'static>(&self, id: &str) -> Result<Option<Arc<S>>> {
        self.kernel.get_named::<S>(id)
    }

    /// Resolves `S`, failing with [`Error::MissingDependency`] when absent.
    pub fn require<S: ?Sized + 'static>(&self) -> Result<Arc<S>> {
        self.get::<S>()?.ok_or_else(|| Error::MissingDependency {
            id: self.id().to_string(),
            service: ServiceType::of::<S>().name().to_string(),
        })
    }
}

/// Builds a fresh instance for `descriptor`: runs its single constructor,
/// then its injectors. Caching is left to the caller.
pub(crate) fn construct(kernel: &Kernel, descriptor: &Descriptor) -> Result<Instance> {
    let implementation = descriptor.implementation();
    let constructor = implementation.select_constructor(descriptor.id())?;

    let context = Context { kernel, descriptor };
    let mut object = constructor(&context).map_err(|e| {
        if e.is_configuration() {
            e
        } else {
            Error::Construction {
                id: descriptor.id().to_string(),
                type_name: implementation.name().to_string(),
                source: Box::new(e),
            }
        }
    })?;

    for injector in &implementation.injectors {
        let injected = (injector.apply)(&mut *object, kernel).map_err(|e| Error::Injection {
            service: injector.service.name().to_string(),
            type_name: implementation.name().to_string(),
            source: Box::new(e),
        })?;
        if !injected {
            log::debug!(
                "No '{}' available for injection into component '{}'",
                injector.service,
                descriptor.id()
            );
        }
    }

    (implementation.seal)(object, descriptor.bindings()).ok_or_else(|| {
        Error::Other(format!(
            "Constructor of component '{}' produced a value that is not a '{}'",
            descriptor.id(),
            implementation.name()
        ))
    })
}
