use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, Weak};

use crate::kernel::error::Result;
use crate::kernel::microkernel::Kernel;

/// Identity of a service contract or implementation type.
///
/// Works for sized types and for trait objects alike, so
/// `ServiceType::of::<dyn Logger>()` and `ServiceType::of::<ConsoleLogger>()`
/// are both valid keys.
#[derive(Clone, Copy)]
pub struct ServiceType {
    id: TypeId,
    name: &'static str,
}

impl ServiceType {
    pub fn of<S: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<S>(),
            name: std::any::type_name::<S>(),
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for ServiceType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ServiceType {}

impl Hash for ServiceType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ServiceType").field(&self.name).finish()
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Marker trait for every type the kernel can materialize.
pub trait Component: Any + Send + Sync {
    fn component_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Opt-in lifecycle capability. Return `Some(self)` to receive
    /// start/stop notifications from the owning kernel.
    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        None
    }
}

/// Start/stop notifications delivered by [`Kernel::start`] and [`Kernel::stop`].
pub trait Lifecycle: Send + Sync {
    fn on_start(&self, _kernel: &Kernel) -> Result<()> {
        Ok(())
    }

    fn on_stop(&self, _kernel: &Kernel) -> Result<()> {
        Ok(())
    }
}

type Cast = Arc<dyn Fn(Arc<dyn Any + Send + Sync>) -> Option<Box<dyn Any>> + Send + Sync>;

/// A service type an implementation is advertised under, together with the
/// conversion from the concrete implementation to that service.
#[derive(Clone)]
pub struct ServiceBinding {
    service: ServiceType,
    cast: Cast,
}

impl ServiceBinding {
    /// Binds implementation `T` to service `S`. The conversion is usually
    /// just the unsizing coercion, written `|c| c`.
    pub fn new<T, S>(convert: fn(Arc<T>) -> Arc<S>) -> Self
    where
        T: Component,
        S: ?Sized + Send + Sync + 'static,
    {
        let cast: Cast = Arc::new(move |object: Arc<dyn Any + Send + Sync>| {
            object
                .downcast::<T>()
                .ok()
                .map(|concrete| Box::new(convert(concrete)) as Box<dyn Any>)
        });
        Self {
            service: ServiceType::of::<S>(),
            cast,
        }
    }

    /// Binding of an implementation to its own concrete type.
    pub fn concrete<T: Component>() -> Self {
        Self::new::<T, T>(|c| c)
    }

    pub fn service(&self) -> ServiceType {
        self.service
    }

    fn apply<S: ?Sized + 'static>(&self, object: Arc<dyn Any + Send + Sync>) -> Option<Arc<S>> {
        (self.cast)(object)
            .and_then(|boxed| boxed.downcast::<Arc<S>>().ok())
            .map(|service| *service)
    }
}

impl fmt::Debug for ServiceBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceBinding")
            .field("service", &self.service)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
enum Anchor {
    Owned {
        any: Arc<dyn Any + Send + Sync>,
        component: Arc<dyn Component>,
    },
    // A kernel's entry for itself; weak so a scope never owns itself.
    Scope(Weak<Kernel>),
}

/// Type-erased handle to a materialized component.
///
/// Cloning the handle clones the underlying reference, never the component.
#[derive(Clone)]
pub struct Instance {
    anchor: Anchor,
    implementation: ServiceBinding,
    services: Arc<[ServiceBinding]>,
}

impl Instance {
    pub(crate) fn owned<T: Component>(object: T, services: Arc<[ServiceBinding]>) -> Self {
        let object = Arc::new(object);
        Self {
            anchor: Anchor::Owned {
                any: object.clone(),
                component: object,
            },
            implementation: ServiceBinding::concrete::<T>(),
            services,
        }
    }

    pub(crate) fn scope(kernel: Weak<Kernel>, services: Arc<[ServiceBinding]>) -> Self {
        Self {
            anchor: Anchor::Scope(kernel),
            implementation: ServiceBinding::concrete::<Kernel>(),
            services,
        }
    }

    /// The concrete implementation type.
    pub fn implementation(&self) -> ServiceType {
        self.implementation.service()
    }

    /// Declared service types, excluding the implementation type.
    pub fn services(&self) -> impl Iterator<Item = ServiceType> + '_ {
        self.services.iter().map(ServiceBinding::service)
    }

    /// Whether `cast` would succeed for `service`.
    pub fn satisfies(&self, service: &ServiceType) -> bool {
        self.implementation.service() == *service || self.services().any(|s| s == *service)
    }

    /// Views the instance as `S`, which must be the implementation type or
    /// one of its declared services.
    pub fn cast<S: ?Sized + 'static>(&self) -> Option<Arc<S>> {
        let wanted = ServiceType::of::<S>();
        let binding = if self.implementation.service() == wanted {
            &self.implementation
        } else {
            self.services.iter().find(|b| b.service() == wanted)?
        };
        binding.apply::<S>(self.any()?)
    }

    /// The instance as a component, if it is still alive.
    pub fn component(&self) -> Option<Arc<dyn Component>> {
        match &self.anchor {
            Anchor::Owned { component, .. } => Some(component.clone()),
            Anchor::Scope(kernel) => kernel.upgrade().map(|k| k as Arc<dyn Component>),
        }
    }

    /// Identity comparison: true when both handles reference the same object.
    pub fn ptr_eq(&self, other: &Instance) -> bool {
        std::ptr::eq(self.address(), other.address())
    }

    fn any(&self) -> Option<Arc<dyn Any + Send + Sync>> {
        match &self.anchor {
            Anchor::Owned { any, .. } => Some(any.clone()),
            Anchor::Scope(kernel) => kernel.upgrade().map(|k| k as Arc<dyn Any + Send + Sync>),
        }
    }

    fn address(&self) -> *const () {
        match &self.anchor {
            Anchor::Owned { any, .. } => Arc::as_ptr(any) as *const (),
            Anchor::Scope(kernel) => Weak::as_ptr(kernel) as *const (),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("implementation", &self.implementation.service())
            .field("services", &self.services().collect::<Vec<_>>())
            .finish()
    }
}
