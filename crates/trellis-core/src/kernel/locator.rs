use std::sync::Arc;

use crate::kernel::component::{Instance, ServiceType};
use crate::kernel::error::Result;

/// Minimal resolution capability: look a service up by type.
pub trait ServiceProvider: Send + Sync {
    fn get_service(&self, service: &ServiceType) -> Result<Option<Instance>>;
}

/// Full read-side resolution surface of a kernel scope.
pub trait Locator: ServiceProvider {
    fn get_service_by_id(&self, id: &str) -> Result<Option<Instance>>;

    /// Resolves `id` and keeps the result only if it satisfies `service`.
    fn get_as(&self, id: &str, service: &ServiceType) -> Result<Option<Instance>>;

    fn contains(&self, id: &str) -> bool;

    fn contains_type(&self, service: &ServiceType) -> bool;
}

impl dyn Locator {
    /// Typed lookup by service type.
    pub fn get<S: ?Sized + 'static>(&self) -> Result<Option<Arc<S>>> {
        Ok(self
            .get_service(&ServiceType::of::<S>())?
            .and_then(|instance| instance.cast::<S>()))
    }

    /// Typed lookup by id.
    pub fn get_named<S: ?Sized + 'static>(&self, id: &str) -> Result<Option<Arc<S>>> {
        Ok(self
            .get_as(id, &ServiceType::of::<S>())?
            .and_then(|instance| instance.cast::<S>()))
    }
}
