pub mod catalog;
pub mod config;
pub mod kernel;
pub mod utils;

// Re-export key public types/traits for easier use by the binary and by
// component crates
pub use catalog::{CatalogEntry, TypeCatalog};
pub use config::{ComponentConfig, ConfigData, ConfigFormat, KernelConfig};
pub use kernel::error::Error as KernelError;
pub use kernel::{
    Component, Context, ImplementationType, Instance, Kernel, Lifecycle, Lifestyle, Locator,
    Parameters, Properties, ServiceBinding, ServiceProvider, ServiceType,
};
