//! # Trellis Kernel
//!
//! The `kernel` module is the component resolution and lifecycle engine of
//! `trellis-core`. Independent modules declare components by id and/or by
//! the service types they implement; the kernel constructs and wires them on
//! demand and delivers coordinated start/stop notifications.
//!
//! ## Key Responsibilities & Components:
//!
//! - **Registration**: [`Kernel::connect`] / [`Kernel::disconnect`] maintain a
//!   [`DescriptorStore`](descriptor::DescriptorStore) of [`Descriptor`]s.
//! - **Resolution**: [`Kernel::get_service`] and friends consult the
//!   [`InstanceStore`](instance::InstanceStore), then the local descriptors,
//!   then the parent scope.
//! - **Construction**: the `activation` submodule runs the single declared
//!   constructor of an [`ImplementationType`] and its property injectors.
//! - **Lifecycle**: [`Kernel::start`] / [`Kernel::stop`] notify components that
//!   implement [`Lifecycle`]; [`Kernel::pause`] suspends the started flag.
//! - **Error Handling**: kernel-specific error types ([`Error`]) and a
//!   `Result` alias in the `error` submodule.
pub mod activation;
pub mod builder;
pub mod component;
pub mod constants;
pub mod descriptor;
pub mod error;
pub mod instance;
pub mod lifecycle;
pub mod locator;
pub mod microkernel;

pub use activation::{Context, Implementation, ImplementationType};
pub use builder::{KernelBuilder, Registration};
pub use component::{Component, Instance, Lifecycle, ServiceBinding, ServiceType};
pub use descriptor::{Descriptor, Lifestyle, Parameter, Parameters, Properties};
pub use error::{Error, LifecyclePhase, Result};
pub use lifecycle::PauseGuard;
pub use locator::{Locator, ServiceProvider};
pub use microkernel::Kernel;
// Test module declaration
#[cfg(test)]
mod tests;
