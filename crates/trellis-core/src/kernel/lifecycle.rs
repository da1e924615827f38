use crate::kernel::component::Instance;
use crate::kernel::error::{Error, LifecyclePhase, Result};
use crate::kernel::microkernel::Kernel;

/// Delivers `phase` to every instance that opted into [`Lifecycle`], in the
/// given order. The first failing hook aborts the pass.
///
/// [`Lifecycle`]: crate::kernel::component::Lifecycle
pub(crate) fn notify(kernel: &Kernel, instances: &[Instance], phase: LifecyclePhase) -> Result<()> {
    for instance in instances {
        let Some(component) = instance.component() else {
            continue;
        };
        let Some(hook) = component.lifecycle() else {
            continue;
        };

        log::debug!("Delivering {} to component: {}", phase, component.component_name());
        let outcome = match phase {
            LifecyclePhase::Start => hook.on_start(kernel),
            LifecyclePhase::Stop => hook.on_stop(kernel),
        };
        outcome.map_err(|source| Error::Lifecycle {
            phase,
            component: component.component_name().to_string(),
            source: Box::new(source),
        })?;
    }
    Ok(())
}

/// Clears the started flag of a kernel until dropped, then restores the
/// value it had when the guard was acquired.
///
/// ```
/// use trellis_core::Kernel;
///
/// let kernel = Kernel::new();
/// kernel.start().unwrap();
/// {
///     let _paused = kernel.pause();
///     assert!(!kernel.is_started());
/// }
/// assert!(kernel.is_started());
/// ```
#[must_use = "the kernel is resumed as soon as the guard is dropped"]
#[derive(Debug)]
pub struct PauseGuard<'a> {
    kernel: &'a Kernel,
    was_started: bool,
}

impl<'a> PauseGuard<'a> {
    pub(crate) fn new(kernel: &'a Kernel) -> Self {
        let was_started = kernel.swap_started(false);
        Self { kernel, was_started }
    }

    /// Whether the kernel was started when the guard was taken.
    pub fn was_started(&self) -> bool {
        self.was_started
    }
}

impl Drop for PauseGuard<'_> {
    fn drop(&mut self) {
        self.kernel.swap_started(self.was_started);
    }
}
