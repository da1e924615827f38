//! Demo components bundled with the launcher, addressable by catalog key.
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use trellis_core::kernel::Result;
use trellis_core::{CatalogEntry, Component, ImplementationType, Kernel, Lifecycle, ServiceBinding, TypeCatalog};

pub const CONSOLE_LOGGER: &str = "console_logger";
pub const SYSTEM_CLOCK: &str = "system_clock";
pub const GREETER: &str = "greeter";

pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
}

pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn now(&self) -> u64;
}

pub trait Greeter: Send + Sync {
    fn greeting(&self) -> String;
}

/// Writes to standard output, one line per message.
pub struct ConsoleLogger {
    prefix: String,
}

impl ConsoleLogger {
    fn write(&self, message: &str) {
        println!("{} {}", self.prefix, message);
    }
}

impl Component for ConsoleLogger {
    fn component_name(&self) -> &'static str {
        "ConsoleLogger"
    }

    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        Some(self)
    }
}

impl Logger for ConsoleLogger {
    fn log(&self, message: &str) {
        self.write(message);
    }
}

impl Lifecycle for ConsoleLogger {
    fn on_start(&self, _kernel: &Kernel) -> Result<()> {
        self.write("console logger ready");
        Ok(())
    }

    fn on_stop(&self, _kernel: &Kernel) -> Result<()> {
        self.write("console logger closing");
        Ok(())
    }
}

pub struct SystemClock;

impl Component for SystemClock {
    fn component_name(&self) -> &'static str {
        "SystemClock"
    }
}

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or_default()
    }
}

/// Greets `name` through its logger when the kernel starts.
pub struct DemoGreeter {
    name: String,
    logger: Option<Arc<dyn Logger>>,
    clock: Option<Arc<dyn Clock>>,
}

impl Component for DemoGreeter {
    fn component_name(&self) -> &'static str {
        "Greeter"
    }

    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        Some(self)
    }
}

impl Greeter for DemoGreeter {
    fn greeting(&self) -> String {
        format!("Hello, {}!", self.name)
    }
}

impl Lifecycle for DemoGreeter {
    fn on_start(&self, _kernel: &Kernel) -> Result<()> {
        let Some(logger) = &self.logger else {
            log::warn!("Greeter has no logger; staying silent");
            return Ok(());
        };
        logger.log(&self.greeting());
        if let Some(clock) = &self.clock {
            logger.log(&format!("greeted at {}", clock.now()));
        }
        Ok(())
    }
}

/// Catalog of every bundled demo component.
pub fn catalog() -> Result<TypeCatalog> {
    let mut catalog = TypeCatalog::new();

    catalog.register(
        CONSOLE_LOGGER,
        CatalogEntry::new(
            ImplementationType::new(|ctx| {
                Ok(ConsoleLogger {
                    prefix: ctx.properties().get_or("prefix", "[log]".to_string()),
                })
            }),
            vec![ServiceBinding::new::<ConsoleLogger, dyn Logger>(|c| c)],
        ),
    )?;

    catalog.register(
        SYSTEM_CLOCK,
        CatalogEntry::new(
            ImplementationType::new(|_| Ok(SystemClock)),
            vec![ServiceBinding::new::<SystemClock, dyn Clock>(|c| c)],
        ),
    )?;

    catalog.register(
        GREETER,
        CatalogEntry::new(
            ImplementationType::of::<DemoGreeter>()
                .constructor(|ctx| {
                    Ok(DemoGreeter {
                        name: ctx.parameters().get("name").unwrap_or_else(|| "world".to_string()),
                        logger: ctx.get::<dyn Logger>()?,
                        clock: None,
                    })
                })
                .inject::<dyn Clock, _>(|greeter, clock| {
                    greeter.clock = Some(clock);
                    Ok(())
                }),
            vec![ServiceBinding::new::<DemoGreeter, dyn Greeter>(|c| c)],
        ),
    )?;

    Ok(catalog)
}
