#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::kernel::{
    Component, ImplementationType, Kernel, Lifecycle, Result, ServiceBinding,
};

pub trait Logger: Send + Sync {
    fn log(&self, message: &str);
    fn lines(&self) -> Vec<String>;
}

#[derive(Debug, Default)]
pub struct MemoryLogger {
    lines: Mutex<Vec<String>>,
}

impl Component for MemoryLogger {}

impl Logger for MemoryLogger {
    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }

    fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> u64;
}

#[derive(Debug)]
pub struct FixedClock(pub u64);

impl Component for FixedClock {}

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

pub trait Service: Send + Sync {
    fn logger(&self) -> Option<Arc<dyn Logger>>;
    fn clock(&self) -> Option<Arc<dyn Clock>>;
}

pub struct LoggingService {
    pub logger: Option<Arc<dyn Logger>>,
    pub clock: Option<Arc<dyn Clock>>,
}

impl Component for LoggingService {}

impl Service for LoggingService {
    fn logger(&self) -> Option<Arc<dyn Logger>> {
        self.logger.clone()
    }

    fn clock(&self) -> Option<Arc<dyn Clock>> {
        self.clock.clone()
    }
}

/// Records lifecycle notifications into a shared journal.
pub struct Probe {
    pub name: String,
    pub journal: Journal,
}

impl Component for Probe {
    fn lifecycle(&self) -> Option<&dyn Lifecycle> {
        Some(self)
    }
}

impl Lifecycle for Probe {
    fn on_start(&self, _kernel: &Kernel) -> Result<()> {
        self.journal.record(format!("start:{}", self.name));
        Ok(())
    }

    fn on_stop(&self, _kernel: &Kernel) -> Result<()> {
        self.journal.record(format!("stop:{}", self.name));
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, entry: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == entry).count()
    }
}

/// Counts how many times a constructor ran.
#[derive(Debug, Clone, Default)]
pub struct Counter(Arc<AtomicUsize>);

impl Counter {
    pub fn bump(&self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

pub fn memory_logger() -> ImplementationType {
    ImplementationType::new(|_| Ok(MemoryLogger::default()))
}

pub fn logger_binding() -> ServiceBinding {
    ServiceBinding::new::<MemoryLogger, dyn Logger>(|c| c)
}

pub fn clock_binding() -> ServiceBinding {
    ServiceBinding::new::<FixedClock, dyn Clock>(|c| c)
}

pub fn service_binding() -> ServiceBinding {
    ServiceBinding::new::<LoggingService, dyn Service>(|c| c)
}

/// A service taking its logger through the constructor.
pub fn logging_service() -> ImplementationType {
    ImplementationType::new(|ctx| {
        Ok(LoggingService {
            logger: ctx.get::<dyn Logger>()?,
            clock: None,
        })
    })
}

pub fn probe(name: &str, journal: &Journal) -> ImplementationType {
    let name = name.to_string();
    let journal = journal.clone();
    ImplementationType::new(move |_| {
        journal.record(format!("built:{}", name));
        Ok(Probe {
            name: name.clone(),
            journal: journal.clone(),
        })
    })
}
