use std::sync::OnceLock;

use crate::kernel::error::{Error, Result};

/// A named slot that accepts exactly one assignment.
///
/// A second `set` fails with [`Error::WriteOnceViolated`] carrying the slot
/// name, and the first value is kept.
#[derive(Debug, Clone)]
pub struct WriteOnce<T> {
    name: &'static str,
    cell: OnceLock<T>,
}

impl<T> WriteOnce<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            cell: OnceLock::new(),
        }
    }

    pub fn set(&self, value: T) -> Result<()> {
        self.cell.set(value).map_err(|_| Error::WriteOnceViolated {
            name: self.name.to_string(),
        })
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_set(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
