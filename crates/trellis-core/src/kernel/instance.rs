use std::collections::{BTreeMap, HashMap};

use crate::kernel::component::{Instance, ServiceType};

#[derive(Debug)]
struct Slot {
    id: Option<String>,
    services: Vec<ServiceType>,
    instance: Instance,
}

/// Materialized instances of one kernel scope.
///
/// Each instance is reachable by its id (when it has one) and by every
/// service type it was stored under. Ids and service types are independent
/// key spaces; the last write to a key wins. An instance that loses all of
/// its keys is dropped from the store.
#[derive(Debug, Default)]
pub struct InstanceStore {
    slots: BTreeMap<u64, Slot>,
    by_id: HashMap<String, u64>,
    by_type: HashMap<ServiceType, u64>,
    next_seq: u64,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, id: Option<&str>, services: &[ServiceType], instance: Instance) {
        let seq = self.next_seq;
        self.next_seq += 1;

        let id = id.filter(|id| !id.is_empty()).map(str::to_string);
        let mut displaced = Vec::new();
        if let Some(id) = &id {
            displaced.extend(self.by_id.insert(id.clone(), seq));
        }
        for service in services {
            displaced.extend(self.by_type.insert(*service, seq));
        }

        self.slots.insert(
            seq,
            Slot {
                id,
                services: services.to_vec(),
                instance,
            },
        );

        for old in displaced {
            if !self.is_referenced(old) {
                self.slots.remove(&old);
            }
        }
    }

    /// Removes the instance stored under `id` together with all of its keys.
    pub fn remove(&mut self, id: &str) -> bool {
        let Some(seq) = self.by_id.remove(id) else {
            return false;
        };
        if let Some(slot) = self.slots.remove(&seq) {
            for service in &slot.services {
                if self.by_type.get(service) == Some(&seq) {
                    self.by_type.remove(service);
                }
            }
        }
        true
    }

    pub fn get(&self, id: &str) -> Option<Instance> {
        self.by_id
            .get(id)
            .and_then(|seq| self.slots.get(seq))
            .map(|slot| slot.instance.clone())
    }

    pub fn get_by_type(&self, service: &ServiceType) -> Option<Instance> {
        self.by_type
            .get(service)
            .and_then(|seq| self.slots.get(seq))
            .map(|slot| slot.instance.clone())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    pub fn contains_type(&self, service: &ServiceType) -> bool {
        self.by_type.contains_key(service)
    }

    /// Every stored instance once, in insertion order.
    pub fn instances(&self) -> Vec<Instance> {
        self.slots.values().map(|slot| slot.instance.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn is_referenced(&self, seq: u64) -> bool {
        self.by_id.values().any(|s| *s == seq) || self.by_type.values().any(|s| *s == seq)
    }
}
