use std::sync::Arc;

use crate::kernel::descriptor::{Descriptor, DescriptorStore};
use crate::kernel::instance::InstanceStore;
use crate::kernel::tests::common::*;
use crate::kernel::{
    Error, ImplementationType, Instance, Lifestyle, Parameters, Properties, ServiceBinding,
    ServiceType,
};

fn descriptor(id: &str, services: Vec<ServiceBinding>) -> Descriptor {
    Descriptor::new(
        id,
        services,
        memory_logger(),
        Lifestyle::Singleton,
        Parameters::new(),
        Properties::new(),
    )
}

fn logger_instance() -> Instance {
    Instance::owned(MemoryLogger::default(), Arc::from(vec![logger_binding()]))
}

#[test]
fn test_descriptor_store_rejects_empty_id() {
    let mut store = DescriptorStore::new();
    let err = store.add(descriptor("", Vec::new())).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { ref name } if name == "descriptor.id"));
    assert!(store.is_empty());
}

#[test]
fn test_descriptor_store_keeps_registration_order() {
    let mut store = DescriptorStore::new();
    store.add(descriptor("b", Vec::new())).unwrap();
    store.add(descriptor("a", vec![logger_binding()])).unwrap();
    store.add(descriptor("c", vec![logger_binding()])).unwrap();

    let ids: Vec<&str> = store.iter().map(|d| d.id()).collect();
    assert_eq!(ids, vec!["b", "a", "c"]);

    let logger = ServiceType::of::<dyn Logger>();
    assert_eq!(store.get_by_type(&logger).unwrap().id(), "a");
    assert!(store.contains_type(&logger));
    assert!(!store.contains_type(&ServiceType::of::<dyn Clock>()));
}

#[test]
fn test_descriptor_store_first_id_wins() {
    let mut store = DescriptorStore::new();
    let first = store.add(descriptor("dup", Vec::new())).unwrap();
    store.add(descriptor("dup", vec![logger_binding()])).unwrap();

    assert_eq!(store.len(), 2);
    assert!(Arc::ptr_eq(&store.get("dup").unwrap(), &first));

    assert!(store.remove("dup"));
    assert!(store.is_empty());
    assert!(!store.contains("dup"));
    assert!(!store.remove("dup"));
}

#[test]
fn test_descriptor_declaring_origin_is_write_once() {
    let descriptor = descriptor("logger", Vec::new());
    assert_eq!(descriptor.declared_by(), None);

    descriptor.declare("components.json").unwrap();
    assert_eq!(descriptor.declared_by(), Some("components.json"));

    let err = descriptor.declare("other.json").unwrap_err();
    assert!(matches!(err, Error::WriteOnceViolated { .. }));
    assert_eq!(descriptor.declared_by(), Some("components.json"));
}

#[test]
fn test_instance_store_keys_are_independent() {
    let mut store = InstanceStore::new();
    let logger = ServiceType::of::<dyn Logger>();
    let first = logger_instance();
    let second = logger_instance();

    store.add(Some("first"), &[logger], first.clone());
    store.add(Some("second"), &[logger], second.clone());

    assert!(store.get("first").unwrap().ptr_eq(&first));
    assert!(store.get("second").unwrap().ptr_eq(&second));
    // Last write wins per service type.
    assert!(store.get_by_type(&logger).unwrap().ptr_eq(&second));
    assert_eq!(store.len(), 2);
}

#[test]
fn test_instance_store_drops_fully_displaced_instance() {
    let mut store = InstanceStore::new();
    let logger = ServiceType::of::<dyn Logger>();

    store.add(None, &[logger], logger_instance());
    let replacement = logger_instance();
    store.add(None, &[logger], replacement.clone());

    assert_eq!(store.len(), 1);
    assert!(store.instances()[0].ptr_eq(&replacement));
}

#[test]
fn test_instance_store_remove_clears_type_keys() {
    let mut store = InstanceStore::new();
    let logger = ServiceType::of::<dyn Logger>();
    store.add(Some("logger"), &[logger], logger_instance());

    assert!(store.remove("logger"));
    assert!(!store.contains("logger"));
    assert!(!store.contains_type(&logger));
    assert!(store.is_empty());
    assert!(!store.remove("logger"));
}

#[test]
fn test_instance_store_remove_keeps_newer_type_owner() {
    let mut store = InstanceStore::new();
    let logger = ServiceType::of::<dyn Logger>();
    store.add(Some("old"), &[logger], logger_instance());
    let newer = logger_instance();
    store.add(Some("new"), &[logger], newer.clone());

    assert!(store.remove("old"));
    assert!(store.get_by_type(&logger).unwrap().ptr_eq(&newer));
}

#[test]
fn test_instance_store_lists_each_instance_once() {
    let mut store = InstanceStore::new();
    let clock = Instance::owned(FixedClock(3), Arc::from(vec![clock_binding()]));
    let services = [ServiceType::of::<dyn Clock>(), ServiceType::of::<FixedClock>()];
    store.add(Some("clock"), &services, clock.clone());
    store.add(Some("logger"), &[ServiceType::of::<dyn Logger>()], logger_instance());

    let all = store.instances();
    assert_eq!(all.len(), 2);
    assert!(all[0].ptr_eq(&clock));
    assert_eq!(all[1].implementation(), ServiceType::of::<MemoryLogger>());
}

#[test]
fn test_instance_casts_to_declared_services_only() {
    let clock = Instance::owned(FixedClock(9), Arc::from(vec![clock_binding()]));

    assert_eq!(clock.cast::<dyn Clock>().unwrap().now(), 9);
    assert_eq!(clock.cast::<FixedClock>().unwrap().0, 9);
    assert!(clock.cast::<dyn Logger>().is_none());
    assert!(clock.satisfies(&ServiceType::of::<dyn Clock>()));
    assert!(!clock.satisfies(&ServiceType::of::<dyn Logger>()));
    assert_eq!(
        clock.component().unwrap().component_name(),
        std::any::type_name::<FixedClock>()
    );

    let implementation = ImplementationType::new(|_| Ok(FixedClock(0)));
    assert_eq!(implementation.service_type(), clock.implementation());
}
