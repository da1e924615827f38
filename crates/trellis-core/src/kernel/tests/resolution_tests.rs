use std::sync::Arc;

use crate::kernel::tests::common::*;
use crate::kernel::{
    Error, ImplementationType, Kernel, Lifestyle, Locator, Parameters, Properties,
    ServiceProvider, ServiceType,
};

fn connect_logger(kernel: &Kernel, id: &str, lifestyle: Lifestyle) -> String {
    kernel
        .connect(
            Some(id),
            vec![logger_binding()],
            memory_logger(),
            lifestyle,
            Parameters::new(),
            Properties::new(),
        )
        .expect("connect logger")
}

#[test]
fn test_transient_resolutions_are_distinct() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "logger", Lifestyle::Transient);

    let first = kernel.get::<dyn Logger>().unwrap().expect("first logger");
    let second = kernel.get::<dyn Logger>().unwrap().expect("second logger");
    assert!(!Arc::ptr_eq(&first, &second));

    let by_id = kernel.get_service_by_id("logger").unwrap().expect("by id");
    let again = kernel.get_service_by_id("logger").unwrap().expect("by id again");
    assert!(!by_id.ptr_eq(&again));
}

#[test]
fn test_singleton_resolutions_share_identity() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "logger", Lifestyle::Singleton);

    let by_type = kernel.get::<dyn Logger>().unwrap().expect("by type");
    let by_id = kernel.get_named::<dyn Logger>("logger").unwrap().expect("by id");
    let again = kernel.get::<dyn Logger>().unwrap().expect("again");

    assert!(Arc::ptr_eq(&by_type, &by_id));
    assert!(Arc::ptr_eq(&by_type, &again));
}

#[test]
fn test_dependency_injection_only_is_cached() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "logger", Lifestyle::DependencyInjectionOnly);

    let first = kernel.get_service_by_id("logger").unwrap().expect("first");
    let second = kernel.get_service_by_id("logger").unwrap().expect("second");
    assert!(first.ptr_eq(&second));
}

#[test]
fn test_unregistered_service_is_absent() {
    let kernel = Kernel::new();

    assert!(kernel.get::<dyn Logger>().unwrap().is_none());
    assert!(kernel.get_service_by_id("nobody").unwrap().is_none());
    assert!(!kernel.contains("nobody"));
    assert!(!kernel.contains_service::<dyn Logger>());
}

#[test]
fn test_get_named_requires_compatible_service() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "logger", Lifestyle::Singleton);

    assert!(kernel.get_named::<dyn Clock>("logger").unwrap().is_none());
    assert!(kernel.get_named::<dyn Logger>("logger").unwrap().is_some());
    // The implementation type is always satisfied, even when not advertised.
    assert!(kernel.get_named::<MemoryLogger>("logger").unwrap().is_some());
}

#[test]
fn test_disconnect_evicts_cached_instance() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "logger", Lifestyle::Singleton);
    kernel.get::<dyn Logger>().unwrap().expect("materialized");

    assert!(kernel.disconnect("logger").unwrap());
    assert!(!kernel.contains("logger"));
    assert!(kernel.get_service_by_id("logger").unwrap().is_none());
    assert!(kernel.get::<dyn Logger>().unwrap().is_none());

    assert!(!kernel.disconnect("logger").unwrap());
}

#[test]
fn test_empty_id_is_rejected() {
    let kernel = Kernel::new();

    let err = kernel.disconnect("").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));

    let err = kernel.get_service_by_id("").unwrap_err();
    assert!(matches!(err, Error::InvalidArgument { .. }));
}

#[test]
fn test_missing_id_is_generated() {
    let kernel = Kernel::new();
    let first = kernel
        .connect(
            None,
            vec![logger_binding()],
            memory_logger(),
            Lifestyle::Singleton,
            Parameters::new(),
            Properties::new(),
        )
        .unwrap();
    let second = kernel
        .connect(
            Some(""),
            vec![clock_binding()],
            ImplementationType::new(|_| Ok(FixedClock(1))),
            Lifestyle::Singleton,
            Parameters::new(),
            Properties::new(),
        )
        .unwrap();

    assert!(!first.is_empty());
    assert_ne!(first, second);
    assert!(kernel.contains(&first));
    assert!(kernel.contains(&second));
    assert_eq!(kernel.component_ids(), vec![first, second]);
}

#[test]
fn test_contains_before_materialization() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "logger", Lifestyle::Singleton);

    assert!(kernel.contains("logger"));
    assert!(kernel.contains_service::<dyn Logger>());
    assert!(!kernel.contains_service::<dyn Clock>());
}

#[test]
fn test_first_registration_serves_type_lookup() {
    let kernel = Kernel::new();
    kernel
        .connect(
            Some("early"),
            vec![clock_binding()],
            ImplementationType::new(|_| Ok(FixedClock(1))),
            Lifestyle::Singleton,
            Parameters::new(),
            Properties::new(),
        )
        .unwrap();
    kernel
        .connect(
            Some("late"),
            vec![clock_binding()],
            ImplementationType::new(|_| Ok(FixedClock(2))),
            Lifestyle::Singleton,
            Parameters::new(),
            Properties::new(),
        )
        .unwrap();

    let clock = kernel.get::<dyn Clock>().unwrap().expect("clock");
    assert_eq!(clock.now(), 1);
    let late = kernel.get_named::<dyn Clock>("late").unwrap().expect("late");
    assert_eq!(late.now(), 2);
}

#[test]
fn test_kernel_resolves_itself() {
    let kernel = Kernel::new();

    let by_type = kernel.get::<Kernel>().unwrap().expect("kernel by type");
    assert!(Arc::ptr_eq(&by_type, &kernel));

    let locator = kernel.get::<dyn Locator>().unwrap().expect("locator");
    assert!(locator.contains_type(&ServiceType::of::<Kernel>()));
    assert!(!locator.contains("kernel"));
    assert!(kernel.component_ids().is_empty());
    let provider = kernel.get::<dyn ServiceProvider>().unwrap().expect("provider");
    assert!(provider
        .get_service(&ServiceType::of::<Kernel>())
        .unwrap()
        .is_some());
}

#[test]
fn test_locator_trait_object_lookups() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "logger", Lifestyle::Singleton);

    let locator: Arc<dyn Locator> = kernel.clone();
    let logger = locator.get::<dyn Logger>().unwrap().expect("logger");
    let named = locator.get_named::<dyn Logger>("logger").unwrap().expect("named");
    assert!(Arc::ptr_eq(&logger, &named));
    assert!(locator.get_named::<dyn Clock>("logger").unwrap().is_none());
}

#[test]
fn test_logger_and_transient_service_scenario() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "L", Lifestyle::Singleton);
    kernel
        .connect(
            Some("S"),
            vec![service_binding()],
            logging_service(),
            Lifestyle::Transient,
            Parameters::new(),
            Properties::new(),
        )
        .unwrap();

    let first = kernel.get_named::<dyn Service>("S").unwrap().expect("service");
    let second = kernel.get_named::<dyn Service>("S").unwrap().expect("service");
    assert!(!Arc::ptr_eq(&first, &second));

    let logger = kernel.get_named::<dyn Logger>("L").unwrap().expect("logger");
    assert!(Arc::ptr_eq(&first.logger().expect("first logger"), &logger));
    assert!(Arc::ptr_eq(&second.logger().expect("second logger"), &logger));
}

#[test]
fn test_kernel_self_entry_leaves_ids_free() {
    let kernel = Kernel::new();
    connect_logger(&kernel, "kernel", Lifestyle::Singleton);

    kernel.start().unwrap();
    let logger = kernel.get_named::<dyn Logger>("kernel").unwrap().expect("user component");
    let by_type = kernel.get::<dyn Logger>().unwrap().expect("by type");
    assert!(Arc::ptr_eq(&logger, &by_type));

    assert!(kernel.disconnect("kernel").unwrap());
    assert!(kernel.get_service_by_id("kernel").unwrap().is_none());
    let locator = kernel.get::<dyn Locator>().unwrap().expect("self still resolves");
    assert!(locator.contains_type(&ServiceType::of::<dyn ServiceProvider>()));
}
