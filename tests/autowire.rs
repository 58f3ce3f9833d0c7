use ferrous_container::{
    id_of, Arguments, ClassDescriptor, Concrete, Container, DiError, DiResult, Injectable,
    ParameterDescriptor,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

struct SomeDependency;

impl Injectable for SomeDependency {
    fn describe() -> ClassDescriptor {
        ClassDescriptor::of::<SomeDependency>().construct(|_| Ok(SomeDependency))
    }
}

struct DependentClass {
    dependency: Arc<SomeDependency>,
}

impl Injectable for DependentClass {
    fn describe() -> ClassDescriptor {
        ClassDescriptor::of::<DependentClass>()
            .param(ParameterDescriptor::service::<SomeDependency>("dependency"))
            .construct(|args| {
                Ok(DependentClass {
                    dependency: args.get(0)?,
                })
            })
    }
}

struct ClassWithOptionalDependency {
    dependency: Option<Arc<SomeDependency>>,
}

impl Injectable for ClassWithOptionalDependency {
    fn describe() -> ClassDescriptor {
        ClassDescriptor::of::<ClassWithOptionalDependency>()
            .param(ParameterDescriptor::service::<SomeDependency>("dependency").default_null())
            .construct(|args| {
                Ok(ClassWithOptionalDependency {
                    dependency: args.optional(0)?,
                })
            })
    }
}

struct Mailer {
    host: String,
    retries: u32,
}

impl Injectable for Mailer {
    fn describe() -> ClassDescriptor {
        ClassDescriptor::of::<Mailer>()
            .param(ParameterDescriptor::builtin::<String>("host"))
            .param(ParameterDescriptor::builtin::<u32>("retries").with_default(3u32))
            .construct(|args| {
                Ok(Mailer {
                    host: args.cloned(0)?,
                    retries: args.cloned(1)?,
                })
            })
    }
}

#[test]
fn test_resolves_registered_dependency() {
    let container = Container::new();
    container.instance(id_of::<SomeDependency>(), SomeDependency);

    let registered = container.get_type::<SomeDependency>().unwrap();
    let resolved = container.resolve::<DependentClass>().unwrap();

    assert!(Arc::ptr_eq(&resolved.dependency, &registered));
}

#[test]
fn test_resolves_known_class_dependency() {
    let container = Container::new();
    container.register_class::<SomeDependency>();

    let a = container.resolve::<DependentClass>().unwrap();
    let b = container.resolve::<DependentClass>().unwrap();

    // Autowired classes are not cached.
    assert!(!Arc::ptr_eq(&a.dependency, &b.dependency));
}

#[test]
fn test_unknown_dependency_is_unresolved() {
    let container = Container::new();

    assert_eq!(
        container.resolve::<DependentClass>().err(),
        Some(DiError::UnresolvedParameter {
            class: id_of::<DependentClass>(),
            parameter: "dependency".into(),
        })
    );
}

#[test]
fn test_container_beats_null_default() {
    let container = Container::new();
    container.instance(id_of::<SomeDependency>(), SomeDependency);

    let resolved = container.resolve::<ClassWithOptionalDependency>().unwrap();
    assert!(resolved.dependency.is_some());
}

#[test]
fn test_null_default_when_unsatisfied() {
    let container = Container::new();

    let resolved = container.resolve::<ClassWithOptionalDependency>().unwrap();
    assert!(resolved.dependency.is_none());
}

#[test]
fn test_builtin_parameters_never_hit_the_container() {
    let container = Container::new();
    container.instance(id_of::<String>(), String::from("from-container"));

    assert_eq!(
        container.resolve::<Mailer>().err(),
        Some(DiError::UnresolvedParameter {
            class: id_of::<Mailer>(),
            parameter: "host".into(),
        })
    );
}

#[test]
fn test_binding_wins_and_default_fills_the_rest() {
    let container = Container::new();
    container.bind_parameter(id_of::<Mailer>(), "host", String::from("smtp.local"));

    let mailer = container.resolve::<Mailer>().unwrap();
    assert_eq!(mailer.host, "smtp.local");
    assert_eq!(mailer.retries, 3);

    container.bind_parameter(id_of::<Mailer>(), "retries", 5u32);
    container.bind_parameter(id_of::<Mailer>(), "host", String::from("smtp.remote"));

    let mailer = container.resolve::<Mailer>().unwrap();
    assert_eq!(mailer.host, "smtp.remote");
    assert_eq!(mailer.retries, 5);
}

#[test]
fn test_binding_beats_container_entry() {
    let container = Container::new();
    let registered = Arc::new(SomeDependency);
    container.register(id_of::<SomeDependency>(), Concrete::shared(registered.clone()), true);
    container.bind_parameter(id_of::<DependentClass>(), "dependency", SomeDependency);

    let resolved = container.resolve::<DependentClass>().unwrap();
    assert!(!Arc::ptr_eq(&resolved.dependency, &registered));
}

#[test]
fn test_binding_of_wrong_type_surfaces_as_mismatch() {
    let container = Container::new();
    container.bind_parameter(id_of::<DependentClass>(), "dependency", ());

    assert!(matches!(
        container.resolve::<DependentClass>(),
        Err(DiError::TypeMismatch(_))
    ));
}

#[test]
fn test_no_constructor_builds_with_empty_arguments() {
    let container = Container::new();
    let resolved = container.resolve::<SomeDependency>();
    assert!(resolved.is_ok());
}

#[test]
fn test_abstract_class_is_not_instantiable() {
    let container = Container::new();
    container.register_class_descriptor(ClassDescriptor::abstract_class("app::Repository"));

    assert_eq!(
        container.resolve_class("app::Repository").unwrap_err(),
        DiError::NotInstantiable("app::Repository".into())
    );
}

#[test]
fn test_unknown_class() {
    let container = Container::new();
    assert_eq!(
        container.resolve_class("app::Nothing").unwrap_err(),
        DiError::UnknownClass("app::Nothing".into())
    );
}

#[test]
fn test_autowired_parameter_builds_unregistered_class() {
    struct Service {
        dependency: Arc<SomeDependency>,
    }

    impl Injectable for Service {
        fn describe() -> ClassDescriptor {
            ClassDescriptor::of::<Service>()
                .param(ParameterDescriptor::autowired::<SomeDependency>("dependency"))
                .construct(|args| Ok(Service { dependency: args.get(0)? }))
        }
    }

    let container = Container::new();
    let service = container.resolve::<Service>().unwrap();
    assert_eq!(Arc::strong_count(&service.dependency), 1);
    assert!(container.has_class(&id_of::<SomeDependency>()));
}

#[test]
fn test_register_autowired_caches_when_shared() {
    let container = Container::new();
    container.register_autowired::<SomeDependency>(true);
    container.register_autowired::<DependentClass>(false);

    let a = container.get_type::<DependentClass>().unwrap();
    let b = container.get_type::<DependentClass>().unwrap();

    assert!(!Arc::ptr_eq(&a, &b));
    assert!(Arc::ptr_eq(&a.dependency, &b.dependency));
}

#[test]
fn test_dependency_failure_aborts_resolution() {
    let container = Container::new();
    container.register(
        id_of::<SomeDependency>(),
        Concrete::try_factory(|_| -> DiResult<SomeDependency> {
            Err(DiError::factory("offline"))
        }),
        true,
    );

    assert_eq!(
        container.resolve::<ClassWithOptionalDependency>().err(),
        Some(DiError::Factory("offline".into()))
    );
}

struct Greeter {
    greeting: String,
    calls: AtomicUsize,
}

impl Injectable for Greeter {
    fn describe() -> ClassDescriptor {
        ClassDescriptor::of::<Greeter>()
            .method(
                "greet",
                vec![
                    ParameterDescriptor::service_id("name", "user.name"),
                    ParameterDescriptor::builtin::<String>("punctuation").with_default(String::from("!")),
                ],
                |greeter: &Greeter, args: &Arguments| {
                    greeter.calls.fetch_add(1, Ordering::SeqCst);
                    Ok(format!(
                        "{} {}{}",
                        greeter.greeting,
                        args.named::<String>("name")?,
                        args.named::<String>("punctuation")?
                    ))
                },
            )
            .construct(|_| {
                Ok(Greeter {
                    greeting: String::from("hello"),
                    calls: AtomicUsize::new(0),
                })
            })
    }
}

#[test]
fn test_resolve_method_autowires_arguments() {
    let container = Container::new();
    container.instance("user.name", String::from("ada"));

    let greeter = container.resolve::<Greeter>().unwrap();
    let result = container.call_method(&greeter, "greet").unwrap();

    assert_eq!(*result.downcast::<String>().unwrap(), "hello ada!");
    assert_eq!(greeter.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_resolve_method_ignores_parameter_bindings() {
    let container = Container::new();
    container.bind_parameter(id_of::<Greeter>(), "name", String::from("bound"));

    let greeter = container.resolve::<Greeter>().unwrap();
    assert_eq!(
        container.call_method(&greeter, "greet").unwrap_err(),
        DiError::UnresolvedParameter {
            class: id_of::<Greeter>(),
            parameter: "name".into(),
        }
    );
}

#[test]
fn test_unknown_method() {
    let container = Container::new();
    let greeter = container.resolve::<Greeter>().unwrap();

    assert_eq!(
        container.call_method(&greeter, "wave").unwrap_err(),
        DiError::UnknownMethod {
            class: id_of::<Greeter>(),
            method: "wave".into(),
        }
    );
}
