use ferrous_injector::{
    arg, Argument, Class, DiError, InjectFlags, Injector, Provider, Resolver, Token,
    DEFAULT_MAX_DEPTH,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct Counter(usize);

fn counting_class(counter: &Arc<AtomicUsize>) -> Class {
    let counter = counter.clone();
    Class::from_fn(move |_| Ok(Counter(counter.fetch_add(1, Ordering::SeqCst))))
}

#[test]
fn test_value_round_trip_is_identity() {
    let root = Injector::root(vec![Provider::value(Token::named("config"), String::from("v"))], true)
        .unwrap();
    let child = root.create_child(vec![], true).unwrap();

    let first = root.get_any(&Token::named("config"), InjectFlags::DEFAULT).unwrap().unwrap();
    for flags in [InjectFlags::DEFAULT, InjectFlags::SKIP_CACHE, InjectFlags::OPTIONAL] {
        let again = root.get_any(&Token::named("config"), flags).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &again));
        let from_child = child.get_any(&Token::named("config"), flags).unwrap().unwrap();
        assert!(Arc::ptr_eq(&first, &from_child));
    }

    // Skipping self past the root never finds anything
    assert!(matches!(
        root.get_any(&Token::named("config"), InjectFlags::SKIP_SELF),
        Err(DiError::NotFound(_))
    ));
}

#[test]
fn test_class_provider_is_cached_by_default() {
    let counter = Arc::new(AtomicUsize::new(0));
    let root = Injector::root(vec![Provider::class(counting_class(&counter))], true).unwrap();

    let a = root.get::<Counter>().unwrap();
    let b = root.get::<Counter>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_transient_class_is_rebuilt_every_time() {
    let counter = Arc::new(AtomicUsize::new(0));
    let root = Injector::root(vec![Provider::class(counting_class(&counter)).transient()], true)
        .unwrap();

    let a = root.get::<Counter>().unwrap();
    let b = root.get::<Counter>().unwrap();
    assert!(!Arc::ptr_eq(&a, &b));
    assert_eq!((a.0, b.0), (0, 1));
}

#[test]
fn test_factory_receives_resolved_dependencies() {
    let root = Injector::root(
        vec![
            Provider::value(Token::named("host"), "localhost"),
            Provider::value(Token::named("port"), 5432u16),
            Provider::factory(
                Token::named("url"),
                vec![
                    ferrous_injector::Dependency::token("host"),
                    ferrous_injector::Dependency::token("port"),
                ],
                |args| {
                    let host = args.get::<&str>(0)?;
                    let port = args.get::<u16>(1)?;
                    Ok(arg(format!("{}:{}", host, port)))
                },
            ),
        ],
        true,
    )
    .unwrap();

    let url = root.get_token::<String>(&Token::named("url"), InjectFlags::DEFAULT).unwrap();
    assert_eq!(url.as_deref().map(String::as_str), Some("localhost:5432"));
}

#[test]
fn test_factory_is_not_cached_unless_asked() {
    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let root = Injector::root(
        vec![Provider::factory_of(move |_| Ok(Counter(c.fetch_add(1, Ordering::SeqCst))))],
        true,
    )
    .unwrap();

    root.get::<Counter>().unwrap();
    root.get::<Counter>().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    let calls = Arc::new(AtomicUsize::new(0));
    let c = calls.clone();
    let cached = Injector::root(
        vec![Provider::factory_of(move |_| Ok(Counter(c.fetch_add(1, Ordering::SeqCst)))).cacheable(true)],
        true,
    )
    .unwrap();
    cached.get::<Counter>().unwrap();
    cached.get::<Counter>().unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_alias_resolves_target_token() {
    let root = Injector::root(
        vec![
            Provider::value(Token::named("primary"), 1u8),
            Provider::alias(Token::named("main"), Token::named("primary")),
        ],
        true,
    )
    .unwrap();

    let main = root.get_any(&Token::named("main"), InjectFlags::DEFAULT).unwrap().unwrap();
    let primary = root.get_any(&Token::named("primary"), InjectFlags::DEFAULT).unwrap().unwrap();
    assert!(Arc::ptr_eq(&main, &primary));
}

#[test]
fn test_default_provider_prefers_ancestor() {
    let root = Injector::root(vec![Provider::value(Token::named("level"), "root")], true).unwrap();
    let child = root
        .create_child(
            vec![Provider::default_for(Provider::value(Token::named("level"), "fallback"))],
            true,
        )
        .unwrap();
    let level = child.get_token::<&str>(&Token::named("level"), InjectFlags::DEFAULT).unwrap();
    assert_eq!(level.as_deref(), Some(&"root"));

    let lonely = Injector::root(
        vec![Provider::default_for(Provider::value(Token::named("level"), "fallback"))],
        true,
    )
    .unwrap();
    let level = lonely.get_token::<&str>(&Token::named("level"), InjectFlags::DEFAULT).unwrap();
    assert_eq!(level.as_deref(), Some(&"fallback"));
}

#[test]
fn test_child_override_shadows_parent() {
    let root = Injector::root(vec![Provider::value(Token::named("name"), "root")], true).unwrap();
    let child = root
        .create_child(vec![Provider::value(Token::named("name"), "child")], true)
        .unwrap();

    let name = |injector: &Injector| {
        injector
            .get_token::<&str>(&Token::named("name"), InjectFlags::DEFAULT)
            .unwrap()
            .map(|v| *v)
    };
    assert_eq!(name(&child), Some("child"));
    assert_eq!(name(&root), Some("root"));

    let parent_view = child
        .get_token::<&str>(&Token::named("name"), InjectFlags::SKIP_SELF)
        .unwrap();
    assert_eq!(parent_view.as_deref(), Some(&"root"));
}

#[test]
fn test_self_flag_stops_at_caller() {
    let root = Injector::root(vec![Provider::value(Token::named("x"), 1u8)], true).unwrap();
    let child = root.create_child(vec![], true).unwrap();

    // Populate the child's cache with a value owned by the root
    child.get_any(&Token::named("x"), InjectFlags::DEFAULT).unwrap();

    assert!(matches!(
        child.get_any(&Token::named("x"), InjectFlags::SELF),
        Err(DiError::NotFound(_))
    ));
    assert!(child
        .get_any(&Token::named("x"), InjectFlags::SELF | InjectFlags::OPTIONAL)
        .unwrap()
        .is_none());
    assert!(root.get_any(&Token::named("x"), InjectFlags::SELF).unwrap().is_some());
}

#[test]
fn test_skip_self_with_self_is_never_satisfied() {
    let root = Injector::root(vec![Provider::value(Token::named("x"), 1u8)], true).unwrap();
    let child = root.create_child(vec![], true).unwrap();

    let flags = InjectFlags::SKIP_SELF | InjectFlags::SELF;
    assert!(matches!(child.get_any(&Token::named("x"), flags), Err(DiError::NotFound(_))));
    assert!(child
        .get_any(&Token::named("x"), flags | InjectFlags::OPTIONAL)
        .unwrap()
        .is_none());
}

#[test]
fn test_create_bypasses_registered_provider() {
    let counter = Arc::new(AtomicUsize::new(100));
    let root = Injector::root(vec![Provider::value_of(Counter(0))], true).unwrap();

    let created = root.create(&counting_class(&counter), vec![]).unwrap();
    assert_eq!(created.downcast_ref::<Counter>().unwrap().0, 100);
    assert_eq!(root.get::<Counter>().unwrap().0, 0);
}

#[test]
fn test_set_binds_class_to_other_token() {
    let counter = Arc::new(AtomicUsize::new(7));
    let root = Injector::root(vec![], true).unwrap();
    root.set("counter", counting_class(&counter));

    let value = root.get_token::<Counter>(&Token::named("counter"), InjectFlags::DEFAULT).unwrap();
    assert_eq!(value.unwrap().0, 7);
    assert!(root.get_optional::<Counter>().unwrap().is_none());
}

#[test]
fn test_empty_values_are_valid_results() {
    let root = Injector::root(vec![Provider::value_arg(Token::named("nothing"), None)], true)
        .unwrap();
    let value: Argument = root.get_any(&Token::named("nothing"), InjectFlags::DEFAULT).unwrap();
    assert!(value.is_none());
    assert!(matches!(
        root.get_token::<u8>(&Token::named("nothing"), InjectFlags::DEFAULT),
        Ok(None)
    ));
}

#[test]
fn test_type_mismatch_is_reported() {
    let root = Injector::root(vec![Provider::value(Token::named("n"), 1u8)], true).unwrap();
    assert!(matches!(
        root.get_token::<String>(&Token::named("n"), InjectFlags::DEFAULT),
        Err(DiError::TypeMismatch(_))
    ));
}

#[test]
fn test_factory_can_inject_resolving_injector() {
    let root = Injector::root(
        vec![Provider::factory(
            Token::named("owner"),
            vec![ferrous_injector::Dependency::on::<Injector>()],
            |args| Ok(arg(args.get::<Injector>(0)?.id())),
        )],
        true,
    )
    .unwrap();
    let child = root.create_child(vec![], true).unwrap();

    let owner = child
        .get_token::<ferrous_injector::InjectorId>(&Token::named("owner"), InjectFlags::DEFAULT)
        .unwrap()
        .unwrap();
    // Unscoped providers resolve at the calling injector
    assert_eq!(*owner, child.id());

    let owner = root
        .get_token::<ferrous_injector::InjectorId>(&Token::named("owner"), InjectFlags::DEFAULT)
        .unwrap()
        .unwrap();
    assert_eq!(*owner, root.id());
}

#[test]
fn test_root_alias_follows_child_override() {
    let root = Injector::root(
        vec![
            Provider::value(Token::named("console"), "root"),
            Provider::alias(Token::named("logger"), Token::named("console")),
        ],
        true,
    )
    .unwrap();
    let child = root
        .create_child(vec![Provider::value(Token::named("console"), "child")], true)
        .unwrap();

    let logger = |injector: &Injector| {
        injector
            .get_token::<&str>(&Token::named("logger"), InjectFlags::DEFAULT)
            .unwrap()
            .map(|v| *v)
    };
    assert_eq!(logger(&child), Some("child"));
    assert_eq!(logger(&root), Some("root"));
    // Served again from the child's provider cache
    assert_eq!(logger(&child), Some("child"));
}

#[test]
fn test_root_factory_sees_child_only_tokens() {
    let root = Injector::root(
        vec![Provider::factory(
            Token::named("greeting"),
            vec![ferrous_injector::Dependency::token("user")],
            |args| Ok(arg(format!("hello {}", args.get::<&str>(0)?))),
        )],
        true,
    )
    .unwrap();
    let child = root
        .create_child(vec![Provider::value(Token::named("user"), "ada")], true)
        .unwrap();

    let greeting = child.get_token::<String>(&Token::named("greeting"), InjectFlags::DEFAULT).unwrap();
    assert_eq!(greeting.as_deref().map(String::as_str), Some("hello ada"));
    assert!(matches!(
        root.get_token::<String>(&Token::named("greeting"), InjectFlags::DEFAULT),
        Err(DiError::NotFound(_))
    ));
}

#[test]
fn test_local_tokens_lists_registrations() {
    let root = Injector::root(vec![Provider::value(Token::named("a"), 1u8)], true).unwrap();
    root.tag("group", ["a"]).unwrap();
    let mut names: Vec<String> = root.local_tokens().iter().map(|t| t.to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["a", "group"]);
}

#[test]
fn test_self_dependent_factory_hits_depth_limit() {
    let root = Injector::root(
        vec![Provider::factory(
            Token::named("loop"),
            vec![ferrous_injector::Dependency::token("loop")],
            |args| Ok(args.raw(0)?.clone()),
        )],
        true,
    )
    .unwrap();

    assert_eq!(
        root.get_any(&Token::named("loop"), InjectFlags::DEFAULT).err(),
        Some(DiError::DepthExceeded(DEFAULT_MAX_DEPTH))
    );
    // The guard unwinds, so the injector stays usable
    root.add(Provider::value(Token::named("after"), 1u8));
    assert!(root.get_any(&Token::named("after"), InjectFlags::DEFAULT).is_ok());
}

#[test]
fn test_alias_cycle_hits_depth_limit() {
    let root = Injector::root(
        vec![
            Provider::alias(Token::named("ping"), Token::named("pong")),
            Provider::alias(Token::named("pong"), Token::named("ping")),
        ],
        true,
    )
    .unwrap();
    let child = root.create_child(vec![], true).unwrap();

    assert!(matches!(
        child.get_any(&Token::named("ping"), InjectFlags::DEFAULT),
        Err(DiError::DepthExceeded(_))
    ));
}
