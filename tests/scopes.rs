use ferrous_injector::{
    Class, DiError, InjectFlags, Injector, InjectorConfig, Lifetime, Provider, Resolver, Scope,
    ScopeRequest, Token,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[derive(Debug)]
struct RequestContext {
    id: usize,
}

fn scoped_root(counter: &Arc<AtomicUsize>) -> Injector {
    let counter = counter.clone();
    Injector::root(
        vec![Provider::factory_of(move |_| {
            Ok(RequestContext { id: counter.fetch_add(1, Ordering::SeqCst) })
        })
        .cacheable(true)
        .with_lifetime(Lifetime::SCOPED)],
        true,
    )
    .unwrap()
}

#[test]
fn test_scoped_lifetime_per_child() {
    let counter = Arc::new(AtomicUsize::new(1));
    let root = scoped_root(&counter);

    let scope1 = root.create_child(vec![], true).unwrap();
    let scope2 = root.create_child(vec![], true).unwrap();

    let ctx1a = scope1.get_required::<RequestContext>();
    let ctx1b = scope1.get_required::<RequestContext>();
    let ctx2a = scope2.get_required::<RequestContext>();
    let ctx2b = scope2.get_required::<RequestContext>();

    // Same instance within same scope
    assert!(Arc::ptr_eq(&ctx1a, &ctx1b));
    assert!(Arc::ptr_eq(&ctx2a, &ctx2b));

    // Different instances across scopes
    assert!(!Arc::ptr_eq(&ctx1a, &ctx2a));
    assert_eq!((ctx1a.id, ctx2a.id), (1, 2));
}

#[test]
fn test_cannot_resolve_scoped_from_root() {
    let counter = Arc::new(AtomicUsize::new(0));
    let root = scoped_root(&counter);

    let result = root.get::<RequestContext>();
    assert!(
        matches!(
            result,
            Err(DiError::ScopeViolation { provider_scope: 2, injector_scope: 1, .. })
        ),
        "Expected a scope violation when resolving a scoped provider from the root"
    );

    // Optional never hides a wiring error
    assert!(root.get_optional::<RequestContext>().is_err());
    assert_eq!(counter.load(Ordering::SeqCst), 0);
}

#[test]
fn test_descendants_share_their_tier_instance() {
    let counter = Arc::new(AtomicUsize::new(0));
    let root = scoped_root(&counter);
    let request = root.create_child(vec![], true).unwrap();
    let nested_a = request.create_child(vec![], true).unwrap();
    let nested_b = request.create_child(vec![], false).unwrap();

    let from_a = nested_a.get::<RequestContext>().unwrap();
    let from_b = nested_b.get::<RequestContext>().unwrap();
    let from_request = request.get::<RequestContext>().unwrap();

    assert!(Arc::ptr_eq(&from_a, &from_b));
    assert!(Arc::ptr_eq(&from_a, &from_request));
    assert_eq!(counter.load(Ordering::SeqCst), 1);
}

#[test]
fn test_local_override_does_not_leak_to_sibling() {
    let counter = Arc::new(AtomicUsize::new(0));
    let root = scoped_root(&counter);

    let overridden = root
        .create_child(vec![Provider::value_of(RequestContext { id: 99 })], true)
        .unwrap();
    let sibling = root.create_child(vec![], true).unwrap();

    assert_eq!(overridden.get::<RequestContext>().unwrap().id, 99);
    assert_eq!(sibling.get::<RequestContext>().unwrap().id, 0);
}

#[test]
fn test_class_provider_inherits_registration_scope() {
    struct Session;
    let root = Injector::root(vec![], true).unwrap();
    let child = root.create_child(vec![], true).unwrap();
    child.add_class(Class::from_fn(|_| Ok(Session)));

    let grandchild = child.create_child(vec![], true).unwrap();
    let a = grandchild.get::<Session>().unwrap();
    let b = child.get::<Session>().unwrap();
    assert!(Arc::ptr_eq(&a, &b));
    assert!(root.get_optional::<Session>().unwrap().is_none());
}

#[test]
fn test_singleton_slot_spans_sibling_scopes() {
    struct Pool;
    let built = Arc::new(AtomicUsize::new(0));
    let b = built.clone();
    let root = Injector::root(vec![], true).unwrap();
    let provider = Provider::class(Class::from_fn(move |_| {
        b.fetch_add(1, Ordering::SeqCst);
        Ok(Pool)
    }))
    .with_lifetime(Lifetime::SCOPED)
    .singleton();
    root.add(provider);

    let first = root.create_child(vec![], true).unwrap().get::<Pool>().unwrap();
    let second = root.create_child(vec![], true).unwrap().get::<Pool>().unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(built.load(Ordering::SeqCst), 1);
}

#[test]
fn test_child_scope_rules() {
    let root = Injector::root(vec![], true).unwrap();
    assert_eq!(root.scope(), Scope::ROOT);
    assert!(root.is_root());

    let same = root.create_child(vec![], false).unwrap();
    assert_eq!(same.scope().id(), 1);

    let deep = root.create_child(vec![], 4).unwrap();
    assert_eq!(deep.scope().id(), 4);
    assert_eq!(deep.create_child(vec![], true).unwrap().scope().id(), 5);

    assert!(matches!(
        deep.create_child(vec![], 3),
        Err(DiError::InvalidScope { requested: 3, parent: 4 })
    ));
    assert!(matches!(root.create_child(vec![], 0), Err(DiError::InvalidScope { .. })));
    assert!(matches!(root.create_child(vec![], -2), Err(DiError::InvalidScope { .. })));
    assert!(Injector::root(vec![], -1).is_err());
}

#[test]
fn test_new_child_of_last_level_is_an_error() {
    let root = Injector::root(vec![], u32::MAX).unwrap();
    assert_eq!(root.scope().id(), u32::MAX);
    assert!(matches!(
        root.create_child(vec![], true),
        Err(DiError::InvalidScope { parent: u32::MAX, .. })
    ));
    assert_eq!(root.create_child(vec![], false).unwrap().scope().id(), u32::MAX);
}

#[test]
fn test_unscoped_classes_are_cached_per_registering_injector() {
    let counter = Arc::new(AtomicUsize::new(1));
    let class = |counter: &Arc<AtomicUsize>| {
        let counter = counter.clone();
        Provider::class(Class::from_fn(move |_| {
            Ok(RequestContext { id: counter.fetch_add(1, Ordering::SeqCst) })
        }))
        .with_lifetime(Lifetime::Unscoped)
    };

    let first = Injector::root(vec![class(&counter)], true).unwrap();
    let second = Injector::root(vec![class(&counter)], true).unwrap();
    assert_eq!(first.local_tokens().len(), 1);

    let a1 = first.get_required::<RequestContext>();
    let a2 = first.get_required::<RequestContext>();
    let b1 = second.get_required::<RequestContext>();
    let b2 = second.get_required::<RequestContext>();

    assert!(Arc::ptr_eq(&a1, &a2));
    assert!(Arc::ptr_eq(&b1, &b2));
    assert!(!Arc::ptr_eq(&a1, &b1));
    assert_ne!(a1.id, b1.id);
    assert_eq!(counter.load(Ordering::SeqCst), 3);
}

#[test]
fn test_tier_skipping_children_resolve_scoped_providers() {
    let counter = Arc::new(AtomicUsize::new(0));
    let root = scoped_root(&counter);
    let deep = root.create_child(vec![], 5).unwrap();
    assert!(deep.get::<RequestContext>().is_ok());
}

#[test]
fn test_named_tiers_come_from_configuration() {
    let root = Injector::builder()
        .config(InjectorConfig::default().with_tier("request", 3))
        .build()
        .unwrap();

    let request = root.create_child(vec![], ScopeRequest::named("request")).unwrap();
    assert_eq!(request.scope().id(), 3);
    assert!(matches!(
        root.create_child(vec![], ScopeRequest::named("job")),
        Err(DiError::Config(_))
    ));

    let scoped = root.create_child(vec![], ScopeRequest::named("scoped")).unwrap();
    assert_eq!(scoped.scope().id(), 2);
}

#[test]
fn test_root_scope_from_configuration() {
    let root = Injector::builder()
        .config(InjectorConfig::default().with_root_scope(3))
        .build()
        .unwrap();
    assert_eq!(root.scope().id(), 3);

    let explicit = Injector::builder()
        .config(InjectorConfig::default().with_root_scope(3))
        .scope(true)
        .build()
        .unwrap();
    assert_eq!(explicit.scope().id(), 1);
}

#[test]
fn test_scope_violation_inside_dependency_chain() {
    struct Handler;
    let root = Injector::root(
        vec![
            Provider::value(Token::named("request"), 1u8).with_lifetime(Lifetime::SCOPED),
            Provider::factory(
                Token::of::<Handler>(),
                vec![ferrous_injector::Dependency::token("request")],
                |_| Ok(ferrous_injector::arg(Handler)),
            ),
        ],
        true,
    )
    .unwrap();
    let child = root.create_child(vec![], true).unwrap();

    // The factory is unscoped, so it resolves at the caller
    assert!(matches!(
        root.get_any(&Token::of::<Handler>(), InjectFlags::DEFAULT),
        Err(DiError::ScopeViolation { .. })
    ));
    assert!(child.get::<Handler>().is_ok());
}
