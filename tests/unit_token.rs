/// Unit tests for tokens, flags and lifetimes

use ferrous_injector::{InjectFlags, Lifetime, ScopeRequest, Token};
use std::collections::HashMap;

#[test]
fn test_type_tokens_match_by_type() {
    struct A;
    struct B;
    assert_eq!(Token::of::<A>(), Token::of::<A>());
    assert_ne!(Token::of::<A>(), Token::of::<B>());
    assert!(Token::of::<A>().is_type());
    assert!(!Token::named("a").is_type());
}

#[test]
fn test_named_tokens_match_by_string() {
    let owned = Token::named(format!("{}.{}", "http", "port"));
    assert_eq!(owned, Token::named("http.port"));
    assert_eq!(owned.display_name(), "http.port");
    assert_eq!(owned.to_string(), "http.port");
}

#[test]
fn test_symbols_are_unique() {
    let first = Token::symbol("logger");
    let second = Token::symbol("logger");
    assert_ne!(first, second);
    assert_ne!(first, Token::named("logger"));
    assert_eq!(first.display_name(), second.display_name());
}

#[test]
fn test_tokens_as_map_keys() {
    let symbol = Token::symbol("s");
    let mut map = HashMap::new();
    map.insert(Token::of::<u8>(), 1);
    map.insert(Token::named("n"), 2);
    map.insert(symbol.clone(), 3);

    assert_eq!(map[&Token::of::<u8>()], 1);
    assert_eq!(map[&Token::from("n")], 2);
    assert_eq!(map[&symbol], 3);
    assert!(!map.contains_key(&Token::symbol("s")));
}

#[test]
fn test_token_debug_output() {
    assert_eq!(format!("{:?}", Token::named("db")), "Named(\"db\")");
    assert!(format!("{:?}", Token::of::<u8>()).starts_with("Type("));
    assert!(format!("{:?}", Token::symbol("x")).starts_with("Symbol(x#"));
}

#[test]
fn test_flag_combinations() {
    let flags = InjectFlags::OPTIONAL | InjectFlags::SKIP_SELF;
    assert!(flags.contains(InjectFlags::OPTIONAL));
    assert!(flags.contains(InjectFlags::SKIP_SELF));
    assert!(!flags.contains(InjectFlags::SELF));
    assert_eq!(flags.without(InjectFlags::SKIP_SELF), InjectFlags::OPTIONAL);
    assert!(InjectFlags::DEFAULT.is_empty());
    assert_eq!(InjectFlags::default(), InjectFlags::DEFAULT);
}

#[test]
fn test_lifetime_levels() {
    assert_eq!(Lifetime::Inherit.level(3), 3);
    assert_eq!(Lifetime::Unscoped.level(3), 0);
    assert_eq!(Lifetime::SCOPED.level(5), 2);
    assert_eq!(Lifetime::from(-1), Lifetime::Inherit);
    assert_eq!(Lifetime::from(0), Lifetime::TRANSIENT);
    assert_eq!(Lifetime::from(1u32), Lifetime::SINGLETON);
}

#[test]
fn test_scope_requests_from_literals() {
    assert_eq!(ScopeRequest::from(true), ScopeRequest::New);
    assert_eq!(ScopeRequest::from(false), ScopeRequest::Parent);
    assert_eq!(ScopeRequest::from(3), ScopeRequest::Level(3));
    assert_eq!(ScopeRequest::from(Lifetime::SCOPED), ScopeRequest::Level(2));
}
