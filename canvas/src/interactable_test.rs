use super::*;

#[derive(Debug, Clone, PartialEq)]
struct Region(&'static str);

#[test]
fn register_returns_distinct_ids() {
    let registry = InteractableRegistry::new();
    let a = registry.register(Region("a"));
    let b = registry.register(Region("b"));
    assert_ne!(a.id(), b.id());
    assert_eq!(registry.len(), 2);
    assert_eq!(registry.lookup(a.id()), Some(Region("a")));
    assert_eq!(registry.lookup(b.id()), Some(Region("b")));
}

#[test]
fn dropping_guard_unregisters() {
    let registry = InteractableRegistry::new();
    let guard = registry.register(Region("frame"));
    let id = guard.id();
    drop(guard);
    assert!(!registry.contains(id));
    assert!(registry.is_empty());
}

#[test]
fn explicit_unregister_matches_drop() {
    let registry = InteractableRegistry::new();
    let guard = registry.register(Region("frame"));
    let id = guard.id();
    registry.unregister(guard);
    assert!(registry.lookup(id).is_none());
}

#[test]
fn guard_outliving_registry_drops_quietly() {
    let guard = {
        let registry = InteractableRegistry::new();
        registry.register(Region("orphan"))
    };
    drop(guard);
}

#[test]
fn leaked_guard_leaves_inert_stale_entry() {
    let registry = InteractableRegistry::new();
    let leaked = registry.register(Region("leaked"));
    let id = leaked.id();
    std::mem::forget(leaked);
    assert!(registry.contains(id));

    let next = registry.register(Region("next"));
    assert_eq!(registry.lookup(next.id()), Some(Region("next")));
    drop(next);
    assert_eq!(registry.len(), 1);
}

#[test]
fn double_registration_yields_independent_entries() {
    let registry = InteractableRegistry::new();
    let first = registry.register(Region("same"));
    let second = registry.register(Region("same"));
    registry.unregister(first);
    assert_eq!(registry.len(), 1);
    assert!(registry.contains(second.id()));
}

#[test]
fn guard_debug_shows_id() {
    let registry = InteractableRegistry::new();
    let guard = registry.register(Region("x"));
    assert!(format!("{guard:?}").contains(&guard.id().to_string()));
}
