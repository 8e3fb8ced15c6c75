//! Definition store and registry tests

use std::sync::Arc;

use crate::definition::{StreamDefinition, StreamKey};
use crate::error::SchemaError;
use crate::registry::StreamRegistry;
use crate::store::InMemoryDefinitionStore;

fn definition(name: &str) -> StreamDefinition {
    StreamDefinition::from_json(&format!(r#"{{"name": "{name}"}}"#)).expect("parse failed")
}

#[test]
fn test_save_and_get() {
    let store = InMemoryDefinitionStore::new();

    let key = store.save(definition("org.sample.stats")).expect("save failed");

    assert!(store.contains(&key));
    assert_eq!(store.len(), 1);
    assert_eq!(store.get(&key).unwrap().name, "org.sample.stats");
}

#[test]
fn test_duplicate_save_rejected() {
    let store = InMemoryDefinitionStore::new();
    store.save(definition("s")).expect("first save failed");

    let err = store.save(definition("s")).unwrap_err();

    assert!(matches!(err, SchemaError::DuplicateDefinition { .. }));
    assert_eq!(store.len(), 1);
}

#[test]
fn test_same_name_different_version_coexist() {
    let store = InMemoryDefinitionStore::new();
    let v1 = StreamDefinition::from_json(r#"{"name": "s", "version": "1.0.0"}"#).unwrap();
    let v2 = StreamDefinition::from_json(r#"{"name": "s", "version": "2.0.0"}"#).unwrap();

    store.save(v1).expect("v1 save failed");
    store.save(v2).expect("v2 save failed");

    assert_eq!(store.len(), 2);
    assert!(store.contains(&StreamKey::new("s", "1.0.0")));
    assert!(store.contains(&StreamKey::new("s", "2.0.0")));
}

#[test]
fn test_registry_registers_through_lazy_store() {
    let registry = StreamRegistry::new();

    let key = registry
        .register(r#"{"name": "org.sample.stats"}"#)
        .expect("register failed");

    assert!(registry.store().contains(&key));
}

#[test]
fn test_registry_propagates_duplicate() {
    let registry = StreamRegistry::new();
    registry.register(r#"{"name": "s"}"#).expect("register failed");

    let err = registry.register(r#"{"name": "s"}"#).unwrap_err();

    assert!(matches!(err, SchemaError::DuplicateDefinition { .. }));
}

#[test]
fn test_registry_propagates_parse_error() {
    let registry = StreamRegistry::new();

    let err = registry.register("not json at all").unwrap_err();

    assert!(matches!(err, SchemaError::Malformed(_)));
    // A failed parse must not have initialized partial state
    assert!(registry.store().is_empty());
}

#[test]
fn test_concurrent_first_use_initializes_store_once() {
    let registry = Arc::new(StreamRegistry::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let registry = Arc::clone(&registry);
            std::thread::spawn(move || {
                registry
                    .register(&format!(r#"{{"name": "stream-{i}"}}"#))
                    .expect("register failed");
                Arc::as_ptr(registry.store()) as usize
            })
        })
        .collect();

    let pointers: Vec<usize> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    // Every thread saw the same backing store
    assert!(pointers.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(registry.store().len(), 8);
}
