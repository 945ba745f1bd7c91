//! Behaviour shared by both backends, exercised through the registry.

use std::sync::Arc;

use serde_json::json;
use typedkv_storage::{Instance, Kind, Platform, Registry, StorageConfig, StorageError, Value};

fn registries() -> Vec<Registry> {
    [Platform::Native, Platform::Web]
        .into_iter()
        .map(|p| Registry::new(StorageConfig::in_memory(p)).unwrap())
        .collect()
}

fn fresh_default(registry: &Registry) -> Arc<Instance> {
    let storage = registry.default_instance().unwrap();
    storage.clear().unwrap();
    storage
}

#[test]
fn test_typed_setters_report_success() {
    for registry in registries() {
        let storage = fresh_default(&registry);
        assert!(storage.set_string("name", "John").unwrap());
        assert!(storage.set_number("age", 25.0).unwrap());
        assert!(storage.set_boolean("isActive", true).unwrap());
        assert!(storage.set_object("user", &json!({"id": 1, "name": "John"})).unwrap());

        assert_eq!(storage.get_string("name").unwrap().as_deref(), Some("John"));
        assert_eq!(storage.get_number("age").unwrap(), Some(25.0));
        assert_eq!(storage.get_boolean("isActive").unwrap(), Some(true));
        assert_eq!(
            storage.get_object::<serde_json::Value>("user").unwrap(),
            Some(json!({"id": 1, "name": "John"}))
        );
    }
}

#[test]
fn test_number_edge_values() {
    for registry in registries() {
        let storage = fresh_default(&registry);
        for n in [0.0, -0.5, 1e300, f64::MIN_POSITIVE, -42.0] {
            storage.set_number("n", n).unwrap();
            assert_eq!(storage.get_number("n").unwrap(), Some(n));
        }
    }
}

#[test]
fn test_auto_dispatch_matches_typed_setters() {
    for registry in registries() {
        let storage = fresh_default(&registry);
        storage.set("key", &json!("value")).unwrap();
        assert_eq!(storage.get("key", Some(Kind::String)).unwrap(), Some(Value::from("value")));

        storage.set("key", &json!(42)).unwrap();
        assert_eq!(storage.get("key", Some(Kind::Number)).unwrap(), Some(Value::Number(42.0)));

        storage.set("key", &json!(true)).unwrap();
        assert_eq!(storage.get("key", Some(Kind::Boolean)).unwrap(), Some(Value::Boolean(true)));

        storage.set("key", &json!({"test": "value"})).unwrap();
        assert_eq!(
            storage.get("key", Some(Kind::Object)).unwrap(),
            Some(Value::Object(json!({"test": "value"})))
        );

        storage.set("list", &json!(["a", "b"])).unwrap();
        assert_eq!(
            storage.get_object::<Vec<String>>("list").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );

        assert!(matches!(
            storage.set("key", &json!(null)),
            Err(StorageError::UnsupportedType(_))
        ));
    }
}

#[test]
fn test_set_value_mirrors_set() {
    for registry in registries() {
        let storage = fresh_default(&registry);
        storage.set_value("flag", Value::Boolean(false)).unwrap();
        storage.set_value("obj", Value::Object(json!({"nested": {"x": 1}}))).unwrap();

        assert_eq!(storage.get_boolean("flag").unwrap(), Some(false));
        assert_eq!(
            storage.get("obj", Some(Kind::Object)).unwrap(),
            Some(Value::Object(json!({"nested": {"x": 1}})))
        );
    }
}

#[test]
fn test_empty_key_is_invalid_argument() {
    for registry in registries() {
        let storage = fresh_default(&registry);
        let err = storage.set_string("", "v").unwrap_err();
        assert!(matches!(err, StorageError::InvalidArgument(_)));
        assert!(matches!(
            storage.set(&String::new(), &json!(1)),
            Err(StorageError::InvalidArgument(_))
        ));
    }
}

#[test]
fn test_user_object_scenario() {
    let user = json!({"id": 1, "name": "John"});
    for registry in registries() {
        let storage = fresh_default(&registry);
        storage.set_object("user", &user).unwrap();
        assert_eq!(storage.get_object::<serde_json::Value>("user").unwrap(), Some(user.clone()));

        match registry.platform() {
            // Kind tag mismatch
            Platform::Web => assert_eq!(storage.get_string("user").unwrap(), None),
            // Objects are JSON strings at rest
            Platform::Native => assert_eq!(
                storage.get_string("user").unwrap(),
                Some(user.to_string())
            ),
        }
    }
}

#[test]
fn test_delete_contains_and_clear() {
    for registry in registries() {
        let storage = fresh_default(&registry);
        assert!(storage.delete("nonExistent").unwrap());
        assert!(!storage.contains("nonExistent").unwrap());

        storage.set_string("key1", "value1").unwrap();
        storage.set_number("key2", 2.0).unwrap();
        storage.set_boolean("key3", true).unwrap();
        assert_eq!(storage.all_keys().unwrap().len(), 3);

        assert!(storage.clear().unwrap());
        assert_eq!(storage.all_keys().unwrap(), Vec::<String>::new());
        assert!(storage.clear().unwrap());
    }
}

#[test]
fn test_named_instances_are_isolated_and_cached() {
    for registry in registries() {
        let user = registry.instance("userPreferences").unwrap();
        let app = registry.instance("appSettings").unwrap();

        user.set_string("theme", "dark").unwrap();
        app.set_string("theme", "light").unwrap();

        assert_eq!(user.get_string("theme").unwrap().as_deref(), Some("dark"));
        assert_eq!(app.get_string("theme").unwrap().as_deref(), Some("light"));
        assert!(Arc::ptr_eq(&user, &registry.instance("userPreferences").unwrap()));
        assert!(!Arc::ptr_eq(&user, &app));
    }
}
