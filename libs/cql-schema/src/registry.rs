use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use cql_core::{Type, UserType, UserTypeResolver, parse_type_with};

use crate::error::{Result, SchemaError};

/// Named user types, keyed by `keyspace.name`.
///
/// Uses interior mutability so types can be added while the registry is
/// shared between parsers.
#[derive(Debug)]
pub struct TypeRegistry {
    /// Keyspace used when a lookup names none.
    default_keyspace: Option<String>,
    types: RwLock<HashMap<String, UserType>>,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self {
            default_keyspace: None,
            types: RwLock::new(HashMap::new()),
        }
    }
}

fn key(keyspace: &str, name: &str) -> String {
    format!("{}.{}", keyspace.to_ascii_lowercase(), name.to_ascii_lowercase())
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry resolving unqualified names in `keyspace`.
    pub fn for_keyspace(keyspace: impl Into<String>) -> Self {
        Self {
            default_keyspace: Some(keyspace.into()),
            ..Self::default()
        }
    }

    pub fn default_keyspace(&self) -> Option<&str> {
        self.default_keyspace.as_deref()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<String, UserType>> {
        match self.types.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("type registry read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<String, UserType>> {
        match self.types.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("type registry write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }

    /// Register a named user type, replacing any previous definition.
    /// Returns the registered type, qualified with `keyspace` and `name`.
    pub fn register(&self, keyspace: &str, name: &str, fields: Vec<(String, Type)>) -> UserType {
        let ty = UserType::new(fields).with_name(Some(keyspace), name);
        if self.write().insert(key(keyspace, name), ty.clone()).is_some() {
            tracing::debug!(keyspace, name, "replaced user type");
        }
        ty
    }

    pub fn get(&self, keyspace: &str, name: &str) -> Option<UserType> {
        self.read().get(&key(keyspace, name)).cloned()
    }

    pub fn contains(&self, keyspace: &str, name: &str) -> bool {
        self.read().contains_key(&key(keyspace, name))
    }

    /// Registered `keyspace.name` keys, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }
}

impl UserTypeResolver for TypeRegistry {
    fn resolve(&self, keyspace: Option<&str>, name: &str) -> Option<Type> {
        let keyspace = keyspace.or(self.default_keyspace.as_deref())?;
        self.get(keyspace, name).map(Type::UserType)
    }
}

/// Remembers the last name the registry could not resolve.
struct Tracking<'a> {
    registry: &'a TypeRegistry,
    missing: RefCell<Option<String>>,
}

impl UserTypeResolver for Tracking<'_> {
    fn resolve(&self, keyspace: Option<&str>, name: &str) -> Option<Type> {
        let found = self.registry.resolve(keyspace, name);
        if found.is_none() {
            let full = match keyspace {
                Some(ks) => format!("{ks}.{name}"),
                None => name.to_string(),
            };
            *self.missing.borrow_mut() = Some(full);
        }
        found
    }
}

/// Parse a CQL type string against the registry. A named type the
/// registry does not know is reported as `SchemaError::UnknownType`.
pub fn parse_schema_type(input: &str, registry: &TypeRegistry) -> Result<Type> {
    let tracking = Tracking {
        registry,
        missing: RefCell::new(None),
    };
    parse_type_with(input, &tracking).map_err(|e| match tracking.missing.take() {
        Some(name) => SchemaError::UnknownType(name),
        None => SchemaError::Value(e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use cql_core::{ScalarKind, parse_type_with};

    fn address_fields() -> Vec<(String, Type)> {
        vec![
            ("street".to_string(), Type::scalar(ScalarKind::Text)),
            ("zip".to_string(), Type::scalar(ScalarKind::Int)),
        ]
    }

    #[test]
    fn register_and_lookup_is_case_insensitive() {
        let registry = TypeRegistry::new();
        let ty = registry.register("Shop", "Address", address_fields());
        assert_eq!(ty.keyspace(), Some("Shop"));
        assert_eq!(registry.get("shop", "address"), Some(ty));
        assert!(registry.contains("SHOP", "ADDRESS"));
        assert_eq!(registry.names(), ["shop.address"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn resolves_unqualified_names_in_default_keyspace() {
        let registry = TypeRegistry::for_keyspace("shop");
        registry.register("shop", "address", address_fields());

        let ty = parse_type_with("map<text, frozen<address>>", &registry).unwrap();
        assert_eq!(ty.to_string(), "map<text, shop.address>");
        assert!(parse_type_with("other.address", &registry).is_err());

        let plain = TypeRegistry::new();
        plain.register("shop", "address", address_fields());
        assert!(plain.resolve(None, "address").is_none());
        assert!(plain.resolve(Some("shop"), "address").is_some());
    }

    #[test]
    fn unknown_names_are_reported_by_name() {
        let registry = TypeRegistry::for_keyspace("shop");
        let err = parse_schema_type("list<frozen<phone>>", &registry).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownType(ref n) if n == "phone"));

        let err = parse_schema_type("list<int", &registry).unwrap_err();
        assert!(matches!(err, SchemaError::Value(_)));

        registry.register("shop", "phone", address_fields());
        assert!(parse_schema_type("list<frozen<phone>>", &registry).is_ok());
    }

    #[test]
    fn shared_between_threads() {
        let registry = std::sync::Arc::new(TypeRegistry::new());
        let handles: Vec<_> = (0..4)
            .map(|i| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    registry.register("ks", &format!("t{i}"), address_fields());
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(registry.len(), 4);
    }
}
