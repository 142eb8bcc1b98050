use std::sync::Arc;

use cql_core::{Type, UserType};

use crate::config::{KeyspaceConfig, SchemaConfig};
use crate::error::{Result, SchemaError};
use crate::function::{Aggregate, Function};
use crate::registry::{TypeRegistry, parse_schema_type};
use crate::table::Table;

#[derive(Debug)]
pub struct Keyspace {
    name: String,
    registry: Arc<TypeRegistry>,
    user_types: Vec<UserType>,
    tables: Vec<Table>,
    functions: Vec<Function>,
    aggregates: Vec<Aggregate>,
}

impl Keyspace {
    /// Build a keyspace from configuration.
    ///
    /// User types are registered in declaration order, so a type may refer
    /// to any type declared before it. Tables, functions and aggregates are
    /// built afterwards and may use every user type.
    pub fn from_config(config: &KeyspaceConfig) -> Result<Self> {
        let ctx = format!("keyspace '{}'", config.name);
        let registry = Arc::new(TypeRegistry::for_keyspace(&config.name));

        let mut user_types = Vec::with_capacity(config.types.len());
        for ty in &config.types {
            if registry.contains(&config.name, &ty.name) {
                return Err(SchemaError::Config(format!(
                    "{ctx}: user type '{}' declared twice",
                    ty.name
                )));
            }
            let fields = ty
                .fields
                .iter()
                .map(|f| {
                    parse_schema_type(&f.ty, &registry)
                        .map(|t| (f.name.clone(), t))
                        .map_err(|e| {
                            e.with_context(format!("{ctx} type '{}' field '{}'", ty.name, f.name))
                        })
                })
                .collect::<Result<Vec<_>>>()?;
            let registered = registry.register(&config.name, &ty.name, fields);
            tracing::debug!(
                keyspace = %config.name,
                name = %ty.name,
                fields = registered.fields().len(),
                "registered user type"
            );
            user_types.push(registered);
        }

        let tables = config
            .tables
            .iter()
            .map(|t| Table::from_config(t, &registry).map_err(|e| e.with_context(&ctx)))
            .collect::<Result<Vec<_>>>()?;

        let functions = config
            .functions
            .iter()
            .map(|f| Function::from_config(f, &registry).map_err(|e| e.with_context(&ctx)))
            .collect::<Result<Vec<_>>>()?;

        let aggregates = config
            .aggregates
            .iter()
            .map(|a| {
                Aggregate::from_config(a, &registry, &functions).map_err(|e| e.with_context(&ctx))
            })
            .collect::<Result<Vec<_>>>()?;

        tracing::info!(
            keyspace = %config.name,
            types = user_types.len(),
            tables = tables.len(),
            functions = functions.len(),
            aggregates = aggregates.len(),
            "loaded keyspace"
        );

        Ok(Keyspace {
            name: config.name.clone(),
            registry,
            user_types,
            tables,
            functions,
            aggregates,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    /// User types in declaration order.
    pub fn user_types(&self) -> &[UserType] {
        &self.user_types
    }

    pub fn user_type(&self, name: &str) -> Option<UserType> {
        self.registry.get(&self.name, name)
    }

    /// Parse a type string in the context of this keyspace.
    pub fn parse_type(&self, input: &str) -> Result<Type> {
        parse_schema_type(input, &self.registry)
    }

    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name() == name)
    }

    pub fn tables(&self) -> &[Table] {
        &self.tables
    }

    /// Look up a function by signature, e.g. `avg_state(tuple<int, bigint>,int)`.
    pub fn function(&self, signature: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.signature() == signature)
    }

    pub fn functions(&self) -> &[Function] {
        &self.functions
    }

    pub fn aggregate(&self, signature: &str) -> Option<&Aggregate> {
        self.aggregates.iter().find(|a| a.signature() == signature)
    }

    pub fn aggregates(&self) -> &[Aggregate] {
        &self.aggregates
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "name": self.name,
            "types": self
                .user_types
                .iter()
                .map(|u| (Type::UserType(u.clone()).to_string(), fields_json(u)))
                .collect::<serde_json::Map<_, _>>(),
            "tables": self.tables.iter().map(Table::to_json).collect::<Vec<_>>(),
            "functions": self.functions,
            "aggregates": self.aggregates.iter().map(Aggregate::to_json).collect::<Vec<_>>(),
        })
    }
}

/// A user type's fields rendered anonymously: `userType<street:text, zip:int>`.
fn fields_json(ty: &UserType) -> serde_json::Value {
    let fields = ty
        .fields()
        .iter()
        .map(|f| (f.name().to_string(), f.ty().clone()))
        .collect();
    serde_json::Value::String(Type::user_type(fields).to_string())
}

/// Every keyspace of a configuration.
#[derive(Debug, Default)]
pub struct Schema {
    keyspaces: Vec<Keyspace>,
}

impl Schema {
    pub fn from_config(config: &SchemaConfig) -> Result<Self> {
        let mut keyspaces: Vec<Keyspace> = Vec::with_capacity(config.keyspaces.len());
        for ks in &config.keyspaces {
            if keyspaces.iter().any(|k| k.name() == ks.name) {
                return Err(SchemaError::Config(format!("keyspace '{}' declared twice", ks.name)));
            }
            keyspaces.push(Keyspace::from_config(ks)?);
        }
        Ok(Schema { keyspaces })
    }

    pub fn keyspace(&self, name: &str) -> Option<&Keyspace> {
        self.keyspaces.iter().find(|k| k.name() == name)
    }

    pub fn keyspaces(&self) -> &[Keyspace] {
        &self.keyspaces
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::Array(self.keyspaces.iter().map(Keyspace::to_json).collect())
    }
}
