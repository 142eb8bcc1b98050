pub mod column;
pub mod config;
pub mod error;
pub mod function;
pub mod keyspace;
pub mod literal;
pub mod marshal;
pub mod registry;
pub mod table;

pub use column::{Column, ColumnKind, ColumnMeta};
pub use config::{ConfigParser, SchemaConfig, TomlParser};
pub use error::SchemaError;
pub use function::{Aggregate, Function};
pub use keyspace::{Keyspace, Schema};
pub use literal::parse_literal;
pub use marshal::{MarshalType, parse_marshal};
pub use registry::{TypeRegistry, parse_schema_type};
pub use table::{Table, TableMeta, options_from_fields};
