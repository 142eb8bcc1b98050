use cql_core::Value;

use crate::column::{Column, ColumnKind, ColumnMeta};
use crate::config::{ClusteringOrder, TableConfig};
use crate::error::{Result, SchemaError};
use crate::registry::{TypeRegistry, parse_schema_type};

/// Fields that end the option block of table metadata.
const OPTION_TERMINATORS: [&str; 3] = ["keyspace_name", "table_name", "columnfamily_name"];

/// Table metadata as the driver layer reports it.
#[derive(Debug, Clone)]
pub struct TableMeta {
    pub name: String,
    /// Raw metadata fields, in the order the driver returned them.
    pub fields: Vec<(String, Value)>,
    pub columns: Vec<ColumnMeta>,
}

/// Table options: metadata fields in order, stopping at the first
/// `keyspace_name`, `table_name` or `columnfamily_name`. Null fields are
/// skipped; a repeated name keeps the last value.
pub fn options_from_fields(fields: &[(String, Value)]) -> Vec<(String, Value)> {
    let mut options: Vec<(String, Value)> = Vec::new();
    for (name, value) in fields {
        if OPTION_TERMINATORS.contains(&name.as_str()) {
            break;
        }
        if value.is_null() {
            continue;
        }
        match options.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value.clone(),
            None => options.push((name.clone(), value.clone())),
        }
    }
    options
}

#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    options: Vec<(String, Value)>,
    columns: Vec<Column>,
    partition_key: Vec<usize>,
    clustering_key: Vec<usize>,
}

impl Table {
    /// Build a table from driver metadata. Key columns are ordered by their
    /// position.
    pub fn from_meta(meta: &TableMeta) -> Result<Self> {
        let columns = meta
            .columns
            .iter()
            .map(|c| {
                Column::from_meta(c).map_err(|e| e.with_context(format!("table '{}'", meta.name)))
            })
            .collect::<Result<Vec<_>>>()?;

        let key = |kind: ColumnKind| -> Vec<usize> {
            let mut positions: Vec<(usize, usize)> = meta
                .columns
                .iter()
                .enumerate()
                .filter(|(_, c)| c.kind == kind)
                .map(|(i, c)| (c.position, i))
                .collect();
            positions.sort();
            positions.into_iter().map(|(_, i)| i).collect()
        };

        Ok(Table {
            name: meta.name.clone(),
            options: options_from_fields(&meta.fields),
            partition_key: key(ColumnKind::PartitionKey),
            clustering_key: key(ColumnKind::ClusteringKey),
            columns,
        })
    }

    /// Build a table from configuration, resolving named user types through
    /// `registry`.
    pub fn from_config(config: &TableConfig, registry: &TypeRegistry) -> Result<Self> {
        let ctx = format!("table '{}'", config.name);

        let index_of = |name: &str| {
            config
                .columns
                .iter()
                .position(|c| c.name == name)
                .ok_or_else(|| SchemaError::Config(format!("{ctx}: unknown key column '{name}'")))
        };
        let partition_key = config
            .partition_key
            .iter()
            .map(|n| index_of(n))
            .collect::<Result<Vec<_>>>()?;
        let clustering_key = config
            .clustering_key
            .iter()
            .map(|c| index_of(&c.name))
            .collect::<Result<Vec<_>>>()?;
        if partition_key.is_empty() {
            return Err(SchemaError::Config(format!("{ctx}: partition key is empty")));
        }

        let mut columns = Vec::with_capacity(config.columns.len());
        for (i, col) in config.columns.iter().enumerate() {
            let ty = parse_schema_type(&col.ty, registry)
                .map_err(|e| e.with_context(format!("{ctx} column '{}'", col.name)))?;

            let clustering = config.clustering_key.iter().find(|c| c.name == col.name);
            let kind = if partition_key.contains(&i) {
                ColumnKind::PartitionKey
            } else if clustering.is_some() {
                ColumnKind::ClusteringKey
            } else if col.is_static {
                ColumnKind::Static
            } else {
                ColumnKind::Regular
            };
            if col.is_static && kind != ColumnKind::Static {
                return Err(SchemaError::Config(format!(
                    "{ctx}: key column '{}' cannot be static",
                    col.name
                )));
            }

            let mut column = Column::new(&col.name, ty, kind)
                .with_frozen(is_frozen(&col.ty))
                .with_reversed(clustering.is_some_and(|c| c.order == ClusteringOrder::Desc));
            if let Some(index) = &col.index {
                column = column.with_index(index, None);
            }
            columns.push(column);
        }

        let options = config
            .options
            .iter()
            .flatten()
            .map(|(k, v)| (k.clone(), option_value(v)))
            .collect();

        tracing::debug!(table = %config.name, columns = columns.len(), "built table");
        Ok(Table {
            name: config.name.clone(),
            options,
            columns,
            partition_key,
            clustering_key,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn option(&self, name: &str) -> Option<&Value> {
        self.options.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn options(&self) -> &[(String, Value)] {
        &self.options
    }

    pub fn comment(&self) -> Option<&str> {
        self.option("comment").and_then(Value::as_str)
    }

    pub fn gc_grace_seconds(&self) -> Option<i64> {
        self.int_option("gc_grace_seconds")
    }

    pub fn default_ttl(&self) -> Option<i64> {
        self.int_option("default_time_to_live")
    }

    fn int_option(&self, name: &str) -> Option<i64> {
        match self.option(name)? {
            Value::Int(i) => Some(*i),
            Value::Int32(n) => Some(i64::from(n.get())),
            Value::Bigint(n) => Some(n.get()),
            _ => None,
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name() == name)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn partition_key(&self) -> Vec<&Column> {
        self.partition_key.iter().map(|&i| &self.columns[i]).collect()
    }

    pub fn clustering_key(&self) -> Vec<&Column> {
        self.clustering_key.iter().map(|&i| &self.columns[i]).collect()
    }

    /// Partition key followed by clustering key.
    pub fn primary_key(&self) -> Vec<&Column> {
        self.partition_key
            .iter()
            .chain(&self.clustering_key)
            .map(|&i| &self.columns[i])
            .collect()
    }

    /// `asc`/`desc` for each clustering column.
    pub fn clustering_order(&self) -> Vec<&'static str> {
        self.clustering_key()
            .into_iter()
            .map(Column::clustering_order)
            .collect()
    }

    pub fn to_json(&self) -> serde_json::Value {
        let names = |cols: Vec<&Column>| -> Vec<String> {
            cols.into_iter().map(|c| c.name().to_string()).collect()
        };
        serde_json::json!({
            "name": self.name,
            "options": self
                .options
                .iter()
                .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
                .collect::<serde_json::Map<_, _>>(),
            "columns": self.columns,
            "partition_key": names(self.partition_key()),
            "clustering_key": names(self.clustering_key()),
        })
    }
}

/// Whether the outermost type in a CQL type string is `frozen<...>`.
fn is_frozen(ty: &str) -> bool {
    let ty = ty.trim_start();
    ty.get(..6).is_some_and(|prefix| prefix.eq_ignore_ascii_case("frozen"))
        && ty[6..].trim_start().starts_with('<')
}

fn option_value(value: &toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::Text(s.clone()),
        toml::Value::Integer(i) => Value::Int(*i),
        toml::Value::Float(f) => Value::Double(*f),
        toml::Value::Boolean(b) => Value::Bool(*b),
        other => Value::Text(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SchemaConfig;
    use cql_core::{ScalarKind, Type};

    fn field(name: &str, value: Value) -> (String, Value) {
        (name.to_string(), value)
    }

    #[test]
    fn options_stop_at_identity_fields() {
        let fields = vec![
            field("comment", Value::from("people")),
            field("gc_grace_seconds", Value::Int(864000)),
            field("caching", Value::Null),
            field("table_name", Value::from("users")),
            field("default_time_to_live", Value::Int(60)),
        ];
        let options = options_from_fields(&fields);
        let names: Vec<&str> = options.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["comment", "gc_grace_seconds"]);

        let fields = vec![field("columnfamily_name", Value::from("t")), field("comment", Value::from("x"))];
        assert!(options_from_fields(&fields).is_empty());
    }

    #[test]
    fn from_meta_orders_keys_by_position() {
        let mut a = ColumnMeta::new("a", ColumnKind::PartitionKey);
        a.position = 1;
        a.fields.push(("validator".into(), Value::from("Int32Type")));
        let mut b = ColumnMeta::new("b", ColumnKind::PartitionKey);
        b.fields.push(("validator".into(), Value::from("UTF8Type")));
        let mut c = ColumnMeta::new("c", ColumnKind::ClusteringKey);
        c.fields.push(("validator".into(), Value::from("ReversedType(LongType)")));

        let meta = TableMeta {
            name: "t".into(),
            fields: vec![field("comment", Value::from("hi")), field("keyspace_name", Value::from("ks"))],
            columns: vec![a, b, c],
        };
        let table = Table::from_meta(&meta).unwrap();
        let pk: Vec<&str> = table.partition_key().iter().map(|c| c.name()).collect();
        assert_eq!(pk, ["b", "a"]);
        assert_eq!(table.clustering_order(), ["desc"]);
        assert_eq!(table.primary_key().len(), 3);
        assert_eq!(table.comment(), Some("hi"));
        assert_eq!(table.column("a").unwrap().ty(), Some(&Type::scalar(ScalarKind::Int)));
    }

    #[test]
    fn from_meta_reports_table_in_errors() {
        let mut bad = ColumnMeta::new("x", ColumnKind::Regular);
        bad.fields.push(("validator".into(), Value::from("ListType(")));
        let meta = TableMeta { name: "t".into(), fields: vec![], columns: vec![bad] };
        let err = Table::from_meta(&meta).unwrap_err();
        assert!(err.to_string().contains("table 't'"), "{err}");
    }

    fn config_table(src: &str) -> TableConfig {
        SchemaConfig::parse(src).unwrap().keyspaces.remove(0).tables.remove(0)
    }

    #[test]
    fn from_config_assigns_kinds_and_flags() {
        let cfg = config_table(
            r#"
            [[keyspaces]]
            name = "ks"
            [[keyspaces.tables]]
            name = "events"
            partition_key = ["id"]
            clustering_key = [ { name = "at", order = "desc" } ]
            columns = [
                { name = "id", type = "uuid" },
                { name = "at", type = "timestamp" },
                { name = "owner", type = "text", static = true },
                { name = "tags", type = "frozen<set<text>>", index = "by_tag" },
            ]
            options = { gc_grace_seconds = 10 }
            "#,
        );
        let table = Table::from_config(&cfg, &TypeRegistry::for_keyspace("ks")).unwrap();
        assert_eq!(table.column("id").unwrap().kind(), ColumnKind::PartitionKey);
        assert!(table.column("at").unwrap().is_reversed());
        assert!(table.column("owner").unwrap().is_static());
        let tags = table.column("tags").unwrap();
        assert!(tags.is_frozen());
        assert_eq!(tags.index_name(), Some("by_tag"));
        assert!(!table.column("at").unwrap().is_frozen());
        assert_eq!(tags.ty().unwrap().to_string(), "set<text>");
        assert_eq!(table.gc_grace_seconds(), Some(10));

        let json = table.to_json();
        assert_eq!(json["partition_key"], serde_json::json!(["id"]));
        assert_eq!(json["columns"][1]["reversed"], true);
    }

    #[test]
    fn from_config_rejects_bad_keys() {
        let cfg = config_table(
            r#"
            [[keyspaces]]
            name = "ks"
            [[keyspaces.tables]]
            name = "t"
            partition_key = ["missing"]
            columns = [ { name = "id", type = "int" } ]
            "#,
        );
        let err = Table::from_config(&cfg, &TypeRegistry::new()).unwrap_err();
        assert_eq!(err.to_string(), "config error: table 't': unknown key column 'missing'");

        let cfg = config_table(
            r#"
            [[keyspaces]]
            name = "ks"
            [[keyspaces.tables]]
            name = "t"
            partition_key = ["id"]
            columns = [ { name = "id", type = "int", static = true } ]
            "#,
        );
        assert!(Table::from_config(&cfg, &TypeRegistry::new()).is_err());
    }

    #[test]
    fn from_config_reports_unknown_types() {
        let cfg = config_table(
            r#"
            [[keyspaces]]
            name = "ks"
            [[keyspaces.tables]]
            name = "t"
            partition_key = ["id"]
            columns = [ { name = "id", type = "int" }, { name = "home", type = "address" } ]
            "#,
        );
        let err = Table::from_config(&cfg, &TypeRegistry::for_keyspace("ks")).unwrap_err();
        assert_eq!(err.to_string(), "unknown type: table 't' column 'home': address");
    }

    #[test]
    fn frozen_needs_a_type_argument() {
        assert!(is_frozen("frozen<address>"));
        assert!(is_frozen("  FROZEN <list<int>>"));
        assert!(!is_frozen("frozenset_t"));
        assert!(!is_frozen("frozen"));
        assert!(!is_frozen("list<frozen<address>>"));
    }
}
