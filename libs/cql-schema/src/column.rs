use serde::Serialize;

use cql_core::{Type, Value, ValueError};

use crate::error::{Result, SchemaError};
use crate::marshal::parse_marshal;

/// Role of a column in its table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    PartitionKey,
    ClusteringKey,
    Regular,
    Static,
    CompactValue,
}

/// Column metadata as the driver layer reports it.
#[derive(Debug, Clone)]
pub struct ColumnMeta {
    pub name: String,
    pub kind: ColumnKind,
    /// Position within the partition or clustering key.
    pub position: usize,
    /// Decoded data type, absent on schema versions that only carry a
    /// `validator` string.
    pub data_type: Option<Type>,
    pub frozen: bool,
    /// Raw metadata fields, in the order the driver returned them.
    pub fields: Vec<(String, Value)>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
            position: 0,
            data_type: None,
            frozen: false,
            fields: Vec::new(),
        }
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
            .filter(|v| !v.is_null())
    }

    fn text_field(&self, name: &str) -> Result<Option<&str>> {
        match self.field(name) {
            None => Ok(None),
            Some(Value::Text(s)) => Ok(Some(s)),
            Some(other) => Err(ValueError::invalid_argument(format!(
                "column field \"{name}\" must be a string, {} given",
                other.kind_name()
            ))
            .into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    name: String,
    #[serde(rename = "type")]
    ty: Option<Type>,
    kind: ColumnKind,
    reversed: bool,
    frozen: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_options: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: Type, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            kind,
            reversed: false,
            frozen: false,
            index_name: None,
            index_options: None,
        }
    }

    pub fn with_reversed(mut self, reversed: bool) -> Self {
        self.reversed = reversed;
        self
    }

    pub fn with_frozen(mut self, frozen: bool) -> Self {
        self.frozen = frozen;
        self
    }

    pub fn with_index(mut self, name: impl Into<String>, options: Option<String>) -> Self {
        self.index_name = Some(name.into());
        self.index_options = options;
        self
    }

    /// Build a column from driver metadata.
    ///
    /// A `validator` field wins: it is parsed as a marshal class string and
    /// yields the type along with the reversed and frozen flags. Otherwise
    /// the decoded data type is used and `clustering_order` must be present;
    /// `desc` marks the column reversed.
    pub fn from_meta(meta: &ColumnMeta) -> Result<Self> {
        let mut column = Column {
            name: meta.name.clone(),
            ty: None,
            kind: meta.kind,
            reversed: false,
            frozen: false,
            index_name: meta.text_field("index_name")?.map(str::to_string),
            index_options: meta.text_field("index_options")?.map(str::to_string),
        };

        if let Some(validator) = meta.text_field("validator")? {
            let parsed = parse_marshal(validator)
                .map_err(|e| e.with_context(format!("column '{}'", meta.name)))?;
            column.ty = Some(parsed.ty);
            column.reversed = parsed.reversed;
            column.frozen = parsed.frozen;
        } else if let Some(data_type) = &meta.data_type {
            let order = meta
                .text_field("clustering_order")?
                .ok_or_else(|| SchemaError::MissingField("clustering_order".to_string()))?;
            column.ty = Some(data_type.clone());
            column.frozen = meta.frozen;
            column.reversed = order == "desc";
        }

        Ok(column)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Column type; absent when the metadata carried neither a validator
    /// nor a data type.
    pub fn ty(&self) -> Option<&Type> {
        self.ty.as_ref()
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    pub fn is_static(&self) -> bool {
        self.kind == ColumnKind::Static
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn index_name(&self) -> Option<&str> {
        self.index_name.as_deref()
    }

    pub fn index_options(&self) -> Option<&str> {
        self.index_options.as_deref()
    }

    /// `asc` or `desc`.
    pub fn clustering_order(&self) -> &'static str {
        if self.reversed { "desc" } else { "asc" }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cql_core::ScalarKind;

    fn meta_with(fields: &[(&str, Value)]) -> ColumnMeta {
        let mut meta = ColumnMeta::new("created", ColumnKind::ClusteringKey);
        meta.fields = fields
            .iter()
            .map(|(n, v)| (n.to_string(), v.clone()))
            .collect();
        meta
    }

    #[test]
    fn validator_takes_precedence() {
        let mut meta = meta_with(&[(
            "validator",
            Value::from(
                "org.apache.cassandra.db.marshal.ReversedType(org.apache.cassandra.db.marshal.TimestampType)",
            ),
        )]);
        meta.data_type = Some(Type::scalar(ScalarKind::Int));

        let column = Column::from_meta(&meta).unwrap();
        assert_eq!(column.ty(), Some(&Type::scalar(ScalarKind::Timestamp)));
        assert!(column.is_reversed());
        assert!(!column.is_frozen());
        assert_eq!(column.clustering_order(), "desc");
    }

    #[test]
    fn data_type_requires_clustering_order() {
        let mut meta = meta_with(&[]);
        meta.data_type = Some(Type::scalar(ScalarKind::Int));
        let err = Column::from_meta(&meta).unwrap_err();
        assert!(matches!(err, SchemaError::MissingField(ref f) if f == "clustering_order"));
        assert_eq!(err.to_string(), "Unable to get column field \"clustering_order\"");

        meta.fields.push(("clustering_order".into(), Value::from("desc")));
        meta.frozen = true;
        let column = Column::from_meta(&meta).unwrap();
        assert!(column.is_reversed());
        assert!(column.is_frozen());

        meta.fields[0].1 = Value::from("asc");
        assert!(!Column::from_meta(&meta).unwrap().is_reversed());
    }

    #[test]
    fn no_type_information_yields_untyped_column() {
        let column = Column::from_meta(&meta_with(&[])).unwrap();
        assert_eq!(column.ty(), None);
        assert!(!column.is_reversed());
    }

    #[test]
    fn index_fields_and_static_kind() {
        let mut meta = meta_with(&[
            ("validator", Value::from("Int32Type")),
            ("index_name", Value::from("by_score")),
            ("index_options", Value::Null),
        ]);
        meta.kind = ColumnKind::Static;
        let column = Column::from_meta(&meta).unwrap();
        assert!(column.is_static());
        assert_eq!(column.index_name(), Some("by_score"));
        assert_eq!(column.index_options(), None);
    }

    #[test]
    fn non_string_validator_is_rejected() {
        let err = Column::from_meta(&meta_with(&[("validator", Value::Int(1))])).unwrap_err();
        assert!(matches!(err, SchemaError::Value(_)));
    }

    #[test]
    fn serializes_as_json() {
        let column = Column::new("id", Type::scalar(ScalarKind::Uuid), ColumnKind::PartitionKey);
        let json = serde_json::to_value(&column).unwrap();
        assert_eq!(json["type"], "uuid");
        assert_eq!(json["kind"], "partition_key");
        assert!(json.get("index_name").is_none());
    }
}
