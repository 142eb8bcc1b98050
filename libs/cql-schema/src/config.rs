use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, SchemaError};

/// Root configuration: a list of keyspaces.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchemaConfig {
    #[serde(default)]
    pub keyspaces: Vec<KeyspaceConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct KeyspaceConfig {
    pub name: String,

    /// User types, in dependency order: a type may only refer to types
    /// declared before it.
    #[serde(default)]
    pub types: Vec<UserTypeConfig>,

    #[serde(default)]
    pub tables: Vec<TableConfig>,

    #[serde(default)]
    pub functions: Vec<FunctionConfig>,

    #[serde(default)]
    pub aggregates: Vec<AggregateConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserTypeConfig {
    pub name: String,
    #[serde(default)]
    pub fields: Vec<FieldConfig>,
}

/// A `{ name, type }` pair. The type is a CQL type string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    pub name: String,
    pub columns: Vec<ColumnConfig>,
    #[serde(default)]
    pub partition_key: Vec<String>,
    #[serde(default)]
    pub clustering_key: Vec<ClusteringConfig>,
    /// Free-form table options (`comment`, `gc_grace_seconds`, ...).
    #[serde(default)]
    pub options: Option<toml::Table>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ColumnConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    #[serde(default, rename = "static")]
    pub is_static: bool,
    #[serde(default)]
    pub index: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ClusteringConfig {
    pub name: String,
    #[serde(default)]
    pub order: ClusteringOrder,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusteringOrder {
    #[default]
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FunctionConfig {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<FieldConfig>,
    pub returns: String,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub called_on_null_input: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AggregateConfig {
    pub name: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    pub state_function: String,
    pub state_type: String,
    #[serde(default)]
    pub final_function: Option<String>,
    #[serde(default)]
    pub initial_condition: Option<String>,
}

// ════════════════════════════════════════════════════════════════
//  Loading
// ════════════════════════════════════════════════════════════════

/// A configuration file format.
pub trait ConfigParser {
    /// File extensions handled, without the dot.
    fn extensions(&self) -> &[&str];

    fn parse(&self, content: &str) -> Result<SchemaConfig>;
}

pub struct TomlParser;

impl ConfigParser for TomlParser {
    fn extensions(&self) -> &[&str] {
        &["toml"]
    }

    fn parse(&self, content: &str) -> Result<SchemaConfig> {
        SchemaConfig::parse(content)
    }
}

impl SchemaConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::load_with(path, &[])
    }

    /// Load configuration, choosing the parser by file extension. TOML is
    /// always available; `parsers` add further formats.
    pub fn load_with(path: impl AsRef<Path>, parsers: &[&dyn ConfigParser]) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| SchemaError::Config(format!("{}: {e}", path.display())))?;
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("toml")
            .to_ascii_lowercase();

        let parser = parsers
            .iter()
            .copied()
            .chain(std::iter::once(&TomlParser as &dyn ConfigParser))
            .find(|p| p.extensions().contains(&ext.as_str()))
            .ok_or_else(|| {
                SchemaError::Config(format!(
                    "{}: unsupported config format '.{ext}'",
                    path.display()
                ))
            })?;

        tracing::debug!(path = %path.display(), format = %ext, "loading schema config");
        parser
            .parse(&content)
            .map_err(|e| e.with_context(path.display()))
    }

    /// Parse configuration from a TOML string.
    pub fn parse(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| SchemaError::Config(e.to_string()))
    }
}
