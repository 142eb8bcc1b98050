pub mod calc;
pub mod check;
pub mod type_info;

use std::path::Path;

use cql_schema::{Schema, SchemaConfig};
use cql_schema_hcl::HclParser;

use crate::error::CliError;

/// Load and resolve a schema file. TOML and HCL are supported.
pub fn load_schema(path: &Path) -> Result<Schema, CliError> {
    tracing::info!(schema = %path.display(), "loading schema");
    let config = SchemaConfig::load_with(path, &[&HclParser])?;
    Ok(Schema::from_config(&config)?)
}
