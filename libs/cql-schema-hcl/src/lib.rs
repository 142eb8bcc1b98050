use cql_schema::config::{ConfigParser, SchemaConfig};
use cql_schema::error::SchemaError;

pub struct HclParser;

impl ConfigParser for HclParser {
    fn extensions(&self) -> &[&str] {
        &["hcl"]
    }

    fn parse(&self, content: &str) -> Result<SchemaConfig, SchemaError> {
        hcl::from_str(content).map_err(|e| SchemaError::Config(e.to_string()))
    }
}
