use cql_core::{Type, parse_type};

use crate::config::TypeArgs;
use crate::error::CliError;

pub fn run(args: TypeArgs) -> Result<(), CliError> {
    let ty = match &args.schema {
        Some(path) => {
            let schema = super::load_schema(path)?;
            let keyspace = match &args.keyspace {
                Some(name) => schema
                    .keyspace(name)
                    .ok_or_else(|| CliError::KeyspaceNotFound(name.clone()))?,
                None => schema
                    .keyspaces()
                    .first()
                    .ok_or_else(|| CliError::KeyspaceNotFound("<none>".to_string()))?,
            };
            keyspace.parse_type(&args.input)?
        }
        None => parse_type(&args.input)?,
    };
    println!("{}", serde_json::to_string_pretty(&describe(&ty))?);
    Ok(())
}

/// Canonical form, short name and protocol code of a type.
pub fn describe(ty: &Type) -> serde_json::Value {
    serde_json::json!({
        "type": ty,
        "name": ty.name(),
        "code": format!("0x{:04x}", ty.code().code()),
        "scalar": ty.is_scalar(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_nested_types() {
        let ty = parse_type("MAP<text, frozen<list<int>>>").unwrap();
        let info = describe(&ty);
        assert_eq!(info["type"], "map<text, list<int>>");
        assert_eq!(info["name"], "map");
        assert_eq!(info["code"], "0x0021");
        assert_eq!(info["scalar"], false);

        let info = describe(&parse_type("smallint").unwrap());
        assert_eq!(info["code"], "0x0013");
    }
}
