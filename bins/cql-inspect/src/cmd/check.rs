use cql_core::Type;
use cql_schema::Schema;

use crate::config::CheckArgs;
use crate::error::CliError;

pub fn run(args: CheckArgs) -> Result<(), CliError> {
    let schema = super::load_schema(&args.schema)?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&schema.to_json())?);
    } else {
        print!("{}", summary(&schema));
    }
    Ok(())
}

/// Human-readable listing of a schema.
pub fn summary(schema: &Schema) -> String {
    let mut out = String::new();
    for ks in schema.keyspaces() {
        out.push_str(&format!("keyspace {}\n", ks.name()));
        for ty in ks.user_types() {
            out.push_str(&format!("  type {}\n", Type::UserType(ty.clone())));
            for field in ty.fields() {
                out.push_str(&format!("    {} {}\n", field.name(), field.ty()));
            }
        }
        for table in ks.tables() {
            let key: Vec<&str> = table.primary_key().iter().map(|c| c.name()).collect();
            out.push_str(&format!("  table {} ({})\n", table.name(), key.join(", ")));
            for column in table.columns() {
                let ty = column.ty().map_or_else(|| "?".to_string(), Type::to_string);
                let mut flags = Vec::new();
                if column.is_static() {
                    flags.push("static");
                }
                if column.is_reversed() {
                    flags.push("desc");
                }
                if column.is_frozen() {
                    flags.push("frozen");
                }
                let flags = if flags.is_empty() {
                    String::new()
                } else {
                    format!(" [{}]", flags.join(", "))
                };
                out.push_str(&format!("    {} {ty}{flags}\n", column.name()));
            }
        }
        for function in ks.functions() {
            out.push_str(&format!("  function {} -> {}\n", function, function.return_type()));
        }
        for aggregate in ks.aggregates() {
            out.push_str(&format!(
                "  aggregate {} -> {}\n",
                aggregate,
                aggregate.return_type()
            ));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use cql_schema::SchemaConfig;

    #[test]
    fn summary_lists_types_and_columns() {
        let config = SchemaConfig::parse(
            r#"
            [[keyspaces]]
            name = "shop"
            [[keyspaces.types]]
            name = "address"
            fields = [ { name = "zip", type = "int" } ]
            [[keyspaces.tables]]
            name = "users"
            partition_key = ["id"]
            clustering_key = [ { name = "at", order = "desc" } ]
            columns = [
                { name = "id", type = "uuid" },
                { name = "at", type = "timestamp" },
                { name = "home", type = "frozen<address>" },
            ]
            "#,
        )
        .unwrap();
        let schema = Schema::from_config(&config).unwrap();
        let text = summary(&schema);
        assert_eq!(
            text,
            "keyspace shop\n\
             \x20 type shop.address\n\
             \x20   zip int\n\
             \x20 table users (id, at)\n\
             \x20   id uuid\n\
             \x20   at timestamp [desc]\n\
             \x20   home shop.address [frozen]\n"
        );
    }
}
