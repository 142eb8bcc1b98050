use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "cql-inspect", about = "Inspect CQL schemas, types and numeric values")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load a schema file and report what it defines
    Check(CheckArgs),
    /// Parse a CQL type string and print its canonical form
    Type(TypeArgs),
    /// Evaluate checked integer arithmetic at a fixed width
    Calc(CalcArgs),
}

#[derive(Args, Clone, Debug)]
pub struct CheckArgs {
    /// Schema file (.toml or .hcl)
    #[arg(long, default_value = "schema.toml", env = "CQL_SCHEMA")]
    pub schema: PathBuf,

    /// Print the resolved schema as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Clone, Debug)]
pub struct TypeArgs {
    /// Type string, e.g. "map<text, frozen<list<int>>>"
    pub input: String,

    /// Schema file providing named user types
    #[arg(long, env = "CQL_SCHEMA")]
    pub schema: Option<PathBuf>,

    /// Keyspace whose user types resolve unqualified names
    #[arg(long, requires = "schema")]
    pub keyspace: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct CalcArgs {
    #[arg(long, value_enum, default_value_t = IntWidth::Bigint)]
    pub width: IntWidth,

    /// Left operand (base-10)
    #[arg(allow_hyphen_values = true)]
    pub a: String,

    /// add, sub, mul, div, mod (or + - x / %), or unary abs, neg, sqrt
    pub op: String,

    /// Right operand, omitted for unary operators
    #[arg(allow_hyphen_values = true)]
    pub b: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum IntWidth {
    Tinyint,
    Smallint,
    Int,
    Bigint,
}
