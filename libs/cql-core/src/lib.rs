pub mod collection;
pub mod error;
pub mod hash;
pub mod numeric;
pub mod parse;
pub mod scalar;
pub mod types;
pub mod value;

pub use error::{ErrorKind, Result, ValueError};
pub use numeric::{Bigint, Int32, Numeric, Smallint, Tinyint, Width};
pub use parse::{UserTypeResolver, parse_type, parse_type_with};
pub use scalar::{ScalarKind, TypeCode};
pub use types::{Field, TupleType, Type, UserType};
pub use value::{Value, ValueKind};
