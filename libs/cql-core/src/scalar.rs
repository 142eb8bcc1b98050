use serde::{Deserialize, Serialize};

use crate::error::{Result, ValueError};

// ════════════════════════════════════════════════════════════════
//  Scalar Kind
// ════════════════════════════════════════════════════════════════

/// Primitive column types. Each carries its protocol type code and its CQL
/// name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    Ascii,
    Bigint,
    Blob,
    Boolean,
    Counter,
    Decimal,
    Double,
    Float,
    Int,
    Text,
    Timestamp,
    Uuid,
    Varchar,
    Varint,
    Timeuuid,
    Inet,
    Date,
    Time,
    Smallint,
    Tinyint,
    Duration,
}

impl ScalarKind {
    pub const ALL: [ScalarKind; 21] = [
        ScalarKind::Ascii,
        ScalarKind::Bigint,
        ScalarKind::Blob,
        ScalarKind::Boolean,
        ScalarKind::Counter,
        ScalarKind::Decimal,
        ScalarKind::Double,
        ScalarKind::Float,
        ScalarKind::Int,
        ScalarKind::Text,
        ScalarKind::Timestamp,
        ScalarKind::Uuid,
        ScalarKind::Varchar,
        ScalarKind::Varint,
        ScalarKind::Timeuuid,
        ScalarKind::Inet,
        ScalarKind::Date,
        ScalarKind::Time,
        ScalarKind::Smallint,
        ScalarKind::Tinyint,
        ScalarKind::Duration,
    ];

    /// Protocol type code.
    pub fn code(self) -> u16 {
        match self {
            ScalarKind::Ascii => 0x0001,
            ScalarKind::Bigint => 0x0002,
            ScalarKind::Blob => 0x0003,
            ScalarKind::Boolean => 0x0004,
            ScalarKind::Counter => 0x0005,
            ScalarKind::Decimal => 0x0006,
            ScalarKind::Double => 0x0007,
            ScalarKind::Float => 0x0008,
            ScalarKind::Int => 0x0009,
            ScalarKind::Text => 0x000A,
            ScalarKind::Timestamp => 0x000B,
            ScalarKind::Uuid => 0x000C,
            ScalarKind::Varchar => 0x000D,
            ScalarKind::Varint => 0x000E,
            ScalarKind::Timeuuid => 0x000F,
            ScalarKind::Inet => 0x0010,
            ScalarKind::Date => 0x0011,
            ScalarKind::Time => 0x0012,
            ScalarKind::Smallint => 0x0013,
            ScalarKind::Tinyint => 0x0014,
            ScalarKind::Duration => 0x0015,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        Self::ALL.iter().copied().find(|k| k.code() == code)
    }

    /// CQL name, e.g. `"bigint"`.
    pub fn name(self) -> &'static str {
        match self {
            ScalarKind::Ascii => "ascii",
            ScalarKind::Bigint => "bigint",
            ScalarKind::Blob => "blob",
            ScalarKind::Boolean => "boolean",
            ScalarKind::Counter => "counter",
            ScalarKind::Decimal => "decimal",
            ScalarKind::Double => "double",
            ScalarKind::Float => "float",
            ScalarKind::Int => "int",
            ScalarKind::Text => "text",
            ScalarKind::Timestamp => "timestamp",
            ScalarKind::Uuid => "uuid",
            ScalarKind::Varchar => "varchar",
            ScalarKind::Varint => "varint",
            ScalarKind::Timeuuid => "timeuuid",
            ScalarKind::Inet => "inet",
            ScalarKind::Date => "date",
            ScalarKind::Time => "time",
            ScalarKind::Smallint => "smallint",
            ScalarKind::Tinyint => "tinyint",
            ScalarKind::Duration => "duration",
        }
    }

    /// Case-insensitive lookup by CQL name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|k| k.name().eq_ignore_ascii_case(name))
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ════════════════════════════════════════════════════════════════
//  Type Code
// ════════════════════════════════════════════════════════════════

/// Any protocol type code: a scalar, or one of the composite codes whose
/// types need component types to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeCode {
    Scalar(ScalarKind),
    List,
    Map,
    Set,
    Udt,
    Tuple,
}

impl TypeCode {
    pub fn code(self) -> u16 {
        match self {
            TypeCode::Scalar(kind) => kind.code(),
            TypeCode::List => 0x0020,
            TypeCode::Map => 0x0021,
            TypeCode::Set => 0x0022,
            TypeCode::Udt => 0x0030,
            TypeCode::Tuple => 0x0031,
        }
    }

    pub fn from_code(code: u16) -> Result<Self> {
        match code {
            0x0020 => Ok(TypeCode::List),
            0x0021 => Ok(TypeCode::Map),
            0x0022 => Ok(TypeCode::Set),
            0x0030 => Ok(TypeCode::Udt),
            0x0031 => Ok(TypeCode::Tuple),
            other => ScalarKind::from_code(other)
                .map(TypeCode::Scalar)
                .ok_or_else(|| {
                    ValueError::invalid_argument(format!("unknown type code 0x{other:04x}"))
                }),
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Canonical scalar cache
// ════════════════════════════════════════════════════════════════

static SCALARS: std::sync::OnceLock<Vec<crate::types::Type>> = std::sync::OnceLock::new();

/// Canonical, process-wide instance of a scalar type. Populated once on
/// first use; concurrent first calls race harmlessly.
pub fn canonical(kind: ScalarKind) -> &'static crate::types::Type {
    let all = SCALARS.get_or_init(|| {
        ScalarKind::ALL
            .iter()
            .map(|k| crate::types::Type::Scalar(*k))
            .collect()
    });
    &all[kind.index()]
}
