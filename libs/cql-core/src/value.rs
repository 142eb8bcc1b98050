use std::cmp::Ordering;
use std::fmt;

use crate::collection::{ListValue, MapValue, SetValue, TupleValue, UserTypeValue};
use crate::hash;
use crate::numeric::{Bigint, Int32, Smallint, Tinyint};
use crate::types::Type;

/// Rank of a value kind. Values of different kinds order by this rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Double,
    Text,
    Blob,
    Tinyint,
    Smallint,
    Int32,
    Bigint,
    Type,
    Collection,
    Set,
    Map,
    Tuple,
    UserType,
}

/// Dynamic value: what the driver layer binds as a parameter or reads from
/// a result column.
///
/// Strategy by kind:
/// - Host scalars (`Int`, `Double`, `Bool`, `Text`): as-is
/// - Fixed-width integers: domain-checked `Numeric` wrappers
/// - Collections, tuples, user types: carry their own `Type`
///
/// `Eq`, `Ord` and `Hash` follow [`hash::compare`] and [`hash::hash_value`],
/// so every value, doubles included, can be a map key.
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    /// Host-native integer.
    Int(i64),
    Double(f64),
    Text(String),
    Blob(Vec<u8>),

    Tinyint(Tinyint),
    Smallint(Smallint),
    Int32(Int32),
    Bigint(Bigint),

    /// A type descriptor passed around as a value.
    Type(Type),

    Collection(ListValue),
    Set(SetValue),
    Map(MapValue),
    Tuple(TupleValue),
    UserType(UserTypeValue),
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Int(_) => ValueKind::Int,
            Value::Double(_) => ValueKind::Double,
            Value::Text(_) => ValueKind::Text,
            Value::Blob(_) => ValueKind::Blob,
            Value::Tinyint(_) => ValueKind::Tinyint,
            Value::Smallint(_) => ValueKind::Smallint,
            Value::Int32(_) => ValueKind::Int32,
            Value::Bigint(_) => ValueKind::Bigint,
            Value::Type(_) => ValueKind::Type,
            Value::Collection(_) => ValueKind::Collection,
            Value::Set(_) => ValueKind::Set,
            Value::Map(_) => ValueKind::Map,
            Value::Tuple(_) => ValueKind::Tuple,
            Value::UserType(_) => ValueKind::UserType,
        }
    }

    /// Short description of the kind, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self.kind() {
            ValueKind::Null => "null",
            ValueKind::Bool => "a boolean",
            ValueKind::Int => "a long",
            ValueKind::Double => "a double",
            ValueKind::Text => "a string",
            ValueKind::Blob => "a blob",
            ValueKind::Tinyint => "a tinyint",
            ValueKind::Smallint => "a smallint",
            ValueKind::Int32 => "an int",
            ValueKind::Bigint => "a bigint",
            ValueKind::Type => "a type",
            ValueKind::Collection => "a collection",
            ValueKind::Set => "a set",
            ValueKind::Map => "a map",
            ValueKind::Tuple => "a tuple",
            ValueKind::UserType => "a user type value",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_type(&self) -> Option<&Type> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    /// Canonical hash, see [`hash::hash_value`].
    pub fn hash_code(&self) -> u32 {
        hash::hash_value(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        hash::compare(self, other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        hash::compare(self, other)
    }
}

impl std::hash::Hash for Value {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        state.write_u32(hash::hash_value(self));
    }
}

// ════════════════════════════════════════════════════════════════
//  Conversions
// ════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(d: f64) -> Self {
        Value::Double(d)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Type> for Value {
    fn from(t: Type) -> Self {
        Value::Type(t)
    }
}

impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        use serde_json::Value as Json;
        match value {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Int(i) => Json::from(*i),
            Value::Double(d) => serde_json::Number::from_f64(*d).map_or(Json::Null, Json::Number),
            Value::Text(s) => Json::String(s.clone()),
            Value::Blob(b) => Json::String(hex(b)),
            Value::Tinyint(n) => Json::from(n.get()),
            Value::Smallint(n) => Json::from(n.get()),
            Value::Int32(n) => Json::from(n.get()),
            Value::Bigint(n) => Json::from(n.get()),
            Value::Type(t) => Json::String(t.to_string()),
            Value::Collection(list) => Json::Array(list.items().iter().map(Json::from).collect()),
            Value::Set(set) => Json::Array(set.items().iter().map(Json::from).collect()),
            Value::Map(map) => Json::Array(
                map.entries()
                    .iter()
                    .map(|(k, v)| Json::Array(vec![Json::from(k), Json::from(v)]))
                    .collect(),
            ),
            Value::Tuple(tuple) => Json::Array(tuple.values().iter().map(Json::from).collect()),
            Value::UserType(udt) => Json::Object(
                udt.fields()
                    .map(|(name, v)| (name.to_string(), Json::from(v)))
                    .collect(),
            ),
        }
    }
}

fn hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2);
    out.push_str("0x");
    for b in bytes {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

// ════════════════════════════════════════════════════════════════
//  Display
// ════════════════════════════════════════════════════════════════

/// CQL literal rendering: `'text'`, `0xcafe`, `[1, 2]`, `{1, 2}`,
/// `{k: v}`, `(1, 'a')`, `{field: value}`.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Double(d) => write!(f, "{d}"),
            Value::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Value::Blob(b) => f.write_str(&hex(b)),
            Value::Tinyint(n) => write!(f, "{n}"),
            Value::Smallint(n) => write!(f, "{n}"),
            Value::Int32(n) => write!(f, "{n}"),
            Value::Bigint(n) => write!(f, "{n}"),
            Value::Type(t) => write!(f, "{t}"),
            Value::Collection(list) => write_seq(f, "[", list.items(), "]"),
            Value::Set(set) => write_seq(f, "{", set.items(), "}"),
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (k, v)) in map.entries().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            }
            Value::Tuple(tuple) => write_seq(f, "(", tuple.values(), ")"),
            Value::UserType(udt) => {
                f.write_str("{")?;
                for (i, (name, v)) in udt.fields().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{name}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

fn write_seq(f: &mut fmt::Formatter<'_>, open: &str, values: &[Value], close: &str) -> fmt::Result {
    f.write_str(open)?;
    for (i, v) in values.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{v}")?;
    }
    f.write_str(close)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{BTreeSet, HashSet};

    #[test]
    fn doubles_work_as_set_keys() {
        let mut set = HashSet::new();
        set.insert(Value::Double(f64::NAN));
        set.insert(Value::Double(-f64::NAN));
        set.insert(Value::Double(1.5));
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn btree_order_is_deterministic() {
        let set: BTreeSet<Value> = [
            Value::Text("b".into()),
            Value::Int(2),
            Value::Null,
            Value::Text("a".into()),
            Value::Int(-1),
        ]
        .into_iter()
        .collect();
        let rendered: Vec<String> = set.iter().map(|v| v.to_string()).collect();
        assert_eq!(rendered, ["null", "-1", "2", "'a'", "'b'"]);
    }

    #[test]
    fn text_literals_escape_quotes() {
        assert_eq!(Value::from("it's").to_string(), "'it''s'");
        assert_eq!(Value::Blob(vec![0xca, 0xfe]).to_string(), "0xcafe");
    }

    #[test]
    fn json_conversion() {
        assert_eq!(serde_json::Value::from(&Value::Int(3)), serde_json::json!(3));
        assert_eq!(serde_json::Value::from(&Value::Double(f64::NAN)), serde_json::Value::Null);
        assert_eq!(
            serde_json::Value::from(&Value::Bigint(Bigint::new(-2))),
            serde_json::json!(-2)
        );
    }
}
