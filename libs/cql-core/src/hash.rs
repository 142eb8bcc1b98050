//! Canonical hashing and total ordering over dynamic values.
//!
//! These are the primitives map and set values rely on for key equality and
//! deterministic iteration order. `compare(a, b) == Equal` always implies
//! `hash_value(a) == hash_value(b)`.

use std::cmp::Ordering;

use crate::value::Value;

/// Hash of `Value::Null`.
pub const NULL_HASH: u32 = 0;

/// Bit pattern every NaN is mapped to before hashing or comparison.
pub const CANONICAL_NAN: i64 = 0x7ff8_0000_0000_0000;

// ════════════════════════════════════════════════════════════════
//  Integer and string mixing
// ════════════════════════════════════════════════════════════════

/// 64-bit integer hash: folds the high half into the low half.
pub fn bigint_hash(value: i64) -> u32 {
    (value ^ (value >> 32)) as u32
}

/// Hash for integers of 32 bits or fewer.
pub fn small_hash(value: i32) -> u32 {
    (31u32 * 17).wrapping_add(value as u32)
}

pub fn combine_hash(seed: u32, hash: u32) -> u32 {
    seed ^ hash
        .wrapping_add(0x9e37_79b9)
        .wrapping_add(seed << 6)
        .wrapping_add(seed >> 2)
}

/// Order-dependent byte string hash (DJB, times 33).
pub fn string_hash(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .fold(5381u32, |h, b| h.wrapping_mul(33).wrapping_add(u32::from(*b)))
}

// ════════════════════════════════════════════════════════════════
//  Doubles
// ════════════════════════════════════════════════════════════════

pub fn double_to_bits(value: f64) -> i64 {
    if value.is_nan() {
        return CANONICAL_NAN;
    }
    value.to_bits() as i64
}

pub fn double_hash(value: f64) -> u32 {
    bigint_hash(double_to_bits(value))
}

/// IEEE order, with NaNs and signed zeros ordered by canonical bits.
pub fn double_compare(a: f64, b: f64) -> Ordering {
    if a < b {
        return Ordering::Less;
    }
    if a > b {
        return Ordering::Greater;
    }
    double_to_bits(a).cmp(&double_to_bits(b))
}

// ════════════════════════════════════════════════════════════════
//  Dynamic values
// ════════════════════════════════════════════════════════════════

pub fn hash_value(value: &Value) -> u32 {
    match value {
        Value::Null => NULL_HASH,
        Value::Bool(b) => u32::from(*b),
        Value::Int(i) => bigint_hash(*i),
        Value::Double(d) => double_hash(*d),
        Value::Text(s) => string_hash(s.as_bytes()),
        Value::Blob(b) => string_hash(b),
        Value::Tinyint(n) => n.hash_code(),
        Value::Smallint(n) => n.hash_code(),
        Value::Int32(n) => n.hash_code(),
        Value::Bigint(n) => n.hash_code(),
        Value::Type(t) => string_hash(t.to_string().as_bytes()),
        Value::Collection(list) => hash_seq(value.kind() as u32, list.items()),
        Value::Set(set) => hash_seq(value.kind() as u32, set.items()),
        Value::Map(map) => map.entries().iter().fold(value.kind() as u32, |h, (k, v)| {
            combine_hash(combine_hash(h, hash_value(k)), hash_value(v))
        }),
        Value::Tuple(tuple) => hash_seq(value.kind() as u32, tuple.values()),
        Value::UserType(udt) => hash_seq(value.kind() as u32, udt.values()),
    }
}

fn hash_seq(seed: u32, values: &[Value]) -> u32 {
    values.iter().fold(seed, |h, v| combine_hash(h, hash_value(v)))
}

/// Total order over every dynamic value. Values of different kinds are
/// ordered by kind rank.
pub fn compare(a: &Value, b: &Value) -> Ordering {
    if std::ptr::eq(a, b) {
        return Ordering::Equal;
    }

    let (ka, kb) = (a.kind(), b.kind());
    if ka != kb {
        return ka.cmp(&kb);
    }

    match (a, b) {
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Int(x), Value::Int(y)) => x.cmp(y),
        (Value::Double(x), Value::Double(y)) => double_compare(*x, *y),
        (Value::Text(x), Value::Text(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Blob(x), Value::Blob(y)) => x.cmp(y),
        (Value::Tinyint(x), Value::Tinyint(y)) => x.cmp(y),
        (Value::Smallint(x), Value::Smallint(y)) => x.cmp(y),
        (Value::Int32(x), Value::Int32(y)) => x.cmp(y),
        (Value::Bigint(x), Value::Bigint(y)) => x.cmp(y),
        (Value::Type(x), Value::Type(y)) => x.cmp(y),
        (Value::Collection(x), Value::Collection(y)) => x
            .element_type()
            .cmp(y.element_type())
            .then_with(|| compare_seq(x.items(), y.items())),
        (Value::Set(x), Value::Set(y)) => x
            .element_type()
            .cmp(y.element_type())
            .then_with(|| compare_seq(x.items(), y.items())),
        (Value::Map(x), Value::Map(y)) => x
            .key_type()
            .cmp(y.key_type())
            .then_with(|| x.value_type().cmp(y.value_type()))
            .then_with(|| compare_entries(x.entries(), y.entries())),
        (Value::Tuple(x), Value::Tuple(y)) => x
            .tuple_type()
            .cmp(y.tuple_type())
            .then_with(|| compare_seq(x.values(), y.values())),
        (Value::UserType(x), Value::UserType(y)) => x
            .user_type()
            .cmp(y.user_type())
            .then_with(|| compare_seq(x.values(), y.values())),
        // Kinds already matched above.
        _ => Ordering::Equal,
    }
}

fn compare_seq(a: &[Value], b: &[Value]) -> Ordering {
    for (x, y) in a.iter().zip(b) {
        let ord = compare(x, y);
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}

fn compare_entries(a: &[(Value, Value)], b: &[(Value, Value)]) -> Ordering {
    for ((ka, va), (kb, vb)) in a.iter().zip(b) {
        let ord = compare(ka, kb).then_with(|| compare(va, vb));
        if ord != Ordering::Equal {
            return ord;
        }
    }
    a.len().cmp(&b.len())
}
