//! Property-based tests for value hashing and ordering.
//!
//! - `compare(a, b) == Equal` implies equal hashes
//! - `compare` is a total order across mixed kinds
//! - Every NaN is one value; signed zeros stay distinct
//! - Composite values (maps, tuples, user types) follow the same rules

use std::cmp::Ordering;

use cql_core::hash::{compare, double_compare, hash_value};
use cql_core::{Bigint, Int32, ScalarKind, Smallint, Tinyint, Type, UserType, Value};
use proptest::prelude::*;

fn double_strategy() -> impl Strategy<Value = f64> {
    prop_oneof![
        any::<f64>(),
        Just(f64::NAN),
        Just(-f64::NAN),
        Just(f64::from_bits(0x7ff0_0000_0000_0001)),
        Just(0.0),
        Just(-0.0),
        Just(f64::INFINITY),
        Just(f64::NEG_INFINITY),
    ]
}

fn scalar_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        (-5i64..5).prop_map(Value::Int),
        any::<i64>().prop_map(Value::Int),
        double_strategy().prop_map(Value::Double),
        "[a-c]{0,3}".prop_map(Value::Text),
        prop::collection::vec(any::<u8>(), 0..4).prop_map(Value::Blob),
        any::<i8>().prop_map(|v| Value::Tinyint(Tinyint::new(v))),
        (-3i16..3).prop_map(|v| Value::Smallint(Smallint::new(v))),
        (-3i32..3).prop_map(|v| Value::Int32(Int32::new(v))),
        any::<i32>().prop_map(|v| Value::Int32(Int32::new(v))),
        any::<i64>().prop_map(|v| Value::Bigint(Bigint::new(v))),
        Just(Value::Type(Type::scalar(ScalarKind::Int))),
        Just(Value::Type(Type::collection(Type::scalar(ScalarKind::Text)))),
    ]
}

fn int_list() -> impl Strategy<Value = Value> {
    prop::collection::vec(-3i64..3, 0..4).prop_map(|items| {
        Type::collection(Type::scalar(ScalarKind::Bigint))
            .create(items.into_iter().map(Value::Int).collect())
            .unwrap()
    })
}

fn text_set() -> impl Strategy<Value = Value> {
    prop::collection::vec("[a-c]{1,2}", 0..4).prop_map(|items| {
        Type::set(Type::scalar(ScalarKind::Text))
            .create(items.into_iter().map(Value::Text).collect())
            .unwrap()
    })
}

fn text_int_map() -> impl Strategy<Value = Value> {
    prop::collection::vec(("[a-c]", -3i64..3), 0..3).prop_map(|entries| {
        let args = entries
            .into_iter()
            .flat_map(|(k, v)| [Value::Text(k), Value::Int(v)])
            .collect();
        Type::map(Type::scalar(ScalarKind::Text), Type::scalar(ScalarKind::Int))
            .create(args)
            .unwrap()
    })
}

fn maybe<T: std::fmt::Debug>(
    strategy: impl Strategy<Value = T>,
    to_value: fn(T) -> Value,
) -> impl Strategy<Value = Value> {
    prop_oneof![1 => Just(Value::Null), 3 => strategy.prop_map(to_value)]
}

fn tuple_value() -> impl Strategy<Value = Value> {
    let pair = (maybe(-2i64..2, Value::Int), maybe("[a-b]", Value::Text)).prop_map(|(a, b)| {
        Type::tuple(vec![Type::scalar(ScalarKind::Int), Type::scalar(ScalarKind::Text)])
            .create(vec![a, b])
            .unwrap()
    });
    let single = maybe(-2i64..2, Value::Int).prop_map(|a| {
        Type::tuple(vec![Type::scalar(ScalarKind::Bigint)]).create(vec![a]).unwrap()
    });
    prop_oneof![pair, single]
}

fn user_type_value() -> impl Strategy<Value = Value> {
    (maybe(-2i64..2, Value::Int), any::<bool>()).prop_map(|(x, named)| {
        let fields = vec![
            ("x".to_string(), Type::scalar(ScalarKind::Int)),
            ("label".to_string(), Type::scalar(ScalarKind::Text)),
        ];
        let ty = if named {
            Type::UserType(UserType::new(fields).with_name(Some("ks"), "point"))
        } else {
            Type::user_type(fields)
        };
        ty.create(vec![Value::from("x"), x]).unwrap()
    })
}

fn any_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        6 => scalar_value(),
        1 => int_list(),
        1 => text_set(),
        1 => text_int_map(),
        1 => tuple_value(),
        1 => user_type_value(),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// compare(a, b) == Equal implies hash(a) == hash(b).
    #[test]
    fn equal_values_have_equal_hashes(a in any_value(), b in any_value()) {
        if compare(&a, &b) == Ordering::Equal {
            prop_assert_eq!(hash_value(&a), hash_value(&b));
        }
        let copy = a.clone();
        prop_assert_eq!(compare(&a, &copy), Ordering::Equal);
        prop_assert_eq!(hash_value(&a), hash_value(&copy));
    }

    #[test]
    fn compare_is_antisymmetric(a in any_value(), b in any_value()) {
        prop_assert_eq!(compare(&a, &b), compare(&b, &a).reverse());
    }

    #[test]
    fn compare_is_transitive(a in any_value(), b in any_value(), c in any_value()) {
        let mut v = [a, b, c];
        v.sort_by(compare);
        prop_assert_ne!(compare(&v[0], &v[1]), Ordering::Greater);
        prop_assert_ne!(compare(&v[1], &v[2]), Ordering::Greater);
        prop_assert_ne!(compare(&v[0], &v[2]), Ordering::Greater);
    }

    #[test]
    fn double_compare_is_total(a in double_strategy(), b in double_strategy()) {
        let ab = double_compare(a, b);
        prop_assert_eq!(ab, double_compare(b, a).reverse());
        if ab == Ordering::Equal {
            prop_assert_eq!(hash_value(&Value::Double(a)), hash_value(&Value::Double(b)));
        }
        if a < b {
            prop_assert_eq!(ab, Ordering::Less);
        }
    }

    #[test]
    fn nans_are_one_value(payload in 1u64..(1 << 51), negative in any::<bool>()) {
        let sign = if negative { 1u64 << 63 } else { 0 };
        let nan = f64::from_bits(sign | 0x7ff0_0000_0000_0000 | payload);
        prop_assert!(nan.is_nan());
        prop_assert_eq!(Value::Double(nan), Value::Double(f64::NAN));
        prop_assert_eq!(hash_value(&Value::Double(nan)), hash_value(&Value::Double(f64::NAN)));
    }

    #[test]
    fn different_kinds_never_compare_equal(a in scalar_value(), b in scalar_value()) {
        if a.kind() != b.kind() {
            prop_assert_eq!(compare(&a, &b), a.kind().cmp(&b.kind()));
        }
    }
}

#[test]
fn signed_zeros_are_distinct() {
    let (pos, neg) = (Value::Double(0.0), Value::Double(-0.0));
    assert_eq!(compare(&neg, &pos), Ordering::Less);
    assert_ne!(hash_value(&neg), hash_value(&pos));
}

#[test]
fn null_hashes_to_zero() {
    assert_eq!(hash_value(&Value::Null), cql_core::hash::NULL_HASH);
    assert_eq!(compare(&Value::Null, &Value::Null), Ordering::Equal);
}
