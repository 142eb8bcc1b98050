//! Typed composite values: lists, sets, maps, tuples and user type values.
//!
//! Each value carries its type and validates every element on insertion.
//! Sets and maps keep their keys ordered by [`hash::compare`], so iteration
//! order is deterministic.

use crate::error::{Result, ValueError};
use crate::hash;
use crate::types::{TupleType, Type, UserType};
use crate::value::Value;

fn check_not_null(value: &Value) -> Result<()> {
    if value.is_null() {
        return Err(ValueError::invalid_argument(
            "Invalid value: null is not supported inside collections",
        ));
    }
    Ok(())
}

// ════════════════════════════════════════════════════════════════
//  List
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ListValue {
    element: Type,
    items: Vec<Value>,
}

impl ListValue {
    pub fn new(element: Type) -> Self {
        Self { element, items: Vec::new() }
    }

    pub fn push(&mut self, value: Value) -> Result<()> {
        check_not_null(&value)?;
        let value = self.element.coerce(value)?;
        self.items.push(value);
        Ok(())
    }

    pub fn element_type(&self) -> &Type {
        &self.element
    }

    pub fn ty(&self) -> Type {
        Type::collection(self.element.clone())
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════
//  Set
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct SetValue {
    element: Type,
    /// Sorted by `hash::compare`, no duplicates.
    items: Vec<Value>,
}

impl SetValue {
    pub fn new(element: Type) -> Self {
        Self { element, items: Vec::new() }
    }

    /// Insert a value. Returns `false` if an equal value was already present.
    pub fn insert(&mut self, value: Value) -> Result<bool> {
        check_not_null(&value)?;
        let value = self.element.coerce(value)?;
        match self.items.binary_search_by(|item| hash::compare(item, &value)) {
            Ok(_) => Ok(false),
            Err(pos) => {
                self.items.insert(pos, value);
                Ok(true)
            }
        }
    }

    pub fn contains(&self, value: &Value) -> bool {
        self.items
            .binary_search_by(|item| hash::compare(item, value))
            .is_ok()
    }

    pub fn element_type(&self) -> &Type {
        &self.element
    }

    pub fn ty(&self) -> Type {
        Type::set(self.element.clone())
    }

    pub fn items(&self) -> &[Value] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════
//  Map
// ════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct MapValue {
    key: Type,
    value: Type,
    /// Sorted by key, keys unique.
    entries: Vec<(Value, Value)>,
}

impl MapValue {
    pub fn new(key: Type, value: Type) -> Self {
        Self { key, value, entries: Vec::new() }
    }

    /// Insert an entry, returning the value previously stored under an equal
    /// key.
    pub fn insert(&mut self, key: Value, value: Value) -> Result<Option<Value>> {
        check_not_null(&key)?;
        check_not_null(&value)?;
        let key = self.key.coerce(key)?;
        let value = self.value.coerce(value)?;
        match self.entries.binary_search_by(|(k, _)| hash::compare(k, &key)) {
            Ok(pos) => Ok(Some(std::mem::replace(&mut self.entries[pos].1, value))),
            Err(pos) => {
                self.entries.insert(pos, (key, value));
                Ok(None)
            }
        }
    }

    pub fn get(&self, key: &Value) -> Option<&Value> {
        self.entries
            .binary_search_by(|(k, _)| hash::compare(k, key))
            .ok()
            .map(|pos| &self.entries[pos].1)
    }

    pub fn key_type(&self) -> &Type {
        &self.key
    }

    pub fn value_type(&self) -> &Type {
        &self.value
    }

    pub fn ty(&self) -> Type {
        Type::map(self.key.clone(), self.value.clone())
    }

    pub fn entries(&self) -> &[(Value, Value)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════
//  Tuple
// ════════════════════════════════════════════════════════════════

/// Tuple value. Elements start out null.
#[derive(Debug, Clone)]
pub struct TupleValue {
    ty: TupleType,
    values: Vec<Value>,
}

impl TupleValue {
    pub fn new(ty: TupleType) -> Self {
        let values = vec![Value::Null; ty.len()];
        Self { ty, values }
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<()> {
        let element = self.ty.elements().get(index).ok_or_else(|| {
            ValueError::invalid_argument(format!(
                "Index out of bounds: {index}, tuple has {} elements",
                self.ty.len()
            ))
        })?;
        self.values[index] = element.coerce(value)?;
        Ok(())
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn tuple_type(&self) -> &TupleType {
        &self.ty
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

// ════════════════════════════════════════════════════════════════
//  User type value
// ════════════════════════════════════════════════════════════════

/// Value of a user-defined type. Values are positional, aligned with the
/// type's fields; fields start out null.
#[derive(Debug, Clone)]
pub struct UserTypeValue {
    ty: UserType,
    values: Vec<Value>,
}

impl UserTypeValue {
    pub fn new(ty: UserType) -> Self {
        let values = vec![Value::Null; ty.fields().len()];
        Self { ty, values }
    }

    /// Set the first field called `name`.
    pub fn set(&mut self, name: &str, value: Value) -> Result<()> {
        let index = self
            .ty
            .field_index(name)
            .ok_or_else(|| ValueError::invalid_argument(format!("Invalid name '{name}'")))?;
        self.values[index] = self.ty.fields()[index].ty().coerce(value)?;
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.ty.field_index(name).map(|i| &self.values[i])
    }

    pub fn user_type(&self) -> &UserType {
        &self.ty
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// `(field name, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.ty
            .fields()
            .iter()
            .map(|f| f.name())
            .zip(self.values.iter())
    }
}
