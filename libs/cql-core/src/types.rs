use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::collection::{ListValue, MapValue, SetValue, TupleValue, UserTypeValue};
use crate::error::{Result, ValueError};
use crate::numeric::{Bigint, Int32, Smallint, Tinyint};
use crate::scalar::{self, ScalarKind, TypeCode};
use crate::value::Value;

// ════════════════════════════════════════════════════════════════
//  Type
// ════════════════════════════════════════════════════════════════

/// Column type descriptor.
///
/// Immutable once built. Composite types share their nested types through
/// `Arc`, so cloning is cheap and the hierarchy is an acyclic graph.
/// Equality and ordering are structural.
///
/// Rendering examples:
/// - `int`, `text`
/// - `list<int>`, `set<text>`, `map<text, bigint>`
/// - `tuple<int, text>`
/// - `shop.address` (named user type), `userType<a:int, b:text>` (anonymous)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Scalar(ScalarKind),
    Collection(Arc<Type>),
    Set(Arc<Type>),
    Map(Arc<Type>, Arc<Type>),
    Tuple(TupleType),
    UserType(UserType),
}

/// Ordered element types of a tuple. Duplicates allowed, may be empty.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TupleType {
    elements: Arc<[Type]>,
}

/// A single field of a user type.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Field {
    name: String,
    ty: Type,
}

/// User-defined type: ordered `(name, type)` fields plus an optional
/// keyspace-qualified name.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct UserType {
    keyspace: Option<String>,
    name: Option<String>,
    fields: Arc<[Field]>,
}

impl TupleType {
    pub fn new(elements: Vec<Type>) -> Self {
        Self { elements: elements.into() }
    }

    pub fn elements(&self) -> &[Type] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl Field {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self { name: name.into(), ty }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn ty(&self) -> &Type {
        &self.ty
    }
}

impl UserType {
    pub fn new(fields: Vec<(String, Type)>) -> Self {
        Self {
            keyspace: None,
            name: None,
            fields: fields.into_iter().map(|(name, ty)| Field { name, ty }).collect(),
        }
    }

    /// Same fields, with a name and optional keyspace.
    pub fn with_name(mut self, keyspace: Option<&str>, name: &str) -> Self {
        self.keyspace = keyspace.map(str::to_string);
        self.name = Some(name.to_string());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn keyspace(&self) -> Option<&str> {
        self.keyspace.as_deref()
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Position of the first field called `name`.
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Type of the first field called `name`.
    pub fn field(&self, name: &str) -> Option<&Type> {
        self.field_index(name).map(|i| &self.fields[i].ty)
    }
}

// ════════════════════════════════════════════════════════════════
//  Construction
// ════════════════════════════════════════════════════════════════

fn type_arg<'a>(value: &'a Value, what: &str) -> Result<&'a Type> {
    value.as_type().ok_or_else(|| {
        ValueError::invalid_argument(format!(
            "{what} must be a type, {} given",
            value.kind_name()
        ))
    })
}

impl Type {
    /// Canonical instance of a scalar type.
    pub fn scalar(kind: ScalarKind) -> Type {
        scalar::canonical(kind).clone()
    }

    /// Type for a protocol code. Composite codes fail: they cannot exist
    /// without their component types.
    pub fn from_code(code: TypeCode) -> Result<Type> {
        match code {
            TypeCode::Scalar(kind) => Ok(Type::scalar(kind)),
            other => Err(ValueError::logic(format!(
                "instantiation of an abstract type is not supported: type code 0x{:04x} needs component types",
                other.code()
            ))),
        }
    }

    pub fn collection(element: Type) -> Type {
        Type::Collection(Arc::new(element))
    }

    pub fn set(element: Type) -> Type {
        Type::Set(Arc::new(element))
    }

    pub fn map(key: Type, value: Type) -> Type {
        Type::Map(Arc::new(key), Arc::new(value))
    }

    pub fn tuple(elements: Vec<Type>) -> Type {
        Type::Tuple(TupleType::new(elements))
    }

    pub fn user_type(fields: Vec<(String, Type)>) -> Type {
        Type::UserType(UserType::new(fields))
    }

    // Dynamic constructors: arguments arrive as values from the driver
    // layer and are checked before anything is built.

    pub fn collection_of(element: &Value) -> Result<Type> {
        Ok(Type::collection(type_arg(element, "type")?.clone()))
    }

    pub fn set_of(element: &Value) -> Result<Type> {
        Ok(Type::set(type_arg(element, "type")?.clone()))
    }

    pub fn map_of(key: &Value, value: &Value) -> Result<Type> {
        let key = type_arg(key, "keyType")?;
        let value = type_arg(value, "valueType")?;
        Ok(Type::map(key.clone(), value.clone()))
    }

    pub fn tuple_of(args: &[Value]) -> Result<Type> {
        let elements = args
            .iter()
            .enumerate()
            .map(|(i, arg)| {
                arg.as_type().cloned().ok_or_else(|| {
                    ValueError::invalid_argument(format!("Argument {} is not a type", i + 1))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Type::tuple(elements))
    }

    /// `userType(name, type, name, type, ...)`.
    pub fn user_type_of(args: &[Value]) -> Result<Type> {
        if args.len() % 2 == 1 {
            return Err(ValueError::invalid_argument(
                "Not enough name/type pairs, user types can only be created from an even \
                 number of name/type pairs, where each odd argument is a name and each even \
                 argument is a type, e.g userType(name, type, name, type, name, type)",
            ));
        }
        let mut fields = Vec::with_capacity(args.len() / 2);
        for (i, pair) in args.chunks_exact(2).enumerate() {
            let position = i * 2 + 1;
            let name = pair[0].as_str().ok_or_else(|| {
                ValueError::invalid_argument(format!("Argument {position} is not a string"))
            })?;
            let ty = pair[1].as_type().ok_or_else(|| {
                ValueError::invalid_argument(format!("Argument {} is not a type", position + 1))
            })?;
            fields.push((name.to_string(), ty.clone()));
        }
        Ok(Type::user_type(fields))
    }

    // ════════════════════════════════════════════════════════════════
    //  Introspection
    // ════════════════════════════════════════════════════════════════

    /// Short name: `list`, `set`, `map`, `tuple`, the scalar name, or the
    /// user type's name (`udt` when anonymous).
    pub fn name(&self) -> &str {
        match self {
            Type::Scalar(kind) => kind.name(),
            Type::Collection(_) => "list",
            Type::Set(_) => "set",
            Type::Map(..) => "map",
            Type::Tuple(_) => "tuple",
            Type::UserType(u) => u.name().unwrap_or("udt"),
        }
    }

    pub fn code(&self) -> TypeCode {
        match self {
            Type::Scalar(kind) => TypeCode::Scalar(*kind),
            Type::Collection(_) => TypeCode::List,
            Type::Set(_) => TypeCode::Set,
            Type::Map(..) => TypeCode::Map,
            Type::Tuple(_) => TypeCode::Tuple,
            Type::UserType(_) => TypeCode::Udt,
        }
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, Type::Scalar(_))
    }

    // ════════════════════════════════════════════════════════════════
    //  Values
    // ════════════════════════════════════════════════════════════════

    /// Whether `value` can be stored in a column of this type. Null fits
    /// every type.
    pub fn accepts(&self, value: &Value) -> bool {
        use ScalarKind as K;

        if value.is_null() {
            return true;
        }
        match (self, value) {
            (Type::Scalar(K::Ascii | K::Text | K::Varchar), Value::Text(_)) => true,
            (Type::Scalar(K::Boolean), Value::Bool(_)) => true,
            (Type::Scalar(K::Int), Value::Int32(_)) => true,
            (Type::Scalar(K::Int), Value::Int(i)) => i32::try_from(*i).is_ok(),
            (Type::Scalar(K::Bigint | K::Counter), Value::Bigint(_) | Value::Int(_)) => true,
            (Type::Scalar(K::Smallint), Value::Smallint(_)) => true,
            (Type::Scalar(K::Tinyint), Value::Tinyint(_)) => true,
            (Type::Scalar(K::Double | K::Float), Value::Double(_)) => true,
            (Type::Scalar(K::Blob), Value::Blob(_)) => true,
            (Type::Scalar(K::Timestamp | K::Date | K::Time), Value::Int(_)) => true,
            (
                Type::Scalar(K::Decimal | K::Varint | K::Uuid | K::Timeuuid | K::Inet | K::Duration),
                Value::Text(_),
            ) => true,
            (Type::Collection(t), Value::Collection(list)) => list.element_type() == t.as_ref(),
            (Type::Set(t), Value::Set(set)) => set.element_type() == t.as_ref(),
            (Type::Map(k, v), Value::Map(map)) => {
                map.key_type() == k.as_ref() && map.value_type() == v.as_ref()
            }
            (Type::Tuple(t), Value::Tuple(tuple)) => tuple.tuple_type() == t,
            (Type::UserType(u), Value::UserType(udt)) => udt.user_type() == u,
            _ => false,
        }
    }

    pub fn validate(&self, value: &Value) -> Result<()> {
        if self.accepts(value) {
            return Ok(());
        }
        Err(ValueError::invalid_argument(format!(
            "value must be of type {self}, {} given",
            value.kind_name()
        )))
    }

    /// Validate `value` and convert it to the form stored for this type.
    ///
    /// Integer columns hold exactly one representation: a host integer put
    /// into an `int`, `bigint` or `counter` becomes the fixed-width value.
    pub fn coerce(&self, value: Value) -> Result<Value> {
        self.validate(&value)?;
        match (self, &value) {
            (Type::Scalar(ScalarKind::Int), Value::Int(_)) => Int32::parse(&value).map(Value::from),
            (Type::Scalar(ScalarKind::Bigint | ScalarKind::Counter), Value::Int(_)) => {
                Bigint::parse(&value).map(Value::from)
            }
            _ => Ok(value),
        }
    }

    /// Build a value of this type from positional arguments.
    ///
    /// - scalar: exactly one argument; integer widths are parsed
    /// - list, set: the elements
    /// - map: `key, value, key, value, ...`
    /// - tuple: nothing (all null) or exactly one value per element
    /// - user type: `name, value, name, value, ...`
    pub fn create(&self, args: Vec<Value>) -> Result<Value> {
        match self {
            Type::Scalar(kind) => create_scalar(*kind, args),
            Type::Collection(t) => {
                let mut list = ListValue::new(t.as_ref().clone());
                for v in args {
                    list.push(v)?;
                }
                Ok(Value::Collection(list))
            }
            Type::Set(t) => {
                let mut set = SetValue::new(t.as_ref().clone());
                for v in args {
                    set.insert(v)?;
                }
                Ok(Value::Set(set))
            }
            Type::Map(k, v) => {
                if args.len() % 2 == 1 {
                    return Err(ValueError::invalid_argument(
                        "Not enough key/value pairs, maps can only be created from an even \
                         number of arguments, where each odd argument is a key and each even \
                         argument is a value, e.g create(key, value, key, value)",
                    ));
                }
                let mut map = MapValue::new(k.as_ref().clone(), v.as_ref().clone());
                let mut it = args.into_iter();
                while let (Some(key), Some(value)) = (it.next(), it.next()) {
                    map.insert(key, value)?;
                }
                Ok(Value::Map(map))
            }
            Type::Tuple(t) => {
                let mut tuple = TupleValue::new(t.clone());
                if args.is_empty() {
                    return Ok(Value::Tuple(tuple));
                }
                if args.len() != t.len() {
                    return Err(ValueError::invalid_argument(format!(
                        "Invalid number of elements given. Expected {} arguments.",
                        t.len()
                    )));
                }
                for (i, v) in args.into_iter().enumerate() {
                    tuple
                        .set(i, v)
                        .map_err(|e| e.with_context(format!("element {i}")))?;
                }
                Ok(Value::Tuple(tuple))
            }
            Type::UserType(u) => {
                if args.len() % 2 == 1 {
                    return Err(ValueError::invalid_argument(
                        "Not enough name/value pairs, user type values can only be created \
                         from an even number of arguments, where each odd argument is a name \
                         and each even argument is a value, e.g create(name, value, name, value)",
                    ));
                }
                let mut udt = UserTypeValue::new(u.clone());
                let mut it = args.into_iter().enumerate();
                while let (Some((i, name)), Some((_, value))) = (it.next(), it.next()) {
                    let name = name.as_str().ok_or_else(|| {
                        ValueError::invalid_argument(format!("Argument {} is not a string", i + 1))
                    })?;
                    udt.set(name, value)?;
                }
                Ok(Value::UserType(udt))
            }
        }
    }
}

fn create_scalar(kind: ScalarKind, mut args: Vec<Value>) -> Result<Value> {
    if args.len() != 1 {
        return Err(ValueError::invalid_argument(format!(
            "{kind} values are created from exactly one argument, {} given",
            args.len()
        )));
    }
    let value = args.remove(0);
    if value.is_null() {
        return Ok(value);
    }
    match kind {
        ScalarKind::Tinyint => Tinyint::parse(&value).map(Value::from),
        ScalarKind::Smallint => Smallint::parse(&value).map(Value::from),
        ScalarKind::Int => Int32::parse(&value).map(Value::from),
        ScalarKind::Bigint | ScalarKind::Counter => Bigint::parse(&value).map(Value::from),
        _ => {
            scalar::canonical(kind).validate(&value)?;
            Ok(value)
        }
    }
}

// ════════════════════════════════════════════════════════════════
//  Rendering
// ════════════════════════════════════════════════════════════════

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Scalar(kind) => write!(f, "{kind}"),
            Type::Collection(t) => write!(f, "list<{t}>"),
            Type::Set(t) => write!(f, "set<{t}>"),
            Type::Map(k, v) => write!(f, "map<{k}, {v}>"),
            Type::Tuple(t) => {
                f.write_str("tuple<")?;
                for (i, e) in t.elements().iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{e}")?;
                }
                f.write_str(">")
            }
            Type::UserType(u) => match (u.keyspace(), u.name()) {
                (Some(ks), Some(name)) => write!(f, "{ks}.{name}"),
                (None, Some(name)) => f.write_str(name),
                _ => {
                    f.write_str("userType<")?;
                    for (i, field) in u.fields().iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{}:{}", field.name, field.ty)?;
                    }
                    f.write_str(">")
                }
            },
        }
    }
}

impl Serialize for Type {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::parse::parse_type(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn int() -> Type {
        Type::scalar(ScalarKind::Int)
    }

    fn text() -> Type {
        Type::scalar(ScalarKind::Text)
    }

    #[test]
    fn renders_canonical_strings() {
        assert_eq!(Type::tuple(vec![int(), text()]).to_string(), "tuple<int, text>");
        assert_eq!(
            Type::map(text(), Type::scalar(ScalarKind::Bigint)).to_string(),
            "map<text, bigint>"
        );
        assert_eq!(Type::set(Type::collection(int())).to_string(), "set<list<int>>");
        assert_eq!(Type::tuple(vec![]).to_string(), "tuple<>");
        let udt = Type::user_type(vec![("a".into(), int()), ("b".into(), text())]);
        assert_eq!(udt.to_string(), "userType<a:int, b:text>");
    }

    #[test]
    fn names() {
        assert_eq!(int().name(), "int");
        assert_eq!(Type::collection(int()).name(), "list");
        assert_eq!(Type::set(int()).name(), "set");
        assert_eq!(Type::map(int(), int()).name(), "map");
        assert_eq!(Type::tuple(vec![int()]).name(), "tuple");
        let named = Type::UserType(UserType::new(vec![]).with_name(Some("ks"), "address"));
        assert_eq!(named.name(), "address");
        assert_eq!(named.to_string(), "ks.address");
        assert_eq!(Type::user_type(vec![]).name(), "udt");
    }

    #[test]
    fn equality_is_structural() {
        assert_eq!(Type::scalar(ScalarKind::Int), int());
        assert_eq!(
            Type::map(text(), Type::tuple(vec![int(), int()])),
            Type::map(text(), Type::tuple(vec![int(), int()]))
        );
        assert_ne!(Type::tuple(vec![int(), text()]), Type::tuple(vec![text(), int()]));
        assert_ne!(Type::collection(int()), Type::set(int()));
        assert_ne!(
            Type::user_type(vec![("a".into(), int())]),
            Type::user_type(vec![("b".into(), int())])
        );
    }

    #[test]
    fn composite_codes_cannot_be_instantiated() {
        let err = Type::from_code(TypeCode::Tuple).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Logic);
        assert!(err.message().starts_with("instantiation of an abstract type is not supported"));
        assert_eq!(Type::from_code(TypeCode::Scalar(ScalarKind::Uuid)).unwrap().name(), "uuid");
    }

    #[test]
    fn dynamic_constructors_check_arguments() {
        let err = Type::map_of(&Value::Type(text()), &Value::from("int")).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert_eq!(err.message(), "valueType must be a type, a string given");

        let err = Type::collection_of(&Value::Int(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let err = Type::tuple_of(&[Value::Type(int()), Value::Null]).unwrap_err();
        assert_eq!(err.message(), "Argument 2 is not a type");

        let err = Type::user_type_of(&[Value::from("a"), Value::Type(int()), Value::from("b")])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.message().starts_with("Not enough name/type pairs"));

        let err = Type::user_type_of(&[Value::Int(1), Value::Type(int())]).unwrap_err();
        assert_eq!(err.message(), "Argument 1 is not a string");

        let err = Type::user_type_of(&[Value::from("a"), Value::from("int")]).unwrap_err();
        assert_eq!(err.message(), "Argument 2 is not a type");

        let ok = Type::user_type_of(&[
            Value::from("b"),
            Value::Type(text()),
            Value::from("a"),
            Value::Type(int()),
        ])
        .unwrap();
        assert_eq!(ok.to_string(), "userType<b:text, a:int>");
    }

    #[test]
    fn tuple_create() {
        let ty = Type::tuple(vec![int(), text()]);
        let value = ty.create(vec![Value::Int(5), Value::from("x")]).unwrap();
        let Value::Tuple(tuple) = &value else {
            panic!("expected a tuple, got {value:?}");
        };
        assert!(int().accepts(&tuple.values()[0]));
        assert!(text().accepts(&tuple.values()[1]));
        assert!(ty.accepts(&value));

        assert_eq!(ty.create(vec![Value::Int(5)]).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(
            ty.create(vec![Value::from("x"), Value::Int(5)]).unwrap_err().kind(),
            ErrorKind::InvalidArgument
        );

        let empty = ty.create(vec![]).unwrap();
        assert_eq!(empty.to_string(), "(null, null)");
    }

    #[test]
    fn scalar_create_parses_integer_widths() {
        let small = Type::scalar(ScalarKind::Smallint);
        assert_eq!(
            small.create(vec![Value::from("12")]).unwrap(),
            Value::Smallint(Smallint::new(12))
        );
        assert_eq!(
            small.create(vec![Value::Int(70000)]).unwrap_err().kind(),
            ErrorKind::Range
        );
        assert_eq!(text().create(vec![Value::Int(1)]).unwrap_err().kind(), ErrorKind::InvalidArgument);
        assert_eq!(text().create(vec![]).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn map_and_user_type_create() {
        let ty = Type::map(text(), int());
        let value = ty
            .create(vec![Value::from("b"), Value::Int(2), Value::from("a"), Value::Int(1)])
            .unwrap();
        assert_eq!(value.to_string(), "{'a': 1, 'b': 2}");
        assert!(ty.create(vec![Value::from("a")]).is_err());

        let udt = Type::user_type(vec![("street".into(), text()), ("zip".into(), int())]);
        let value = udt
            .create(vec![Value::from("zip"), Value::Int(123)])
            .unwrap();
        assert_eq!(value.to_string(), "{street: null, zip: 123}");
        assert!(udt.create(vec![Value::Int(1), Value::Int(2)]).is_err());
        assert!(udt.create(vec![Value::from("nope"), Value::Int(2)]).is_err());
    }

    #[test]
    fn nested_values_validate_by_type() {
        let inner = Type::collection(int());
        let outer = Type::set(inner.clone());
        let list = inner.create(vec![Value::Int(1), Value::Int(2)]).unwrap();
        let set = outer.create(vec![list.clone(), list]).unwrap();
        let Value::Set(set) = set else { panic!("expected a set") };
        assert_eq!(set.len(), 1);

        let wrong = Type::collection(text()).create(vec![Value::from("a")]).unwrap();
        assert!(outer.create(vec![wrong]).is_err());
    }

    #[test]
    fn serde_uses_the_rendered_string() {
        let ty = Type::map(text(), Type::tuple(vec![int(), Type::set(text())]));
        let json = serde_json::to_string(&ty).unwrap();
        assert_eq!(json, "\"map<text, tuple<int, set<text>>>\"");
        let back: Type = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ty);
    }
}
