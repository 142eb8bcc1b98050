//! Parser for legacy marshal validator strings, e.g.
//! `org.apache.cassandra.db.marshal.ReversedType(org.apache.cassandra.db.marshal.Int32Type)`.
//!
//! Older schema tables describe column types this way instead of CQL
//! syntax. A top-level `ReversedType` marks a descending clustering column
//! and a top-level `FrozenType` a frozen column; both wrap the real type.

use cql_core::{ScalarKind, Type, UserType, ValueError};

const PACKAGE: &str = "org.apache.cassandra.db.marshal.";

/// Result of parsing a validator string.
#[derive(Debug, Clone, PartialEq)]
pub struct MarshalType {
    pub ty: Type,
    pub reversed: bool,
    pub frozen: bool,
}

/// CQL scalar for a marshal class name.
fn scalar_for(class: &str) -> Option<ScalarKind> {
    use ScalarKind as K;
    Some(match class {
        "AsciiType" => K::Ascii,
        "LongType" => K::Bigint,
        "BytesType" => K::Blob,
        "BooleanType" => K::Boolean,
        "CounterColumnType" => K::Counter,
        "DecimalType" => K::Decimal,
        "DoubleType" => K::Double,
        "FloatType" => K::Float,
        "InetAddressType" => K::Inet,
        "Int32Type" => K::Int,
        "UTF8Type" => K::Text,
        "TimestampType" | "DateType" => K::Timestamp,
        "UUIDType" => K::Uuid,
        "IntegerType" => K::Varint,
        "TimeUUIDType" => K::Timeuuid,
        "SimpleDateType" => K::Date,
        "TimeType" => K::Time,
        "ShortType" => K::Smallint,
        "ByteType" => K::Tinyint,
        "DurationType" => K::Duration,
        _ => return None,
    })
}

pub fn parse_marshal(input: &str) -> Result<MarshalType, ValueError> {
    let mut parser = Parser { input, pos: 0 };
    let mut reversed = false;
    let mut frozen = false;

    let mut class = parser.class_name()?;
    loop {
        match class {
            "ReversedType" if !reversed && !frozen => reversed = true,
            "FrozenType" if !frozen => frozen = true,
            _ => break,
        }
        parser.expect('(')?;
        class = parser.class_name()?;
    }

    let ty = parser.class_body(class)?;
    for _ in 0..(usize::from(reversed) + usize::from(frozen)) {
        parser.expect(')')?;
    }
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(parser.unexpected());
    }
    Ok(MarshalType { ty, reversed, frozen })
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek().filter(|c| c.is_whitespace()) {
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self) -> ValueError {
        match self.peek() {
            Some(c) => ValueError::format(format!(
                "unexpected character '{c}' at position {} in validator '{}'",
                self.pos, self.input
            )),
            None => ValueError::format(format!("unexpected end of validator '{}'", self.input)),
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<(), ValueError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// A bare token: class names, keyspace names and hex strings.
    fn token(&mut self) -> Result<&'a str, ValueError> {
        self.skip_ws();
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '$'))
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(&self.input[start..self.pos])
    }

    /// Class name with the marshal package prefix removed.
    fn class_name(&mut self) -> Result<&'a str, ValueError> {
        let name = self.token()?;
        Ok(name.strip_prefix(PACKAGE).unwrap_or(name))
    }

    fn parse(&mut self) -> Result<Type, ValueError> {
        let class = self.class_name()?;
        self.class_body(class)
    }

    /// Parameters (if any) of `class`, already consumed by the caller.
    fn class_body(&mut self, class: &str) -> Result<Type, ValueError> {
        if let Some(kind) = scalar_for(class) {
            return Ok(Type::scalar(kind));
        }

        self.expect('(')?;
        let ty = match class {
            "ListType" => Type::collection(self.parse()?),
            "SetType" => Type::set(self.parse()?),
            "MapType" => {
                let key = self.parse()?;
                self.expect(',')?;
                Type::map(key, self.parse()?)
            }
            "FrozenType" | "ReversedType" => self.parse()?,
            "TupleType" => {
                let mut elements = vec![self.parse()?];
                while self.eat(',') {
                    elements.push(self.parse()?);
                }
                Type::tuple(elements)
            }
            "UserType" => self.user_type()?,
            other => {
                return Err(ValueError::invalid_argument(format!(
                    "unsupported marshal type '{other}'"
                )));
            }
        };
        self.expect(')')?;
        Ok(ty)
    }

    /// `keyspace, hexname, hexfield:type, ...`
    fn user_type(&mut self) -> Result<Type, ValueError> {
        let keyspace = self.token()?;
        self.expect(',')?;
        let name = decode_hex(self.token()?)?;

        let mut fields = Vec::new();
        while self.eat(',') {
            let field = decode_hex(self.token()?)?;
            self.expect(':')?;
            fields.push((field, self.parse()?));
        }
        Ok(Type::UserType(UserType::new(fields).with_name(Some(keyspace), &name)))
    }
}

fn decode_hex(hex: &str) -> Result<String, ValueError> {
    let invalid = || ValueError::format(format!("invalid hex name '{hex}'"));
    if hex.len() % 2 != 0 {
        return Err(invalid());
    }
    let bytes = (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid()))
        .collect::<Result<Vec<u8>, _>>()?;
    String::from_utf8(bytes).map_err(|_| invalid())
}
