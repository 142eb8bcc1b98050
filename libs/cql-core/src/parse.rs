//! Parser for CQL type strings, the inverse of `Type`'s `Display`.
//!
//! Accepts scalar names, `list<T>`, `set<T>`, `map<K, V>`, `tuple<...>`,
//! `frozen<T>` (structurally transparent), anonymous `userType<a:T, ...>`,
//! and named user types through a [`UserTypeResolver`].

use std::str::FromStr;

use crate::error::{Result, ValueError};
use crate::scalar::ScalarKind;
use crate::types::Type;

/// Looks up named user types while parsing.
pub trait UserTypeResolver {
    fn resolve(&self, keyspace: Option<&str>, name: &str) -> Option<Type>;
}

/// Resolver that knows no user types.
pub struct NoUserTypes;

impl UserTypeResolver for NoUserTypes {
    fn resolve(&self, _keyspace: Option<&str>, _name: &str) -> Option<Type> {
        None
    }
}

pub fn parse_type(input: &str) -> Result<Type> {
    parse_type_with(input, &NoUserTypes)
}

pub fn parse_type_with(input: &str, resolver: &dyn UserTypeResolver) -> Result<Type> {
    let mut parser = Parser { input, pos: 0, resolver };
    let ty = parser.parse_type()?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(parser.unexpected());
    }
    Ok(ty)
}

impl FromStr for Type {
    type Err = ValueError;

    fn from_str(s: &str) -> Result<Self> {
        parse_type(s)
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
    resolver: &'a dyn UserTypeResolver,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn unexpected(&self) -> ValueError {
        match self.peek() {
            Some(c) => ValueError::format(format!(
                "unexpected character '{c}' at position {} in '{}'",
                self.pos, self.input
            )),
            None => ValueError::format(format!("unexpected end of type string '{}'", self.input)),
        }
    }

    fn eat(&mut self, expected: char) -> bool {
        self.skip_ws();
        if self.peek() == Some(expected) {
            self.pos += expected.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: char) -> Result<()> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Bare identifier (`[A-Za-z0-9_]+`) or a double-quoted one with `""`
    /// escapes.
    fn ident(&mut self) -> Result<String> {
        self.skip_ws();
        if self.peek() == Some('"') {
            self.pos += 1;
            let mut out = String::new();
            loop {
                match self.peek() {
                    Some('"') => {
                        self.pos += 1;
                        if self.peek() == Some('"') {
                            self.pos += 1;
                            out.push('"');
                        } else {
                            return Ok(out);
                        }
                    }
                    Some(c) => {
                        self.pos += c.len_utf8();
                        out.push(c);
                    }
                    None => return Err(self.unexpected()),
                }
            }
        }

        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(self.input[start..self.pos].to_string())
    }

    fn type_list(&mut self) -> Result<Vec<Type>> {
        let mut types = Vec::new();
        if self.eat('>') {
            return Ok(types);
        }
        loop {
            types.push(self.parse_type()?);
            if self.eat('>') {
                return Ok(types);
            }
            self.expect(',')?;
        }
    }

    fn parse_type(&mut self) -> Result<Type> {
        let name = self.ident()?;
        let lower = name.to_ascii_lowercase();

        match lower.as_str() {
            "list" | "set" | "frozen" => {
                self.expect('<')?;
                let inner = self.parse_type()?;
                self.expect('>')?;
                Ok(match lower.as_str() {
                    "list" => Type::collection(inner),
                    "set" => Type::set(inner),
                    _ => inner,
                })
            }
            "map" => {
                self.expect('<')?;
                let key = self.parse_type()?;
                self.expect(',')?;
                let value = self.parse_type()?;
                self.expect('>')?;
                Ok(Type::map(key, value))
            }
            "tuple" => {
                self.expect('<')?;
                Ok(Type::tuple(self.type_list()?))
            }
            "usertype" if self.eat('<') => {
                let mut fields = Vec::new();
                if !self.eat('>') {
                    loop {
                        let field = self.ident()?;
                        self.expect(':')?;
                        fields.push((field, self.parse_type()?));
                        if self.eat('>') {
                            break;
                        }
                        self.expect(',')?;
                    }
                }
                Ok(Type::user_type(fields))
            }
            _ => {
                if let Some(kind) = ScalarKind::from_name(&name) {
                    return Ok(Type::scalar(kind));
                }
                let (keyspace, name) = if self.eat('.') {
                    (Some(name), self.ident()?)
                } else {
                    (None, name)
                };
                self.resolver
                    .resolve(keyspace.as_deref(), &name)
                    .ok_or_else(|| {
                        let full = match &keyspace {
                            Some(ks) => format!("{ks}.{name}"),
                            None => name.clone(),
                        };
                        ValueError::invalid_argument(format!("unknown type '{full}'"))
                    })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::types::UserType;

    struct OneType;

    impl UserTypeResolver for OneType {
        fn resolve(&self, keyspace: Option<&str>, name: &str) -> Option<Type> {
            (name == "address" && keyspace.is_none_or(|ks| ks == "shop")).then(|| {
                Type::UserType(
                    UserType::new(vec![("street".into(), Type::scalar(ScalarKind::Text))])
                        .with_name(Some("shop"), "address"),
                )
            })
        }
    }

    #[test]
    fn display_round_trips() {
        for s in [
            "int",
            "list<int>",
            "set<text>",
            "map<text, bigint>",
            "tuple<int, text>",
            "tuple<>",
            "map<tuple<int, list<blob>>, set<map<uuid, double>>>",
            "userType<a:int, b:list<text>>",
        ] {
            assert_eq!(parse_type(s).unwrap().to_string(), s);
        }
    }

    #[test]
    fn frozen_and_whitespace_are_accepted() {
        let ty: Type = " MAP < text ,frozen<list<int>> > ".parse().unwrap();
        assert_eq!(ty.to_string(), "map<text, list<int>>");
    }

    #[test]
    fn named_user_types_resolve() {
        let ty = parse_type_with("list<frozen<address>>", &OneType).unwrap();
        assert_eq!(ty.to_string(), "list<shop.address>");
        let ty = parse_type_with("shop.address", &OneType).unwrap();
        assert_eq!(ty.name(), "address");
        let err = parse_type_with("other.address", &OneType).unwrap_err();
        assert_eq!(err.message(), "unknown type 'other.address'");
    }

    #[test]
    fn malformed_strings_are_format_errors() {
        for bad in ["", "list<int", "map<int>", "tuple<int,>", "int>", "list<>"] {
            let err = parse_type(bad).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Format, "{bad:?}: {err}");
        }
        assert_eq!(parse_type("widget").unwrap_err().kind(), ErrorKind::InvalidArgument);
    }
}
