//! CQL literals as written in schema metadata, read against a known type.
//!
//! Used for aggregate initial conditions such as `0`, `(0, 0)`,
//! `[1, 2]`, `{'a', 'b'}`, `{'k': 1}` or `{street: 'Main', zip: 1}`.
//! Composite literals are built through [`Type::create`], so they are
//! validated and ordered like any other value.

use cql_core::{ScalarKind, Type, Value, ValueError};

pub fn parse_literal(ty: &Type, input: &str) -> Result<Value, ValueError> {
    let mut parser = Parser { input, pos: 0 };
    let value = parser.value(ty)?;
    parser.skip_ws();
    if parser.pos < input.len() {
        return Err(parser.unexpected());
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

/// A scalar token and whether it was single-quoted.
struct Token {
    text: String,
    quoted: bool,
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
                "unexpected character '{c}' at position {} in literal '{}'",
                self.pos, self.input
            )),
            None => ValueError::format(format!("unexpected end of literal '{}'", self.input)),
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

    fn expect(&mut self, expected: char) -> Result<(), ValueError> {
        if self.eat(expected) {
            Ok(())
        } else {
            Err(self.unexpected())
        }
    }

    /// Unquoted `null`, case-insensitive.
    fn eat_null(&mut self) -> bool {
        self.skip_ws();
        let rest = &self.input[self.pos..];
        let is_null = rest.get(..4).is_some_and(|s| s.eq_ignore_ascii_case("null"))
            && !rest[4..].starts_with(|c: char| c.is_alphanumeric() || c == '_');
        if is_null {
            self.pos += 4;
        }
        is_null
    }

    fn value(&mut self, ty: &Type) -> Result<Value, ValueError> {
        if self.eat_null() {
            return Ok(Value::Null);
        }
        match ty {
            Type::Scalar(kind) => {
                let token = self.token()?;
                scalar(*kind, ty, token)
            }
            Type::Collection(element) => {
                let items = self.sequence('[', ']', element)?;
                ty.create(items)
            }
            Type::Set(element) => {
                let items = self.sequence('{', '}', element)?;
                ty.create(items)
            }
            Type::Map(key, value) => {
                let mut args = Vec::new();
                self.expect('{')?;
                if !self.eat('}') {
                    loop {
                        args.push(self.value(key)?);
                        self.expect(':')?;
                        args.push(self.value(value)?);
                        if self.eat('}') {
                            break;
                        }
                        self.expect(',')?;
                    }
                }
                ty.create(args)
            }
            Type::Tuple(tuple) => {
                let mut values = Vec::with_capacity(tuple.len());
                self.expect('(')?;
                if !self.eat(')') {
                    loop {
                        let element = tuple.elements().get(values.len()).ok_or_else(|| {
                            ValueError::invalid_argument(format!(
                                "Too many elements in tuple literal '{}', expected {}",
                                self.input,
                                tuple.len()
                            ))
                        })?;
                        values.push(self.value(element)?);
                        if self.eat(')') {
                            break;
                        }
                        self.expect(',')?;
                    }
                }
                ty.create(values)
            }
            Type::UserType(udt) => {
                let mut args = Vec::new();
                self.expect('{')?;
                if !self.eat('}') {
                    loop {
                        let name = self.field_name()?;
                        let field = udt.field(&name).ok_or_else(|| {
                            ValueError::invalid_argument(format!("Invalid name '{name}'"))
                        })?;
                        self.expect(':')?;
                        let value = self.value(field)?;
                        args.push(Value::Text(name));
                        args.push(value);
                        if self.eat('}') {
                            break;
                        }
                        self.expect(',')?;
                    }
                }
                ty.create(args)
            }
        }
    }

    /// `open element, element close`
    fn sequence(&mut self, open: char, close: char, element: &Type) -> Result<Vec<Value>, ValueError> {
        let mut items = Vec::new();
        self.expect(open)?;
        if self.eat(close) {
            return Ok(items);
        }
        loop {
            items.push(self.value(element)?);
            if self.eat(close) {
                return Ok(items);
            }
            self.expect(',')?;
        }
    }

    /// A single-quoted string (`''` escapes a quote) or a bare run of
    /// characters up to the next delimiter.
    fn token(&mut self) -> Result<Token, ValueError> {
        self.skip_ws();
        if self.eat('\'') {
            let mut text = String::new();
            loop {
                let c = self.peek().ok_or_else(|| self.unexpected())?;
                self.pos += c.len_utf8();
                if c == '\'' {
                    if self.peek() == Some('\'') {
                        self.pos += 1;
                    } else {
                        return Ok(Token { text, quoted: true });
                    }
                }
                text.push(c);
            }
        }

        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| !matches!(c, ',' | ':' | ')' | ']' | '}')) {
            self.pos += c.len_utf8();
        }
        let text = self.input[start..self.pos].trim();
        if text.is_empty() {
            return Err(self.unexpected());
        }
        Ok(Token { text: text.to_string(), quoted: false })
    }

    /// User type field name, bare or double-quoted.
    fn field_name(&mut self) -> Result<String, ValueError> {
        self.skip_ws();
        if self.eat('"') {
            let start = self.pos;
            let end = self.input[start..]
                .find('"')
                .map(|i| start + i)
                .ok_or_else(|| self.unexpected())?;
            self.pos = end + 1;
            return Ok(self.input[start..end].to_string());
        }
        let start = self.pos;
        while let Some(c) = self.peek().filter(|c| c.is_alphanumeric() || *c == '_') {
            self.pos += c.len_utf8();
        }
        if start == self.pos {
            return Err(self.unexpected());
        }
        Ok(self.input[start..self.pos].to_string())
    }
}

fn scalar(kind: ScalarKind, ty: &Type, token: Token) -> Result<Value, ValueError> {
    use ScalarKind as K;
    let Token { text, quoted } = token;
    match kind {
        K::Tinyint | K::Smallint | K::Int | K::Bigint | K::Counter => {
            ty.create(vec![Value::Text(text)])
        }
        K::Double | K::Float => text
            .parse::<f64>()
            .map(Value::Double)
            .map_err(|_| ValueError::format(format!("Invalid floating point value: '{text}'"))),
        K::Boolean => match text.to_ascii_lowercase().as_str() {
            "true" => Ok(Value::Bool(true)),
            "false" => Ok(Value::Bool(false)),
            _ => Err(ValueError::format(format!("Invalid boolean value: '{text}'"))),
        },
        K::Timestamp | K::Date | K::Time => {
            text.parse::<i64>().map(Value::Int).map_err(ValueError::from)
        }
        K::Blob if !quoted && (text.starts_with("0x") || text.starts_with("0X")) => {
            decode_hex(&text[2..]).map(Value::Blob)
        }
        K::Blob => Ok(Value::Blob(text.into_bytes())),
        _ => Ok(Value::Text(text)),
    }
}

fn decode_hex(hex: &str) -> Result<Vec<u8>, ValueError> {
    let invalid = || ValueError::format(format!("Invalid blob literal '0x{hex}'"));
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(invalid());
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid()))
        .collect()
}
