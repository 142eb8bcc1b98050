use std::fmt;

/// Category of a value error. Callers inspect the kind to decide whether
/// different input could succeed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Value or arithmetic result outside the domain of its type.
    Range,
    /// Division or modulo with a zero divisor.
    DivideByZero,
    /// Wrong kind of argument where a specific kind or type was required.
    InvalidArgument,
    /// Structurally forbidden operation.
    Logic,
    /// Malformed textual input.
    Format,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Range => f.write_str("range"),
            ErrorKind::DivideByZero => f.write_str("divide by zero"),
            ErrorKind::InvalidArgument => f.write_str("invalid argument"),
            ErrorKind::Logic => f.write_str("logic"),
            ErrorKind::Format => f.write_str("format"),
        }
    }
}

/// Error returned by every fallible type and value operation.
///
/// Carries an `ErrorKind` for categorization and a human-readable message.
/// Values are immutable, so a failed operation never leaves a partially
/// modified operand behind.
#[derive(Clone, PartialEq, Eq)]
pub struct ValueError {
    kind: ErrorKind,
    message: String,
}

pub type Result<T> = std::result::Result<T, ValueError>;

impl ValueError {
    pub fn range(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Range, message: msg.into() }
    }

    pub fn divide_by_zero(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::DivideByZero, message: msg.into() }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::InvalidArgument, message: msg.into() }
    }

    pub fn logic(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Logic, message: msg.into() }
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self { kind: ErrorKind::Format, message: msg.into() }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Add context to the error, preserving the original ErrorKind.
    ///
    /// Produces: `"context: original message"`.
    pub fn with_context(self, ctx: impl fmt::Display) -> Self {
        Self {
            kind: self.kind,
            message: format!("{ctx}: {}", self.message),
        }
    }
}

impl fmt::Debug for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)
    }
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValueError {}

impl From<std::num::ParseIntError> for ValueError {
    fn from(e: std::num::ParseIntError) -> Self {
        Self::format(e.to_string())
    }
}
