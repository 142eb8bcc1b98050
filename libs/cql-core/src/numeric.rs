//! Fixed-width signed integer values with checked arithmetic.
//!
//! One generic [`Numeric`] is instantiated per supported width
//! ([`Tinyint`], [`Smallint`], [`Int32`], [`Bigint`]). A `Numeric` never holds
//! a value outside its width: construction, arithmetic and casts that would
//! leave the range fail with a range error instead of wrapping.

use std::fmt;
use std::hash::Hash;
use std::num::IntErrorKind;
use std::str::FromStr;

use crate::error::{Result, ValueError};
use crate::hash;
use crate::scalar::{self, ScalarKind};
use crate::types::Type;
use crate::value::Value;

mod sealed {
    pub trait Sealed {}
}

/// A supported integer width. Sealed: implemented for `i8`, `i16`, `i32`
/// and `i64` only.
pub trait Width:
    sealed::Sealed + Copy + Ord + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    const MIN: Self;
    const MAX: Self;
    /// CQL name of the width, used in error messages.
    const NAME: &'static str;
    const SCALAR: ScalarKind;

    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn checked_mul(self, rhs: Self) -> Option<Self>;
    fn checked_div(self, rhs: Self) -> Option<Self>;
    fn wrapping_rem(self, rhs: Self) -> Self;
    fn checked_abs(self) -> Option<Self>;
    fn checked_neg(self) -> Option<Self>;
    fn checked_isqrt(self) -> Option<Self>;
    fn is_zero(self) -> bool;

    fn to_i128(self) -> i128;
    fn from_i128(value: i128) -> Option<Self>;
    fn hash_code(self) -> u32;

    fn into_value(n: Numeric<Self>) -> Value;
    fn from_value(value: &Value) -> Option<Numeric<Self>>;
}

macro_rules! impl_width {
    ($t:ty, $name:literal, $scalar:ident, $variant:ident, $hash:expr) => {
        impl sealed::Sealed for $t {}

        impl Width for $t {
            const MIN: Self = <$t>::MIN;
            const MAX: Self = <$t>::MAX;
            const NAME: &'static str = $name;
            const SCALAR: ScalarKind = ScalarKind::$scalar;

            fn checked_add(self, rhs: Self) -> Option<Self> {
                <$t>::checked_add(self, rhs)
            }
            fn checked_sub(self, rhs: Self) -> Option<Self> {
                <$t>::checked_sub(self, rhs)
            }
            fn checked_mul(self, rhs: Self) -> Option<Self> {
                <$t>::checked_mul(self, rhs)
            }
            fn checked_div(self, rhs: Self) -> Option<Self> {
                <$t>::checked_div(self, rhs)
            }
            fn wrapping_rem(self, rhs: Self) -> Self {
                <$t>::wrapping_rem(self, rhs)
            }
            fn checked_abs(self) -> Option<Self> {
                <$t>::checked_abs(self)
            }
            fn checked_neg(self) -> Option<Self> {
                <$t>::checked_neg(self)
            }
            fn checked_isqrt(self) -> Option<Self> {
                <$t>::checked_isqrt(self)
            }
            fn is_zero(self) -> bool {
                self == 0
            }
            fn to_i128(self) -> i128 {
                i128::from(self)
            }
            fn from_i128(value: i128) -> Option<Self> {
                <$t>::try_from(value).ok()
            }
            fn hash_code(self) -> u32 {
                let f: fn($t) -> u32 = $hash;
                f(self)
            }
            fn into_value(n: Numeric<Self>) -> Value {
                Value::$variant(n)
            }
            fn from_value(value: &Value) -> Option<Numeric<Self>> {
                match value {
                    Value::$variant(n) => Some(*n),
                    _ => None,
                }
            }
        }
    };
}

impl_width!(i8, "tinyint", Tinyint, Tinyint, |v| hash::small_hash(i32::from(v)));
impl_width!(i16, "smallint", Smallint, Smallint, |v| hash::small_hash(i32::from(v)));
impl_width!(i32, "int", Int, Int32, hash::small_hash);
impl_width!(i64, "bigint", Bigint, Bigint, hash::bigint_hash);

// ════════════════════════════════════════════════════════════════
//  Numeric
// ════════════════════════════════════════════════════════════════

/// Immutable fixed-width integer value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Numeric<T: Width>(T);

pub type Tinyint = Numeric<i8>;
pub type Smallint = Numeric<i16>;
pub type Int32 = Numeric<i32>;
pub type Bigint = Numeric<i64>;

impl<T: Width> Numeric<T> {
    pub const MIN: Self = Numeric(T::MIN);
    pub const MAX: Self = Numeric(T::MAX);

    pub fn new(raw: T) -> Self {
        Numeric(raw)
    }

    /// The raw integer.
    pub fn get(self) -> T {
        self.0
    }

    fn out_of_range(given: impl fmt::Display) -> ValueError {
        ValueError::range(format!(
            "value must be between {} and {}, {given} given",
            T::MIN,
            T::MAX
        ))
    }

    /// Build from a host integer, rejecting values outside the width.
    pub fn from_i64(value: i64) -> Result<Self> {
        T::from_i128(i128::from(value))
            .map(Numeric)
            .ok_or_else(|| Self::out_of_range(value))
    }

    /// Build from a double. The bound check is done on the real value, then
    /// the value is truncated toward zero.
    pub fn from_f64(value: f64) -> Result<Self> {
        let min = T::MIN.to_i128() as f64;
        let max = T::MAX.to_i128() as f64;
        // `max` rounds up to 2^63 for the 64-bit width, hence the second check.
        if !(value >= min && value <= max) || value as i128 > T::MAX.to_i128() {
            return Err(Self::out_of_range(value));
        }
        T::from_i128(value.trunc() as i128)
            .map(Numeric)
            .ok_or_else(|| Self::out_of_range(value))
    }

    /// Parse from a dynamic value: a host integer, a double, a base-10
    /// string, or a value of the same width.
    pub fn parse(value: &Value) -> Result<Self> {
        match value {
            Value::Int(i) => Self::from_i64(*i),
            Value::Double(d) => Self::from_f64(*d),
            Value::Text(s) => s.parse(),
            other => T::from_value(other).ok_or_else(|| {
                ValueError::invalid_argument(format!(
                    "expected a long, a double, a numeric string or a {}, {} given",
                    T::NAME,
                    other.kind_name()
                ))
            }),
        }
    }

    // ════════════════════════════════════════════════════════════════
    //  Arithmetic
    // ════════════════════════════════════════════════════════════════

    pub fn add(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_add(rhs.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::range("Sum is out of range"))
    }

    pub fn sub(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_sub(rhs.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::range("Difference is out of range"))
    }

    pub fn mul(self, rhs: Self) -> Result<Self> {
        self.0
            .checked_mul(rhs.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::range("Product is out of range"))
    }

    /// Truncating division. `MIN / -1` is out of range.
    pub fn div(self, rhs: Self) -> Result<Self> {
        if rhs.0.is_zero() {
            return Err(ValueError::divide_by_zero("Cannot divide by zero"));
        }
        self.0
            .checked_div(rhs.0)
            .map(Numeric)
            .ok_or_else(|| ValueError::range("Quotient is out of range"))
    }

    /// Remainder with the sign of the dividend.
    pub fn rem(self, rhs: Self) -> Result<Self> {
        if rhs.0.is_zero() {
            return Err(ValueError::divide_by_zero("Cannot modulo by zero"));
        }
        Ok(Numeric(self.0.wrapping_rem(rhs.0)))
    }

    pub fn abs(self) -> Result<Self> {
        self.0
            .checked_abs()
            .map(Numeric)
            .ok_or_else(|| ValueError::range(format!("absolute value of {} is out of range", self.0)))
    }

    /// Negation. Rejected at `MIN` for every width.
    pub fn neg(self) -> Result<Self> {
        self.0
            .checked_neg()
            .map(Numeric)
            .ok_or_else(|| ValueError::range(format!("negation of {} is out of range", self.0)))
    }

    /// Integer square root, `floor(sqrt(self))`.
    pub fn sqrt(self) -> Result<Self> {
        self.0
            .checked_isqrt()
            .map(Numeric)
            .ok_or_else(|| ValueError::range("Cannot take a square root of a negative number"))
    }

    // ════════════════════════════════════════════════════════════════
    //  Conversions
    // ════════════════════════════════════════════════════════════════

    pub fn to_i64(self) -> i64 {
        // Every width is at most 64 bits.
        self.0.to_i128() as i64
    }

    pub fn to_i32(self) -> Result<i32> {
        let v = self.0.to_i128();
        if v < i128::from(i32::MIN) {
            return Err(ValueError::range("Value is too small"));
        }
        if v > i128::from(i32::MAX) {
            return Err(ValueError::range("Value is too big"));
        }
        Ok(v as i32)
    }

    /// Lossy for magnitudes above 2^53; never fails.
    pub fn to_f64(self) -> f64 {
        self.0.to_i128() as f64
    }

    /// Convert to another width, failing when the value does not fit.
    pub fn cast<U: Width>(self) -> Result<Numeric<U>> {
        U::from_i128(self.0.to_i128())
            .map(Numeric)
            .ok_or_else(|| Numeric::<U>::out_of_range(self.0))
    }

    pub fn hash_code(self) -> u32 {
        self.0.hash_code()
    }

    /// The scalar type of this width.
    pub fn scalar_type() -> &'static Type {
        scalar::canonical(T::SCALAR)
    }
}

impl<T: Width> From<T> for Numeric<T> {
    fn from(raw: T) -> Self {
        Numeric(raw)
    }
}

impl<T: Width> From<Numeric<T>> for Value {
    fn from(n: Numeric<T>) -> Self {
        T::into_value(n)
    }
}

impl<T: Width> fmt::Display for Numeric<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<T: Width> FromStr for Numeric<T> {
    type Err = ValueError;

    /// Base-10 only. Malformed input is a format error; well-formed input
    /// outside the width is a range error naming the width's bounds.
    fn from_str(s: &str) -> Result<Self> {
        let wide = match s.parse::<i128>() {
            Ok(v) => v,
            Err(e) => {
                return Err(match e.kind() {
                    IntErrorKind::PosOverflow | IntErrorKind::NegOverflow => Self::out_of_range(s),
                    _ => ValueError::format(format!("Invalid integer value: '{s}'")),
                });
            }
        };
        T::from_i128(wide)
            .map(Numeric)
            .ok_or_else(|| Self::out_of_range(s))
    }
}
