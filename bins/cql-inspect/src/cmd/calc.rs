use cql_core::{Numeric, Result as ValueResult, Width};

use crate::config::{CalcArgs, IntWidth};
use crate::error::CliError;

pub fn run(args: CalcArgs) -> Result<(), CliError> {
    let result = match args.width {
        IntWidth::Tinyint => eval::<i8>(&args.a, &args.op, args.b.as_deref()),
        IntWidth::Smallint => eval::<i16>(&args.a, &args.op, args.b.as_deref()),
        IntWidth::Int => eval::<i32>(&args.a, &args.op, args.b.as_deref()),
        IntWidth::Bigint => eval::<i64>(&args.a, &args.op, args.b.as_deref()),
    }?;
    println!("{result}");
    Ok(())
}

type Binary<T> = fn(Numeric<T>, Numeric<T>) -> ValueResult<Numeric<T>>;
type Unary<T> = fn(Numeric<T>) -> ValueResult<Numeric<T>>;

enum Op<T: Width> {
    Binary(Binary<T>),
    Unary(Unary<T>),
}

fn operator<T: Width>(op: &str) -> Option<Op<T>> {
    Some(match op {
        "add" | "+" => Op::Binary(Numeric::<T>::add),
        "sub" | "-" => Op::Binary(Numeric::<T>::sub),
        "mul" | "x" | "*" => Op::Binary(Numeric::<T>::mul),
        "div" | "/" => Op::Binary(Numeric::<T>::div),
        "mod" | "%" => Op::Binary(Numeric::<T>::rem),
        "abs" => Op::Unary(Numeric::<T>::abs),
        "neg" => Op::Unary(Numeric::<T>::neg),
        "sqrt" => Op::Unary(Numeric::<T>::sqrt),
        _ => return None,
    })
}

/// Evaluate `a op b` (or `a op` for unary operators) at width `T`.
pub fn eval<T: Width>(a: &str, op: &str, b: Option<&str>) -> Result<String, CliError> {
    let a: Numeric<T> = a.trim().parse()?;
    let result = match (operator::<T>(op), b) {
        (None, _) => return Err(CliError::UnknownOperator(op.to_string())),
        (Some(Op::Binary(f)), Some(b)) => f(a, b.trim().parse()?)?,
        (Some(Op::Binary(_)), None) => return Err(CliError::MissingOperand(op.to_string())),
        (Some(Op::Unary(f)), None) => f(a)?,
        (Some(Op::Unary(_)), Some(_)) => return Err(CliError::UnexpectedOperand(op.to_string())),
    };
    tracing::debug!(width = T::NAME, op, %result, "evaluated");
    Ok(result.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_operators() {
        assert_eq!(eval::<i16>("100", "add", Some("200")).unwrap(), "300");
        assert_eq!(eval::<i64>("-7", "/", Some("2")).unwrap(), "-3");
        assert_eq!(eval::<i32>("-7", "mod", Some("2")).unwrap(), "-1");
        assert_eq!(eval::<i8>("12", "x", Some("10")).unwrap(), "120");
    }

    #[test]
    fn overflow_is_reported() {
        let err = eval::<i16>("32767", "+", Some("1")).unwrap_err();
        assert_eq!(err.to_string(), "Sum is out of range");
        let err = eval::<i8>("1", "div", Some("0")).unwrap_err();
        assert_eq!(err.to_string(), "Cannot divide by zero");
        let err = eval::<i16>("40000", "abs", None).unwrap_err();
        assert_eq!(err.to_string(), "value must be between -32768 and 32767, 40000 given");
    }

    #[test]
    fn unary_operators() {
        assert_eq!(eval::<i64>("17", "sqrt", None).unwrap(), "4");
        assert_eq!(eval::<i32>("-5", "abs", None).unwrap(), "5");
        assert!(eval::<i8>("-128", "neg", None).is_err());
    }

    #[test]
    fn operand_count_is_checked() {
        assert!(matches!(eval::<i64>("1", "add", None), Err(CliError::MissingOperand(_))));
        assert!(matches!(eval::<i64>("1", "abs", Some("2")), Err(CliError::UnexpectedOperand(_))));
        assert!(matches!(eval::<i64>("1", "pow", Some("2")), Err(CliError::UnknownOperator(_))));
    }
}
