use std::cmp::Ordering;

use crate::error::EvalError;
use crate::expr::{BinaryOp, Expr, UnaryOp, Value};

type Result<T> = std::result::Result<T, EvalError>;

impl Expr {
    /// Evaluates the expression. `slots` holds the values of the bound variables, indexed by slot.
    pub fn evaluate(&self, slots: &[&Value]) -> Result<Value> {
        match self {
            Expr::Literal(value) => Ok(value.clone()),
            Expr::Slot(slot, name) => slots
                .get(*slot)
                .map(|&value| value.clone())
                .ok_or_else(|| EvalError::UnknownName(name.clone())),
            Expr::Ident(name) => Err(EvalError::UnknownName(name.clone())),
            Expr::List(items) => {
                let values = items
                    .iter()
                    .map(|e| e.evaluate(slots))
                    .collect::<Result<Vec<_>>>()?;
                Ok(Value::List(values))
            }
            Expr::Unary(op, e) => unary(*op, e.evaluate(slots)?),
            Expr::Binary(BinaryOp::And, l, r) => {
                if bool_operand("and", l.evaluate(slots)?)? {
                    bool_operand("and", r.evaluate(slots)?).map(Value::Bool)
                } else {
                    Ok(Value::Bool(false))
                }
            }
            Expr::Binary(BinaryOp::Or, l, r) => {
                if bool_operand("or", l.evaluate(slots)?)? {
                    Ok(Value::Bool(true))
                } else {
                    bool_operand("or", r.evaluate(slots)?).map(Value::Bool)
                }
            }
            Expr::Binary(op, l, r) => binary(*op, l.evaluate(slots)?, r.evaluate(slots)?),
            Expr::Call(name, args) => {
                let args = args
                    .iter()
                    .map(|e| e.evaluate(slots))
                    .collect::<Result<Vec<_>>>()?;
                call(name, args)
            }
            Expr::Count(list, item) => {
                let item = item.evaluate(slots)?;
                match list.evaluate(slots)? {
                    Value::List(values) => {
                        Ok(Value::Int(values.iter().filter(|&v| *v == item).count() as i64))
                    }
                    other => Err(invalid_operand("count", &other)),
                }
            }
        }
    }
}

fn invalid_operand(op: &'static str, operand: &Value) -> EvalError {
    EvalError::InvalidOperand {
        op,
        operand: format!("{} ({})", operand, operand.kind()),
    }
}

fn bool_operand(op: &'static str, value: Value) -> Result<bool> {
    value.as_bool().ok_or_else(|| invalid_operand(op, &value))
}

fn int_operand(op: &'static str, value: &Value) -> Result<i64> {
    value.as_int().ok_or_else(|| invalid_operand(op, value))
}

fn unary(op: UnaryOp, value: Value) -> Result<Value> {
    match op {
        UnaryOp::Not => Ok(Value::Bool(!bool_operand("not", value)?)),
        UnaryOp::Neg => int_operand("-", &value)?
            .checked_neg()
            .map(Value::Int)
            .ok_or(EvalError::Overflow),
    }
}

fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value> {
    let symbol = op.symbol();
    let value = match op {
        BinaryOp::Eq => Value::Bool(left == right),
        BinaryOp::Ne => Value::Bool(left != right),
        BinaryOp::Lt | BinaryOp::Gt | BinaryOp::Le | BinaryOp::Ge => {
            let ordering = compare(symbol, &left, &right)?;
            Value::Bool(match op {
                BinaryOp::Lt => ordering == Ordering::Less,
                BinaryOp::Gt => ordering == Ordering::Greater,
                BinaryOp::Le => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
        BinaryOp::In | BinaryOp::NotIn => {
            let contains = match (&left, &right) {
                (_, Value::List(values)) => values.contains(&left),
                (Value::Str(needle), Value::Str(haystack)) => haystack.contains(needle.as_str()),
                _ => return Err(invalid_operand(symbol, &right)),
            };
            Value::Bool(contains == (op == BinaryOp::In))
        }
        BinaryOp::Add => match (left, right) {
            (Value::Str(mut a), Value::Str(b)) => {
                a.push_str(&b);
                Value::Str(a)
            }
            (Value::List(mut a), Value::List(b)) => {
                a.extend(b);
                Value::List(a)
            }
            (a, b) => arithmetic(symbol, &a, &b, i64::checked_add)?,
        },
        BinaryOp::Sub => arithmetic(symbol, &left, &right, i64::checked_sub)?,
        BinaryOp::Mul => arithmetic(symbol, &left, &right, i64::checked_mul)?,
        BinaryOp::Div => {
            if right.as_int() == Some(0) {
                return Err(EvalError::DivisionByZero);
            }
            arithmetic(symbol, &left, &right, floor_div)?
        }
        BinaryOp::Rem => {
            if right.as_int() == Some(0) {
                return Err(EvalError::DivisionByZero);
            }
            arithmetic(symbol, &left, &right, floor_rem)?
        }
        BinaryOp::And | BinaryOp::Or => {
            let (a, b) = (bool_operand(symbol, left)?, bool_operand(symbol, right)?);
            Value::Bool(if op == BinaryOp::And { a && b } else { a || b })
        }
    };
    Ok(value)
}

fn compare(op: &'static str, left: &Value, right: &Value) -> Result<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Ok(a.cmp(b)),
        (Value::Str(a), Value::Str(b)) => Ok(a.cmp(b)),
        (Value::Int(_), other) | (Value::Str(_), other) | (other, _) => {
            Err(invalid_operand(op, other))
        }
    }
}

fn arithmetic(
    op: &'static str,
    left: &Value,
    right: &Value,
    f: impl FnOnce(i64, i64) -> Option<i64>,
) -> Result<Value> {
    let (a, b) = (int_operand(op, left)?, int_operand(op, right)?);
    f(a, b).map(Value::Int).ok_or(EvalError::Overflow)
}

/// Division rounding toward negative infinity
fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && (a < 0) != (b < 0) {
        Some(q - 1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the divisor
fn floor_rem(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && (r < 0) != (b < 0) {
        Some(r + b)
    } else {
        Some(r)
    }
}

fn call(name: &str, args: Vec<Value>) -> Result<Value> {
    match name {
        "abs" => {
            let arg = single_argument("abs", args)?;
            int_operand("abs", &arg)?
                .checked_abs()
                .map(Value::Int)
                .ok_or(EvalError::Overflow)
        }
        "len" => {
            let arg = single_argument("len", args)?;
            match arg {
                Value::List(values) => Ok(Value::Int(values.len() as i64)),
                Value::Str(s) => Ok(Value::Int(s.chars().count() as i64)),
                other => Err(invalid_operand("len", &other)),
            }
        }
        "sum" => {
            let arg = single_argument("sum", args)?;
            let values = list_argument("sum", arg)?;
            values.iter().try_fold(Value::Int(0), |acc, v| {
                arithmetic("sum", &acc, v, i64::checked_add)
            })
        }
        "min" | "max" => {
            let function = if name == "min" { "min" } else { "max" };
            let values = if args.len() == 1 {
                let arg = single_argument(function, args)?;
                list_argument(function, arg)?
            } else {
                args
            };
            let mut values = values.into_iter();
            let mut best = values.next().ok_or(EvalError::WrongArgumentCount {
                function,
                expected: "at least 1",
                found: 0,
            })?;
            for value in values {
                let ordering = compare(function, &value, &best)?;
                let better = if function == "min" {
                    ordering == Ordering::Less
                } else {
                    ordering == Ordering::Greater
                };
                if better {
                    best = value;
                }
            }
            Ok(best)
        }
        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

fn list_argument(function: &'static str, arg: Value) -> Result<Vec<Value>> {
    match arg {
        Value::List(values) => Ok(values),
        other => Err(invalid_operand(function, &other)),
    }
}

fn single_argument(function: &'static str, mut args: Vec<Value>) -> Result<Value> {
    let found = args.len();
    match args.pop() {
        Some(arg) if found == 1 => Ok(arg),
        _ => Err(EvalError::WrongArgumentCount {
            function,
            expected: "1",
            found,
        }),
    }
}
