//! The tagged value union (§3.1) and its operator contracts (§4.1).
//!
//! Grounded on the teacher's `interpreter/mod.rs::VariableType`, generalized
//! from its 4 variants (`Void`/`Bool`/`Str`/`Int`) to the spec's 8, and from
//! its ad hoc `match` arms per operator into the single unified
//! `numeric_binary` dispatch the spec's "Dynamic dispatch over value
//! variants" design note calls for.
mod access_modifier;
mod function;
mod struct_instance;
mod struct_type;

pub use access_modifier::AccessModifier;
pub use function::{BuiltinCall, BuiltinFunction, Function, UserFunction};
pub use struct_instance::StructInstance;
pub use struct_type::StructType;

use std::sync::atomic::{AtomicU64, Ordering};

use crate::ast::{BinaryVerb, Position, TypeName, UnaryVerb};
use crate::error::{err, ErrorKind, EvalError};

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Monotonic identity counter shared by functions, struct types, and struct
/// instances (§5: "must be unique across a run; in a single-threaded model
/// a simple monotonic counter suffices").
pub fn next_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Int(i64),
    Double(f64),
    String(String),
    Bool(bool),
    Function(Function),
    StructType(StructType),
    StructInstance(StructInstance),
}

impl Value {
    pub fn type_name(&self) -> TypeName {
        match self {
            Value::Null => TypeName::Null,
            Value::Int(_) => TypeName::Int,
            Value::Double(_) => TypeName::Double,
            Value::String(_) => TypeName::String,
            Value::Bool(_) => TypeName::Bool,
            Value::Function(_) => TypeName::Function,
            Value::StructType(t) => TypeName::Struct(t.name().to_owned()),
            Value::StructInstance(i) => TypeName::Struct(i.struct_type().name().to_owned()),
        }
    }

    /// The built-in `__fvalue_type` name, distinct per variant (§8.2: the
    /// function is injective across all 8 variants, not just the 6
    /// primitive ones — struct instances report their own struct name while
    /// every other struct-typed thing still reads back as a distinct tag).
    pub fn type_tag(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Int(_) => "Int",
            Value::Double(_) => "Double",
            Value::String(_) => "String",
            Value::Bool(_) => "Bool",
            Value::Function(_) => "Function",
            Value::StructType(_) => "StructType",
            Value::StructInstance(_) => "StructInstance",
        }
    }

    /// `Double → Int` construction rule (§3.1): if `d` is exactly
    /// representable as an `Int`, store it as one.
    pub fn from_double(d: f64) -> Value {
        if is_integer_valued(d) && in_i64_range(d) {
            Value::Int(d as i64)
        } else {
            Value::Double(d)
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Int(i) => Some(*i as f64),
            Value::Double(d) => Some(*d),
            _ => None,
        }
    }

    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "null".to_owned(),
            Value::Int(i) => i.to_string(),
            Value::Double(d) => format_double(*d),
            Value::String(s) => s.clone(),
            Value::Bool(b) => b.to_string(),
            Value::Function(func) => format!("<Function {}@{}>", func.display_name(), func.id()),
            Value::StructType(t) => format!("<StructType {}@{}>", t.name(), t.id()),
            Value::StructInstance(i) => {
                format!("<StructInstance {}@{}>", i.struct_type().name(), i.id())
            }
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        // Cross-variant comparisons are never equal (SPEC_FULL.md §9 Open
        // Question 2, pinned): arithmetic unifies Int/Double, equality does
        // not.
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Double(a), Value::Double(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::StructType(a), Value::StructType(b)) => a == b,
            (Value::StructInstance(a), Value::StructInstance(b)) => a == b,
            _ => false,
        }
    }
}

fn is_integer_valued(d: f64) -> bool {
    d.fract() == 0.0
}

fn in_i64_range(d: f64) -> bool {
    d >= i64::MIN as f64 && d <= i64::MAX as f64
}

/// Shortest-round-trip decimal rendering for a double, always with a
/// decimal point so it never collapses into an integer-looking literal
/// (§4.1 `toString`: "double via shortest-round-trip decimal").
fn format_double(d: f64) -> String {
    if d.is_nan() {
        return "NaN".to_owned();
    }
    if d.is_infinite() {
        return if d > 0.0 { "Infinity" } else { "-Infinity" }.to_owned();
    }
    let s = format!("{d}");
    if s.contains('.') || s.contains('e') || s.contains('E') {
        s
    } else {
        format!("{s}.0")
    }
}

fn value_error(message: impl Into<String>, position: &Position) -> EvalError {
    err(ErrorKind::ValueError, message, position)
}

/// `+ - * / % **` on two `Int`s: exact `i128` arithmetic, collapsed back to
/// `Int` iff the exact result is representable losslessly (§3.1 invariant,
/// §8.1 invariants 1–2).
fn int_arith(
    verb: BinaryVerb,
    a: i64,
    b: i64,
    position: &Position,
) -> Result<Value, EvalError> {
    let (a128, b128) = (a as i128, b as i128);
    let exact: i128 = match verb {
        BinaryVerb::Add => a128 + b128,
        BinaryVerb::Sub => a128 - b128,
        BinaryVerb::Mul => a128 * b128,
        BinaryVerb::Div => {
            if b == 0 {
                return Err(value_error("division by zero", position));
            }
            if a % b == 0 {
                return Ok(Value::Int(a / b));
            }
            return Ok(Value::Double(a as f64 / b as f64));
        }
        BinaryVerb::Mod => {
            if b == 0 {
                return Err(value_error("modulo by zero", position));
            }
            return Ok(Value::Int(a % b));
        }
        BinaryVerb::Pow => {
            if let Ok(exp) = u32::try_from(b) {
                match a128.checked_pow(exp) {
                    Some(v) => v,
                    None => return Ok(Value::Double((a as f64).powf(b as f64))),
                }
            } else {
                // Negative exponent: result is fractional unless a == 1/-1.
                return Ok(Value::from_double((a as f64).powf(b as f64)));
            }
        }
        _ => unreachable!("int_arith called with non-arithmetic verb"),
    };
    if (i64::MIN as i128..=i64::MAX as i128).contains(&exact) {
        Ok(Value::Int(exact as i64))
    } else {
        Ok(Value::Double(exact as f64))
    }
}

/// `+ - * / %` where at least one operand is `Double`: computed in `f64`,
/// then collapsed back to `Int` via the same result-value rule as the
/// all-`Int` path (SPEC_FULL.md §9 Open Question 6 — unification is decided
/// by the result, not by whether an operand happened to be a `Double`).
/// `**` is handled separately by its caller: it keeps the narrower
/// both-operands-must-be-`Int` contract instead.
fn mixed_arith(verb: BinaryVerb, a: f64, b: f64, position: &Position) -> Result<Value, EvalError> {
    let result = match verb {
        BinaryVerb::Add => a + b,
        BinaryVerb::Sub => a - b,
        BinaryVerb::Mul => a * b,
        BinaryVerb::Div => {
            if b == 0.0 {
                return Err(value_error("division by zero", position));
            }
            a / b
        }
        BinaryVerb::Mod => {
            if b == 0.0 {
                return Err(value_error("modulo by zero", position));
            }
            a % b
        }
        _ => unreachable!("mixed_arith called with non-arithmetic verb"),
    };
    Ok(Value::from_double(result))
}

fn mixed_pow(a: f64, b: f64) -> Value {
    Value::Double(a.powf(b))
}

/// Arithmetic dispatch for `+ - * / % **`, implementing the Int/Double
/// unification invariant (§3.1) and string concatenation for `+` (§4.1).
pub fn arithmetic(
    verb: BinaryVerb,
    lhs: &Value,
    rhs: &Value,
    position: &Position,
) -> Result<Value, EvalError> {
    match (lhs, rhs) {
        (Value::String(a), Value::String(b)) if verb == BinaryVerb::Add => {
            Ok(Value::String(format!("{a}{b}")))
        }
        (Value::Int(a), Value::Int(b)) => int_arith(verb, *a, *b, position),
        (Value::Double(_), _) | (_, Value::Double(_)) => {
            let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
                return Err(value_error(
                    format!(
                        "cannot apply '{verb}' to '{}' and '{}'",
                        lhs.type_name(),
                        rhs.type_name()
                    ),
                    position,
                ));
            };
            if verb == BinaryVerb::Pow {
                Ok(mixed_pow(a, b))
            } else {
                mixed_arith(verb, a, b, position)
            }
        }
        _ => Err(value_error(
            format!(
                "cannot apply '{verb}' to '{}' and '{}'",
                lhs.type_name(),
                rhs.type_name()
            ),
            position,
        )),
    }
}

/// `< <= > >=`: numeric unifies Int/Double, `String`/`String` is
/// lexicographic, everything else fails.
pub fn ordering(
    verb: BinaryVerb,
    lhs: &Value,
    rhs: &Value,
    position: &Position,
) -> Result<bool, EvalError> {
    let ord = match (lhs, rhs) {
        (Value::String(a), Value::String(b)) => a.as_bytes().cmp(b.as_bytes()),
        _ => {
            let (Some(a), Some(b)) = (lhs.as_f64(), rhs.as_f64()) else {
                return Err(value_error(
                    format!(
                        "cannot compare '{}' and '{}'",
                        lhs.type_name(),
                        rhs.type_name()
                    ),
                    position,
                ));
            };
            a.partial_cmp(&b).ok_or_else(|| {
                value_error("comparison produced no ordering (NaN)", position)
            })?
        }
    };
    Ok(match verb {
        BinaryVerb::Lt => ord.is_lt(),
        BinaryVerb::LtEq => ord.is_le(),
        BinaryVerb::Gt => ord.is_gt(),
        BinaryVerb::GtEq => ord.is_ge(),
        _ => unreachable!("ordering called with non-comparison verb"),
    })
}

/// `&& ||`: both operands must be `Bool`. Evaluated strictly, no
/// short-circuit (SPEC_FULL.md §9 Open Question 1, pinned) — the caller has
/// already evaluated both sides before calling this.
pub fn logical(verb: BinaryVerb, lhs: &Value, rhs: &Value, position: &Position) -> Result<Value, EvalError> {
    let (Value::Bool(a), Value::Bool(b)) = (lhs, rhs) else {
        return Err(value_error(
            format!(
                "'{verb}' requires Bool operands, got '{}' and '{}'",
                lhs.type_name(),
                rhs.type_name()
            ),
            position,
        ));
    };
    Ok(Value::Bool(match verb {
        BinaryVerb::And => *a && *b,
        BinaryVerb::Or => *a || *b,
        _ => unreachable!("logical called with non-logical verb"),
    }))
}

/// `& | ^ << >>`: both operands `Int`.
pub fn bitwise(verb: BinaryVerb, lhs: &Value, rhs: &Value, position: &Position) -> Result<Value, EvalError> {
    let (Value::Int(a), Value::Int(b)) = (lhs, rhs) else {
        return Err(value_error(
            format!(
                "'{verb}' requires Int operands, got '{}' and '{}'",
                lhs.type_name(),
                rhs.type_name()
            ),
            position,
        ));
    };
    Ok(Value::Int(match verb {
        BinaryVerb::BitAnd => a & b,
        BinaryVerb::BitOr => a | b,
        BinaryVerb::BitXor => a ^ b,
        BinaryVerb::Shl => a << b,
        BinaryVerb::Shr => a >> b,
        _ => unreachable!("bitwise called with non-bitwise verb"),
    }))
}

/// Unary `-`: `Int` or `Double`. Unary `!`: `Bool`. Unary `~`: `Int`.
pub fn unary(verb: UnaryVerb, operand: &Value, position: &Position) -> Result<Value, EvalError> {
    match (verb, operand) {
        (UnaryVerb::Neg, Value::Int(i)) => Ok(Value::Int(-i)),
        (UnaryVerb::Neg, Value::Double(d)) => Ok(Value::from_double(-d)),
        (UnaryVerb::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryVerb::BitNot, Value::Int(i)) => Ok(Value::Int(!i)),
        (verb, operand) => Err(value_error(
            format!("cannot apply unary '{verb}' to '{}'", operand.type_name()),
            position,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new("test", 1, 1)
    }

    #[test]
    fn int_plus_int_stays_int_when_lossless() {
        let result = arithmetic(BinaryVerb::Add, &Value::Int(2), &Value::Int(2), &pos()).unwrap();
        assert_eq!(result, Value::Int(4));
    }

    #[test]
    fn int_overflow_widens_to_double_without_wraparound() {
        let result = arithmetic(
            BinaryVerb::Add,
            &Value::Int(i64::MAX),
            &Value::Int(1),
            &pos(),
        )
        .unwrap();
        assert_eq!(result, Value::Double(i64::MAX as f64 + 1.0));
    }

    #[test]
    fn int_div_int_with_remainder_becomes_double() {
        let result = arithmetic(BinaryVerb::Div, &Value::Int(2), &Value::Int(4), &pos()).unwrap();
        assert_eq!(result, Value::Double(0.5));
    }

    #[test]
    fn double_plus_int_stays_int_when_integer_valued() {
        let result = arithmetic(BinaryVerb::Add, &Value::Double(2.0), &Value::Int(2), &pos())
            .unwrap();
        assert_eq!(result, Value::Int(4));
    }

    #[test]
    fn division_by_zero_is_a_value_error() {
        let err = arithmetic(BinaryVerb::Div, &Value::Int(1), &Value::Int(0), &pos())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }

    #[test]
    fn zero_pow_zero_is_int_one() {
        let result = arithmetic(BinaryVerb::Pow, &Value::Int(0), &Value::Int(0), &pos()).unwrap();
        assert_eq!(result, Value::Int(1));
    }

    #[test]
    fn string_concatenation() {
        let result = arithmetic(
            BinaryVerb::Add,
            &Value::String("".to_owned()),
            &Value::String("".to_owned()),
            &pos(),
        )
        .unwrap();
        assert_eq!(result, Value::String("".to_owned()));
    }

    #[test]
    fn cross_variant_equality_is_false() {
        assert_ne!(Value::Int(3), Value::Double(3.0));
    }

    #[test]
    fn string_ordering_is_lexicographic() {
        assert!(ordering(
            BinaryVerb::Lt,
            &Value::String("a".to_owned()),
            &Value::String("b".to_owned()),
            &pos()
        )
        .unwrap());
    }

    #[test]
    fn type_tag_is_injective() {
        let values = vec![
            Value::Null,
            Value::Int(0),
            Value::Double(0.0),
            Value::String(String::new()),
            Value::Bool(false),
        ];
        let tags: std::collections::HashSet<_> = values.iter().map(Value::type_tag).collect();
        assert_eq!(tags.len(), values.len());
    }
}
