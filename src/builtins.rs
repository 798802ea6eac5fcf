//! Built-in function registry (§4.4).
//!
//! The teacher has no equivalent table — its `print` built-in is an ad hoc
//! arm inside `interpreter/mod.rs::run_fn_call`. This module generalizes
//! that into the fixed, named set the spec requires, seeded into the global
//! context at construction, each bound as a `PublicConst` slot exactly as
//! §4.4 specifies.
use std::io::{self, BufRead, Read, Write};
use std::rc::Rc;

use crate::ast::{Position, TypeName};
use crate::context::ContextRef;
use crate::error::{err, ErrorKind, EvalError};
use crate::value::{AccessModifier, Function, Value};

fn builtin_error(name: &str, message: impl Into<String>, position: &Position) -> EvalError {
    err(ErrorKind::ValueError, format!("{name}: {}", message.into()), position)
}

fn check_arity(name: &str, expected: usize, args: &[Value], position: &Position) -> Result<(), EvalError> {
    if args.len() != expected {
        return Err(err(
            ErrorKind::BuiltinArgumentMismatch,
            format!(
                "'{name}' expects {expected} argument(s), got {}",
                args.len()
            ),
            position,
        ));
    }
    Ok(())
}

fn def_fn(
    global: &ContextRef,
    name: &str,
    arity: i32,
    call: impl Fn(&[Value], &Position) -> Result<Value, EvalError> + 'static,
    position: &Position,
) -> Result<(), EvalError> {
    let function = Function::new_builtin(name, arity, Rc::new(call));
    global.def(
        name,
        TypeName::Function,
        AccessModifier::PublicConst,
        Value::Function(function),
        position,
    )
}

/// Seed `global` with the `null`/`true`/`false` values and the `__f...`
/// built-in functions (§4.4). `position` is used only as the synthetic
/// "defined here" location for these root bindings.
pub fn install(global: &ContextRef, position: &Position) -> Result<(), EvalError> {
    global.def(
        "null",
        TypeName::Null,
        AccessModifier::PublicConst,
        Value::Null,
        position,
    )?;
    global.def(
        "true",
        TypeName::Bool,
        AccessModifier::PublicConst,
        Value::Bool(true),
        position,
    )?;
    global.def(
        "false",
        TypeName::Bool,
        AccessModifier::PublicConst,
        Value::Bool(false),
        position,
    )?;

    def_fn(
        global,
        "__fstdout_print",
        -1,
        |args, _pos| {
            let mut out = String::new();
            for arg in args {
                out.push_str(&arg.to_display_string());
            }
            print!("{out}");
            io::stdout().flush().ok();
            Ok(Value::Int(args.len() as i64))
        },
        position,
    )?;

    def_fn(
        global,
        "__fstdout_println",
        -1,
        |args, _pos| {
            let mut out = String::new();
            for arg in args {
                out.push_str(&arg.to_display_string());
            }
            println!("{out}");
            Ok(Value::Int(args.len() as i64))
        },
        position,
    )?;

    def_fn(
        global,
        "__fstdin_read",
        0,
        |args, pos| {
            check_arity("__fstdin_read", 0, args, pos)?;
            let mut token = Vec::new();
            for byte in io::stdin().lock().bytes() {
                let byte = byte.map_err(|e| builtin_error("__fstdin_read", e.to_string(), pos))?;
                // ASCII whitespace bytes never occur inside a multi-byte UTF-8
                // sequence (those are all >= 0x80), so this boundary check is
                // safe to make before the buffered bytes are decoded.
                if byte.is_ascii_whitespace() {
                    if token.is_empty() {
                        continue;
                    }
                    break;
                }
                token.push(byte);
            }
            String::from_utf8(token)
                .map(Value::String)
                .map_err(|e| builtin_error("__fstdin_read", e.to_string(), pos))
        },
        position,
    )?;

    def_fn(
        global,
        "__fstdin_readln",
        0,
        |args, pos| {
            check_arity("__fstdin_readln", 0, args, pos)?;
            let mut line = String::new();
            io::stdin()
                .lock()
                .read_line(&mut line)
                .map_err(|e| builtin_error("__fstdin_readln", e.to_string(), pos))?;
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            Ok(Value::String(line))
        },
        position,
    )?;

    def_fn(
        global,
        "__fvalue_type",
        1,
        |args, pos| {
            check_arity("__fvalue_type", 1, args, pos)?;
            Ok(Value::String(args[0].type_tag().to_owned()))
        },
        position,
    )?;

    def_fn(
        global,
        "__fvalue_int_parse",
        1,
        |args, pos| {
            check_arity("__fvalue_int_parse", 1, args, pos)?;
            match &args[0] {
                Value::String(s) => s
                    .trim()
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| builtin_error("__fvalue_int_parse", format!("'{s}' is not a valid integer"), pos)),
                other => Err(builtin_error(
                    "__fvalue_int_parse",
                    format!("expected String, got {}", other.type_name()),
                    pos,
                )),
            }
        },
        position,
    )?;

    def_fn(
        global,
        "__fvalue_int_from",
        1,
        |args, pos| {
            check_arity("__fvalue_int_from", 1, args, pos)?;
            match &args[0] {
                Value::Double(d) => Ok(Value::Int(d.trunc() as i64)),
                Value::Bool(b) => Ok(Value::Int(if *b { 1 } else { 0 })),
                other => Err(builtin_error(
                    "__fvalue_int_from",
                    format!("expected Double or Bool, got {}", other.type_name()),
                    pos,
                )),
            }
        },
        position,
    )?;

    def_fn(
        global,
        "__fvalue_double_parse",
        1,
        |args, pos| {
            check_arity("__fvalue_double_parse", 1, args, pos)?;
            match &args[0] {
                Value::String(s) => s
                    .trim()
                    .parse::<f64>()
                    .map(Value::from_double)
                    .map_err(|_| builtin_error("__fvalue_double_parse", format!("'{s}' is not a valid double"), pos)),
                other => Err(builtin_error(
                    "__fvalue_double_parse",
                    format!("expected String, got {}", other.type_name()),
                    pos,
                )),
            }
        },
        position,
    )?;

    def_fn(
        global,
        "__fvalue_double_from",
        1,
        |args, pos| {
            check_arity("__fvalue_double_from", 1, args, pos)?;
            match &args[0] {
                Value::Int(i) => Ok(Value::from_double(*i as f64)),
                Value::Bool(b) => Ok(Value::from_double(if *b { 1.0 } else { 0.0 })),
                other => Err(builtin_error(
                    "__fvalue_double_from",
                    format!("expected Int or Bool, got {}", other.type_name()),
                    pos,
                )),
            }
        },
        position,
    )?;

    def_fn(
        global,
        "__fvalue_string_from",
        1,
        |args, pos| {
            check_arity("__fvalue_string_from", 1, args, pos)?;
            Ok(Value::String(args[0].to_display_string()))
        },
        position,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos() -> Position {
        Position::new("test", 1, 1)
    }

    #[test]
    fn int_parse_round_trips_through_string_from() {
        let global = ContextRef::new_root("global");
        install(&global, &pos()).unwrap();

        let parse = global.get("__fvalue_int_parse").unwrap();
        let Value::Function(parse) = parse else {
            panic!("expected function");
        };
        let parsed = (parse.as_builtin().unwrap().call)(&[Value::String("42".to_owned())], &pos())
            .unwrap();
        assert_eq!(parsed, Value::Int(42));

        let string_from = global.get("__fvalue_string_from").unwrap();
        let Value::Function(string_from) = string_from else {
            panic!("expected function");
        };
        let rendered = (string_from.as_builtin().unwrap().call)(&[parsed], &pos()).unwrap();
        assert_eq!(rendered, Value::String("42".to_owned()));
    }

    #[test]
    fn malformed_int_parse_fails() {
        let global = ContextRef::new_root("global");
        install(&global, &pos()).unwrap();

        let Value::Function(parse) = global.get("__fvalue_int_parse").unwrap() else {
            panic!("expected function");
        };
        let err = (parse.as_builtin().unwrap().call)(&[Value::String("nope".to_owned())], &pos())
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::ValueError);
    }
}
