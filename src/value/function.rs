use std::fmt;
use std::rc::Rc;

use crate::ast::{Block, DefaultParam, Param, Position, TypeName};
use crate::context::ContextRef;
use crate::error::EvalError;

use super::{next_id, Value};

/// A user-defined function: positional + default parameters, optional
/// variadic rest, declared return type, body, and the context that was
/// current when the function literal/def was evaluated (§3.2).
#[derive(Debug)]
pub struct UserFunction {
    pub name: Option<String>,
    pub params: Vec<Param>,
    pub defaults: Vec<DefaultParam>,
    pub variadic: bool,
    pub return_type: TypeName,
    pub body: Block,
    pub closure: ContextRef,
}

pub type BuiltinCall = dyn Fn(&[Value], &Position) -> Result<Value, EvalError>;

/// A host-provided callable (§4.4). `arity == -1` means variadic.
pub struct BuiltinFunction {
    pub name: String,
    pub arity: i32,
    pub call: Rc<BuiltinCall>,
}

impl fmt::Debug for BuiltinFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltinFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .finish()
    }
}

#[derive(Debug, Clone)]
enum FunctionKind {
    User(Rc<UserFunction>),
    Builtin(Rc<BuiltinFunction>),
}

/// A first-class function value. Equality and `toString` are by identity
/// (§3.2): every function, user-defined or built-in, is assigned a unique
/// id when the value is created.
#[derive(Debug, Clone)]
pub struct Function {
    id: u64,
    kind: FunctionKind,
}

impl Function {
    pub fn new_user(inner: UserFunction) -> Self {
        Self {
            id: next_id(),
            kind: FunctionKind::User(Rc::new(inner)),
        }
    }

    pub fn new_builtin(name: impl Into<String>, arity: i32, call: Rc<BuiltinCall>) -> Self {
        Self {
            id: next_id(),
            kind: FunctionKind::Builtin(Rc::new(BuiltinFunction {
                name: name.into(),
                arity,
                call,
            })),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn as_user(&self) -> Option<&UserFunction> {
        match &self.kind {
            FunctionKind::User(f) => Some(f),
            FunctionKind::Builtin(_) => None,
        }
    }

    pub fn as_builtin(&self) -> Option<&BuiltinFunction> {
        match &self.kind {
            FunctionKind::Builtin(f) => Some(f),
            FunctionKind::User(_) => None,
        }
    }

    pub fn display_name(&self) -> String {
        match &self.kind {
            FunctionKind::User(f) => f.name.clone().unwrap_or_else(|| "anonymous".to_owned()),
            FunctionKind::Builtin(f) => f.name.clone(),
        }
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
