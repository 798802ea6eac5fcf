//! Lexical scope chain (§3.5).
//!
//! Grounded on the teacher's `typechecker/scope.rs` (stack-of-maps, lookup
//! walking back to front) and `typechecker/context.rs`, generalized from a
//! single per-typechecker scope stack into a parent-linked chain of
//! reference-counted frames that closures can share (spec §9: contexts are
//! released when their last reference drops; an arena/handle scheme is the
//! "preferred strategy for a systems-language rewrite" the spec mentions,
//! but a plain `Rc<RefCell<_>>` parent chain is simpler and sufficient here
//! since Fig closures only ever reference an *ancestor* context, never
//! themselves before they exist — the self-capture cycle the spec worries
//! about only arises once a closure is bound into the very scope it
//! captured, and ordinary `Rc` handles that fine as long as nothing needs to
//! be freed eagerly, which nothing here does).
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::ast::TypeName;
use crate::error::{err, ErrorKind, EvalError};
use crate::value::{AccessModifier, Value};

/// A single variable binding: declared type, access modifier, current value.
#[derive(Debug, Clone)]
pub struct Slot {
    pub type_name: TypeName,
    pub access_modifier: AccessModifier,
    pub value: Value,
}

#[derive(Debug)]
struct ContextInner {
    name: String,
    slots: HashMap<String, Slot>,
    parent: Option<ContextRef>,
}

/// A reference-counted handle to a `Context` frame. Cloning shares the frame;
/// the frame is dropped once its last handle is.
#[derive(Debug, Clone)]
pub struct ContextRef(Rc<RefCell<ContextInner>>);

impl ContextRef {
    pub fn new_root(name: impl Into<String>) -> Self {
        trace!("creating root context");
        Self(Rc::new(RefCell::new(ContextInner {
            name: name.into(),
            slots: HashMap::new(),
            parent: None,
        })))
    }

    /// Create a fresh child frame, as done for every block statement and
    /// every function call (§3.5 Lifecycle).
    pub fn child(&self, name: impl Into<String>) -> Self {
        trace!("creating child context '{}'", self.0.borrow().name);
        Self(Rc::new(RefCell::new(ContextInner {
            name: name.into(),
            slots: HashMap::new(),
            parent: Some(self.clone()),
        })))
    }

    pub fn name(&self) -> String {
        self.0.borrow().name.clone()
    }

    /// `def(name, type, am, value)` — fails on redeclaration in this frame.
    pub fn def(
        &self,
        name: &str,
        type_name: TypeName,
        access_modifier: AccessModifier,
        value: Value,
        position: &crate::ast::Position,
    ) -> Result<(), EvalError> {
        let mut inner = self.0.borrow_mut();
        if inner.slots.contains_key(name) {
            return Err(err(
                ErrorKind::Redeclaration,
                format!("variable '{name}' is already declared in this scope"),
                position,
            ));
        }
        if !conforms(&type_name, &value) {
            return Err(err(
                ErrorKind::VariableTypeMismatch,
                format!(
                    "cannot assign a value of type '{}' to '{name}' declared as '{type_name}'",
                    value.type_name()
                ),
                position,
            ));
        }
        inner.slots.insert(
            name.to_owned(),
            Slot {
                type_name,
                access_modifier,
                value,
            },
        );
        Ok(())
    }

    /// `get(name)` — walks the parent chain, returns from the nearest binding.
    pub fn get(&self, name: &str) -> Option<Value> {
        let inner = self.0.borrow();
        if let Some(slot) = inner.slots.get(name) {
            return Some(slot.value.clone());
        }
        inner.parent.as_ref().and_then(|parent| parent.get(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        let inner = self.0.borrow();
        inner.slots.contains_key(name)
            || inner
                .parent
                .as_ref()
                .is_some_and(|parent| parent.contains(name))
    }

    pub fn is_variable_mutable(&self, name: &str) -> Option<bool> {
        let inner = self.0.borrow();
        if let Some(slot) = inner.slots.get(name) {
            return Some(slot.access_modifier.is_mutable());
        }
        inner
            .parent
            .as_ref()
            .and_then(|parent| parent.is_variable_mutable(name))
    }

    pub fn get_type_info(&self, name: &str) -> Option<TypeName> {
        let inner = self.0.borrow();
        if let Some(slot) = inner.slots.get(name) {
            return Some(slot.type_name.clone());
        }
        inner
            .parent
            .as_ref()
            .and_then(|parent| parent.get_type_info(name))
    }

    /// `set(name, value)` — locates the nearest slot; fails if immutable or
    /// type-mismatched, otherwise replaces the value in place.
    pub fn set(
        &self,
        name: &str,
        value: Value,
        position: &crate::ast::Position,
    ) -> Result<(), EvalError> {
        let mut inner = self.0.borrow_mut();
        if let Some(slot) = inner.slots.get_mut(name) {
            if !slot.access_modifier.is_mutable() {
                return Err(err(
                    ErrorKind::ConstAssignment,
                    format!("cannot assign to immutable variable '{name}'"),
                    position,
                ));
            }
            if !conforms(&slot.type_name, &value) {
                return Err(err(
                    ErrorKind::VariableTypeMismatch,
                    format!(
                        "cannot assign a value of type '{}' to '{name}' declared as '{}'",
                        value.type_name(),
                        slot.type_name
                    ),
                    position,
                ));
            }
            slot.value = value;
            return Ok(());
        }
        let parent = inner.parent.clone();
        drop(inner);
        match parent {
            Some(parent) => parent.set(name, value, position),
            None => Err(err(
                ErrorKind::VariableNotFound,
                format!("cannot assign to undeclared variable '{name}'"),
                position,
            )),
        }
    }

    /// Walks to the root, returning each scope name, innermost first.
    pub fn stack_trace(&self) -> Vec<String> {
        let inner = self.0.borrow();
        let mut trace = vec![inner.name.clone()];
        if let Some(parent) = &inner.parent {
            trace.extend(parent.stack_trace());
        }
        trace
    }

    /// True iff `name` resolves, walking the chain, to a scope whose name
    /// starts with `"<Function "` before reaching the root — used by
    /// `Return` to reject returns outside any function (§4.5.6).
    pub fn innermost_function_scope(&self) -> Option<Self> {
        let inner = self.0.borrow();
        if inner.name.starts_with("<Function ") {
            return Some(self.clone());
        }
        inner
            .parent
            .as_ref()
            .and_then(|parent| parent.innermost_function_scope())
    }
}

/// Type conformance: `Any` accepts anything, `Inferred` is resolved before a
/// slot is ever defined (the caller substitutes the initializer's type), and
/// every other declared type must match the value's runtime variant exactly.
pub fn conforms(declared: &TypeName, value: &Value) -> bool {
    if matches!(declared, TypeName::Any) {
        return true;
    }
    &value.type_name() == declared
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Position;

    fn pos() -> Position {
        Position::new("test", 1, 1)
    }

    #[test]
    fn nearest_binding_wins_across_shadowing_scopes() {
        let root = ContextRef::new_root("global");
        root.def(
            "x",
            TypeName::Int,
            AccessModifier::Normal,
            Value::Int(1),
            &pos(),
        )
        .unwrap();

        let child = root.child("<Block 1:1>");
        child
            .def(
                "x",
                TypeName::Int,
                AccessModifier::Normal,
                Value::Int(2),
                &pos(),
            )
            .unwrap();

        assert_eq!(child.get("x"), Some(Value::Int(2)));
        assert_eq!(root.get("x"), Some(Value::Int(1)));
    }

    #[test]
    fn redeclaration_in_same_frame_fails() {
        let root = ContextRef::new_root("global");
        root.def(
            "x",
            TypeName::Int,
            AccessModifier::Normal,
            Value::Int(1),
            &pos(),
        )
        .unwrap();

        let err = root
            .def(
                "x",
                TypeName::Int,
                AccessModifier::Normal,
                Value::Int(2),
                &pos(),
            )
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Redeclaration);
    }

    #[test]
    fn assignment_to_const_fails() {
        let root = ContextRef::new_root("global");
        root.def(
            "x",
            TypeName::Int,
            AccessModifier::Const,
            Value::Int(1),
            &pos(),
        )
        .unwrap();

        let err = root.set("x", Value::Int(2), &pos()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ConstAssignment);
    }

    #[test]
    fn assignment_through_child_mutates_ancestor_slot() {
        let root = ContextRef::new_root("global");
        root.def(
            "x",
            TypeName::Int,
            AccessModifier::Normal,
            Value::Int(1),
            &pos(),
        )
        .unwrap();

        let child = root.child("<Block 1:1>");
        child.set("x", Value::Int(9), &pos()).unwrap();

        assert_eq!(root.get("x"), Some(Value::Int(9)));
    }

    #[test]
    fn closures_sharing_an_ancestor_observe_live_mutation() {
        // A child context captured "now" must see a mutation made after
        // capture but before it is read (§8.1 invariant 6).
        let root = ContextRef::new_root("global");
        root.def(
            "counter",
            TypeName::Int,
            AccessModifier::Normal,
            Value::Int(0),
            &pos(),
        )
        .unwrap();

        let captured = root.clone();
        root.set("counter", Value::Int(41), &pos()).unwrap();

        assert_eq!(captured.get("counter"), Some(Value::Int(41)));
    }

    #[test]
    fn contains_walks_the_parent_chain() {
        let root = ContextRef::new_root("global");
        root.def(
            "x",
            TypeName::Int,
            AccessModifier::Normal,
            Value::Int(1),
            &pos(),
        )
        .unwrap();

        let child = root.child("<Block 1:1>");
        assert!(child.contains("x"));
        assert!(!child.contains("y"));
        assert!(!root.contains("y"));
    }

    #[test]
    fn is_variable_mutable_reflects_access_modifier() {
        let root = ContextRef::new_root("global");
        root.def(
            "mutable",
            TypeName::Int,
            AccessModifier::Normal,
            Value::Int(1),
            &pos(),
        )
        .unwrap();
        root.def(
            "fixed",
            TypeName::Int,
            AccessModifier::Const,
            Value::Int(2),
            &pos(),
        )
        .unwrap();

        let child = root.child("<Block 1:1>");
        assert_eq!(child.is_variable_mutable("mutable"), Some(true));
        assert_eq!(child.is_variable_mutable("fixed"), Some(false));
        assert_eq!(child.is_variable_mutable("undeclared"), None);
    }

    #[test]
    fn get_type_info_returns_the_declared_type() {
        let root = ContextRef::new_root("global");
        root.def(
            "name",
            TypeName::String,
            AccessModifier::Normal,
            Value::String("fig".to_owned()),
            &pos(),
        )
        .unwrap();

        let child = root.child("<Block 1:1>");
        assert_eq!(child.get_type_info("name"), Some(TypeName::String));
        assert_eq!(child.get_type_info("missing"), None);
    }

    #[test]
    fn stack_trace_lists_scopes_innermost_first() {
        let root = ContextRef::new_root("global");
        let block = root.child("<Block 1:1>");
        let call = block.child("<Function f()>");

        assert_eq!(
            call.stack_trace(),
            vec![
                "<Function f()>".to_owned(),
                "<Block 1:1>".to_owned(),
                "global".to_owned(),
            ]
        );
    }
}
