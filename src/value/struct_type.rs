use std::rc::Rc;

use crate::ast::FieldDecl;
use crate::context::ContextRef;

use super::next_id;

#[derive(Debug)]
struct StructTypeInner {
    name: String,
    fields: Vec<FieldDecl>,
    def_context: ContextRef,
}

/// A named record schema (§3.3). Cheaply clonable; equality and `toString`
/// are by identity, like `Function`.
#[derive(Debug, Clone)]
pub struct StructType {
    id: u64,
    inner: Rc<StructTypeInner>,
}

impl StructType {
    pub fn new(name: impl Into<String>, fields: Vec<FieldDecl>, def_context: ContextRef) -> Self {
        Self {
            id: next_id(),
            inner: Rc::new(StructTypeInner {
                name: name.into(),
                fields,
                def_context,
            }),
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn fields(&self) -> &[FieldDecl] {
        &self.inner.fields
    }

    pub fn def_context(&self) -> &ContextRef {
        &self.inner.def_context
    }

    pub fn field(&self, name: &str) -> Option<&FieldDecl> {
        self.inner.fields.iter().find(|f| f.name == name)
    }
}

impl PartialEq for StructType {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}
