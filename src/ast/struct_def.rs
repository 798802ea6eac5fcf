use crate::value::AccessModifier;

use super::{Expression, Position, TypeName};

#[derive(Debug, Clone)]
pub struct FieldDecl {
    pub access_modifier: AccessModifier,
    pub name: String,
    pub type_name: TypeName,
    pub default_value: Option<Expression>,
    pub position: Position,
}

#[derive(Debug, Clone)]
pub struct StructDef {
    pub name: String,
    pub fields: Vec<FieldDecl>,
    pub is_public: bool,
    pub position: Position,
}
