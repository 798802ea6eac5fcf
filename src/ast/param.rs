use super::{Expression, Position, TypeName};

/// A required positional parameter.
#[derive(Debug, Clone)]
pub struct Param {
    pub name: String,
    pub type_name: TypeName,
    pub position: Position,
}

/// A parameter with a default expression, evaluated per call site (see
/// SPEC_FULL.md §9 Open Question 3) when the caller doesn't supply it.
#[derive(Debug, Clone)]
pub struct DefaultParam {
    pub name: String,
    pub type_name: TypeName,
    pub default: Expression,
    pub position: Position,
}
