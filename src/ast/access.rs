use super::{Expression, Position};

/// `a.x` — field read off a struct instance. Added per SPEC_FULL.md §3.6a
/// (Open Question 4: the distilled AST has no field-access node).
#[derive(Debug, Clone)]
pub struct Access {
    pub target: Box<Expression>,
    pub field: String,
    pub position: Position,
}

/// `a.x = expr` — field write. A statement, mirroring `VarAssign`.
#[derive(Debug, Clone)]
pub struct AccessAssign {
    pub target: Box<Expression>,
    pub field: String,
    pub value: Box<Expression>,
    pub position: Position,
}
