use super::{Expression, Position};

#[derive(Debug, Clone)]
pub struct VarAssign {
    pub name: String,
    pub value: Expression,
    pub position: Position,
}
