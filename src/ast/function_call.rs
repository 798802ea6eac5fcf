use super::{Expression, Position};

#[derive(Debug, Clone)]
pub struct FunctionCall {
    pub callee: Box<Expression>,
    pub args: Vec<Expression>,
    pub position: Position,
}
