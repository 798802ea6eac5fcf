use super::{Expression, Position};

/// Present in the AST but unimplemented at the evaluator level (§4.5.1): any
/// `ListExpr` reaching evaluation fails with `NotSupported`.
#[derive(Debug, Clone)]
pub struct ListExpr {
    pub elements: Vec<Expression>,
    pub position: Position,
}
