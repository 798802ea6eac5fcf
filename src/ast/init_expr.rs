use super::{Expression, Position};

/// The three construction modes a struct literal can use (§4.5.5).
#[derive(Debug, Clone)]
pub enum InitArgs {
    /// `Point { 3, 4 }` — arguments in field-declaration order.
    Positional(Vec<Expression>),
    /// `Point { y: 4, x: 3 }` — any order, missing fields take their default.
    Named(Vec<(String, Expression)>),
    /// `Point { x, y }` — each identifier is both the field name and the
    /// value source, read from the surrounding scope.
    Shorthand(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct InitExpr {
    pub struct_expr: Box<Expression>,
    pub args: InitArgs,
    pub position: Position,
}
