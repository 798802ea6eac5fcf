use super::{Block, DefaultParam, Expression, Param, Position, TypeName};

#[derive(Debug, Clone)]
pub enum FunctionBody {
    Block(Block),
    /// Arrow form (`fun(x) -> Int { x }` written as `fun(x) -> Int => x`):
    /// the evaluator synthesizes an implicit `Return(expr)` at this position.
    Expr(Box<Expression>),
}

#[derive(Debug, Clone)]
pub struct FunctionLiteral {
    pub params: Vec<Param>,
    pub defaults: Vec<DefaultParam>,
    pub variadic: bool,
    pub return_type: TypeName,
    pub body: FunctionBody,
    pub position: Position,
}
