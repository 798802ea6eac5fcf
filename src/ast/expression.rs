use super::{
    Access, BinaryOp, FunctionCall, FunctionLiteral, InitExpr, ListExpr, Literal, Position,
    UnaryOp,
};

#[derive(Debug, Clone)]
pub enum Expression {
    ValueLiteral(Literal, Position),
    VarRef(String, Position),
    Binary(BinaryOp),
    Unary(UnaryOp),
    FunctionCall(FunctionCall),
    FunctionLiteral(FunctionLiteral),
    InitExpr(InitExpr),
    ListExpr(ListExpr),
    Access(Access),
}

impl Expression {
    pub fn position(&self) -> &Position {
        match self {
            Expression::ValueLiteral(_, position) => position,
            Expression::VarRef(_, position) => position,
            Expression::Binary(BinaryOp { position, .. }) => position,
            Expression::Unary(UnaryOp { position, .. }) => position,
            Expression::FunctionCall(FunctionCall { position, .. }) => position,
            Expression::FunctionLiteral(FunctionLiteral { position, .. }) => position,
            Expression::InitExpr(InitExpr { position, .. }) => position,
            Expression::ListExpr(ListExpr { position, .. }) => position,
            Expression::Access(Access { position, .. }) => position,
        }
    }
}
