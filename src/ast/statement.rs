use super::{
    AccessAssign, Block, Expression, FunctionDef, If, Import, Position, StructDef, VarAssign,
    VarDef, While,
};

#[derive(Debug, Clone)]
pub enum Statement {
    ExpressionStmt(Expression),
    BlockStatement(Block),
    VarDef(VarDef),
    VarAssign(VarAssign),
    AccessAssign(AccessAssign),
    FunctionDef(FunctionDef),
    StructDef(StructDef),
    If(If),
    While(While),
    Return(Option<Expression>, Position),
    Break(Position),
    Continue(Position),
    Import(Import),
}

impl Statement {
    pub fn position(&self) -> &Position {
        match self {
            Statement::ExpressionStmt(expr) => expr.position(),
            Statement::BlockStatement(Block { position, .. }) => position,
            Statement::VarDef(VarDef { position, .. }) => position,
            Statement::VarAssign(VarAssign { position, .. }) => position,
            Statement::AccessAssign(AccessAssign { position, .. }) => position,
            Statement::FunctionDef(FunctionDef { position, .. }) => position,
            Statement::StructDef(StructDef { position, .. }) => position,
            Statement::If(If { position, .. }) => position,
            Statement::While(While { position, .. }) => position,
            Statement::Return(_, position) => position,
            Statement::Break(position) => position,
            Statement::Continue(position) => position,
            Statement::Import(Import { position, .. }) => position,
        }
    }
}
