use super::{Block, Expression, Position};

#[derive(Debug, Clone)]
pub struct ElseIf {
    pub condition: Expression,
    pub block: Block,
}

#[derive(Debug, Clone)]
pub struct If {
    pub condition: Expression,
    pub body: Block,
    pub elifs: Vec<ElseIf>,
    pub else_block: Option<Block>,
    pub position: Position,
}
