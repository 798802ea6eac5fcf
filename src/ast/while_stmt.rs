use super::{Block, Expression, Position};

#[derive(Debug, Clone)]
pub struct While {
    pub condition: Expression,
    pub body: Block,
    pub position: Position,
}
