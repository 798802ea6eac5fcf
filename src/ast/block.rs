use super::{Position, Statement};

#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Statement>,
    pub position: Position,
}
