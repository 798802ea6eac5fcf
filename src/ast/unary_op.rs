use std::fmt::{self, Display};

use super::{Expression, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryVerb {
    Neg,
    Not,
    BitNot,
}

impl Display for UnaryVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnaryVerb::Neg => "-",
            UnaryVerb::Not => "!",
            UnaryVerb::BitNot => "~",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct UnaryOp {
    pub verb: UnaryVerb,
    pub operand: Box<Expression>,
    pub position: Position,
}
