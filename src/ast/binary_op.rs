use std::fmt::{self, Display};

use super::{Expression, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryVerb {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    Shl,
    Shr,
}

impl Display for BinaryVerb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryVerb::Add => "+",
            BinaryVerb::Sub => "-",
            BinaryVerb::Mul => "*",
            BinaryVerb::Div => "/",
            BinaryVerb::Mod => "%",
            BinaryVerb::Pow => "**",
            BinaryVerb::Eq => "==",
            BinaryVerb::NotEq => "!=",
            BinaryVerb::Lt => "<",
            BinaryVerb::LtEq => "<=",
            BinaryVerb::Gt => ">",
            BinaryVerb::GtEq => ">=",
            BinaryVerb::And => "&&",
            BinaryVerb::Or => "||",
            BinaryVerb::BitAnd => "&",
            BinaryVerb::BitOr => "|",
            BinaryVerb::BitXor => "^",
            BinaryVerb::Shl => "<<",
            BinaryVerb::Shr => ">>",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct BinaryOp {
    pub verb: BinaryVerb,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
    pub position: Position,
}
