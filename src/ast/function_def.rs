use super::{Block, DefaultParam, Param, Position, TypeName};

#[derive(Debug, Clone)]
pub struct FunctionDef {
    pub name: String,
    pub params: Vec<Param>,
    pub defaults: Vec<DefaultParam>,
    pub variadic: bool,
    pub return_type: TypeName,
    pub body: Block,
    pub is_public: bool,
    pub position: Position,
}
