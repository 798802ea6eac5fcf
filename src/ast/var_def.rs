use super::{Expression, Position, TypeName};

#[derive(Debug, Clone)]
pub struct VarDef {
    pub name: String,
    pub type_name: TypeName,
    pub initializer: Option<Expression>,
    pub is_public: bool,
    pub is_const: bool,
    pub position: Position,
}
