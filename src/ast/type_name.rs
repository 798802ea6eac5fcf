use std::fmt::{self, Display};

/// A declared type name, as it appears in a parameter, struct field, or
/// variable declaration. `Inferred` is the `varDefTypeFollowed` sentinel
/// (the `:=` form): "take the type of whatever the initializer produced".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Any,
    Null,
    Int,
    Double,
    String,
    Bool,
    Function,
    Struct(String),
    Inferred,
}

impl Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeName::Any => write!(f, "Any"),
            TypeName::Null => write!(f, "Null"),
            TypeName::Int => write!(f, "Int"),
            TypeName::Double => write!(f, "Double"),
            TypeName::String => write!(f, "String"),
            TypeName::Bool => write!(f, "Bool"),
            TypeName::Function => write!(f, "Function"),
            TypeName::Struct(name) => write!(f, "{name}"),
            TypeName::Inferred => write!(f, "<inferred>"),
        }
    }
}
