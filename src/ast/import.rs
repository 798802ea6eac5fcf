use super::Position;

/// Parsed but inert: the core evaluator never resolves imports (spec §1
/// non-goals — module/import system is out of scope).
#[derive(Debug, Clone)]
pub struct Import {
    pub path: String,
    pub position: Position,
}
