pub mod graph;
pub mod lang;
mod unit;

pub use graph::{
    build_order, AmbiguousDefinition, CompileGroup, CompileOrder, Cycle, DependencyGraph,
    Resolution, Stage, SymbolTable, UnitId, Unresolved,
};
pub use unit::{decode, extract, extract_unit};
