/// JSON serialization of a derivation table.
pub mod dump;
/// Fixpoint engine: the context-aware CYK sweep.
pub mod engine;
/// Forest serializer: DOT output of the shared parse forest.
pub mod forest;
/// The derivation table (chart) and its value types.
pub mod table;
