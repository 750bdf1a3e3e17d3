// Solver adapters: concrete implementations of ConstraintEngine

pub mod json_stream;
pub mod minizinc;

pub use minizinc::{MiniZincConfig, MiniZincEngine};
