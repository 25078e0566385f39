//! Joint probability distributions over small combinatorial action spaces

pub mod space;
pub mod table;

pub use space::{SignalSpace, Variable};
pub use table::ProbabilityTable;
