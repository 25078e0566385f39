//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use std::fmt;

/// A value an attribute, signal, or motor command can take.
///
/// Domains are finite and declared up front, so a small closed set of kinds
/// is enough: booleans, integers, and symbolic names like `"up"` or `"down"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Value {
    Bool(bool),
    Int(i64),
    Sym(String),
}

impl Value {
    /// Symbolic value from a string slice.
    pub fn sym(s: &str) -> Self {
        Value::Sym(s.to_string())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Sym(s) => write!(f, "{}", s),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Sym(s.to_string())
    }
}

/// One complete choice of value for every variable in a signal space.
pub type Assignment = ahash::AHashMap<String, Value>;

/// Named parameters attached to a causal event.
pub type Params = ahash::AHashMap<String, Value>;

/// Simulation time unit.
pub type Tick = u64;
