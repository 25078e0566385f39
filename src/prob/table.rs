//! Extensional probability table over a fixed signal space
//!
//! One `f64` slot per complete joint assignment, so arbitrary correlations
//! between motor signals can be represented without any independence
//! assumption. Size is exponential in the number of variables, which is fine
//! for the small motor spaces this crate targets (a handful of variables with
//! two or three values each).

use crate::core::{Assignment, Result};
use crate::prob::space::SignalSpace;

#[derive(Debug, Clone)]
pub struct ProbabilityTable {
    space: SignalSpace,
    slots: Vec<f64>,
}

impl ProbabilityTable {
    /// Table with the uniform distribution `1/N` over all `N` assignments.
    pub fn uniform(space: SignalSpace) -> Self {
        let n = space.len();
        let p = 1.0 / n as f64;
        Self {
            space,
            slots: vec![p; n],
        }
    }

    pub fn space(&self) -> &SignalSpace {
        &self.space
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Probability of an exact, fully-specified assignment.
    pub fn get(&self, assignment: &Assignment) -> Result<f64> {
        Ok(self.slots[self.space.index_of(assignment)?])
    }

    /// Overwrite the probability of one assignment.
    ///
    /// Does not renormalize; callers restore the sum-to-1 invariant
    /// themselves (see [`ProbabilityTable::map`]).
    pub fn set(&mut self, assignment: &Assignment, p: f64) -> Result<()> {
        let i = self.space.index_of(assignment)?;
        self.slots[i] = p;
        Ok(())
    }

    /// Probability at a dense slot index.
    pub fn get_index(&self, index: usize) -> f64 {
        self.slots[index]
    }

    /// Overwrite the probability at a dense slot index.
    pub fn set_index(&mut self, index: usize, p: f64) {
        self.slots[index] = p;
    }

    /// Apply a pure function to every slot in place.
    ///
    /// Used both for initialization and for renormalization division.
    pub fn map(&mut self, f: impl Fn(f64) -> f64) {
        for slot in &mut self.slots {
            *slot = f(*slot);
        }
    }

    /// Sum over all slots. 1.0 within floating tolerance when normalized.
    pub fn total(&self) -> f64 {
        self.slots.iter().sum()
    }

    /// All `(assignment, probability)` pairs in stable slot order.
    pub fn iter(&self) -> impl Iterator<Item = (Assignment, f64)> + '_ {
        self.space
            .enumerate()
            .enumerate()
            .map(move |(i, a)| (a, self.slots[i]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Value;

    fn hand_space() -> SignalSpace {
        SignalSpace::new(vec![
            ("left".into(), vec![Value::sym("down"), Value::sym("up")]),
            ("right".into(), vec![Value::sym("down"), Value::sym("up")]),
        ])
    }

    #[test]
    fn uniform_sums_to_one() {
        let table = ProbabilityTable::uniform(hand_space());
        assert_eq!(table.len(), 4);
        assert!((table.total() - 1.0).abs() < 1e-12);
        for (_, p) in table.iter() {
            assert!((p - 0.25).abs() < 1e-12);
        }
    }

    #[test]
    fn set_then_get() {
        let mut table = ProbabilityTable::uniform(hand_space());
        let a = table.space().assignment_at(2);
        table.set(&a, 0.9).unwrap();
        assert!((table.get(&a).unwrap() - 0.9).abs() < 1e-12);
    }

    #[test]
    fn get_rejects_bad_assignment() {
        let table = ProbabilityTable::uniform(hand_space());
        let mut a = table.space().assignment_at(0);
        a.insert("left".into(), Value::sym("sideways"));
        assert!(table.get(&a).is_err());
    }

    #[test]
    fn map_divides_every_slot() {
        let mut table = ProbabilityTable::uniform(hand_space());
        table.map(|p| p / 2.0);
        assert!((table.total() - 0.5).abs() < 1e-12);
    }
}
