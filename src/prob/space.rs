//! Ordered variable-domain descriptor for a motor-signal space
//!
//! A `SignalSpace` fixes the variables and their ordered domains once, then
//! maps complete assignments to dense slot indices and back. The index is
//! mixed-radix with the last variable varying fastest, so enumeration order
//! is stable for a fixed space and can be asserted in tests.

use crate::core::{Assignment, Result, SimError, Value};

/// One named variable with its ordered, finite domain.
#[derive(Debug, Clone)]
pub struct Variable {
    pub name: String,
    pub domain: Vec<Value>,
}

/// Fixed, ordered set of variables spanning a combinatorial assignment space.
#[derive(Debug, Clone)]
pub struct SignalSpace {
    vars: Vec<Variable>,
}

impl SignalSpace {
    /// Build a space from `(name, ordered domain)` pairs. Variable order is
    /// the given order and never changes afterward.
    pub fn new(vars: Vec<(String, Vec<Value>)>) -> Self {
        Self {
            vars: vars
                .into_iter()
                .map(|(name, domain)| Variable { name, domain })
                .collect(),
        }
    }

    pub fn variables(&self) -> &[Variable] {
        &self.vars
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Number of complete assignments: the cartesian product of all domains.
    pub fn len(&self) -> usize {
        self.vars.iter().map(|v| v.domain.len()).product()
    }

    /// Dense slot index of a fully-specified assignment.
    ///
    /// Fails if the assignment names a variable outside the space, omits one,
    /// or picks a value outside a variable's domain.
    pub fn index_of(&self, assignment: &Assignment) -> Result<usize> {
        if let Some(extra) = assignment.keys().find(|k| !self.vars.iter().any(|v| &v.name == *k)) {
            return Err(SimError::UnknownVariable(extra.clone()));
        }

        let mut index = 0;
        for var in &self.vars {
            let value = assignment
                .get(&var.name)
                .ok_or_else(|| SimError::MissingVariable(var.name.clone()))?;
            let pos = var
                .domain
                .iter()
                .position(|v| v == value)
                .ok_or_else(|| SimError::DomainViolation {
                    name: var.name.clone(),
                    value: value.clone(),
                })?;
            index = index * var.domain.len() + pos;
        }
        Ok(index)
    }

    /// Assignment at a dense slot index. Inverse of [`SignalSpace::index_of`].
    pub fn assignment_at(&self, mut index: usize) -> Assignment {
        debug_assert!(index < self.len());

        let mut assignment = Assignment::default();
        for var in self.vars.iter().rev() {
            let pos = index % var.domain.len();
            index /= var.domain.len();
            assignment.insert(var.name.clone(), var.domain[pos].clone());
        }
        assignment
    }

    /// All assignments in stable slot order, recomputed on demand.
    pub fn enumerate(&self) -> impl Iterator<Item = Assignment> + '_ {
        (0..self.len()).map(move |i| self.assignment_at(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_three() -> SignalSpace {
        SignalSpace::new(vec![
            ("left".into(), vec![Value::sym("down"), Value::sym("up")]),
            (
                "right".into(),
                vec![Value::sym("down"), Value::sym("still"), Value::sym("up")],
            ),
        ])
    }

    #[test]
    fn product_size() {
        assert_eq!(two_by_three().len(), 6);
    }

    #[test]
    fn index_roundtrip() {
        let space = two_by_three();
        for i in 0..space.len() {
            let a = space.assignment_at(i);
            assert_eq!(space.index_of(&a).unwrap(), i);
        }
    }

    #[test]
    fn enumeration_is_stable_and_last_variable_fastest() {
        let space = two_by_three();
        let all: Vec<_> = space.enumerate().collect();
        assert_eq!(all.len(), 6);
        assert_eq!(all[0]["left"], Value::sym("down"));
        assert_eq!(all[0]["right"], Value::sym("down"));
        assert_eq!(all[1]["left"], Value::sym("down"));
        assert_eq!(all[1]["right"], Value::sym("still"));
        assert_eq!(all[3]["left"], Value::sym("up"));
        assert_eq!(all[3]["right"], Value::sym("down"));
    }

    #[test]
    fn unknown_variable_is_rejected() {
        let space = two_by_three();
        let mut a = space.assignment_at(0);
        a.insert("elbow".into(), Value::sym("up"));
        assert!(matches!(
            space.index_of(&a),
            Err(SimError::UnknownVariable(v)) if v == "elbow"
        ));
    }

    #[test]
    fn missing_variable_is_rejected() {
        let space = two_by_three();
        let mut a = space.assignment_at(0);
        a.remove("right");
        assert!(matches!(
            space.index_of(&a),
            Err(SimError::MissingVariable(v)) if v == "right"
        ));
    }

    #[test]
    fn out_of_domain_value_is_rejected() {
        let space = two_by_three();
        let mut a = space.assignment_at(0);
        a.insert("left".into(), Value::sym("sideways"));
        assert!(matches!(
            space.index_of(&a),
            Err(SimError::DomainViolation { name, .. }) if name == "left"
        ));
    }
}
