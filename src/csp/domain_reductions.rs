use itertools::Itertools;
use vec_map::VecMap;

use crate::csp::{Variable, VariableId};
use crate::expr::Value;

/// A log of values removed from variable domains, in the order they were removed
#[derive(Debug, Default)]
pub(crate) struct DomainReductions {
    removals: Vec<Removal>,
}

#[derive(Debug)]
struct Removal {
    variable: VariableId,
    /// position of the value in the domain at the time it was removed
    position: usize,
    value: Value,
}

impl DomainReductions {
    /// Removes the value at `position` from the variable's domain and records it
    pub fn remove(&mut self, variables: &mut [Variable], variable: VariableId, position: usize) {
        let value = variables[variable].domain.remove(position);
        self.removals.push(Removal {
            variable,
            position,
            value,
        });
    }

    /// Appends the removals of a later propagation step
    pub fn extend(&mut self, other: DomainReductions) {
        self.removals.extend(other.removals);
    }

    pub fn is_empty(&self) -> bool {
        self.removals.is_empty()
    }

    /// Variables with removed values, in order of first removal
    pub fn changed_variables(&self) -> Vec<VariableId> {
        self.removals.iter().map(|r| r.variable).unique().collect()
    }

    /// Removed values grouped by variable
    pub fn by_variable(&self) -> VecMap<Vec<&Value>> {
        let mut map: VecMap<Vec<&Value>> = VecMap::new();
        for removal in &self.removals {
            map.entry(removal.variable)
                .or_insert_with(Vec::new)
                .push(&removal.value);
        }
        map
    }

    /// Puts every removed value back where it was, most recent first
    pub fn revert(self, variables: &mut [Variable]) {
        for removal in self.removals.into_iter().rev() {
            variables[removal.variable]
                .domain
                .insert(removal.position, removal.value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DomainReductions;
    use crate::csp::Variable;
    use crate::expr::Value;

    fn domain(variable: &Variable) -> Vec<i64> {
        variable.domain().iter().filter_map(Value::as_int).collect()
    }

    #[test]
    fn revert_restores_order() {
        let mut variables = vec![Variable::new("A", 1..=5), Variable::new("B", 1..=3)];
        let mut reductions = DomainReductions::default();
        // remove 2 and 3 from A, then 1 from B, then 5 from A
        reductions.remove(&mut variables, 0, 1);
        reductions.remove(&mut variables, 0, 1);
        reductions.remove(&mut variables, 1, 0);
        reductions.remove(&mut variables, 0, 2);
        assert_eq!(vec![1, 4], domain(&variables[0]));
        assert_eq!(vec![2, 3], domain(&variables[1]));
        assert_eq!(vec![0, 1], reductions.changed_variables());
        let by_variable = reductions.by_variable();
        assert_eq!(
            vec![&Value::Int(2), &Value::Int(3), &Value::Int(5)],
            by_variable[0]
        );
        reductions.revert(&mut variables);
        assert_eq!(vec![1, 2, 3, 4, 5], domain(&variables[0]));
        assert_eq!(vec![1, 2, 3], domain(&variables[1]));
    }
}
