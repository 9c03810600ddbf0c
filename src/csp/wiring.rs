//! Link constraints to the variables their predicates mention

use ahash::{AHashMap, AHashSet};

use crate::csp::{Constraint, Variable, VariableId};

/// Resolves the free identifiers of every constraint against the variable names, links each
/// constraint and variable to each other, and binds the predicates to their variables.
/// Returns the distinct unresolved names in the order they were first seen.
pub(crate) fn connect_variables_and_constraints(
    variables: &mut [Variable],
    constraints: &mut [Constraint],
) -> Vec<String> {
    let name_table: AHashMap<String, VariableId> = variables
        .iter()
        .enumerate()
        .map(|(id, v)| (v.name.clone(), id))
        .collect();
    let mut warned: AHashSet<String> = AHashSet::default();
    let mut unresolved = Vec::new();
    for (constraint_id, constraint) in constraints.iter_mut().enumerate() {
        let mut linked: Vec<VariableId> = Vec::new();
        for name in constraint.expr.free_identifiers() {
            match name_table.get(name) {
                Some(&variable_id) => {
                    if !linked.contains(&variable_id) {
                        linked.push(variable_id);
                        variables[variable_id].constraints.push(constraint_id);
                    }
                }
                None => {
                    if warned.insert(name.to_string()) {
                        warn!(
                            "variable '{}' not recognized, it will be interpreted as a constant or function",
                            name
                        );
                        unresolved.push(name.to_string());
                    }
                }
            }
        }
        constraint.expr.bind(&mut |name| {
            let variable_id = name_table.get(name)?;
            linked.iter().position(|id| id == variable_id)
        });
        constraint.variables = linked;
    }
    unresolved
}

#[cfg(test)]
mod tests {
    use super::connect_variables_and_constraints;
    use crate::csp::{Constraint, Variable};

    #[test]
    fn links_both_ways() {
        let mut variables = vec![
            Variable::new("A", 0..2),
            Variable::new("B", 0..2),
            Variable::new("C", 0..2),
        ];
        let mut constraints = vec![
            Constraint::new("C > A").unwrap(),
            Constraint::new("B == B * 1").unwrap(),
        ];
        let unresolved = connect_variables_and_constraints(&mut variables, &mut constraints);
        assert!(unresolved.is_empty());
        assert_eq!(&[2, 0], constraints[0].variables());
        assert_eq!(&[1], constraints[1].variables());
        assert_eq!(&[0], variables[0].constraints());
        assert_eq!(&[1], variables[1].constraints());
        assert_eq!(&[0], variables[2].constraints());
    }

    #[test]
    fn unresolved_names_reported_once() {
        let mut variables = vec![Variable::new("Q0", 0..4), Variable::new("Q1", 0..4)];
        let mut constraints = vec![
            Constraint::new("1 != abs(Q0 - Q1)").unwrap(),
            Constraint::new("abs(Q0) < N and N > 0").unwrap(),
        ];
        let unresolved = connect_variables_and_constraints(&mut variables, &mut constraints);
        assert_eq!(vec!["abs".to_string(), "N".to_string()], unresolved);
        assert_eq!(2, constraints[0].arity());
        assert_eq!(1, constraints[1].arity());
    }
}
