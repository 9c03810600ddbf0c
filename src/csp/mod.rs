//! The constraint satisfaction problem and its solver

pub use self::constraint::{Constraint, ConstraintId};
pub use self::heuristic::Heuristic;
pub use self::solution::{Solution, SolveResult, SolveStats};
pub use self::variable::{Variable, VariableId};

use ahash::AHashSet;

use crate::error::{EvalError, SetupError, SolveError};
use crate::expr::Value;

use self::wiring::connect_variables_and_constraints;

mod constraint;
mod domain_reductions;
mod heuristic;
mod propagate;
mod search;
mod solution;
mod variable;
mod wiring;

/// Switches that control propagation and variable ordering
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SolverConfig {
    /// Make the problem node consistent before searching
    pub initial_node: bool,
    /// Make the problem arc consistent before searching
    pub initial_arc: bool,
    /// Enforce node consistency after every assignment
    pub node_during_search: bool,
    /// Enforce arc consistency after every assignment
    pub arc_during_search: bool,
    pub heuristic: Heuristic,
}

/// A set of variables and the constraints between them
#[derive(Debug)]
pub struct Csp {
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    config: SolverConfig,
    assigned_count: usize,
    stats: SolveStats,
    unresolved_names: Vec<String>,
}

impl Csp {
    /// Links the variables and constraints to each other.
    /// The order of `variables` is the static assignment order.
    pub fn new(
        mut variables: Vec<Variable>,
        mut constraints: Vec<Constraint>,
    ) -> Result<Self, SetupError> {
        validate_variables(&variables)?;
        for variable in &mut variables {
            variable.value = None;
            variable.constraints.clear();
        }
        for constraint in &mut constraints {
            constraint.variables.clear();
        }
        let unresolved_names = connect_variables_and_constraints(&mut variables, &mut constraints);
        Ok(Self {
            variables,
            constraints,
            config: SolverConfig::default(),
            assigned_count: 0,
            stats: SolveStats::default(),
            unresolved_names,
        })
    }

    /// Like `new`, parsing each constraint from its predicate text
    pub fn from_sources<S: AsRef<str>>(
        variables: Vec<Variable>,
        sources: impl IntoIterator<Item = S>,
    ) -> Result<Self, SetupError> {
        let constraints = sources
            .into_iter()
            .map(|s| Constraint::new(s.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(variables, constraints)
    }

    pub fn with_config(mut self, config: SolverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn set_config(&mut self, config: SolverConfig) {
        self.config = config;
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn variable(&self, id: VariableId) -> &Variable {
        &self.variables[id]
    }

    pub fn variable_id(&self, name: &str) -> Option<VariableId> {
        self.variables.iter().position(|v| v.name == name)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Counters from the most recent solve
    pub fn stats(&self) -> SolveStats {
        self.stats
    }

    /// Identifiers in the constraints that do not name a variable
    pub fn unresolved_names(&self) -> &[String] {
        &self.unresolved_names
    }

    /// The number of variables that currently hold a value
    pub fn assigned_count(&self) -> usize {
        self.assigned_count
    }

    fn is_solved(&self) -> bool {
        self.assigned_count == self.variables.len()
    }

    /// Evaluates a constraint with the current assignment
    fn evaluate(&mut self, constraint_id: ConstraintId) -> Result<bool, SolveError> {
        self.stats.evaluations += 1;
        let constraint = &self.constraints[constraint_id];
        let mut slots: Vec<&Value> = Vec::with_capacity(constraint.variables.len());
        for &id in &constraint.variables {
            let variable = &self.variables[id];
            match &variable.value {
                Some(value) => slots.push(value),
                None => {
                    let error = EvalError::UnassignedVariable(variable.name.clone());
                    return Err(SolveError::new(constraint.source().to_string(), error));
                }
            }
        }
        constraint
            .expr
            .evaluate(&slots)
            .and_then(Value::into_bool)
            .map_err(|e| SolveError::new(constraint.source().to_string(), e))
    }

    /// The variables of a constraint that do not hold a value
    fn unassigned_variables(
        &self,
        constraint_id: ConstraintId,
    ) -> impl Iterator<Item = VariableId> + '_ {
        self.constraints[constraint_id]
            .variables
            .iter()
            .copied()
            .filter(move |&id| !self.variables[id].is_assigned())
    }

    fn unassigned_count(&self, constraint_id: ConstraintId) -> usize {
        self.unassigned_variables(constraint_id).count()
    }

    /// The constraints of a variable that have exactly `n` unassigned variables
    fn constraints_with_degree(&self, variable_id: VariableId, n: usize) -> Vec<ConstraintId> {
        self.variables[variable_id]
            .constraints
            .iter()
            .copied()
            .filter(|&c| self.unassigned_count(c) == n)
            .collect()
    }

    /// Returns true if a constraint of the variable with every variable assigned is violated
    fn is_conflicting(&mut self, variable_id: VariableId) -> Result<bool, SolveError> {
        for constraint_id in self.constraints_with_degree(variable_id, 0) {
            if !self.evaluate(constraint_id)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

pub(crate) fn validate_variables(variables: &[Variable]) -> Result<(), SetupError> {
    let mut names: AHashSet<&str> = AHashSet::default();
    for variable in variables {
        if !names.insert(variable.name.as_str()) {
            return Err(SetupError::DuplicateVariable(variable.name.clone()));
        }
        let mut values: AHashSet<&Value> = AHashSet::default();
        for value in &variable.domain {
            if !values.insert(value) {
                return Err(SetupError::DuplicateValue {
                    variable: variable.name.clone(),
                    value: value.clone(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::csp::{Csp, Variable};
    use crate::error::{EvalError, ParseErrorType, SetupError};

    fn binary_variables() -> Vec<Variable> {
        vec![
            Variable::new("A", 0..2),
            Variable::new("B", 0..2),
            Variable::new("C", 0..2),
        ]
    }

    #[test]
    fn duplicate_variable() {
        let variables = vec![Variable::new("A", 0..2), Variable::new("A", 0..3)];
        let result = Csp::new(variables, Vec::new());
        assert!(matches!(result, Err(SetupError::DuplicateVariable(name)) if name == "A"));
    }

    #[test]
    fn duplicate_value() {
        let variables = vec![Variable::new("A", vec![1, 2, 1])];
        let result = Csp::new(variables, Vec::new());
        assert!(matches!(result, Err(SetupError::DuplicateValue { .. })));
    }

    #[test]
    fn invalid_source() {
        let result = Csp::from_sources(binary_variables(), &["A + B ==", "A != C"]);
        match result {
            Err(SetupError::Parse(e)) => assert_eq!(ParseErrorType::UnexpectedEnd, e.error_type()),
            other => panic!("unexpected result: {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn evaluate_requires_assignment() {
        let mut csp = Csp::from_sources(binary_variables(), &["A != B"]).unwrap();
        let error = csp.evaluate(0).unwrap_err();
        assert_eq!(&EvalError::UnassignedVariable("A".into()), error.eval_error());
        csp.variables[0].value = Some(0.into());
        csp.variables[1].value = Some(1.into());
        assert!(csp.evaluate(0).unwrap());
        assert_eq!(2, csp.stats().evaluations);
    }

    #[test]
    fn constraints_with_degree() {
        let mut csp =
            Csp::from_sources(binary_variables(), &["A + B + C == 2", "A != B", "A == 1"])
                .unwrap();
        assert_eq!(vec![2], csp.constraints_with_degree(0, 1));
        assert_eq!(vec![1], csp.constraints_with_degree(0, 2));
        csp.variables[1].value = Some(0.into());
        assert_eq!(vec![1, 2], csp.constraints_with_degree(0, 1));
        assert_eq!(vec![0], csp.constraints_with_degree(0, 2));
    }
}
