//! Backtracking search

use crate::csp::domain_reductions::DomainReductions;
use crate::csp::heuristic::SelectVariable;
use crate::csp::propagate::PropagateResult;
use crate::csp::{ConstraintId, Csp, Solution, SolveResult, SolveStats, VariableId};
use crate::error::SolveError;
use crate::expr::Value;

impl Csp {
    /// Finds every solution
    pub fn solve(&mut self) -> Result<SolveResult, SolveError> {
        let mut solutions = Vec::new();
        let stats = self.solve_with(|solution| solutions.push(solution.clone()))?;
        Ok(SolveResult { solutions, stats })
    }

    /// Finds every solution, passing each one to `on_solution` as it is found.
    /// Variable domains are restored before returning.
    pub fn solve_with(
        &mut self,
        mut on_solution: impl FnMut(&Solution),
    ) -> Result<SolveStats, SolveError> {
        self.stats = SolveStats::default();
        self.assigned_count = 0;
        if !self.check_constant_constraints()? {
            info!("a constraint without variables is false");
            return Ok(self.stats);
        }
        let mut reductions = DomainReductions::default();
        let result = match self.preprocess(&mut reductions) {
            Ok(PropagateResult::Consistent) => {
                info!("begin backtracking");
                self.search_next(&mut on_solution)
            }
            Ok(PropagateResult::Conflict) => Ok(()),
            Err(e) => Err(e),
        };
        reductions.revert(&mut self.variables);
        result?;
        info!("{}", self.stats);
        Ok(self.stats)
    }

    fn check_constant_constraints(&mut self) -> Result<bool, SolveError> {
        for constraint_id in 0..self.constraints.len() {
            if self.constraints[constraint_id].arity() == 0 && !self.evaluate(constraint_id)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Initial node and arc consistency
    fn preprocess(
        &mut self,
        reductions: &mut DomainReductions,
    ) -> Result<PropagateResult, SolveError> {
        if self.config.initial_node {
            let unary = self.constraints_with_arity(1);
            let result = self.node_consistency(&unary, reductions)?;
            self.log_reductions("init node", reductions);
            if result == PropagateResult::Conflict {
                info!("empty domain found while making the problem node consistent");
                return Ok(result);
            }
        }
        if self.config.initial_arc {
            let binary = self.constraints_with_arity(2);
            let mut arc_reductions = DomainReductions::default();
            let result = self.arc_consistency(&binary, &[], &mut arc_reductions);
            self.log_reductions("init arc", &arc_reductions);
            reductions.extend(arc_reductions);
            if result? == PropagateResult::Conflict {
                info!("empty domain found while making the problem arc consistent");
                return Ok(PropagateResult::Conflict);
            }
        }
        Ok(PropagateResult::Consistent)
    }

    fn constraints_with_arity(&self, arity: usize) -> Vec<ConstraintId> {
        (0..self.constraints.len())
            .filter(|&c| self.constraints[c].arity() == arity)
            .collect()
    }

    fn search_next(&mut self, on_solution: &mut dyn FnMut(&Solution)) -> Result<(), SolveError> {
        self.stats.states += 1;
        let variable_id = match self.config.heuristic.select_variable(self) {
            Some(id) => id,
            None => {
                let solution = self.current_solution();
                debug!("{}solution found: {}", indent(self.assigned_count), solution);
                self.stats.solutions += 1;
                on_solution(&solution);
                return Ok(());
            }
        };
        self.assigned_count += 1;
        let domain = self.variables[variable_id].domain.clone();
        debug!(
            "{}choosing variable {} with domain [{}]",
            self.indent(),
            self.variables[variable_id].name,
            itertools::join(&domain, ", ")
        );
        let result = self.try_values(variable_id, &domain, on_solution);
        self.variables[variable_id].value = None;
        self.assigned_count -= 1;
        result
    }

    fn try_values(
        &mut self,
        variable_id: VariableId,
        domain: &[Value],
        on_solution: &mut dyn FnMut(&Solution),
    ) -> Result<(), SolveError> {
        for value in domain {
            debug!(
                "{}assigning {} to {}",
                self.indent(),
                value,
                self.variables[variable_id].name
            );
            self.variables[variable_id].value = Some(value.clone());
            if self.is_conflicting(variable_id)? {
                debug!("{}direct conflict", self.indent());
                continue;
            }
            let mut reductions = DomainReductions::default();
            let result = match self.propagate_assignment(variable_id, &mut reductions) {
                Ok(PropagateResult::Consistent) => self.search_next(on_solution),
                Ok(PropagateResult::Conflict) => Ok(()),
                Err(e) => Err(e),
            };
            reductions.revert(&mut self.variables);
            result?;
        }
        Ok(())
    }

    /// Node and arc consistency scoped to the constraints of a newly assigned variable
    fn propagate_assignment(
        &mut self,
        variable_id: VariableId,
        reductions: &mut DomainReductions,
    ) -> Result<PropagateResult, SolveError> {
        if self.config.node_during_search {
            let unary = self.constraints_with_degree(variable_id, 1);
            let result = self.node_consistency(&unary, reductions)?;
            self.log_reductions("node", reductions);
            if result == PropagateResult::Conflict {
                debug!("{}empty domain found by node consistency", self.indent());
                return Ok(result);
            }
        }
        if self.config.arc_during_search {
            let binary = self.constraints_with_degree(variable_id, 2);
            let changed = reductions.changed_variables();
            let mut arc_reductions = DomainReductions::default();
            let result = self.arc_consistency(&binary, &changed, &mut arc_reductions);
            self.log_reductions("arc", &arc_reductions);
            reductions.extend(arc_reductions);
            if result? == PropagateResult::Conflict {
                debug!("{}empty domain found by arc consistency", self.indent());
                return Ok(PropagateResult::Conflict);
            }
        }
        Ok(PropagateResult::Consistent)
    }

    fn current_solution(&self) -> Solution {
        let assignments = self
            .variables
            .iter()
            .filter_map(|v| Some((v.name.clone(), v.value.clone()?)))
            .collect();
        Solution::new(assignments)
    }

    fn log_reductions(&self, phase: &str, reductions: &DomainReductions) {
        if !log_enabled!(log::Level::Debug) {
            return;
        }
        for (variable_id, values) in &reductions.by_variable() {
            debug!(
                "{}{}: remove [{}] from the domain of {}",
                self.indent(),
                phase,
                itertools::join(values, ", "),
                self.variables[variable_id].name
            );
        }
    }

    fn indent(&self) -> String {
        indent(self.assigned_count)
    }
}

fn indent(assigned_count: usize) -> String {
    "  ".repeat(assigned_count.saturating_sub(1))
}
