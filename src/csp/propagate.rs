//! Node and arc consistency

use crate::collections::LinkedAHashSet;
use crate::csp::domain_reductions::DomainReductions;
use crate::csp::{ConstraintId, Csp, VariableId};
use crate::error::SolveError;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum PropagateResult {
    Consistent,
    /// a domain was emptied
    Conflict,
}

/// Make `x` consistent with `y` with respect to `constraint`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct Arc {
    x: VariableId,
    y: VariableId,
    constraint: ConstraintId,
}

enum Revision {
    Unchanged,
    Changed,
    Emptied,
}

impl Csp {
    /// Removes the values of each constraint's only unassigned variable that violate the constraint
    pub(crate) fn node_consistency(
        &mut self,
        constraints: &[ConstraintId],
        reductions: &mut DomainReductions,
    ) -> Result<PropagateResult, SolveError> {
        for &constraint_id in constraints {
            let variable_id = match self.unassigned_variables(constraint_id).next() {
                Some(id) => id,
                None => continue,
            };
            let result = self.reduce_unary(constraint_id, variable_id, reductions);
            self.variables[variable_id].value = None;
            result?;
            if self.variables[variable_id].domain.is_empty() {
                return Ok(PropagateResult::Conflict);
            }
        }
        Ok(PropagateResult::Consistent)
    }

    fn reduce_unary(
        &mut self,
        constraint_id: ConstraintId,
        variable_id: VariableId,
        reductions: &mut DomainReductions,
    ) -> Result<(), SolveError> {
        let mut position = 0;
        while position < self.variables[variable_id].domain.len() {
            let variable = &mut self.variables[variable_id];
            variable.value = Some(variable.domain[position].clone());
            if self.evaluate(constraint_id)? {
                position += 1;
            } else {
                reductions.remove(&mut self.variables, variable_id, position);
            }
        }
        Ok(())
    }

    /// Makes every arc of the binary constraints consistent, along with the arcs pointing at the
    /// changed variables, until no domain changes
    pub(crate) fn arc_consistency(
        &mut self,
        constraints: &[ConstraintId],
        changed: &[VariableId],
        reductions: &mut DomainReductions,
    ) -> Result<PropagateResult, SolveError> {
        let mut worklist: LinkedAHashSet<Arc> = LinkedAHashSet::default();
        for &constraint_id in constraints {
            if let Some((x, y)) = self.unassigned_pair(constraint_id) {
                enqueue(&mut worklist, x, y, constraint_id);
                enqueue(&mut worklist, y, x, constraint_id);
            }
        }
        for &variable_id in changed {
            self.enqueue_incoming_arcs(&mut worklist, variable_id);
        }
        while let Some(arc) = worklist.pop_back() {
            match self.revise(arc, reductions)? {
                Revision::Unchanged => {}
                Revision::Changed => self.enqueue_incoming_arcs(&mut worklist, arc.x),
                Revision::Emptied => {
                    trace!(
                        "domain of {} emptied by \"{}\"",
                        self.variables[arc.x].name,
                        self.constraints[arc.constraint].source()
                    );
                    return Ok(PropagateResult::Conflict);
                }
            }
        }
        Ok(PropagateResult::Consistent)
    }

    /// Adds `(other, variable)` arcs for every constraint of the variable with two unassigned variables
    fn enqueue_incoming_arcs(&self, worklist: &mut LinkedAHashSet<Arc>, variable_id: VariableId) {
        for constraint_id in self.constraints_with_degree(variable_id, 2) {
            if let Some((a, b)) = self.unassigned_pair(constraint_id) {
                let other = if a == variable_id { b } else { a };
                enqueue(worklist, other, variable_id, constraint_id);
            }
        }
    }

    fn unassigned_pair(&self, constraint_id: ConstraintId) -> Option<(VariableId, VariableId)> {
        let mut unassigned = self.unassigned_variables(constraint_id);
        match (unassigned.next(), unassigned.next(), unassigned.next()) {
            (Some(a), Some(b), None) => Some((a, b)),
            _ => None,
        }
    }

    /// Removes the values of `x` that have no supporting value in `y`
    fn revise(
        &mut self,
        arc: Arc,
        reductions: &mut DomainReductions,
    ) -> Result<Revision, SolveError> {
        let mut changed = false;
        let mut position = 0;
        while position < self.variables[arc.x].domain.len() {
            if self.has_support(arc, position)? {
                position += 1;
            } else {
                reductions.remove(&mut self.variables, arc.x, position);
                changed = true;
                if self.variables[arc.x].domain.is_empty() {
                    return Ok(Revision::Emptied);
                }
            }
        }
        Ok(if changed {
            Revision::Changed
        } else {
            Revision::Unchanged
        })
    }

    /// Returns true if some value of `y` satisfies the constraint together with the value of `x`
    /// at `position`
    fn has_support(&mut self, arc: Arc, position: usize) -> Result<bool, SolveError> {
        let value = self.variables[arc.x].domain[position].clone();
        self.variables[arc.x].value = Some(value);
        let mut result = Ok(false);
        for i in 0..self.variables[arc.y].domain.len() {
            let other = self.variables[arc.y].domain[i].clone();
            self.variables[arc.y].value = Some(other);
            match self.evaluate(arc.constraint) {
                Ok(false) => continue,
                r => {
                    result = r;
                    break;
                }
            }
        }
        self.variables[arc.x].value = None;
        self.variables[arc.y].value = None;
        result
    }
}

fn enqueue(worklist: &mut LinkedAHashSet<Arc>, x: VariableId, y: VariableId, constraint: ConstraintId) {
    let arc = Arc { x, y, constraint };
    if !worklist.contains(&arc) {
        worklist.insert(arc);
    }
}
