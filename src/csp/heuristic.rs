//! Strategies for choosing the next variable to assign

use std::fmt::{self, Display, Formatter};
use std::hash::BuildHasherDefault;
use std::str::FromStr;

use ahash::AHasher;
use enum_dispatch::enum_dispatch;
use linked_hash_map::LinkedHashMap;

use crate::csp::{Csp, VariableId};
use crate::error::ConfigError;

#[enum_dispatch]
pub(crate) trait SelectVariable {
    /// Returns the next unassigned variable, or `None` if every variable is assigned
    fn select_variable(&self, csp: &Csp) -> Option<VariableId>;
}

/// A variable ordering heuristic
#[enum_dispatch(SelectVariable)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heuristic {
    StaticOrder,
    MinimumRemainingValues,
    DegreeHeuristic,
}

impl Heuristic {
    /// The names accepted by `from_str`
    pub const NAMES: [&'static str; 3] = ["none", "mrv", "degree"];

    pub fn name(self) -> &'static str {
        match self {
            Heuristic::StaticOrder(_) => "none",
            Heuristic::MinimumRemainingValues(_) => "mrv",
            Heuristic::DegreeHeuristic(_) => "degree",
        }
    }
}

impl Default for Heuristic {
    fn default() -> Self {
        StaticOrder.into()
    }
}

impl FromStr for Heuristic {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let heuristic = match s {
            "none" => StaticOrder.into(),
            "mrv" => MinimumRemainingValues.into(),
            "degree" => DegreeHeuristic.into(),
            _ => return Err(ConfigError::UnknownHeuristic(s.to_string())),
        };
        Ok(heuristic)
    }
}

impl Display for Heuristic {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Variables in declaration order
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StaticOrder;

impl SelectVariable for StaticOrder {
    fn select_variable(&self, csp: &Csp) -> Option<VariableId> {
        if csp.is_solved() {
            None
        } else {
            Some(csp.assigned_count)
        }
    }
}

/// The variable with the smallest domain
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MinimumRemainingValues;

impl SelectVariable for MinimumRemainingValues {
    fn select_variable(&self, csp: &Csp) -> Option<VariableId> {
        csp.variables
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_assigned())
            .min_by_key(|(_, v)| v.domain.len())
            .map(|(id, _)| id)
    }
}

/// The variable involved in the most unassigned constraint slots
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DegreeHeuristic;

impl SelectVariable for DegreeHeuristic {
    fn select_variable(&self, csp: &Csp) -> Option<VariableId> {
        let mut tally: LinkedHashMap<VariableId, usize, BuildHasherDefault<AHasher>> =
            LinkedHashMap::default();
        for constraint_id in 0..csp.constraints.len() {
            for variable_id in csp.unassigned_variables(constraint_id) {
                match tally.get_mut(&variable_id) {
                    Some(count) => *count += 1,
                    None => {
                        tally.insert(variable_id, 1);
                    }
                }
            }
        }
        let mut best: Option<(VariableId, usize)> = None;
        for (&variable_id, &count) in tally.iter() {
            if best.map_or(true, |(_, best_count)| count > best_count) {
                best = Some((variable_id, count));
            }
        }
        match best {
            Some((variable_id, _)) => Some(variable_id),
            None => csp.variables.iter().position(|v| !v.is_assigned()),
        }
    }
}
